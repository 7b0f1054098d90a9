// src/prompt/mod.rs
//! System prompt assembly.
//!
//! Every completion gets the active persona's prompt followed by the study's
//! conversation style guidelines, so swapped personas keep a consistent
//! human-like register.

pub mod defaults;

pub use defaults::{
    DEFAULT_BASE_INSTRUCTIONS, DEFAULT_EXIT_MODAL_TEXT, DEFAULT_SYSTEM_PROMPT,
};

/// AdminSettings key holding the style guidelines appended to every prompt.
pub const BASE_INSTRUCTIONS_KEY: &str = "humanLikeInstructions";
pub const BASE_INSTRUCTIONS_DESCRIPTION: &str =
    "Base conversation style instructions appended to all system prompts";

/// AdminSettings key holding the exit confirmation copy shown to participants.
pub const EXIT_MODAL_KEY: &str = "exitChatModalText";
pub const EXIT_MODAL_DESCRIPTION: &str = "Text displayed in the exit chat confirmation modal";

/// Persona prompt with the style guidelines appended verbatim.
pub fn compose_system_prompt(persona_prompt: &str, base_instructions: &str) -> String {
    format!("{persona_prompt}{base_instructions}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_appends_guidelines_verbatim() {
        let prompt = compose_system_prompt("You are Ada.", "\n# Style\n- be brief\n");
        assert_eq!(prompt, "You are Ada.\n# Style\n- be brief\n");
    }

    #[test]
    fn default_guidelines_start_with_a_heading() {
        assert!(DEFAULT_BASE_INSTRUCTIONS.contains("# Conversation Style Guidelines"));
    }
}
