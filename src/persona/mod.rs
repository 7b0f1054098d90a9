// src/persona/mod.rs
// Persona rows: named system prompts the rotation scheduler switches between.

pub mod store;
pub mod types;

pub use store::PersonaStore;
pub use types::{CreatePersonaRequest, Persona, PersonaRef, UpdatePersonaRequest};
