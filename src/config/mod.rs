// src/config/mod.rs
// All tunables load from the environment (or .env), with working defaults.

use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::rotation::RotationCurve;

#[derive(Debug, Clone, Deserialize)]
pub struct ChameleonConfig {
    // ── Server
    pub host: String,
    pub port: u16,
    pub cors_origin: String,

    // ── Database
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── OpenAI
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_timeout: u64,

    // ── Admin access
    pub admin_password: String,

    // ── Persona rotation
    pub rotation_tick_seconds: u64,
    pub rotate_early_fraction: f64,
    pub rotate_late_fraction: f64,
    pub rotate_early_chance: f64,
    pub rotate_mid_chance: f64,
    pub rotate_late_chance: f64,

    // ── Logging
    pub log_level: String,
}

/// Parse an env var, falling back to `default` when unset or unparseable.
/// Values may carry inline comments and surrounding whitespace.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: could not parse {key} = '{val}', keeping default");
                    default
                }
            }
        }
        Err(_) => default,
    }
}

impl ChameleonConfig {
    pub fn from_env() -> Self {
        // .env values are visible to env_var_or after this
        let _ = dotenvy::dotenv();

        let curve = RotationCurve::default();
        Self {
            host: env_var_or("CHAMELEON_HOST", "0.0.0.0".to_string()),
            port: env_var_or("CHAMELEON_PORT", 3000),
            cors_origin: env_var_or("CHAMELEON_CORS_ORIGIN", "http://localhost:3000".to_string()),
            database_url: env_var_or("DATABASE_URL", "sqlite:./chameleon.db".to_string()),
            sqlite_max_connections: env_var_or("SQLITE_MAX_CONNECTIONS", 10),
            openai_api_key: env_var_or("OPENAI_API_KEY", String::new()),
            openai_base_url: env_var_or(
                "OPENAI_BASE_URL",
                "https://api.openai.com/v1".to_string(),
            ),
            openai_timeout: env_var_or("CHAMELEON_OPENAI_TIMEOUT", 60),
            admin_password: env_var_or("ADMIN_PASSWORD", String::new()),
            rotation_tick_seconds: env_var_or("CHAMELEON_ROTATION_TICK_SECONDS", 60),
            rotate_early_fraction: env_var_or("CHAMELEON_ROTATE_EARLY_FRACTION", curve.early_fraction),
            rotate_late_fraction: env_var_or("CHAMELEON_ROTATE_LATE_FRACTION", curve.late_fraction),
            rotate_early_chance: env_var_or("CHAMELEON_ROTATE_EARLY_CHANCE", curve.early_chance),
            rotate_mid_chance: env_var_or("CHAMELEON_ROTATE_MID_CHANCE", curve.mid_chance),
            rotate_late_chance: env_var_or("CHAMELEON_ROTATE_LATE_CHANCE", curve.late_chance),
            log_level: env_var_or("CHAMELEON_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Timeout for completion requests.
    pub fn openai_request_timeout(&self) -> Duration {
        Duration::from_secs(self.openai_timeout)
    }

    /// Cadence of the background rotation check.
    pub fn rotation_tick(&self) -> Duration {
        Duration::from_secs(self.rotation_tick_seconds)
    }

    /// Rotation curve with any env overrides applied.
    pub fn rotation_curve(&self) -> RotationCurve {
        RotationCurve {
            early_fraction: self.rotate_early_fraction,
            late_fraction: self.rotate_late_fraction,
            early_chance: self.rotate_early_chance,
            mid_chance: self.rotate_mid_chance,
            late_chance: self.rotate_late_chance,
        }
    }
}

// Read once, on first touch. Tests that need a different ADMIN_PASSWORD set
// it before anything dereferences CONFIG.
pub static CONFIG: Lazy<ChameleonConfig> = Lazy::new(ChameleonConfig::from_env);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_vars_fall_back_to_defaults() {
        assert_eq!(env_var_or("CHAMELEON_TEST_NO_SUCH_VAR", 42), 42);
        assert_eq!(
            env_var_or("CHAMELEON_TEST_NO_SUCH_VAR", "fallback".to_string()),
            "fallback"
        );
    }

    #[test]
    fn convenience_methods() {
        let config = ChameleonConfig::from_env();

        assert!(config.bind_address().contains(':'));
        assert_eq!(config.rotation_tick(), Duration::from_secs(config.rotation_tick_seconds));
        assert_eq!(
            config.openai_request_timeout(),
            Duration::from_secs(config.openai_timeout)
        );
    }

    #[test]
    fn curve_defaults_match_policy_defaults() {
        let config = ChameleonConfig::from_env();
        let curve = config.rotation_curve();
        let default = RotationCurve::default();

        assert_eq!(curve.early_fraction, default.early_fraction);
        assert_eq!(curve.late_fraction, default.late_fraction);
        assert_eq!(curve.early_chance, default.early_chance);
        assert_eq!(curve.mid_chance, default.mid_chance);
        assert_eq!(curve.late_chance, default.late_chance);
    }
}
