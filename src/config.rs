//! Configuración del engine desde variables de entorno.
//!
//! Variables reconocidas (el archivo `.env` se carga una sola vez):
//! - `STORYFLOW_ENFORCE_CONTRACT`: `true`/`false` (también `1`/`0`, `yes`/`no`).
//!   Por defecto `true`.
//! - `STORYFLOW_CONTRACT_POLICY`: `fail_fast` | `collect_all`. Por defecto
//!   `fail_fast`.
use std::env;

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use thiserror::Error;

use story_core::{EngineOptions, StoryEngine, ValidationPolicy};

pub const ENFORCE_CONTRACT_VAR: &str = "STORYFLOW_ENFORCE_CONTRACT";
pub const CONTRACT_POLICY_VAR: &str = "STORYFLOW_CONTRACT_POLICY";

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: '{value}' is not a boolean")]
    InvalidBool { var: &'static str, value: String },
    #[error("{var}: {reason}")]
    InvalidPolicy { var: &'static str, reason: String },
}

/// Configuración global de la aplicación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppConfig {
    /// Opciones con que se construye el engine.
    pub engine: EngineOptions,
}

impl AppConfig {
    /// Lee la configuración del entorno del proceso (tras cargar `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        init_dotenv();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de
    /// variables. Las ausentes toman su valor por defecto.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
        where L: Fn(&str) -> Option<String>
    {
        let mut engine = EngineOptions::default();
        if let Some(raw) = lookup(ENFORCE_CONTRACT_VAR) {
            engine.enforce_contract = parse_bool(ENFORCE_CONTRACT_VAR, &raw)?;
        }
        if let Some(raw) = lookup(CONTRACT_POLICY_VAR) {
            engine.contract_policy =
                raw.parse::<ValidationPolicy>()
                   .map_err(|reason| ConfigError::InvalidPolicy { var: CONTRACT_POLICY_VAR, reason })?;
        }
        Ok(Self { engine })
    }

    /// Engine con factory por defecto y las opciones de esta configuración.
    pub fn engine(&self) -> StoryEngine {
        StoryEngine::builder().options(self.engine).build()
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var, value: raw.to_string() }),
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
/// Un valor inválido se registra y se usa la configuración por defecto.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    AppConfig::from_env().unwrap_or_else(|e| {
                             log::warn!("invalid configuration, using defaults: {e}");
                             AppConfig::default()
                         })
});

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

/// Engine construido a partir de `CONFIG`.
pub fn engine_from_env() -> StoryEngine {
    CONFIG.engine()
}
