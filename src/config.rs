//! Process configuration.
//!
//! Everything is read from the environment once at startup and immutable
//! afterwards, like the catalog it feeds:
//!
//! - `GATEWAY_ADDR` — listen address, default `0.0.0.0:8080`
//! - `LOG_LEVEL` — tracing filter directive, default `info`
//! - `PROTECTED_PROCEDURES` — comma-separated procedure paths requiring a
//!   verified identity; defaults to the standard protected set
//!
//! Config reload is out of scope: changing the protected set means a
//! restart, which is also what makes the set auditable — what is protected
//! is what was deployed.

use std::env;

use tracing_subscriber::EnvFilter;

use crate::catalog::ProtectedProcedureSet;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Startup configuration, sourced from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub addr: String,
    pub log_level: String,
    protected_procedures: Option<Vec<String>>,
}

impl Config {
    /// Reads configuration from the environment, filling defaults.
    pub fn from_env() -> Self {
        Self {
            addr: env::var("GATEWAY_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_owned()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_owned()),
            protected_procedures: env::var("PROTECTED_PROCEDURES")
                .ok()
                .map(|raw| parse_procedure_list(&raw)),
        }
    }

    /// The protected-procedure set this deployment enforces.
    pub fn protected_procedures(&self) -> ProtectedProcedureSet {
        match &self.protected_procedures {
            Some(paths) => ProtectedProcedureSet::new(paths.iter().cloned()),
            None => ProtectedProcedureSet::standard(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_owned(),
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
            protected_procedures: None,
        }
    }
}

/// Splits a comma-separated path list, trimming whitespace and dropping
/// empty entries.
fn parse_procedure_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set, so operators can
/// raise verbosity per-target without touching deployment config.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
