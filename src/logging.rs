//! Logger setup for hosts that embed the library

use crate::config::LoggingConfig;
use crate::error::Result;
use log::debug;

/// Install an `env_logger` using the configured level as the default filter.
///
/// `RUST_LOG` still takes precedence. Calling this again after a logger has
/// been installed is not an error.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = config.level_filter()?;
    let env = env_logger::Env::default().default_filter_or(level.to_string());

    if env_logger::Builder::from_env(env).try_init().is_err() {
        debug!("Logger already initialised, keeping existing one");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VpnError;

    #[test]
    fn test_init_logging_is_repeatable() {
        let config = LoggingConfig::default();
        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_init_logging_rejects_unknown_level() {
        let config = LoggingConfig {
            level: "chatty".to_string(),
        };
        assert!(matches!(init_logging(&config), Err(VpnError::Config(_))));
    }
}
