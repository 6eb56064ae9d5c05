//! Process-wide tracing subscriber for hosts that do not install their own.
//!
//! Filtering comes from `DASHGRID_LOG` (standard `EnvFilter` directives,
//! e.g. `dashgrid.store=debug,info`), defaulting to `info`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "DASHGRID_LOG";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line records.
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}

/// Install a global fmt subscriber.
///
/// Returns `false` when another subscriber was already installed, in which
/// case that subscriber stays in place.
pub fn init_logging(format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = match format {
        LogFormat::Text => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };
    if installed {
        tracing::debug!(target: "dashgrid.engine", ?format, "logging initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_rejected() {
        let _ = init_logging(LogFormat::Text);
        assert!(!init_logging(LogFormat::Json));
    }
}
