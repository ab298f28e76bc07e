//! `tracing` subscriber setup for the server binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, or by
/// `default_level` for the Spyroom crates when `RUST_LOG` is unset.
///
/// Does nothing if a global subscriber is already installed.
///
/// ```no_run
/// spyroom::init_tracing("debug");
/// ```
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(default_level)));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn default_filter(level: &str) -> String {
    [
        "spyroom",
        "spyroom_server",
        "spyroom_room",
        "spyroom_protocol",
        "spyroom_transport",
    ]
    .iter()
    .map(|target| format!("{target}={level}"))
    .collect::<Vec<_>>()
    .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_every_crate() {
        let filter = default_filter("warn");
        assert!(filter.starts_with("spyroom=warn,"));
        assert!(filter.contains("spyroom_room=warn"));
        assert!(filter.contains("spyroom_transport=warn"));
        assert!(filter.parse::<EnvFilter>().is_ok());
    }
}
