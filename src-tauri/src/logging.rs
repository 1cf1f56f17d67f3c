use sha2::{Digest, Sha256};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. A set `RUST_LOG` replaces `level`
/// entirely; repeated calls are ignored.
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level, std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_writer(std::io::stderr)
        .try_init();
}

fn env_filter(level: &str, rust_log: Option<String>) -> EnvFilter {
    match rust_log.filter(|value| !value.trim().is_empty()) {
        Some(directives) => EnvFilter::new(directives),
        None => {
            let directive = level
                .parse::<Directive>()
                .unwrap_or_else(|_| tracing::Level::INFO.into());
            EnvFilter::builder()
                .with_default_directive(directive)
                .parse_lossy("")
        }
    }
}

/// Short stable tag for a bearer token, safe to log.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest
        .iter()
        .take(6)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn fingerprint_is_short_and_stable() {
        let first = token_fingerprint("eyJhbGciOiJIUzI1NiJ9.payload");
        assert_eq!(first.len(), 12);
        assert_eq!(first, token_fingerprint("eyJhbGciOiJIUzI1NiJ9.payload"));
        assert_ne!(first, token_fingerprint("other"));
        assert!(!first.contains("eyJ"));
    }

    #[test]
    fn rust_log_replaces_the_configured_level() {
        let filter = env_filter("warn", Some("debug".to_string()));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = env_filter("warn", None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));

        let filter = env_filter("not a level", Some("  ".to_string()));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}
