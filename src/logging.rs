use tracing_subscriber::EnvFilter;

/// Level applied when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Build the filter from `RUST_LOG`-style directives, falling back to `info`
/// so per-item progress reaches the console by default.
pub fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

pub fn init() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(directives.as_deref()))
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn defaults_to_info() {
        assert_eq!(env_filter(None).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn explicit_directives_win() {
        assert_eq!(env_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(env_filter(Some("warn")).max_level_hint(), Some(LevelFilter::WARN));
    }
}
