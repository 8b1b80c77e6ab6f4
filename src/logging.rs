use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so stdout only carries matches and counts.
/// RUST_LOG wins over the -v count when it is set.
pub fn setup_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug,hickory_proto=info,hickory_resolver=info",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert!(level_for(2).starts_with("debug"));
        assert_eq!(level_for(7), "trace");
    }
}
