use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber: stderr output, `hushold=info` unless
/// `RUST_LOG` says otherwise.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let default = if verbose { "hushold=debug" } else { "hushold=info" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
