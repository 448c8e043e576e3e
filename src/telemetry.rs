use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "warn,gh_query=debug,ghq=debug"
    } else {
        "warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // Ignore the error if a subscriber is already set.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr)
        .try_init();
}
