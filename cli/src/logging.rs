use tracing_subscriber::{fmt, EnvFilter};

/// Level used when `RUST_LOG` is not set.
pub fn default_level(verbose: bool, machine_output: bool) -> &'static str {
    if machine_output {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Installs the fmt subscriber on stderr. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
