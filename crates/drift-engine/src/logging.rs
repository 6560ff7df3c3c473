use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize a tracing subscriber for the host process.
///
/// Formatted, compact output with targets and levels; the `RUST_LOG`
/// environment variable controls the filter, defaulting to "info".
/// Scan-run session ids arrive as span fields, so every event of a run
/// can be correlated across the distributed logs.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{info, warn};

    #[test]
    fn init_is_idempotent_enough_for_tests() {
        // only the first init in a process wins; later calls must not panic
        let _ = init();
        let _ = init();

        info!("info after init");
        warn!("warn after init");
    }
}
