use std::time::{Duration, Instant};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Diagnostics stay silent unless `RUST_LOG` asks for them, so nothing but
/// the form reaches the user's terminal.
pub const DEFAULT_FILTER: &str = "off";

/// Filter from a `RUST_LOG`-style directive. Blank or invalid directives fall
/// back to [`DEFAULT_FILTER`].
pub fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

pub fn diagnostics_subscriber<W>(
    filter: EnvFilter,
    writer: W,
) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .finish()
}

/// Install the stderr diagnostic subscriber, filtered by `RUST_LOG`. Safe to
/// call more than once.
pub fn init_tracing() {
    let directives = std::env::var("RUST_LOG").ok();
    let subscriber = diagnostics_subscriber(env_filter(directives.as_deref()), std::io::stderr);
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Wall-clock timer for a single ask.
pub struct Telemetry {
    start: Instant,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl Telemetry {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed().as_millis()
    }
}
