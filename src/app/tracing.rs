use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LogFormat;

/// Filter used when `RUST_LOG` is unset: this crate at info, dependencies
/// (sqlx, hyper, reqwest) only when they warn.
pub const DEFAULT_DIRECTIVES: &str = "warn,lane_affinity=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber. JSON events are flattened and carry the
/// enclosing span, so the `service` field set in `app::dispatch` lands on every
/// line.
pub fn init_tracing(format: LogFormat) {
    let registry = tracing_subscriber::registry().with(env_filter());
    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .init(),
        LogFormat::Human => registry.with(fmt::layer().with_target(false)).init(),
    }
}
