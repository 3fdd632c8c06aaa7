//! Structured logging schema and subscriber setup for orpaille.
//!
//! All crates use these constants for consistent structured logging fields.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires attention |
//! | WARN  | Recoverable issue, fallback applied |
//! | INFO  | Operation completions |
//! | DEBUG | Decision points, intermediate values |
//! | TRACE | Per-item iteration (candidate waterways, reply sites) |

use tracing_subscriber::EnvFilter;

/// Subsystem originating the log event.
/// Values: "geo", "inference", "search", "assistant", "cache"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "city_suggestions", "river_coordinates", "gold_search"
pub const OPERATION: &str = "op";

/// Location text driving a search.
pub const LOCATION: &str = "location";

/// Search radius in kilometers.
pub const RADIUS_KM: &str = "radius_km";

/// Number of results returned by a lookup or a validated reply.
pub const RESULT_COUNT: &str = "result_count";

/// Initialize the global tracing subscriber from `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing("info");
        init_tracing("debug");
    }
}
