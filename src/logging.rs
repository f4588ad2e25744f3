//! Setting up logging.

use tracing_subscriber::EnvFilter;

/// Setup logging of events reported by domain-xfrout and its tests.
///
/// Use the RUST_LOG environment variable to override the defaults.
///
/// E.g. To enable debug level logging:
///   RUST_LOG=DEBUG
///
/// Or to log only the state changes of transfer sessions:
///   RUST_LOG=domain_xfrout::xfr::session=TRACE
///
/// Or to enable trace level logging but not for the in-memory zones:
///   RUST_LOG=TRACE,domain_xfrout::zonetree=OFF
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_thread_ids(true)
        .without_time()
        .try_init()
        .ok();
}
