//! Standard middleware stages.
//!
//! - [`LoggingMiddleware`]: `debug` events around every invocation
//! - [`TimeoutMiddleware`]: bound the time spent in the rest of the pipeline

mod logging;
mod timeout;

pub use logging::LoggingMiddleware;
pub use timeout::TimeoutMiddleware;
