//! HTTP middleware.

mod basic_auth;
mod logging;
mod metrics;
mod rate_limit;

pub use basic_auth::*;
pub use logging::*;
pub use self::metrics::*;
pub use rate_limit::*;
