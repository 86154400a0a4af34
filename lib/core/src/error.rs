//! Error handling foundation for connector-service.
//!
//! Only the `Result` alias lives here. Each crate defines its own error
//! enums and wraps them in rootcause reports, adding context with
//! `.context()` as errors cross a layer boundary.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
