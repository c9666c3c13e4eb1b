//! HTTP handlers for animal-health-service.

pub mod advisory;
pub mod health;
pub mod report;
pub mod root;

pub use advisory::{analyze_health, generate_treatment, HandlerFailure};
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use report::report_case;
pub use root::root;
