//! Request and response schemas for the HTTP API.

pub mod advisory;
pub mod report;

pub use advisory::{
    AnalysisResponse, FailureResponse, HealthAnalysisRequest, LocationData, RootResponse,
    TreatmentRequest, TreatmentResponse,
};
pub use report::{ReportRequest, ReportResponse, ReportedCase};
