use serde::{Deserialize, Serialize};
use validator::Validate;

use super::LocationData;

pub const CASE_REPORTED_MESSAGE: &str = "Case reported successfully";

/// Epidemiological case report. Same shape as a treatment request but routed
/// to the echo operation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReportRequest {
    pub species: String,
    pub diseases: Vec<String>,
    #[validate(nested)]
    pub location: LocationData,
}

/// The case as acknowledged back to the reporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedCase {
    pub species: String,
    pub diseases: Vec<String>,
    pub location: LocationData,
}

impl From<ReportRequest> for ReportedCase {
    fn from(request: ReportRequest) -> Self {
        Self {
            species: request.species,
            diseases: request.diseases,
            location: request.location,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub message: String,
    pub data: ReportedCase,
    pub success: bool,
}

impl ReportResponse {
    pub fn new(data: ReportedCase) -> Self {
        Self {
            message: CASE_REPORTED_MESSAGE.to_string(),
            data,
            success: true,
        }
    }
}
