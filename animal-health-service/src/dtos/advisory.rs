use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Where a case was observed. All three levels are required; blank values
/// are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LocationData {
    pub region: String,
    pub department: String,
    pub commune: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HealthAnalysisRequest {
    pub species: String,
    pub symptoms: Vec<String>,
    /// Free-form clinical measurements. Accepted but not forwarded.
    #[serde(default)]
    pub clinical_data: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TreatmentRequest {
    pub species: String,
    pub diseases: Vec<String>,
    #[validate(nested)]
    pub location: LocationData,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: String,
    pub success: bool,
}

impl AnalysisResponse {
    pub fn new(analysis: String) -> Self {
        Self {
            analysis,
            success: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TreatmentResponse {
    pub treatment_plan: String,
    pub success: bool,
}

impl TreatmentResponse {
    pub fn new(treatment_plan: String) -> Self {
        Self {
            treatment_plan,
            success: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FailureResponse {
    pub error: String,
    pub success: bool,
}

impl FailureResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            success: false,
        }
    }
}
