use axum::Json;

use crate::dtos::RootResponse;

pub const SERVICE_BANNER: &str = "Perfscanimal Health Backend API";

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: SERVICE_BANNER.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
