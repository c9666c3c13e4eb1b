use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::{StatusCode, header::CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body extractor that validates the payload before the handler runs.
///
/// Malformed JSON, missing fields and wrong types are all reported as 422. A
/// body without a `Content-Type` header is still parsed as JSON; an explicit
/// non-JSON content type is rejected with 415.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value: T = if req.headers().contains_key(CONTENT_TYPE) {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(rejection_to_error)?;
            value
        } else {
            let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
                status_to_error(rejection.status(), rejection.body_text())
            })?;
            serde_json::from_slice(&bytes).map_err(|e| {
                tracing::debug!(error = %e, "Rejected JSON body without content type");
                AppError::UnprocessableEntity(format!(
                    "Failed to parse the request body as JSON: {}",
                    e
                ))
            })?
        };

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    let message = rejection.body_text();
    tracing::debug!(status = %rejection.status(), error = %message, "Rejected JSON body");

    match rejection {
        JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
            AppError::UnprocessableEntity(message)
        }
        other => status_to_error(other.status(), message),
    }
}

fn status_to_error(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::UNPROCESSABLE_ENTITY => AppError::UnprocessableEntity(message),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => AppError::UnsupportedMediaType(message),
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(message),
        _ => AppError::BadRequest(anyhow::anyhow!(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http, routing::post};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        name: String,
    }

    async fn echo(ValidatedJson(payload): ValidatedJson<Payload>) -> String {
        payload.name
    }

    fn app() -> Router {
        Router::new().route("/", post(echo))
    }

    fn json_request(body: &'static str) -> Request {
        http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_well_formed_body() {
        let response = app().oneshot(json_request(r#"{"name":"cattle"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"cattle");
    }

    #[tokio::test]
    async fn missing_field_is_unprocessable() {
        let response = app().oneshot(json_request("{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("name"));
    }

    #[tokio::test]
    async fn syntax_error_is_unprocessable() {
        let response = app().oneshot(json_request("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    fn untyped_request(body: &'static str) -> Request {
        http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn body_without_content_type_is_parsed_as_json() {
        let response = app()
            .oneshot(untyped_request(r#"{"name":"goat"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"goat");
    }

    #[tokio::test]
    async fn broken_body_without_content_type_is_unprocessable() {
        let response = app().oneshot(untyped_request(r#"{"name": "#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app().oneshot(untyped_request("{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn non_json_content_type_is_unsupported() {
        let request = http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "text/plain")
            .body(Body::from(r#"{"name":"goat"}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
