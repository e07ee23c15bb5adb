//! Response envelopes shared by the route modules

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DbError;
use crate::http::error::ApiError;

/// `{success, message}` body of the write endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    pub fn ok(message: &'static str) -> Json<Self> {
        Json(Self {
            success: true,
            message,
        })
    }
}

/// `{success, data, message}` body of the query endpoints.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: &'static str,
}

impl<T: Serialize> DataResponse<T> {
    pub fn found(data: T, message: &'static str) -> Response {
        Json(Self {
            success: true,
            data: Some(data),
            message,
        })
        .into_response()
    }

    /// Unsuccessful answer carrying `status`, with or without a payload.
    pub fn missing(status: StatusCode, data: Option<T>, message: &'static str) -> Response {
        (
            status,
            Json(Self {
                success: false,
                data,
                message,
            }),
        )
            .into_response()
    }
}

/// Map a failed read to a response.
///
/// Not-found and validation failures keep their own status; anything else
/// is logged and answered with `fallback`, which lets each endpoint keep
/// its empty-payload shape.
pub fn failed_read(err: DbError, endpoint: &'static str, fallback: Response) -> Response {
    match err {
        DbError::NotFound { .. } | DbError::Validation(_) => ApiError::from(err).into_response(),
        other => {
            tracing::error!(endpoint, error = %other, "Read failed");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_keeps_payload_shape() {
        let response = DataResponse::missing(
            StatusCode::OK,
            Some(Vec::<u8>::new()),
            "No data to show.",
        );
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn failed_read_keeps_not_found_status() {
        let fallback = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        let response = failed_read(
            DbError::NotFound {
                resource: "table",
                id: "nope".into(),
            },
            "test",
            fallback,
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn failed_read_uses_fallback_for_database_errors() {
        let fallback = StatusCode::SERVICE_UNAVAILABLE.into_response();
        let response = failed_read(
            DbError::NoRowsAffected { operation: "test" },
            "test",
            fallback,
        );
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
