use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use btx_extractors::error::ExtractorError;
use log::warn;
use serde::Serialize;

/// JSON body of every failed request.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    /// Status answered by the target site, when it answered at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
}

/// An error ready to be sent back to the caller.
#[derive(Debug)]
pub struct ApiError {
    code: StatusCode,
    message: String,
    upstream_status: Option<u16>,
}

impl ApiError {
    pub fn bad_request(message: &str) -> Self {
        Self {
            code: StatusCode::BAD_REQUEST,
            message: message.to_string(),
            upstream_status: None,
        }
    }

    pub const fn code(&self) -> StatusCode {
        self.code
    }
}

impl From<ExtractorError> for ApiError {
    fn from(err: ExtractorError) -> Self {
        let (code, upstream_status) = match &err {
            ExtractorError::InvalidUrl { .. } => (StatusCode::BAD_REQUEST, None),
            ExtractorError::UnsupportedSite { .. } | ExtractorError::BlockedPage { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, None)
            }
            ExtractorError::UpstreamHttp { status } => (StatusCode::BAD_GATEWAY, Some(*status)),
            ExtractorError::Unreachable { .. } | ExtractorError::EmptyResponse => {
                (StatusCode::BAD_GATEWAY, None)
            }
            ExtractorError::Timeout => (StatusCode::GATEWAY_TIMEOUT, None),
            ExtractorError::ClientBuild(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        if code.is_server_error() {
            warn!("Request failed: {err}");
        }

        Self {
            code,
            message: err.to_string(),
            upstream_status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            status: self.upstream_status,
        };
        (self.code, Json(body)).into_response()
    }
}
