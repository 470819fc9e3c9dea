//! Error handling module
//!
//! Defines the boundary error type and its HTTP mapping. Callers always
//! receive a generic localized message; raw upstream detail is logged only.

use crate::services::classifier::ErrorKind;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration or infrastructure error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Request validation failed
    #[error("Request validation failed: {0}")]
    Validation(String),

    /// Caller exceeded its daily admission quota
    #[error("Daily request limit reached, resets at {reset_at}")]
    AdmissionRejected { reset_at: DateTime<Utc> },

    /// No provider in the registry is currently available
    #[error("No provider available")]
    NoProviderAvailable,

    /// All retry and failover budget exhausted against upstream providers
    #[error("Upstream provider request failed ({kind:?})")]
    Upstream { kind: ErrorKind },

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AdmissionRejected { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::NoProviderAvailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream { kind } => match kind {
                ErrorKind::RateLimit | ErrorKind::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
                ErrorKind::Permanent => StatusCode::BAD_REQUEST,
                ErrorKind::Temporary | ErrorKind::Network => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "invalid_request_error",
            AppError::AdmissionRejected { .. } => "rate_limit_error",
            AppError::NoProviderAvailable => "overloaded_error",
            AppError::Upstream { kind } => match kind {
                ErrorKind::RateLimit | ErrorKind::QuotaExceeded => "rate_limit_error",
                ErrorKind::Permanent => "invalid_request_error",
                ErrorKind::Temporary | ErrorKind::Network => "api_error",
            },
            AppError::Config(_) | AppError::Internal(_) => "api_error",
        }
    }

    /// Whether detailed error information should be logged
    pub fn should_log_details(&self) -> bool {
        !matches!(
            self,
            AppError::Validation(_) | AppError::AdmissionRejected { .. }
        )
    }

    /// Localized message shown to the caller
    ///
    /// Never embeds raw upstream bodies or statuses.
    pub fn caller_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::AdmissionRejected { reset_at } => format!(
                "لقد وصلت إلى الحد اليومي للأسئلة. يمكنك المحاولة مجدداً بعد {}.",
                reset_at.format("%Y-%m-%d %H:%M UTC")
            ),
            AppError::NoProviderAvailable => {
                "الخدمة غير متاحة حالياً. يرجى المحاولة لاحقاً.".to_string()
            }
            AppError::Upstream { .. } | AppError::Config(_) | AppError::Internal(_) => {
                "عذراً، حدث خطأ أثناء معالجة سؤالك. يرجى المحاولة مرة أخرى.".to_string()
            }
        }
    }
}

/// Implement IntoResponse trait to allow errors to be returned directly as HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log error; raw detail stays here and never reaches the caller
        if self.should_log_details() {
            tracing::error!("Application error: {} - Status code: {}", self, status);
        } else {
            tracing::warn!("Client error: {} - Status code: {}", self.error_type(), status);
        }

        let mut body = serde_json::json!({
            "type": self.error_type(),
            "error": self.caller_message(),
            "id": format!("err_{}", uuid::Uuid::new_v4().simple()),
        });

        if let AppError::AdmissionRejected { reset_at } = &self {
            body["resetTime"] = serde_json::json!(reset_at.to_rfc3339());
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;
