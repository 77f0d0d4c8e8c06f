//! Error handling for the Rubber Carbon Assessment Platform
//!
//! Provides consistent error responses in Thai and English

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_th: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Workflow errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("No geometry available: {0}")]
    GeometryUnavailable(String),

    #[error("Import could not be decoded: {0}")]
    ImportParse(String),

    #[error("A save is already in progress")]
    SaveInProgress,

    // External service errors
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Geocoding service unavailable")]
    GeocodingUnavailable,

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_th: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message, message_th } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_th: message_th.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_th: format!("ไม่พบ {}", resource),
                    field: None,
                },
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_STATE_TRANSITION".to_string(),
                    message_en: msg.clone(),
                    message_th: format!("ไม่สามารถเปลี่ยนขั้นตอนได้: {}", msg),
                    field: None,
                },
            ),
            AppError::GeometryUnavailable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "GEOMETRY_UNAVAILABLE".to_string(),
                    message_en: msg.clone(),
                    message_th: "ไม่พบข้อมูลพื้นที่แปลง กรุณาวาดแปลงใหม่อีกครั้ง".to_string(),
                    field: None,
                },
            ),
            AppError::ImportParse(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "IMPORT_PARSE_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_th: "ไม่สามารถอ่านไฟล์แปลงได้ กรุณาตรวจสอบไฟล์".to_string(),
                    field: None,
                },
            ),
            AppError::SaveInProgress => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "SAVE_IN_PROGRESS".to_string(),
                    message_en: "A save operation is already in progress".to_string(),
                    message_th: "กำลังบันทึกข้อมูลอยู่ กรุณารอสักครู่".to_string(),
                    field: None,
                },
            ),
            AppError::Persistence(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "PERSISTENCE_ERROR".to_string(),
                    message_en: format!("Save failed: {}", msg),
                    message_th: "ไม่สามารถบันทึกแปลงได้ กรุณาลองใหม่อีกครั้ง".to_string(),
                    field: None,
                },
            ),
            AppError::GeocodingUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "GEOCODING_UNAVAILABLE".to_string(),
                    message_en: "Geocoding service is temporarily unavailable".to_string(),
                    message_th: "บริการค้นหาสถานที่ไม่พร้อมใช้งานชั่วคราว".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_th: "เกิดข้อผิดพลาดภายในเซิร์ฟเวอร์".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_th: "เกิดข้อผิดพลาดภายในเซิร์ฟเวอร์".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
