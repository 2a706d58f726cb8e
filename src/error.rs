//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::booking::StoreError;
use crate::receipt::ReceiptError;

/// Application error type. No variant is fatal to the process; every
/// error is scoped to a single request and recoverable by retrying.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Hotel not found")]
    HotelNotFound,

    #[error("Booking validation failed: {0}")]
    Validation(String),

    #[error("Booking store error: {0}")]
    Store(#[from] StoreError),

    #[error("Receipt error: {0}")]
    Receipt(#[from] ReceiptError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::HotelNotFound => (StatusCode::NOT_FOUND, "Отель не найден"),
            AppError::Validation(e) => {
                tracing::debug!("Validation error: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, "Проверьте заполнение формы")
            }
            AppError::Store(e) => {
                tracing::error!("Booking store error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Не удалось сохранить бронирование, попробуйте ещё раз",
                )
            }
            AppError::Receipt(e) => {
                tracing::error!("Receipt error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Не удалось создать квитанцию")
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Внутренняя ошибка")
            }
        };

        // Return simple HTML error page
        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head><title>{} - HOTELS.TJ</title></head>
<body style="font-family: sans-serif; text-align: center; padding: 50px;">
    <h1>{}</h1>
    <p>{}</p>
    <a href="/">На главную</a>
</body>
</html>"#,
            status.as_u16(),
            status.as_u16(),
            message
        );

        (status, axum::response::Html(html)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
