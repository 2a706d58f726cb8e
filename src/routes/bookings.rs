//! Booking submission handler
//!
//! Implements the form flow: a validation or store failure re-renders
//! the detail page with the submitted values preserved so the guest can
//! fix and resubmit; success renders a confirmation page or streams the
//! downloadable receipt.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::booking::{self, BookingError, BookingId, BookingInput, BookingRecord, RoomType};
use crate::catalog::Hotel;
use crate::error::Result;
use crate::receipt;
use crate::search::checkbox;
use crate::session::Theme;
use crate::AppState;

use super::hotels::{render_detail, DetailForm, Stay};
use super::Session;

/// Booking form fields from the detail page
#[derive(Debug, Deserialize)]
pub struct BookingForm {
    pub room_type: RoomType,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default = "default_guests")]
    pub guests: u32,
    #[serde(default)]
    pub guest_name: String,
    #[serde(default)]
    pub guest_phone: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub want_receipt: bool,
}

fn default_guests() -> u32 {
    1
}

/// Confirmation page template
#[derive(Template)]
#[template(path = "bookings/confirmation.html")]
struct ConfirmationTemplate {
    theme_dark: bool,
    booking_ref: String,
    hotel_name: String,
    room_type: String,
    dates: String,
    nights: i64,
    guests: u32,
    total: String,
    guest_name: String,
    guest_phone: String,
    receipt_failed: bool,
}

/// Handle one booking attempt
pub async fn submit(
    State(app): State<AppState>,
    Path(id): Path<u32>,
    headers: HeaderMap,
    axum::Form(form): axum::Form<BookingForm>,
) -> Result<Response> {
    let session = Session::from_headers(&app, &headers);
    let hotel = app
        .catalog
        .find(id)
        .ok_or(crate::error::AppError::HotelNotFound)?;

    let input = BookingInput {
        room_type: form.room_type,
        start: form.start,
        end: form.end,
        guests: form.guests,
        guest_name: form.guest_name.clone(),
        guest_phone: form.guest_phone.clone(),
    };

    // Build the display copy of the record up front; this also surfaces
    // validation failures before any store call.
    let record = match booking::services::build_record(hotel, &input, chrono::Utc::now()) {
        Ok(record) => record,
        Err(e) => {
            let body = failed_form(hotel, &form, e.to_string(), &session)?;
            return Ok(
                (StatusCode::UNPROCESSABLE_ENTITY, session.cookie(), Html(body)).into_response(),
            );
        }
    };

    match booking::submit_booking(app.store.as_ref(), hotel, &input).await {
        Ok(booking_id) => Ok(confirmation_response(
            &session,
            hotel,
            booking_id,
            &record,
            form.want_receipt,
        )),
        Err(BookingError::Validation(e)) => {
            let body = failed_form(hotel, &form, e.to_string(), &session)?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, session.cookie(), Html(body)).into_response())
        }
        Err(BookingError::Store(e)) => {
            tracing::error!("Booking store failed for hotel {}: {}", hotel.id, e);
            let message = "Не удалось сохранить бронирование. Проверьте соединение и попробуйте ещё раз.";
            let body = failed_form(hotel, &form, message.to_string(), &session)?;
            Ok((StatusCode::BAD_GATEWAY, session.cookie(), Html(body)).into_response())
        }
    }
}

/// Re-render the detail page in its FormOpen state with an inline error
/// and the submitted values preserved.
fn failed_form(
    hotel: &Hotel,
    form: &BookingForm,
    error: String,
    session: &Session,
) -> Result<String> {
    let detail_form = DetailForm {
        guest_name: form.guest_name.clone(),
        guest_phone: form.guest_phone.clone(),
        room_type: Some(form.room_type),
        error: Some(error),
    };
    render_detail(
        hotel,
        Stay::new(form.start, form.end, form.guests),
        &session.state,
        &detail_form,
    )
}

/// Success response: confirmation page, or the downloadable receipt when
/// requested. A receipt failure downgrades to the confirmation page with
/// a warning; the booking itself is already committed.
fn confirmation_response(
    session: &Session,
    hotel: &Hotel,
    booking_id: BookingId,
    record: &BookingRecord,
    want_receipt: bool,
) -> Response {
    let mut receipt_failed = false;

    if want_receipt {
        match receipt::render(hotel, booking_id, record) {
            Ok(document) => {
                let disposition =
                    format!("attachment; filename=\"{}\"", receipt::filename(booking_id));
                return (
                    session.cookie(),
                    [
                        (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
                        (header::CONTENT_DISPOSITION, disposition),
                    ],
                    document,
                )
                    .into_response();
            }
            Err(e) => {
                tracing::warn!("Receipt generation failed for booking {}: {}", booking_id, e);
                receipt_failed = true;
            }
        }
    }

    let template = ConfirmationTemplate {
        theme_dark: session.state.theme == Theme::Dark,
        booking_ref: booking_id.to_string(),
        hotel_name: hotel.name.clone(),
        room_type: record.room_type.label().to_string(),
        dates: format!(
            "{} — {}",
            record.start.format("%d.%m.%Y"),
            record.end.format("%d.%m.%Y")
        ),
        nights: record.nights,
        guests: record.guests,
        total: record.total.to_string(),
        guest_name: record.guest_name.clone(),
        guest_phone: record.guest_phone.clone(),
        receipt_failed,
    };

    match template.render() {
        Ok(body) => (session.cookie(), Html(body)).into_response(),
        Err(e) => crate::error::AppError::Template(e).into_response(),
    }
}
