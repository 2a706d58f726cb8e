//! Booking submission service.
//!
//! Validates the form input, builds the immutable booking record and
//! appends it through the injected store. Validation happens before any
//! store call; a failed append is reported without automatic retry, and
//! resubmitting the same form intentionally creates a second booking
//! (the live site has no idempotency key).

use chrono::{NaiveDate, Utc};
use std::time::Duration;
use tracing::info;

use crate::catalog::Hotel;

use super::calculators::{compute_nights, compute_total, RoomType};
use super::store::{BookingId, BookingRecord, BookingStore, StoreError};

/// Fail closed if the store is unreachable rather than hanging
pub const STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Form-level validation failures. Recovered locally: the guest stays on
/// the form and may retry immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("guest name is required")]
    MissingGuestName,

    #[error("guest phone is required")]
    MissingGuestPhone,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Raw booking input from the detail-page form
#[derive(Debug, Clone)]
pub struct BookingInput {
    pub room_type: RoomType,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub guests: u32,
    pub guest_name: String,
    pub guest_phone: String,
}

/// Build the booking record from validated input. Pure except for the
/// caller-supplied timestamp.
pub fn build_record(
    hotel: &Hotel,
    input: &BookingInput,
    created_at: chrono::DateTime<Utc>,
) -> Result<BookingRecord, ValidationError> {
    let guest_name = input.guest_name.trim();
    if guest_name.is_empty() {
        return Err(ValidationError::MissingGuestName);
    }
    let guest_phone = input.guest_phone.trim();
    if guest_phone.is_empty() {
        return Err(ValidationError::MissingGuestPhone);
    }

    let nights = compute_nights(input.start, input.end);
    let guests = input.guests.max(1);
    let total = compute_total(input.room_type.nightly_rate(), nights, guests);

    Ok(BookingRecord {
        hotel_id: hotel.id,
        hotel_name: hotel.name.clone(),
        room_type: input.room_type,
        nights,
        guests,
        start: input.start,
        end: input.end,
        guest_name: guest_name.to_string(),
        guest_phone: guest_phone.to_string(),
        total,
        created_at,
    })
}

/// Validate, persist and report one booking attempt.
///
/// Returns the store-assigned id on success. On `ValidationError` the
/// store is never invoked.
pub async fn submit_booking(
    store: &dyn BookingStore,
    hotel: &Hotel,
    input: &BookingInput,
) -> Result<BookingId, BookingError> {
    let record = build_record(hotel, input, Utc::now())?;

    let id = tokio::time::timeout(STORE_TIMEOUT, store.append(&record))
        .await
        .map_err(|_| StoreError::Timeout)??;

    info!(
        booking_id = %id,
        hotel_id = record.hotel_id,
        room_type = record.room_type.as_str(),
        nights = record.nights,
        guests = record.guests,
        total = %record.total,
        "Booking persisted"
    );

    Ok(id)
}
