//! Booking persistence seam.
//!
//! The store is an append-only capability with a single method, injected
//! into the submission service so the concrete backend stays swappable
//! and tests can use a counting fake. Bookings are written once and
//! never read back by this site.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::calculators::RoomType;

/// Store-assigned booking identifier
pub type BookingId = Uuid;

/// An immutable booking record, constructed on submission
#[derive(Debug, Clone, Serialize)]
pub struct BookingRecord {
    pub hotel_id: u32,
    pub hotel_name: String,
    pub room_type: RoomType,
    pub nights: i64,
    pub guests: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub guest_name: String,
    pub guest_phone: String,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Persistence failures, surfaced to the user as retryable
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("booking store timed out")]
    Timeout,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Append-only booking store. The store assigns the identifier.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn append(&self, booking: &BookingRecord) -> Result<BookingId, StoreError>;
}

/// Postgres-backed store: one INSERT into the `bookings` table
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn append(&self, booking: &BookingRecord) -> Result<BookingId, StoreError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (
                hotel_id,
                hotel_name,
                room_type,
                nights,
                guests,
                start_date,
                end_date,
                guest_name,
                guest_phone,
                total,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(i64::from(booking.hotel_id))
        .bind(&booking.hotel_name)
        .bind(booking.room_type.as_str())
        .bind(booking.nights)
        .bind(booking.guests as i32)
        .bind(booking.start)
        .bind(booking.end)
        .bind(&booking.guest_name)
        .bind(&booking.guest_phone)
        .bind(booking.total)
        .bind(booking.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
