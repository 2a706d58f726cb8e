//! Booking flow: price calculation, validation and persistence.

pub mod calculators;
pub mod services;
pub mod store;

pub use calculators::{compute_nights, compute_total, RoomType};
pub use services::{submit_booking, BookingError, BookingInput, ValidationError};
pub use store::{BookingId, BookingRecord, BookingStore, StoreError};
