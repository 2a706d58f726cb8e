//! Core booking calculations.
//!
//! Pure functions for stay arithmetic - no I/O, no store access.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Room types offered on the detail page.
///
/// Each room type carries its own fixed nightly rate, independent of the
/// hotel's listing price. This mirrors the live site, where the listing
/// shows the hotel rate and the room cards show per-type rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Single,
    Double,
}

impl RoomType {
    pub const ALL: [RoomType; 2] = [RoomType::Single, RoomType::Double];

    /// Fixed nightly rate in dollars
    pub fn nightly_rate(self) -> Decimal {
        match self {
            RoomType::Single => dec!(50),
            RoomType::Double => dec!(80),
        }
    }

    /// Stable identifier used in forms and the bookings table
    pub fn as_str(self) -> &'static str {
        match self {
            RoomType::Single => "single",
            RoomType::Double => "double",
        }
    }

    /// Display label shown to guests
    pub fn label(self) -> &'static str {
        match self {
            RoomType::Single => "Сингл",
            RoomType::Double => "Дабл",
        }
    }
}

/// Whole-day length of a stay, floor-guarded to a minimum of 1.
///
/// Same-day and inverted ranges both yield 1 night rather than an error;
/// the calendar widget allows either selection.
pub fn compute_nights(start: NaiveDate, end: NaiveDate) -> i64 {
    let days = (end - start).num_days();
    if days <= 0 {
        1
    } else {
        days
    }
}

/// Total stay price: rate × nights × guests.
///
/// Guests are clamped to a minimum of 1 before multiplication. No taxes,
/// discounts or currency conversion.
pub fn compute_total(nightly_rate: Decimal, nights: i64, guests: u32) -> Decimal {
    let guests = guests.max(1);
    nightly_rate * Decimal::from(nights) * Decimal::from(guests)
}
