//! Downloadable booking receipt.
//!
//! Renders a fixed-layout confirmation document for a completed booking,
//! with a booking-reference QR code embedded as a PNG data URI. Receipt
//! generation is independent of booking persistence: a failure here
//! never affects the already-committed booking.

use askama::Template;
use base64::Engine as _;
use chrono::Utc;
use image::{ImageEncoder, Luma};
use qrcode::QrCode;

use crate::booking::{BookingId, BookingRecord};
use crate::catalog::Hotel;

#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    #[error("QR encode failed: {0}")]
    Qr(String),

    #[error("PNG encode failed: {0}")]
    Png(#[from] image::ImageError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Receipt document template (standalone, English like the live site's
/// printable confirmation)
#[derive(Template)]
#[template(path = "bookings/receipt.html")]
struct ReceiptTemplate {
    booking_ref: String,
    hotel_name: String,
    hotel_address: String,
    room_type: String,
    dates: String,
    nights: i64,
    guests: u32,
    total: String,
    guest_name: String,
    guest_phone: String,
    generated_at: String,
    qr_data_uri: String,
}

/// Render the receipt document for a persisted booking
pub fn render(
    hotel: &Hotel,
    booking_id: BookingId,
    record: &BookingRecord,
) -> Result<String, ReceiptError> {
    let qr_data_uri = booking_qr(booking_id, record)?;

    let template = ReceiptTemplate {
        booking_ref: booking_id.to_string(),
        hotel_name: hotel.name.clone(),
        hotel_address: if hotel.address.is_empty() {
            "-".to_string()
        } else {
            hotel.address.clone()
        },
        room_type: record.room_type.label().to_string(),
        dates: format!(
            "{} - {}",
            record.start.format("%d/%m/%Y"),
            record.end.format("%d/%m/%Y")
        ),
        nights: record.nights,
        guests: record.guests,
        total: format!("{}$", record.total),
        guest_name: record.guest_name.clone(),
        guest_phone: record.guest_phone.clone(),
        generated_at: Utc::now().format("%d/%m/%Y %H:%M UTC").to_string(),
        qr_data_uri,
    };

    Ok(template.render()?)
}

/// Suggested download filename for a receipt
pub fn filename(booking_id: BookingId) -> String {
    format!("booking-{booking_id}.html")
}

/// Booking reference encoded as a PNG QR code data URI
fn booking_qr(booking_id: BookingId, record: &BookingRecord) -> Result<String, ReceiptError> {
    let payload = format!(
        "HOTELS.TJ booking {} | {} | {} | {} night(s) | {}$",
        booking_id, record.hotel_name, record.room_type.label(), record.nights, record.total
    );

    let code = QrCode::new(payload.as_bytes()).map_err(|e| ReceiptError::Qr(e.to_string()))?;
    let img = code
        .render::<Luma<u8>>()
        .min_dimensions(180, 180)
        .build();

    let mut png = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::L8,
    )?;

    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&png)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::RoomType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sample() -> (Hotel, BookingRecord) {
        let hotel = Hotel {
            id: 1,
            name: "Firuz Hotel".to_string(),
            description: String::new(),
            city: "Душанбе".to_string(),
            price: dec!(50),
            stars: 4,
            wifi: true,
            breakfast: true,
            images: vec!["/static/img/a.jpg".to_string()],
            address: "ул. Рудаки 14, Душанбе".to_string(),
            label: String::new(),
            reviews: 0,
            reviews_list: vec![],
        };
        let record = BookingRecord {
            hotel_id: 1,
            hotel_name: hotel.name.clone(),
            room_type: RoomType::Double,
            nights: 2,
            guests: 2,
            start: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 9, 3).unwrap(),
            guest_name: "Амир".to_string(),
            guest_phone: "+992 900 00 00 00".to_string(),
            total: dec!(320),
            created_at: Utc::now(),
        };
        (hotel, record)
    }

    #[test]
    fn test_receipt_contains_booking_fields() {
        let (hotel, record) = sample();
        let id = Uuid::new_v4();
        let doc = render(&hotel, id, &record).unwrap();

        assert!(doc.contains("Firuz Hotel"));
        assert!(doc.contains("ул. Рудаки 14, Душанбе"));
        assert!(doc.contains("Дабл"));
        assert!(doc.contains("01/09/2026 - 03/09/2026"));
        assert!(doc.contains("320$"));
        assert!(doc.contains("Амир"));
        assert!(doc.contains("+992 900 00 00 00"));
        assert!(doc.contains(&id.to_string()));
    }

    #[test]
    fn test_receipt_embeds_qr_png() {
        let (hotel, record) = sample();
        let doc = render(&hotel, Uuid::new_v4(), &record).unwrap();
        assert!(doc.contains("data:image/png;base64,"));
    }

    #[test]
    fn test_missing_address_renders_dash() {
        let (mut hotel, record) = sample();
        hotel.address.clear();
        let doc = render(&hotel, Uuid::new_v4(), &record).unwrap();
        assert!(doc.contains("Address:"));
        assert!(doc.contains("<td>-</td>"));
    }

    #[test]
    fn test_filename_carries_booking_id() {
        let id = Uuid::new_v4();
        assert_eq!(filename(id), format!("booking-{id}.html"));
    }
}
