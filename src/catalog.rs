//! Static hotel catalog
//!
//! The catalog is embedded in the binary and loaded once at startup.
//! Loading is async so that a real data source (database, CMS) can be
//! dropped in later without touching the callers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A guest review shown on the detail page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub user: String,
    pub rating: u8,
    pub text: String,
}

/// A hotel record. Immutable at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotel {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub city: String,
    /// Nightly rate shown on the listing page, in whole dollars
    pub price: Decimal,
    #[serde(default = "default_stars")]
    pub stars: u8,
    #[serde(default)]
    pub wifi: bool,
    #[serde(default)]
    pub breakfast: bool,
    /// Image paths under /static; never empty
    pub images: Vec<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub label: String,
    /// Review count badge
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub reviews_list: Vec<Review>,
}

fn default_stars() -> u8 {
    4
}

impl Hotel {
    /// Average rating over the review list, if any reviews exist
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews_list.is_empty() {
            return None;
        }
        let sum: u32 = self.reviews_list.iter().map(|r| u32::from(r.rating)).sum();
        Some(f64::from(sum) / self.reviews_list.len() as f64)
    }
}

/// Catalog load/validation errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to parse hotel data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate hotel id: {0}")]
    DuplicateId(u32),

    #[error("Hotel {0} has no images")]
    NoImages(u32),
}

/// The read-only hotel catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    hotels: Vec<Hotel>,
}

const HOTEL_DATA: &str = include_str!("data/hotels.json");

impl Catalog {
    /// Load and validate the embedded catalog
    pub async fn load() -> Result<Self, CatalogError> {
        Self::from_json(HOTEL_DATA)
    }

    fn from_json(data: &str) -> Result<Self, CatalogError> {
        let hotels: Vec<Hotel> = serde_json::from_str(data)?;

        let mut seen = HashSet::new();
        for hotel in &hotels {
            if !seen.insert(hotel.id) {
                return Err(CatalogError::DuplicateId(hotel.id));
            }
            if hotel.images.is_empty() {
                return Err(CatalogError::NoImages(hotel.id));
            }
        }

        Ok(Self { hotels })
    }

    /// All hotels in catalog order
    pub fn hotels(&self) -> &[Hotel] {
        &self.hotels
    }

    /// Look up a hotel by id. `None` is the "hotel not found" outcome.
    pub fn find(&self, id: u32) -> Option<&Hotel> {
        self.hotels.iter().find(|h| h.id == id)
    }

    /// Distinct cities in order of first appearance, for the filter bar
    pub fn cities(&self) -> Vec<String> {
        let mut cities: Vec<String> = Vec::new();
        for hotel in &self.hotels {
            if !cities.iter().any(|c| c == &hotel.city) {
                cities.push(hotel.city.clone());
            }
        }
        cities
    }

    pub fn len(&self) -> usize {
        self.hotels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotels.is_empty()
    }
}
