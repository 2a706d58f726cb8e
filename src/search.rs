//! Hotel filter/sort engine
//!
//! `select_hotels` is the pure core of the listing page: it computes a
//! filtered, ordered view of the catalog from the query state and never
//! mutates its input. All constraints are conjunctive.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::catalog::Hotel;

/// Listing sort modes. "Popular" (a random shuffle in one draft of the
/// source site) is deliberately not a mode here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    PriceAscending,
    PriceDescending,
    Stars,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sort mode: {0}")]
pub struct ParseSortModeError(String);

impl FromStr for SortMode {
    type Err = ParseSortModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price-asc" => Ok(SortMode::PriceAscending),
            "price-desc" => Ok(SortMode::PriceDescending),
            "stars" => Ok(SortMode::Stars),
            other => Err(ParseSortModeError(other.to_string())),
        }
    }
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::PriceAscending => "price-asc",
            SortMode::PriceDescending => "price-desc",
            SortMode::Stars => "stars",
        }
    }
}

/// Query state for one browsing session. Every field is optional; an
/// absent or empty value means "no constraint". `start`, `end` and
/// `guests` are stay context used for price totals only — they never
/// filter the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotelQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, deserialize_with = "checkbox")]
    pub only_wifi: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub only_breakfast: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub stars: Option<u8>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort: Option<SortMode>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub guests: Option<u32>,
}

impl HotelQuery {
    /// Whether a hotel satisfies every active constraint (AND semantics)
    pub fn matches(&self, hotel: &Hotel) -> bool {
        if let Some(city) = self.city.as_deref() {
            if hotel.city != city {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if hotel.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if hotel.price > max {
                return false;
            }
        }
        if self.only_wifi && !hotel.wifi {
            return false;
        }
        if self.only_breakfast && !hotel.breakfast {
            return false;
        }
        if let Some(stars) = self.stars {
            // Exact match, not "at least"
            if hotel.stars != stars {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref() {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty() {
                let name = hotel.name.to_lowercase();
                let description = hotel.description.to_lowercase();
                if !name.contains(&needle) && !description.contains(&needle) {
                    return false;
                }
            }
        }
        true
    }

    /// Canonical cache key over the filter/sort fields. Stay context is
    /// excluded: it does not change the selection.
    pub fn cache_key(&self) -> String {
        format!(
            "city={};min={};max={};wifi={};breakfast={};stars={};sort={};q={}",
            self.city.as_deref().unwrap_or(""),
            self.min_price.map(|p| p.to_string()).unwrap_or_default(),
            self.max_price.map(|p| p.to_string()).unwrap_or_default(),
            self.only_wifi,
            self.only_breakfast,
            self.stars.map(|s| s.to_string()).unwrap_or_default(),
            self.sort.map(SortMode::as_str).unwrap_or(""),
            self.search.as_deref().unwrap_or("").trim().to_lowercase(),
        )
    }
}

/// Compute the filtered, ordered listing view.
///
/// Pure: the same catalog and query always yield the same sequence, and
/// the catalog itself is never reordered. With no sort mode the catalog
/// order is preserved; all sorts are stable.
pub fn select_hotels(catalog: &[Hotel], query: &HotelQuery) -> Vec<Hotel> {
    let mut hotels: Vec<Hotel> = catalog
        .iter()
        .filter(|h| query.matches(h))
        .cloned()
        .collect();

    match query.sort {
        Some(SortMode::PriceAscending) => hotels.sort_by(|a, b| a.price.cmp(&b.price)),
        Some(SortMode::PriceDescending) => hotels.sort_by(|a, b| b.price.cmp(&a.price)),
        Some(SortMode::Stars) => hotels.sort_by(|a, b| b.stars.cmp(&a.stars)),
        None => {}
    }

    hotels
}

/// Stable partition moving favorited hotels to the front.
///
/// Applied by the view layer on top of `select_hotels` when no explicit
/// sort mode is selected; relative order inside each group is preserved.
pub fn favorites_first(hotels: &mut Vec<Hotel>, favorites: &BTreeSet<u32>) {
    if favorites.is_empty() {
        return;
    }
    let (favored, rest): (Vec<Hotel>, Vec<Hotel>) = hotels
        .drain(..)
        .partition(|h| favorites.contains(&h.id));
    hotels.extend(favored);
    hotels.extend(rest);
}

/// Deserialize an optional URL parameter, treating the empty string as
/// absent. HTML forms submit empty inputs as `key=`.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Deserialize an HTML checkbox: any submitted truthy value is `true`,
/// an absent field is `false`.
pub(crate) fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(value.as_deref(), Some("on") | Some("true") | Some("1")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rust_decimal_macros::dec;

    fn hotel(id: u32, name: &str, city: &str, price: Decimal, stars: u8) -> Hotel {
        Hotel {
            id,
            name: name.to_string(),
            description: format!("описание {name}"),
            city: city.to_string(),
            price,
            stars,
            wifi: id % 2 == 0,
            breakfast: id % 3 == 0,
            images: vec!["/static/img/a.jpg".to_string()],
            address: String::new(),
            label: String::new(),
            reviews: 0,
            reviews_list: vec![],
        }
    }

    fn sample_catalog() -> Vec<Hotel> {
        vec![
            hotel(1, "Firuz Hotel", "Душанбе", dec!(50), 4),
            hotel(2, "Panorama", "Пенджикент", dec!(60), 5),
            hotel(3, "Eco Stay", "Душанбе", dec!(40), 3),
            hotel(4, "Lux Palace", "Душанбе", dec!(70), 5),
        ]
    }

    #[test]
    fn test_empty_query_is_identity() {
        let catalog = sample_catalog();
        let result = select_hotels(&catalog, &HotelQuery::default());
        let ids: Vec<u32> = result.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_city_filter() {
        let catalog = sample_catalog();
        let query = HotelQuery {
            city: Some("Пенджикент".to_string()),
            ..Default::default()
        };
        let result = select_hotels(&catalog, &query);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 2);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let catalog = sample_catalog();
        let query = HotelQuery {
            min_price: Some(dec!(40)),
            max_price: Some(dec!(60)),
            ..Default::default()
        };
        let ids: Vec<u32> = select_hotels(&catalog, &query).iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_stars_exact_match() {
        let catalog = sample_catalog();
        let query = HotelQuery {
            stars: Some(5),
            ..Default::default()
        };
        let ids: Vec<u32> = select_hotels(&catalog, &query).iter().map(|h| h.id).collect();
        // 4-star hotels excluded even though they are "at least" 4
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_amenity_flags() {
        let catalog = sample_catalog();
        let query = HotelQuery {
            only_wifi: true,
            ..Default::default()
        };
        for h in select_hotels(&catalog, &query) {
            assert!(h.wifi);
        }
        let query = HotelQuery {
            only_breakfast: true,
            ..Default::default()
        };
        for h in select_hotels(&catalog, &query) {
            assert!(h.breakfast);
        }
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let catalog = sample_catalog();
        let query = HotelQuery {
            search: Some("FIRUZ".to_string()),
            ..Default::default()
        };
        let result = select_hotels(&catalog, &query);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 1);

        // Matches descriptions too
        let query = HotelQuery {
            search: Some("описание panorama".to_string()),
            ..Default::default()
        };
        let result = select_hotels(&catalog, &query);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 2);
    }

    #[test]
    fn test_blank_search_is_no_constraint() {
        let catalog = sample_catalog();
        let query = HotelQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(select_hotels(&catalog, &query).len(), catalog.len());
    }

    #[test]
    fn test_sort_ascending_then_descending_reverses() {
        let catalog = sample_catalog();
        let asc = select_hotels(
            &catalog,
            &HotelQuery {
                sort: Some(SortMode::PriceAscending),
                ..Default::default()
            },
        );
        let desc = select_hotels(
            &catalog,
            &HotelQuery {
                sort: Some(SortMode::PriceDescending),
                ..Default::default()
            },
        );
        // No price ties in the sample, so the orders are exact mirrors
        let asc_ids: Vec<u32> = asc.iter().map(|h| h.id).collect();
        let mut desc_ids: Vec<u32> = desc.iter().map(|h| h.id).collect();
        desc_ids.reverse();
        assert_eq!(asc_ids, desc_ids);
        assert_eq!(asc_ids, vec![3, 1, 2, 4]);
    }

    #[test]
    fn test_sort_by_stars_descending() {
        let catalog = sample_catalog();
        let result = select_hotels(
            &catalog,
            &HotelQuery {
                sort: Some(SortMode::Stars),
                ..Default::default()
            },
        );
        let stars: Vec<u8> = result.iter().map(|h| h.stars).collect();
        assert_eq!(stars, vec![5, 5, 4, 3]);
        // Stable: hotel 2 precedes hotel 4 (both 5 stars, catalog order kept)
        assert_eq!(result[0].id, 2);
        assert_eq!(result[1].id, 4);
    }

    #[test]
    fn test_select_does_not_mutate_catalog() {
        let catalog = sample_catalog();
        let before: Vec<u32> = catalog.iter().map(|h| h.id).collect();
        let _ = select_hotels(
            &catalog,
            &HotelQuery {
                sort: Some(SortMode::PriceDescending),
                ..Default::default()
            },
        );
        let after: Vec<u32> = catalog.iter().map(|h| h.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_end_to_end_scenario() {
        // Catalog contains a hotel priced 50 in city "A"
        let catalog = vec![hotel(10, "A-Hotel", "A", dec!(50), 4)];
        let query = HotelQuery {
            city: Some("A".to_string()),
            min_price: Some(dec!(40)),
            max_price: Some(dec!(60)),
            ..Default::default()
        };
        assert_eq!(select_hotels(&catalog, &query).len(), 1);

        let query = HotelQuery {
            city: Some("B".to_string()),
            ..Default::default()
        };
        assert!(select_hotels(&catalog, &query).is_empty());
    }

    #[test]
    fn test_favorites_first_is_stable() {
        let catalog = sample_catalog();
        let mut hotels = select_hotels(&catalog, &HotelQuery::default());
        let favorites: BTreeSet<u32> = [3, 4].into_iter().collect();
        favorites_first(&mut hotels, &favorites);
        let ids: Vec<u32> = hotels.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![3, 4, 1, 2]);
    }

    #[test]
    fn test_favorites_first_empty_set_is_noop() {
        let catalog = sample_catalog();
        let mut hotels = select_hotels(&catalog, &HotelQuery::default());
        favorites_first(&mut hotels, &BTreeSet::new());
        let ids: Vec<u32> = hotels.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_sort_mode_round_trip() {
        for mode in [SortMode::PriceAscending, SortMode::PriceDescending, SortMode::Stars] {
            assert_eq!(mode.as_str().parse::<SortMode>().unwrap(), mode);
        }
        assert!("popular".parse::<SortMode>().is_err());
    }

    #[test]
    fn test_cache_key_ignores_stay_context() {
        let base = HotelQuery {
            city: Some("Душанбе".to_string()),
            ..Default::default()
        };
        let with_stay = HotelQuery {
            start: Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()),
            end: Some(NaiveDate::from_ymd_opt(2026, 9, 4).unwrap()),
            guests: Some(3),
            ..base.clone()
        };
        assert_eq!(base.cache_key(), with_stay.cache_key());
    }

    /// Property: no returned hotel ever violates an active constraint.
    #[test]
    fn test_selection_never_violates_constraints() {
        let mut rng = StdRng::seed_from_u64(42);
        let cities = ["Душанбе", "Пенджикент", "Худжанд"];

        for _ in 0..200 {
            let catalog: Vec<Hotel> = (0..rng.gen_range(1..20u32))
                .map(|i| {
                    hotel(
                        i,
                        &format!("Hotel {i}"),
                        cities[rng.gen_range(0..cities.len())],
                        Decimal::from(rng.gen_range(20..200u32)),
                        rng.gen_range(1..=5u8),
                    )
                })
                .collect();

            let query = HotelQuery {
                city: rng
                    .gen_bool(0.5)
                    .then(|| cities[rng.gen_range(0..cities.len())].to_string()),
                min_price: rng.gen_bool(0.5).then(|| Decimal::from(rng.gen_range(20..200u32))),
                max_price: rng.gen_bool(0.5).then(|| Decimal::from(rng.gen_range(20..200u32))),
                only_wifi: rng.gen_bool(0.3),
                only_breakfast: rng.gen_bool(0.3),
                stars: rng.gen_bool(0.5).then(|| rng.gen_range(1..=5u8)),
                sort: None,
                search: rng.gen_bool(0.3).then(|| format!("hotel {}", rng.gen_range(0..20))),
                ..Default::default()
            };

            for h in select_hotels(&catalog, &query) {
                if let Some(city) = query.city.as_deref() {
                    assert_eq!(h.city, city);
                }
                if let Some(min) = query.min_price {
                    assert!(h.price >= min);
                }
                if let Some(max) = query.max_price {
                    assert!(h.price <= max);
                }
                if query.only_wifi {
                    assert!(h.wifi);
                }
                if query.only_breakfast {
                    assert!(h.breakfast);
                }
                if let Some(stars) = query.stars {
                    assert_eq!(h.stars, stars);
                }
                if let Some(search) = query.search.as_deref() {
                    let needle = search.to_lowercase();
                    assert!(
                        h.name.to_lowercase().contains(&needle)
                            || h.description.to_lowercase().contains(&needle)
                    );
                }
            }
        }
    }
}
