//! Listing and detail page handlers

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use crate::booking::{compute_nights, compute_total, RoomType};
use crate::catalog::Hotel;
use crate::error::Result;
use crate::search::{self, HotelQuery, SortMode};
use crate::session::{SessionState, Theme};
use crate::AppState;

use super::{back_url, Session};

/// Rotating "tip of the day" banner, as on the live site
const TIPS: [&str; 8] = [
    "Проверяйте отзывы перед бронированием!",
    "Бронируйте заранее и экономьте.",
    "Обратите внимание на удобства Wi-Fi.",
    "Используйте фильтры для точного поиска.",
    "Для экономии выбирайте будние дни.",
    "Уточняйте наличие бесплатной парковки.",
    "Обращайте внимание на рейтинг отеля.",
    "Больше гостей — выгоднее бронирование.",
];

/// A `<select>`/radio option with its selected state precomputed
struct SelectOption {
    value: String,
    label: String,
    selected: bool,
}

/// One hotel card on the listing page
struct HotelCard {
    detail_url: String,
    name: String,
    city: String,
    description: String,
    image: String,
    stars_filled: String,
    stars_empty: String,
    wifi: bool,
    breakfast: bool,
    label: String,
    has_label: bool,
    favorite: bool,
    favorite_url: String,
    price: String,
    total: String,
}

/// Listing template
#[derive(Template)]
#[template(path = "hotels/list.html")]
struct ListTemplate {
    theme_dark: bool,
    tip: String,
    cities: Vec<SelectOption>,
    sorts: Vec<SelectOption>,
    stars_options: Vec<SelectOption>,
    guests_options: Vec<SelectOption>,
    min_price: String,
    max_price: String,
    search: String,
    only_wifi: bool,
    only_breakfast: bool,
    start_value: String,
    end_value: String,
    nights: i64,
    guests: u32,
    hotels: Vec<HotelCard>,
    has_hotels: bool,
}

/// A room offer on the detail page
struct RoomOffer {
    value: String,
    label: String,
    rate: String,
    total: String,
    image: String,
    checked: bool,
}

/// A review card on the detail page
struct ReviewCard {
    initial: String,
    user: String,
    rating: u8,
    text: String,
}

/// Detail template
#[derive(Template)]
#[template(path = "hotels/detail.html")]
struct DetailTemplate {
    theme_dark: bool,
    name: String,
    description: String,
    city: String,
    address: String,
    label: String,
    has_label: bool,
    images: Vec<String>,
    features: Vec<String>,
    has_features: bool,
    avg_rating: String,
    has_rating: bool,
    reviews_count: u32,
    reviews: Vec<ReviewCard>,
    has_reviews: bool,
    favorite: bool,
    favorite_url: String,
    book_url: String,
    start_value: String,
    end_value: String,
    nights: i64,
    guests: u32,
    guests_options: Vec<SelectOption>,
    rooms: Vec<RoomOffer>,
    guest_name: String,
    guest_phone: String,
    error: String,
    has_error: bool,
}

/// Stay context shared by the listing and detail pages
#[derive(Debug, Clone, Copy)]
pub(crate) struct Stay {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub nights: i64,
    pub guests: u32,
}

impl Stay {
    /// Resolve the stay from query parameters, defaulting to a one-night
    /// stay starting today.
    pub fn from_query(query: &HotelQuery) -> Self {
        let today = Utc::now().date_naive();
        let start = query.start.unwrap_or(today);
        let end = query.end.unwrap_or_else(|| start.succ_opt().unwrap_or(start));
        Self::new(start, end, query.guests.unwrap_or(1))
    }

    pub fn new(start: NaiveDate, end: NaiveDate, guests: u32) -> Self {
        Self {
            start,
            end,
            nights: compute_nights(start, end),
            guests: guests.max(1),
        }
    }
}

/// Listing page
pub async fn list(
    State(app): State<AppState>,
    Query(query): Query<HotelQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let session = Session::from_headers(&app, &headers);
    let body = render_listing(&app, &query, &session.state).await?;
    Ok((session.cookie(), Html(body)).into_response())
}

/// Entry-document fallback for unmatched paths
pub async fn spa_fallback(State(app): State<AppState>) -> Result<Html<String>> {
    let body = render_listing(&app, &HotelQuery::default(), &SessionState::default()).await?;
    Ok(Html(body))
}

/// Detail page
pub async fn detail(
    State(app): State<AppState>,
    Path(id): Path<u32>,
    Query(query): Query<HotelQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let session = Session::from_headers(&app, &headers);
    let hotel = app
        .catalog
        .find(id)
        .ok_or(crate::error::AppError::HotelNotFound)?;

    let form = DetailForm::default();
    let body = render_detail(hotel, Stay::from_query(&query), &session.state, &form)?;
    Ok((session.cookie(), Html(body)).into_response())
}

/// Toggle a hotel in the session's favorites and go back
pub async fn toggle_favorite(
    State(app): State<AppState>,
    Path(id): Path<u32>,
    headers: HeaderMap,
) -> Response {
    let mut session = Session::from_headers(&app, &headers);
    let now_favorite = session.state.toggle_favorite(id);
    session.save(&app);
    tracing::debug!("Hotel {} favorite -> {}", id, now_favorite);
    (session.cookie(), Redirect::to(&back_url(&headers))).into_response()
}

/// Toggle the session theme and go back
pub async fn toggle_theme(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let mut session = Session::from_headers(&app, &headers);
    session.state.toggle_theme();
    session.save(&app);
    (session.cookie(), Redirect::to(&back_url(&headers))).into_response()
}

/// Detail-page form state: prefilled values and an optional inline error.
/// A failed submission re-renders the form with this state preserved.
#[derive(Debug, Clone, Default)]
pub(crate) struct DetailForm {
    pub guest_name: String,
    pub guest_phone: String,
    pub room_type: Option<RoomType>,
    pub error: Option<String>,
}

async fn render_listing(
    app: &AppState,
    query: &HotelQuery,
    session: &SessionState,
) -> Result<String> {
    let key = query.cache_key();
    let mut hotels: Vec<Hotel> = if let Some(cached) = app.cache.listings.get(&key).await {
        tracing::debug!("Cache HIT for listing: {}", key);
        (*cached).clone()
    } else {
        tracing::debug!("Cache MISS for listing: {}", key);
        let selected = search::select_hotels(app.catalog.hotels(), query);
        app.cache
            .listings
            .insert(key, Arc::new(selected.clone()))
            .await;
        selected
    };

    // Favorited hotels bubble up only when no explicit sort is chosen
    if query.sort.is_none() {
        search::favorites_first(&mut hotels, &session.favorites);
    }

    let stay = Stay::from_query(query);
    let start_value = stay.start.format("%Y-%m-%d").to_string();
    let end_value = stay.end.format("%Y-%m-%d").to_string();

    let cards: Vec<HotelCard> = hotels
        .iter()
        .map(|h| {
            let total = compute_total(h.price, stay.nights, stay.guests);
            HotelCard {
                detail_url: format!(
                    "/hotel/{}?start={}&end={}&guests={}",
                    h.id, start_value, end_value, stay.guests
                ),
                name: h.name.clone(),
                city: h.city.clone(),
                description: h.description.clone(),
                image: h.images[0].clone(),
                stars_filled: "★".repeat(usize::from(h.stars)),
                stars_empty: "★".repeat(usize::from(5u8.saturating_sub(h.stars))),
                wifi: h.wifi,
                breakfast: h.breakfast,
                label: h.label.clone(),
                has_label: !h.label.is_empty(),
                favorite: session.favorites.contains(&h.id),
                favorite_url: format!("/hotel/{}/favorite", h.id),
                price: h.price.to_string(),
                total: total.to_string(),
            }
        })
        .collect();

    let tip_index = Utc::now().timestamp() as usize % TIPS.len();

    let template = ListTemplate {
        theme_dark: session.theme == Theme::Dark,
        tip: TIPS[tip_index].to_string(),
        cities: city_options(app, query),
        sorts: sort_options(query),
        stars_options: star_options(query),
        guests_options: guests_options(stay.guests),
        min_price: query.min_price.map(|p| p.to_string()).unwrap_or_default(),
        max_price: query.max_price.map(|p| p.to_string()).unwrap_or_default(),
        search: query.search.clone().unwrap_or_default(),
        only_wifi: query.only_wifi,
        only_breakfast: query.only_breakfast,
        start_value,
        end_value,
        nights: stay.nights,
        guests: stay.guests,
        has_hotels: !cards.is_empty(),
        hotels: cards,
    };

    Ok(template.render()?)
}

pub(crate) fn render_detail(
    hotel: &Hotel,
    stay: Stay,
    session: &SessionState,
    form: &DetailForm,
) -> Result<String> {
    let mut features = Vec::new();
    if hotel.wifi {
        features.push("📶 Бесплатный Wi-Fi".to_string());
    }
    if hotel.breakfast {
        features.push("🍳 Завтрак включён".to_string());
    }

    let avg = hotel.average_rating();
    let selected_room = form.room_type.unwrap_or(RoomType::Single);

    let rooms: Vec<RoomOffer> = RoomType::ALL
        .iter()
        .enumerate()
        .map(|(i, room)| {
            let total = compute_total(room.nightly_rate(), stay.nights, stay.guests);
            RoomOffer {
                value: room.as_str().to_string(),
                label: room.label().to_string(),
                rate: room.nightly_rate().to_string(),
                total: total.to_string(),
                image: hotel.images[(i + 1) % hotel.images.len()].clone(),
                checked: *room == selected_room,
            }
        })
        .collect();

    let reviews: Vec<ReviewCard> = hotel
        .reviews_list
        .iter()
        .map(|r| ReviewCard {
            initial: r.user.chars().next().map(String::from).unwrap_or_default(),
            user: r.user.clone(),
            rating: r.rating,
            text: r.text.clone(),
        })
        .collect();

    let template = DetailTemplate {
        theme_dark: session.theme == Theme::Dark,
        name: hotel.name.clone(),
        description: hotel.description.clone(),
        city: hotel.city.clone(),
        address: if hotel.address.is_empty() {
            "Не указан".to_string()
        } else {
            hotel.address.clone()
        },
        label: hotel.label.clone(),
        has_label: !hotel.label.is_empty(),
        images: hotel.images.clone(),
        has_features: !features.is_empty(),
        features,
        avg_rating: avg.map(|a| format!("{a:.1}")).unwrap_or_default(),
        has_rating: avg.is_some(),
        reviews_count: hotel.reviews,
        has_reviews: !reviews.is_empty(),
        reviews,
        favorite: session.favorites.contains(&hotel.id),
        favorite_url: format!("/hotel/{}/favorite", hotel.id),
        book_url: format!("/hotel/{}/book", hotel.id),
        start_value: stay.start.format("%Y-%m-%d").to_string(),
        end_value: stay.end.format("%Y-%m-%d").to_string(),
        nights: stay.nights,
        guests: stay.guests,
        guests_options: guests_options(stay.guests),
        rooms,
        guest_name: form.guest_name.clone(),
        guest_phone: form.guest_phone.clone(),
        error: form.error.clone().unwrap_or_default(),
        has_error: form.error.is_some(),
    };

    Ok(template.render()?)
}

fn city_options(app: &AppState, query: &HotelQuery) -> Vec<SelectOption> {
    app.catalog
        .cities()
        .into_iter()
        .map(|city| SelectOption {
            selected: query.city.as_deref() == Some(city.as_str()),
            label: city.clone(),
            value: city,
        })
        .collect()
}

fn sort_options(query: &HotelQuery) -> Vec<SelectOption> {
    [
        (SortMode::PriceAscending, "По цене (дешевле)"),
        (SortMode::PriceDescending, "По цене (дороже)"),
        (SortMode::Stars, "По рейтингу"),
    ]
    .into_iter()
    .map(|(mode, label)| SelectOption {
        value: mode.as_str().to_string(),
        label: label.to_string(),
        selected: query.sort == Some(mode),
    })
    .collect()
}

fn star_options(query: &HotelQuery) -> Vec<SelectOption> {
    [3u8, 4, 5]
        .into_iter()
        .map(|stars| SelectOption {
            value: stars.to_string(),
            label: "★".repeat(usize::from(stars)),
            selected: query.stars == Some(stars),
        })
        .collect()
}

fn guests_options(guests: u32) -> Vec<SelectOption> {
    (1u32..=4)
        .map(|n| SelectOption {
            value: n.to_string(),
            label: if n == 1 {
                format!("{n} взрослый")
            } else {
                format!("{n} взрослых")
            },
            selected: n == guests,
        })
        .collect()
}
