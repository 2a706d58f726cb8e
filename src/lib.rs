//! HOTELS.TJ — server-rendered hotel browsing and booking site.

pub mod booking;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod receipt;
pub mod routes;
pub mod search;
pub mod session;

use std::sync::Arc;

use crate::booking::BookingStore;
use crate::cache::AppCache;
use crate::catalog::Catalog;
use crate::session::KeyValueStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub cache: AppCache,
    pub store: Arc<dyn BookingStore>,
    pub sessions: Arc<dyn KeyValueStore>,
}
