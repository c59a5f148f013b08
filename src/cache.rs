//! Whole-page cache for the index listing.

use crate::auth::Auth;
use crate::config::Settings;
use log::error;
use moka::sync::Cache;
use rocket::fairing::AdHoc;
use std::time::Duration;

const MAX_PAGES: u64 = 10_000;

/// Rendered HTML keyed by request URI and viewer.
pub struct PageCache {
    pages: Cache<String, String>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        PageCache {
            pages: Cache::builder()
                .max_capacity(MAX_PAGES)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Cache key for `uri` as seen by `viewer`.
    pub fn key(uri: &str, viewer: Option<&Auth>) -> String {
        match viewer {
            Some(auth) => format!("{}#{}", uri, auth.id),
            None => uri.to_string(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.pages.get(key)
    }

    pub fn insert(&self, key: String, html: String) {
        self.pages.insert(key, html);
    }

    /// Drops every cached page; the next request renders afresh.
    pub fn clear(&self) {
        self.pages.invalidate_all();
    }

    pub fn manage() -> AdHoc {
        AdHoc::try_on_ignite("Page cache", |rocket| async move {
            let settings: Settings = match rocket.figment().extract() {
                Ok(settings) => settings,
                Err(err) => {
                    error!("Invalid page cache settings: {}", err);
                    return Err(rocket);
                }
            };
            let ttl = Duration::from_secs(settings.page_cache_ttl);
            Ok(rocket.manage(PageCache::new(ttl)))
        })
    }
}
