// ABOUTME: Pre-compiled CSS selector cache shared by the quoting detectors.
// ABOUTME: Eliminates repeated parsing of the fixed marker selectors on every message.

//! Selector caching for repeated marker lookups.
//!
//! Every message runs the same handful of marker selectors. Parsing a
//! selector costs more than matching it against a short e-mail body, so
//! compiled selectors are kept for the life of the process.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use scraper::Selector;

use crate::error::{QuotingError, Result};

/// Thread-safe cache of compiled CSS selectors. Invalid selectors are cached as `None`.
static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Compiles a selector without touching the cache.
pub fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| {
        QuotingError::selector(format!("compile {:?}", css), Some(anyhow::anyhow!("{:?}", e)))
    })
}

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `Some(Selector)` if the selector is valid, `None` if invalid.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    {
        let cache = SELECTOR_CACHE.read().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = match compile(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    };
    let mut cache = SELECTOR_CACHE.write().unwrap_or_else(|e| e.into_inner());
    // Another thread may have inserted while we were compiling
    if let Some(cached) = cache.get(css) {
        return cached.clone();
    }
    cache.insert(css.to_string(), compiled.clone());
    compiled
}

/// Precompiles a batch of selectors into the cache.
pub fn precompile_selectors<I, S>(selectors: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cache = SELECTOR_CACHE.write().unwrap_or_else(|e| e.into_inner());
    for css in selectors {
        let css = css.as_ref();
        if !cache.contains_key(css) {
            cache.insert(css.to_string(), compile(css).ok());
        }
    }
}
