// ABOUTME: Configuration options for the quoting normalizer and the NormalizerBuilder.
// ABOUTME: Options toggle each detector and can be loaded from JSON; the builder also takes listeners.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::QuotingError;
use crate::listener::QuotingListener;
use crate::normalizer::Normalizer;

/// Quotes longer than this many lines are reported as collapsible.
pub const DEFAULT_HIDE_QUOTE_LENGTH: usize = 5;

/// Which steps of the pipeline run, plus the quote collapse threshold.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    pub outlook: bool,
    pub hotmail: bool,
    pub misc: bool,
    pub forwarded: bool,
    pub fusion: bool,
    pub hide_quote_length: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            outlook: true,
            hotmail: true,
            misc: true,
            forwarded: true,
            fusion: true,
            hide_quote_length: DEFAULT_HIDE_QUOTE_LENGTH,
        }
    }
}

impl Options {
    /// Parses options from a JSON object; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, QuotingError> {
        serde_json::from_str(json)
            .map_err(|e| QuotingError::config("parse options", Some(e.into())))
    }

    /// Reads and parses a JSON options file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuotingError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            QuotingError::io(format!("read {}", path.display()), Some(e.into()))
        })?;
        Self::from_json(&json)
    }
}

/// Builder for constructing Normalizer instances with custom configuration.
#[derive(Clone, Default)]
pub struct NormalizerBuilder {
    opts: Options,
    listeners: Vec<Arc<dyn QuotingListener>>,
}

impl fmt::Debug for NormalizerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizerBuilder")
            .field("opts", &self.opts)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl NormalizerBuilder {
    /// Create a new NormalizerBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all options at once.
    pub fn options(mut self, opts: Options) -> Self {
        self.opts = opts;
        self
    }

    pub fn outlook(mut self, enabled: bool) -> Self {
        self.opts.outlook = enabled;
        self
    }

    pub fn hotmail(mut self, enabled: bool) -> Self {
        self.opts.hotmail = enabled;
        self
    }

    pub fn misc(mut self, enabled: bool) -> Self {
        self.opts.misc = enabled;
        self
    }

    pub fn forwarded(mut self, enabled: bool) -> Self {
        self.opts.forwarded = enabled;
        self
    }

    pub fn fusion(mut self, enabled: bool) -> Self {
        self.opts.fusion = enabled;
        self
    }

    /// Set the line count above which quotes are reported as collapsible.
    pub fn hide_quote_length(mut self, lines: usize) -> Self {
        self.opts.hide_quote_length = lines;
        self
    }

    /// Register a listener; listeners are notified in registration order.
    pub fn listener(mut self, listener: Arc<dyn QuotingListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Build the Normalizer with the configured options.
    pub fn build(self) -> Normalizer {
        Normalizer::new(self.opts, self.listeners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let opts = Options::default();
        assert!(opts.outlook && opts.hotmail && opts.misc && opts.forwarded && opts.fusion);
        assert_eq!(opts.hide_quote_length, 5);
    }

    #[test]
    fn test_from_json_partial() {
        let opts = Options::from_json(r#"{"forwarded": false, "hide_quote_length": 12}"#).unwrap();
        assert!(!opts.forwarded);
        assert!(opts.outlook);
        assert_eq!(opts.hide_quote_length, 12);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = Options::from_json("{not json").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_load_missing_file_is_io() {
        let err = Options::load("/definitely/not/here.json").unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_builder_toggles() {
        let normalizer = NormalizerBuilder::new()
            .outlook(false)
            .fusion(false)
            .hide_quote_length(8)
            .build();
        let opts = normalizer.options();
        assert!(!opts.outlook);
        assert!(!opts.fusion);
        assert!(opts.hotmail);
        assert_eq!(opts.hide_quote_length, 8);
    }
}
