// ABOUTME: Main library entry point for the conversations quoting normalizer.
// ABOUTME: Re-exports the public API: Normalizer, NormalizerBuilder, Options, NormalizeReport, QuotingError, ErrorCode.

//! Conversations quoting - rewrites the ad-hoc quoting conventions of
//! various mail clients into nested `<blockquote type="cite">` elements.
//!
//! Outlook, Hotmail and Yahoo each mark quoted replies differently, and
//! plain forwarded text often carries nothing but an
//! `-----Original Message-----` line. The [`Normalizer`] finds those
//! markers, wraps everything from the marker to the end of its container in
//! a blockquote, then fuses blockquotes separated only by whitespace.
//!
//! # Example
//!
//! ```
//! use conversations_quoting::normalize_html;
//!
//! let out = normalize_html(
//!     r#"<body><p>Sounds good.</p><div class="yahoo_quoted">On Monday, a wrote:</div><p>old</p></body>"#,
//! );
//! assert!(out.starts_with(r#"<p>Sounds good.</p><blockquote type="cite">"#));
//! ```

pub mod detect;
pub mod dom;
pub mod error;
pub mod fold;
pub mod fusion;
pub mod input;
pub mod listener;
pub mod normalizer;
pub mod options;
pub mod plaintext;
pub mod selector;

pub use crate::detect::forwarded::forward_marker_offset;
pub use crate::detect::{
    convert_forwarded_marker, convert_hotmail_quoting, convert_misc_quoting,
    convert_outlook_quoting, detect_by_marker_selector, wrap_region_starting_at,
};
pub use crate::dom::serialize::body_html;
pub use crate::error::{ErrorCode, QuotingError, Result};
pub use crate::fold::{find_signature, quote_report, topmost_quotes, QuoteInfo, QuoteReport};
pub use crate::fusion::{fuse_blockquotes, FusionOutcome};
pub use crate::input::decode_input;
pub use crate::listener::{Detector, QuotingListener};
pub use crate::normalizer::{normalize_all, normalize_html, NormalizeReport, Normalizer};
pub use crate::options::{NormalizerBuilder, Options, DEFAULT_HIDE_QUOTE_LENGTH};
pub use crate::plaintext::{cite_string, html_to_text};
