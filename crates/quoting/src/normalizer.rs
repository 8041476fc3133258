// ABOUTME: The quoting pipeline: Outlook, Hotmail, misc, forwarded detection, then blockquote fusion.
// ABOUTME: Normalizer runs the enabled steps in fixed order, notifies listeners and returns a report.

//! Quote normalization pipeline.
//!
//! The steps always run in the same order. Each one is a best-effort
//! heuristic: a miss is a normal outcome. Running the pipeline on its own
//! output changes nothing.

use std::fmt;
use std::sync::Arc;

use scraper::Html;

use crate::detect::clients::{HOTMAIL_SELECTORS, MISC_SELECTOR, OUTLOOK_HEADER_SELECTOR};
use crate::detect::{
    convert_forwarded_marker, convert_hotmail_quoting, convert_misc_quoting,
    convert_outlook_quoting,
};
use crate::dom::serialize::body_html;
use crate::error::QuotingError;
use crate::fusion::{fuse_blockquotes, FusionOutcome};
use crate::listener::{Detector, QuotingListener};
use crate::options::{NormalizerBuilder, Options};
use crate::selector::precompile_selectors;

/// What one normalization pass did.
#[derive(Debug, Default)]
pub struct NormalizeReport {
    pub outlook: bool,
    pub hotmail: bool,
    pub misc: bool,
    pub forwarded: bool,
    /// Blockquotes absorbed by the fusion pass.
    pub fused: usize,
    pub inconsistencies: Vec<QuotingError>,
}

impl NormalizeReport {
    /// Detectors that found a marker, in pipeline order.
    pub fn detectors(&self) -> Vec<Detector> {
        [
            (self.outlook, Detector::Outlook),
            (self.hotmail, Detector::Hotmail),
            (self.misc, Detector::Misc),
            (self.forwarded, Detector::Forwarded),
        ]
        .into_iter()
        .filter_map(|(hit, detector)| hit.then_some(detector))
        .collect()
    }

    /// True when any detector fired or anything was fused.
    pub fn matched_anything(&self) -> bool {
        !self.detectors().is_empty() || self.fused > 0
    }

    pub fn is_consistent(&self) -> bool {
        self.inconsistencies.is_empty()
    }
}

/// Runs the quoting pipeline over message bodies.
#[derive(Clone)]
pub struct Normalizer {
    opts: Options,
    listeners: Vec<Arc<dyn QuotingListener>>,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("opts", &self.opts)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Options::default(), Vec::new())
    }
}

impl Normalizer {
    pub fn new(opts: Options, listeners: Vec<Arc<dyn QuotingListener>>) -> Self {
        precompile_selectors(
            HOTMAIL_SELECTORS
                .iter()
                .copied()
                .chain([MISC_SELECTOR, OUTLOOK_HEADER_SELECTOR, "blockquote", "body", "div"]),
        );
        Self { opts, listeners }
    }

    pub fn builder() -> NormalizerBuilder {
        NormalizerBuilder::new()
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    fn run_detector(
        &self,
        enabled: bool,
        detector: Detector,
        doc: &mut Html,
        step: fn(&mut Html) -> bool,
    ) -> bool {
        if !enabled {
            return false;
        }
        let hit = step(doc);
        if hit {
            log::debug!("{} detector matched", detector);
            for listener in &self.listeners {
                listener.on_marker(detector);
            }
        }
        hit
    }

    /// Normalizes `doc` in place.
    pub fn normalize(&self, doc: &mut Html) -> NormalizeReport {
        let mut report = NormalizeReport {
            outlook: self.run_detector(
                self.opts.outlook,
                Detector::Outlook,
                doc,
                convert_outlook_quoting,
            ),
            ..Default::default()
        };
        report.hotmail = self.run_detector(
            self.opts.hotmail,
            Detector::Hotmail,
            doc,
            convert_hotmail_quoting,
        );
        report.misc = self.run_detector(self.opts.misc, Detector::Misc, doc, convert_misc_quoting);
        report.forwarded = self.run_detector(
            self.opts.forwarded,
            Detector::Forwarded,
            doc,
            convert_forwarded_marker,
        );

        if self.opts.fusion {
            self.record_fusion(fuse_blockquotes(doc), &mut report);
        }

        report
    }

    fn record_fusion(&self, outcome: FusionOutcome, report: &mut NormalizeReport) {
        if outcome.fused > 0 {
            for listener in &self.listeners {
                listener.on_fused(outcome.fused);
            }
        }
        for err in &outcome.inconsistencies {
            for listener in &self.listeners {
                listener.on_inconsistency(err);
            }
        }
        report.fused = outcome.fused;
        report.inconsistencies = outcome.inconsistencies;
    }

    /// Parses `html` as a document, normalizes it and returns the body markup.
    pub fn normalize_html(&self, html: &str) -> String {
        let mut doc = Html::parse_document(html);
        self.normalize(&mut doc);
        body_html(&doc)
    }
}

/// Runs the full pipeline with default options and no listeners.
pub fn normalize_all(doc: &mut Html) -> NormalizeReport {
    Normalizer::default().normalize(doc)
}

/// Parses, normalizes and serializes a message body with default options.
pub fn normalize_html(html: &str) -> String {
    Normalizer::default().normalize_html(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl QuotingListener for Recorder {
        fn on_marker(&self, detector: Detector) {
            self.events.lock().unwrap().push(format!("marker:{}", detector));
        }

        fn on_fused(&self, count: usize) {
            self.events.lock().unwrap().push(format!("fused:{}", count));
        }

        fn on_inconsistency(&self, error: &QuotingError) {
            self.events.lock().unwrap().push(format!("inconsistency:{}", error.op));
        }
    }

    #[test]
    fn test_listeners_see_pipeline_order() {
        let recorder = Arc::new(Recorder::default());
        let normalizer = Normalizer::builder().listener(recorder.clone()).build();
        let mut doc = Html::parse_document(concat!(
            "<body><p>reply</p>",
            r#"<div class="OutlookMessageHeader">From: a</div><p>x</p>"#,
            "</body>"
        ));
        let report = normalizer.normalize(&mut doc);

        assert_eq!(report.detectors(), vec![Detector::Outlook]);
        assert_eq!(*recorder.events.lock().unwrap(), vec!["marker:outlook".to_string()]);
    }

    #[test]
    fn test_disabled_detector_does_not_run() {
        let normalizer = Normalizer::builder().hotmail(false).build();
        let input = "<p>reply</p><hr><p>old</p>";
        assert_eq!(
            normalizer.normalize_html(&format!("<body>{}</body>", input)),
            "<p>reply</p><hr /><p>old</p>"
        );
    }

    #[test]
    fn test_fusion_reported_to_listeners() {
        let recorder = Arc::new(Recorder::default());
        let normalizer = Normalizer::builder().listener(recorder.clone()).build();
        let mut doc = Html::parse_document(
            "<body>hi<blockquote>a</blockquote><br><blockquote>b</blockquote></body>",
        );
        let report = normalizer.normalize(&mut doc);
        assert_eq!(report.fused, 1);
        assert!(report.matched_anything());
        assert!(report.is_consistent());
        assert_eq!(*recorder.events.lock().unwrap(), vec!["fused:1".to_string()]);
    }

    #[test]
    fn test_inconsistencies_reach_listeners_and_report() {
        let recorder = Arc::new(Recorder::default());
        let normalizer = Normalizer::builder().listener(recorder.clone()).build();
        let outcome = FusionOutcome {
            fused: 0,
            inconsistencies: vec![QuotingError::inconsistency("fuse_blockquotes", None)],
        };
        let mut report = NormalizeReport::default();
        normalizer.record_fusion(outcome, &mut report);

        assert!(!report.is_consistent());
        assert!(report.inconsistencies[0].is_inconsistency());
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["inconsistency:fuse_blockquotes".to_string()]
        );
    }

    #[test]
    fn test_no_markers_no_report() {
        let mut doc = Html::parse_document("<body><p>Just a note.</p></body>");
        let report = normalize_all(&mut doc);
        assert!(!report.matched_anything());
    }
}
