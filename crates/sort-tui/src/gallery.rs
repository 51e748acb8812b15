//! Gallery controller: stored classifications, stats and bulk selection.
//!
//! `Gallery` is plain data the App mutates on load/delete/edit results; the
//! async helpers at the bottom do the network side and hand back values for
//! the App to apply.

use std::collections::BTreeSet;

use chrono::{DateTime, Local};
use sort_proto::client::{ApiError, BackendClient};
use sort_proto::protocol::{ClassificationRecord, ClassifyRequest, Stats};
use tracing::debug;

/// Categories offered by the edit dialog.
pub const CATEGORIES: &[&str] = &[
    "plastic",
    "metal",
    "glass",
    "paper",
    "cardboard",
    "organic",
    "biological",
    "clothes",
    "shoes",
    "electronics",
    "other",
];

pub const DELETE_CONFIRM: &str =
    "Are you sure you want to delete this classification? This action cannot be undone.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Grid,
    List,
}

/// One row of the classification breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownRow {
    pub label: String,
    pub count: u64,
    pub percent: f64,
}

impl BreakdownRow {
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

#[derive(Debug)]
pub struct Gallery {
    pub records: Vec<ClassificationRecord>,
    pub stats: Option<Stats>,
    pub view: ViewMode,
    pub bulk_mode: bool,
    pub selected: BTreeSet<String>,
    pub loading: bool,
    pub load_error: Option<String>,
    pub last_loaded: Option<DateTime<Local>>,
}

impl Gallery {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            stats: None,
            view: ViewMode::Grid,
            bulk_mode: false,
            selected: BTreeSet::new(),
            loading: false,
            load_error: None,
            last_loaded: None,
        }
    }

    /// Install a fresh load.  Marks for records that no longer exist are
    /// dropped.
    pub fn set_data(&mut self, records: Vec<ClassificationRecord>, stats: Stats) {
        self.selected
            .retain(|f| records.iter().any(|r| &r.filename == f));
        self.records = records;
        self.stats = Some(stats);
        self.loading = false;
        self.load_error = None;
        self.last_loaded = Some(Local::now());
    }

    pub fn set_error(&mut self, err: impl Into<String>) {
        self.loading = false;
        self.load_error = Some(err.into());
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        };
    }

    /// Enter or leave bulk mode; either way the selection starts empty.
    pub fn toggle_bulk(&mut self) {
        self.bulk_mode = !self.bulk_mode;
        self.selected.clear();
    }

    /// Mark or unmark `filename`.  Ignored outside bulk mode.
    pub fn toggle_selected(&mut self, filename: &str) {
        if !self.bulk_mode {
            return;
        }
        if !self.selected.remove(filename) {
            self.selected.insert(filename.to_string());
        }
    }

    /// Mark every record, or clear the marks when all are already marked.
    pub fn select_all(&mut self) {
        if !self.bulk_mode {
            return;
        }
        if self.all_selected() {
            self.selected.clear();
        } else {
            self.selected = self.records.iter().map(|r| r.filename.clone()).collect();
        }
    }

    pub fn all_selected(&self) -> bool {
        !self.records.is_empty() && self.selected.len() == self.records.len()
    }

    pub fn is_selected(&self, filename: &str) -> bool {
        self.selected.contains(filename)
    }

    /// Filenames to bulk-delete, or the warning to show when nothing is marked.
    pub fn selection(&self) -> Result<Vec<String>, &'static str> {
        if self.selected.is_empty() {
            Err("Please select items to delete.")
        } else {
            Ok(self.selected.iter().cloned().collect())
        }
    }

    pub fn bulk_confirm_prompt(&self) -> String {
        let n = self.selected.len();
        format!(
            "Are you sure you want to delete {} classification{}? This action cannot be undone.",
            n,
            if n > 1 { "s" } else { "" }
        )
    }

    /// After a bulk delete: leave bulk mode with nothing marked.
    pub fn finish_bulk(&mut self) {
        self.bulk_mode = false;
        self.selected.clear();
    }

    pub fn record(&self, filename: &str) -> Option<&ClassificationRecord> {
        self.records.iter().find(|r| r.filename == filename)
    }

    /// Per-category counts with their share of all classified items,
    /// largest first.
    pub fn breakdown(&self) -> Vec<BreakdownRow> {
        let Some(stats) = &self.stats else {
            return Vec::new();
        };
        let total: u64 = stats.classification_counts.values().sum();
        if total == 0 {
            return Vec::new();
        }
        let mut rows: Vec<BreakdownRow> = stats
            .classification_counts
            .iter()
            .map(|(label, &count)| BreakdownRow {
                label: label.clone(),
                count,
                percent: count as f64 * 100.0 / total as f64,
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        rows
    }
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new()
    }
}

/// Confidence line for a record; unclassified records have none.
pub fn confidence_label(record: &ClassificationRecord) -> Option<String> {
    if record.is_unknown() {
        None
    } else {
        Some(format!("Confidence: {:.2}%", record.confidence))
    }
}

/// Validate the edit dialog's fields into a classify request.
pub fn build_classify(
    filename: &str,
    classification: &str,
    confidence: &str,
) -> Result<ClassifyRequest, &'static str> {
    let classification = classification.trim();
    if classification.is_empty() {
        return Err("Please select a classification");
    }
    let confidence: f64 = confidence
        .trim()
        .parse()
        .map_err(|_| "Confidence must be a number between 0 and 100")?;
    if !(0.0..=100.0).contains(&confidence) {
        return Err("Confidence must be a number between 0 and 100");
    }
    Ok(ClassifyRequest {
        filename: filename.to_string(),
        classification: classification.to_string(),
        confidence,
    })
}

// ── Async loaders ─────────────────────────────────────────────────────────────

/// Fetch the record list and stats concurrently.
pub async fn load(client: &BackendClient) -> Result<(Vec<ClassificationRecord>, Stats), ApiError> {
    let (records, stats) = tokio::join!(client.classifications(), client.stats());
    let records = records?;
    let stats = stats?;
    debug!("[gallery] loaded {} records", records.len());
    Ok((records, stats))
}

/// Toast text for a single save.
pub fn save_message(result: &Result<(), ApiError>) -> (crate::widgets::toast::Severity, String) {
    use crate::widgets::toast::Severity;
    match result {
        Ok(()) => (Severity::Success, "Classification saved successfully!".into()),
        Err(ApiError::Rejected(reason)) => (
            Severity::Error,
            format!("Error saving classification: {}", reason),
        ),
        Err(_) => (
            Severity::Error,
            "Error saving classification. Please try again.".into(),
        ),
    }
}

/// Toast text for a single delete.
pub fn delete_message(result: &Result<(), ApiError>) -> (crate::widgets::toast::Severity, String) {
    use crate::widgets::toast::Severity;
    match result {
        Ok(()) => (Severity::Success, "Classification deleted successfully!".into()),
        Err(ApiError::Rejected(reason)) => (
            Severity::Error,
            format!("Error deleting classification: {}", reason),
        ),
        Err(_) => (
            Severity::Error,
            "Error deleting classification. Please try again.".into(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::toast::Severity;
    use std::collections::BTreeMap;

    fn record(filename: &str, classification: &str, confidence: f64) -> ClassificationRecord {
        ClassificationRecord {
            filename: filename.to_string(),
            image_path: format!("/detected_images/{filename}"),
            frame_number: Some(1),
            date: "2026-03-01 09:00:00".to_string(),
            file_size_mb: 0.4,
            classification: classification.to_string(),
            confidence,
            manual_override: false,
        }
    }

    fn stats(counts: &[(&str, u64)]) -> Stats {
        Stats {
            total_images: counts.iter().map(|c| c.1).sum(),
            total_classified: counts.iter().map(|c| c.1).sum(),
            unclassified: 0,
            average_confidence: 80.0,
            classification_counts: counts
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn loaded() -> Gallery {
        let mut g = Gallery::new();
        g.set_data(
            vec![
                record("a.jpg", "plastic", 91.2),
                record("b.jpg", "Unknown", 0.0),
                record("c.jpg", "paper", 70.0),
            ],
            stats(&[("plastic", 1), ("paper", 1)]),
        );
        g
    }

    #[test]
    fn test_toggle_bulk_clears_selection_both_ways() {
        let mut g = loaded();
        g.toggle_bulk();
        g.toggle_selected("a.jpg");
        g.toggle_selected("c.jpg");
        assert_eq!(g.selected.len(), 2);
        g.toggle_bulk();
        assert!(!g.bulk_mode);
        assert!(g.selected.is_empty());
        g.toggle_bulk();
        assert!(g.selected.is_empty());
    }

    #[test]
    fn test_selection_ignored_outside_bulk_mode() {
        let mut g = loaded();
        g.toggle_selected("a.jpg");
        g.select_all();
        assert!(g.selected.is_empty());
    }

    #[test]
    fn test_toggle_selected_flips() {
        let mut g = loaded();
        g.toggle_bulk();
        g.toggle_selected("a.jpg");
        assert!(g.is_selected("a.jpg"));
        g.toggle_selected("a.jpg");
        assert!(!g.is_selected("a.jpg"));
    }

    #[test]
    fn test_select_all_then_deselect_all() {
        let mut g = loaded();
        g.toggle_bulk();
        g.select_all();
        assert!(g.all_selected());
        g.select_all();
        assert!(g.selected.is_empty());
    }

    #[test]
    fn test_empty_selection_warns() {
        let mut g = loaded();
        g.toggle_bulk();
        assert_eq!(g.selection(), Err("Please select items to delete."));
        g.toggle_selected("c.jpg");
        g.toggle_selected("a.jpg");
        assert_eq!(
            g.selection(),
            Ok(vec!["a.jpg".to_string(), "c.jpg".to_string()])
        );
    }

    #[test]
    fn test_bulk_prompt_pluralises() {
        let mut g = loaded();
        g.toggle_bulk();
        g.toggle_selected("a.jpg");
        assert!(g.bulk_confirm_prompt().contains("delete 1 classification?"));
        g.toggle_selected("b.jpg");
        assert!(g.bulk_confirm_prompt().contains("delete 2 classifications?"));
    }

    #[test]
    fn test_reload_drops_marks_for_deleted_records() {
        let mut g = loaded();
        g.toggle_bulk();
        g.select_all();
        g.set_data(vec![record("c.jpg", "paper", 70.0)], stats(&[("paper", 1)]));
        assert_eq!(g.selected.iter().collect::<Vec<_>>(), vec!["c.jpg"]);
        assert!(g.bulk_mode);
    }

    #[test]
    fn test_finish_bulk_resets_mode() {
        let mut g = loaded();
        g.toggle_bulk();
        g.select_all();
        g.finish_bulk();
        assert!(!g.bulk_mode);
        assert!(g.selected.is_empty());
    }

    #[test]
    fn test_breakdown_percentages_sorted() {
        let mut g = Gallery::new();
        g.set_data(
            Vec::new(),
            stats(&[("paper", 1), ("plastic", 6), ("glass", 1)]),
        );
        let rows = g.breakdown();
        assert_eq!(rows[0].label, "plastic");
        assert_eq!(rows[0].percent_label(), "75.0%");
        assert_eq!(rows[1].label, "glass");
        assert_eq!(rows[2].label, "paper");
        assert_eq!(rows[2].percent_label(), "12.5%");
    }

    #[test]
    fn test_breakdown_empty_without_counts() {
        let mut g = Gallery::new();
        assert!(g.breakdown().is_empty());
        g.set_data(Vec::new(), stats(&[]));
        assert!(g.breakdown().is_empty());
    }

    #[test]
    fn test_unknown_record_has_no_confidence() {
        assert_eq!(
            confidence_label(&record("a.jpg", "plastic", 91.2)).as_deref(),
            Some("Confidence: 91.20%")
        );
        assert_eq!(confidence_label(&record("b.jpg", "Unknown", 0.0)), None);
    }

    #[test]
    fn test_view_toggles() {
        let mut g = Gallery::new();
        assert_eq!(g.view, ViewMode::Grid);
        g.toggle_view();
        assert_eq!(g.view, ViewMode::List);
        g.toggle_view();
        assert_eq!(g.view, ViewMode::Grid);
    }

    #[test]
    fn test_build_classify_validates() {
        assert_eq!(
            build_classify("a.jpg", "", "95"),
            Err("Please select a classification")
        );
        assert!(build_classify("a.jpg", "metal", "abc").is_err());
        assert!(build_classify("a.jpg", "metal", "101").is_err());
        let req = build_classify("a.jpg", "metal", " 88.5 ").unwrap();
        assert_eq!(req.classification, "metal");
        assert_eq!(req.confidence, 88.5);
    }

    #[test]
    fn test_result_messages() {
        assert_eq!(
            save_message(&Ok(())),
            (Severity::Success, "Classification saved successfully!".to_string())
        );
        assert_eq!(
            delete_message(&Err(ApiError::Rejected("Unknown error".into()))).1,
            "Error deleting classification: Unknown error"
        );
    }
}
