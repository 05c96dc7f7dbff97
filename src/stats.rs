//! Progress aggregation over the training taxonomy.
//!
//! The same walk backs the per-category summary on a collapsible section and
//! the overall completion badge in the student list: count every checklist
//! leaf, look up the student's entry by composite key (absent means
//! `not_started`), and tally completion by repetition depth.

use std::collections::{BTreeMap, HashMap};

use crate::models::{CompletedItems, ProgressEntry, ProgressStats, ProgressStatus};
use crate::taxonomy::{self, TrainingCategory};

/// Lookup from `(category, subcategory, item)` to the recorded status.
fn status_index(entries: &[ProgressEntry]) -> HashMap<(&str, &str, &str), ProgressStatus> {
    entries
        .iter()
        .map(|e| {
            (
                (e.category.as_str(), e.subcategory.as_str(), e.item.as_str()),
                e.status,
            )
        })
        .collect()
}

fn tally(
    category: &TrainingCategory,
    index: &HashMap<(&str, &str, &str), ProgressStatus>,
    stats: &mut ProgressStats,
) {
    for (subcategory, item) in category.leaf_items() {
        stats.total_items += 1;
        let status = index
            .get(&(category.key, subcategory.as_str(), item))
            .copied()
            .unwrap_or_default();
        match status {
            ProgressStatus::NotStarted => {}
            ProgressStatus::Once => stats.completed_items.once += 1,
            ProgressStatus::Twice => stats.completed_items.twice += 1,
            ProgressStatus::Thrice => stats.completed_items.thrice += 1,
        }
        if status.is_completed() {
            stats.total_completed += 1;
        }
    }
}

fn percentage(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * f64::from(completed) / f64::from(total)).round() as u32
}

fn finish(mut stats: ProgressStats) -> ProgressStats {
    stats.completion_percentage = percentage(stats.total_completed, stats.total_items);
    stats
}

/// Completion figures for one category subtree. A category with zero leaves
/// reports 0 of 0 at 0%.
pub fn category_stats(category: &TrainingCategory, entries: &[ProgressEntry]) -> ProgressStats {
    let index = status_index(entries);
    let mut stats = ProgressStats::default();
    tally(category, &index, &mut stats);
    finish(stats)
}

/// Per-category figures for every category in the taxonomy.
pub fn stats_by_category(entries: &[ProgressEntry]) -> BTreeMap<String, ProgressStats> {
    let index = status_index(entries);
    taxonomy::training_categories()
        .iter()
        .map(|category| {
            let mut stats = ProgressStats::default();
            tally(category, &index, &mut stats);
            (category.key.to_string(), finish(stats))
        })
        .collect()
}

/// Completion figures across the whole taxonomy, for the list-view badge.
/// Computed with the same walk as [`category_stats`].
pub fn overall_stats(entries: &[ProgressEntry]) -> ProgressStats {
    let index = status_index(entries);
    let mut stats = ProgressStats::default();
    for category in taxonomy::training_categories() {
        tally(category, &index, &mut stats);
    }
    finish(stats)
}

/// Summary of one drive array: completed slots, total slots, percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveSummary {
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

/// Completion of a single drive array, as shown next to each Fahrten block.
pub fn drive_summary(fahrten: &[bool]) -> DriveSummary {
    let completed = fahrten.iter().filter(|done| **done).count() as u32;
    let total = fahrten.len() as u32;
    DriveSummary {
        completed,
        total,
        percentage: percentage(completed, total),
    }
}
