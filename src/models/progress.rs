use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Completion marker for one training-checklist item.
///
/// Strictly cyclic, advanced one step at a time by explicit user action:
/// `not_started → once → twice → thrice → not_started`. Variant order is the
/// progress ordering (`not_started < once < twice < thrice`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    Once,
    Twice,
    Thrice,
}

/// Cycle order, also the comparison order.
const STATUS_ORDER: [ProgressStatus; 4] = [
    ProgressStatus::NotStarted,
    ProgressStatus::Once,
    ProgressStatus::Twice,
    ProgressStatus::Thrice,
];

impl ProgressStatus {
    /// The single mutation primitive: step to the next status in the cycle.
    pub fn advance(self) -> Self {
        let index = STATUS_ORDER.iter().position(|s| *s == self).unwrap_or(0);
        STATUS_ORDER[(index + 1) % STATUS_ORDER.len()]
    }

    /// Whether the item counts as completed at all.
    pub fn is_completed(self) -> bool {
        self != Self::NotStarted
    }

    /// Fixed display glyph for each status.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::NotStarted => "",
            Self::Once => "/",
            Self::Twice => "×",
            Self::Thrice => "⊗",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Once => "once",
            Self::Twice => "twice",
            Self::Thrice => "thrice",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "once" => Some(Self::Once),
            "twice" => Some(Self::Twice),
            "thrice" => Some(Self::Thrice),
            _ => None,
        }
    }
}

/// One student's marker for one checklist item.
///
/// Identity is the composite key `(student_id, category, subcategory, item)`;
/// there is no separate row id. `subcategory` is the section key path from
/// the category root joined with `_`. Entries are created lazily on the first
/// status change and removed only when their student is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub student_id: Uuid,
    pub category: String,
    pub subcategory: String,
    pub item: String,
    pub status: ProgressStatus,
    pub notes: Option<String>,
    pub last_updated: DateTime<Utc>,
}

/// Body of a progress upsert: the new status and optional free-text notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertProgressInput {
    pub status: ProgressStatus,
    pub notes: Option<String>,
}

/// Breakdown of completed items by repetition depth.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletedItems {
    pub once: u32,
    pub twice: u32,
    pub thrice: u32,
}

/// Derived completion figures for a category subtree or the whole taxonomy.
/// Never stored; recomputed from progress entries on demand.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressStats {
    pub total_items: u32,
    pub total_completed: u32,
    /// `round(100 * total_completed / total_items)`, 0 when there are no items.
    pub completion_percentage: u32,
    pub completed_items: CompletedItems,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_transitions_close_the_cycle() {
        for start in STATUS_ORDER {
            let mut status = start;
            for _ in 0..4 {
                status = status.advance();
            }
            assert_eq!(status, start);
        }
    }

    #[test]
    fn advance_is_strictly_one_directional() {
        assert_eq!(ProgressStatus::NotStarted.advance(), ProgressStatus::Once);
        assert_eq!(ProgressStatus::Once.advance(), ProgressStatus::Twice);
        assert_eq!(ProgressStatus::Twice.advance(), ProgressStatus::Thrice);
        assert_eq!(ProgressStatus::Thrice.advance(), ProgressStatus::NotStarted);
    }

    #[test]
    fn ordering_follows_the_cycle_index() {
        assert!(ProgressStatus::NotStarted < ProgressStatus::Once);
        assert!(ProgressStatus::Once < ProgressStatus::Twice);
        assert!(ProgressStatus::Twice < ProgressStatus::Thrice);
    }

    #[test]
    fn wire_form_is_snake_case() {
        let json = serde_json::to_string(&ProgressStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
        let parsed: ProgressStatus = serde_json::from_str("\"thrice\"").unwrap();
        assert_eq!(parsed, ProgressStatus::Thrice);
    }

    #[test]
    fn glyphs_match_the_display_tiers() {
        assert_eq!(ProgressStatus::NotStarted.glyph(), "");
        assert_eq!(ProgressStatus::Once.glyph(), "/");
        assert_eq!(ProgressStatus::Twice.glyph(), "×");
        assert_eq!(ProgressStatus::Thrice.glyph(), "⊗");
    }
}
