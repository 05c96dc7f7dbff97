//! Domain models for the Fahrschule record keeper.
//!
//! # Core Concepts
//!
//! - [`Student`]: One record per driving-school student: personal data, exam
//!   status, and five boolean drive arrays (Fahrten).
//! - [`ProgressEntry`]: Completion marker for one training-checklist item,
//!   keyed by `(student_id, category, subcategory, item)`. Created lazily on
//!   first status change, removed only by student-deletion cascade.
//! - [`ProgressStatus`]: The cyclic four-state completion marker
//!   (`not_started → once → twice → thrice → not_started`).
//! - [`ProgressStats`]: Derived per-category and overall completion figures,
//!   never stored.
//! - [`PracticeHour`]: Legacy timestamp-keyed practice log. The boolean-array
//!   model on [`Student`] is canonical; this surface is kept separate and is
//!   never merged with the array semantics.

mod practice;
mod progress;
mod student;

pub use practice::*;
pub use progress::*;
pub use student::*;
