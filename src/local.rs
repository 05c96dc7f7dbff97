//! Offline store for the tablet client.
//!
//! No network and no database: the whole student collection lives in one
//! JSON blob, all progress entries in a second, under fixed file keys inside
//! a data directory. Every mutation rewrites the affected blob in full,
//! mirroring how the tablet persists the record after each edit.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::models::*;
use crate::taxonomy;

/// Fixed storage keys, shared with the tablet app.
const STUDENTS_KEY: &str = "fahrschul_students.json";
const PROGRESS_KEY: &str = "fahrschul_progress.json";

pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "fahrschule")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Self::open(dirs.data_dir().join("tablet"))
    }

    fn read_blob<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let path = self.dir.join(key);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).with_context(|| format!("Corrupt blob {}", path.display()))
    }

    fn write_blob<T: Serialize>(&self, key: &str, values: &[T]) -> Result<()> {
        let path = self.dir.join(key);
        let raw = serde_json::to_string_pretty(values)?;
        std::fs::write(&path, raw)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    // ============================================================
    // Students
    // ============================================================

    pub fn students(&self) -> Result<Vec<Student>> {
        self.read_blob(STUDENTS_KEY)
    }

    pub fn student(&self, id: Uuid) -> Result<Option<Student>> {
        Ok(self.students()?.into_iter().find(|s| s.id == id))
    }

    pub fn create_student(&self, input: CreateStudentInput) -> Result<Student> {
        let student = input.into_student(Utc::now());
        self.save_student(student)
    }

    /// Upsert the full record by id, refreshing `updated_at`. Unknown ids are
    /// appended, matching how the tablet saves a record it created offline.
    pub fn save_student(&self, mut student: Student) -> Result<Student> {
        let mut students = self.students()?;
        student.updated_at = Utc::now();

        match students.iter_mut().find(|s| s.id == student.id) {
            Some(existing) => *existing = student.clone(),
            None => students.push(student.clone()),
        }

        self.write_blob(STUDENTS_KEY, &students)?;
        Ok(student)
    }

    /// Delete a student and cascade to their progress entries.
    pub fn delete_student(&self, id: Uuid) -> Result<bool> {
        let mut students = self.students()?;
        let before = students.len();
        students.retain(|s| s.id != id);
        if students.len() == before {
            return Ok(false);
        }
        self.write_blob(STUDENTS_KEY, &students)?;

        let mut progress: Vec<ProgressEntry> = self.read_blob(PROGRESS_KEY)?;
        progress.retain(|p| p.student_id != id);
        self.write_blob(PROGRESS_KEY, &progress)?;

        Ok(true)
    }

    // ============================================================
    // Drive arrays
    // ============================================================

    /// Flip one drive slot, then persist the whole record.
    pub fn toggle_fahrt(
        &self,
        student_id: Uuid,
        kind: FahrtKind,
        index: usize,
    ) -> Result<Option<Student>> {
        let Some(mut student) = self.student(student_id)? else {
            return Ok(None);
        };
        student.toggle_fahrt(kind, index)?;
        self.save_student(student).map(Some)
    }

    pub fn append_uebungsfahrt(
        &self,
        student_id: Uuid,
        kind: PracticeKind,
    ) -> Result<Option<Student>> {
        let Some(mut student) = self.student(student_id)? else {
            return Ok(None);
        };
        student.append_uebungsfahrt(kind);
        self.save_student(student).map(Some)
    }

    /// Remove a practice slot. A no-op (but still a successful call) when the
    /// array is already down to one element.
    pub fn remove_uebungsfahrt(
        &self,
        student_id: Uuid,
        kind: PracticeKind,
        index: usize,
    ) -> Result<Option<Student>> {
        let Some(mut student) = self.student(student_id)? else {
            return Ok(None);
        };
        if student.remove_uebungsfahrt(kind, index)? {
            return self.save_student(student).map(Some);
        }
        Ok(Some(student))
    }

    // ============================================================
    // Progress
    // ============================================================

    pub fn progress(&self) -> Result<Vec<ProgressEntry>> {
        self.read_blob(PROGRESS_KEY)
    }

    pub fn progress_for_student(&self, student_id: Uuid) -> Result<Vec<ProgressEntry>> {
        Ok(self
            .progress()?
            .into_iter()
            .filter(|p| p.student_id == student_id)
            .collect())
    }

    /// Upsert by composite key. Absent notes keep previously stored notes.
    pub fn upsert_progress(
        &self,
        student_id: Uuid,
        category: &str,
        subcategory: &str,
        item: &str,
        input: UpsertProgressInput,
    ) -> Result<ProgressEntry> {
        if !taxonomy::contains_item(category, subcategory, item) {
            anyhow::bail!(
                "Unknown training item: {}/{}/{}",
                category,
                subcategory,
                item
            );
        }

        let mut entries = self.progress()?;
        let existing = entries.iter_mut().find(|p| {
            p.student_id == student_id
                && p.category == category
                && p.subcategory == subcategory
                && p.item == item
        });

        let entry = match existing {
            Some(existing) => {
                existing.status = input.status;
                if input.notes.is_some() {
                    existing.notes = input.notes;
                }
                existing.last_updated = Utc::now();
                existing.clone()
            }
            None => {
                let entry = ProgressEntry {
                    student_id,
                    category: category.to_string(),
                    subcategory: subcategory.to_string(),
                    item: item.to_string(),
                    status: input.status,
                    notes: input.notes,
                    last_updated: Utc::now(),
                };
                entries.push(entry.clone());
                entry
            }
        };

        self.write_blob(PROGRESS_KEY, &entries)?;
        Ok(entry)
    }

    /// Tap on a checklist box: step the status one position along the cycle,
    /// creating the entry lazily on the first tap.
    pub fn cycle_progress(
        &self,
        student_id: Uuid,
        category: &str,
        subcategory: &str,
        item: &str,
    ) -> Result<ProgressEntry> {
        let current = self
            .progress_for_student(student_id)?
            .into_iter()
            .find(|p| p.category == category && p.subcategory == subcategory && p.item == item)
            .map(|p| p.status)
            .unwrap_or_default();

        self.upsert_progress(
            student_id,
            category,
            subcategory,
            item,
            UpsertProgressInput {
                status: current.advance(),
                notes: None,
            },
        )
    }

    // ============================================================
    // Demo data
    // ============================================================

    /// Seed one demo student, only when the store holds no students yet.
    /// Returns whether anything was written.
    pub fn seed_demo(&self) -> Result<bool> {
        if !self.students()?.is_empty() {
            return Ok(false);
        }

        self.create_student(CreateStudentInput {
            name: "Anna".to_string(),
            surname: "Schmidt".to_string(),
            date_of_birth: "1998-03-20".parse().ok(),
            address: Some("Musterstraße 123, 12345 Berlin".to_string()),
            phone: Some("+49 123 456789".to_string()),
            start_date: "2024-01-15".parse().ok(),
            wears_glasses: Some(true),
            theory_exam_date: "2025-10-15".parse().ok(),
            theory_exam_passed: false,
            practical_exam_date: "2025-11-20".parse().ok(),
            practical_exam_passed: false,
            license_number: None,
            instructor_notes: None,
            ueberlandfahrten: vec![true, true, false, true, false],
            autobahnfahrten: vec![true, false, true, false, true],
            nachtfahrten: vec![false, true, false],
            uebungsfahrten_ganz: vec![
                true, true, false, true, false, false, true, false, true, true,
            ],
            uebungsfahrten_halb: vec![true, false, true, false, true],
        })?;

        Ok(true)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
