use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One driving-school student.
///
/// Besides identity and contact data, a student carries the exam state and
/// five ordered boolean sequences recording completed drives. The three
/// fixed-purpose arrays (`ueberlandfahrten`, `autobahnfahrten`,
/// `nachtfahrten`) hold 5/4/3 slots by legal requirement; the model stores
/// them as plain sequences and does not enforce the length. The two practice
/// arrays (`uebungsfahrten_*`) are resizable with a floor of one element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub start_date: Option<NaiveDate>,
    /// Tri-state: `None` = not recorded, `Some(false)` = no, `Some(true)` = yes.
    pub wears_glasses: Option<bool>,
    pub theory_exam_date: Option<NaiveDate>,
    pub theory_exam_passed: bool,
    pub practical_exam_date: Option<NaiveDate>,
    pub practical_exam_passed: bool,
    pub license_number: Option<String>,
    pub instructor_notes: Option<String>,
    /// Cross-country drives, 5 slots.
    pub ueberlandfahrten: Vec<bool>,
    /// Highway drives, 4 slots.
    pub autobahnfahrten: Vec<bool>,
    /// Night drives, 3 slots.
    pub nachtfahrten: Vec<bool>,
    /// Full-hour practice sessions, resizable.
    pub uebungsfahrten_ganz: Vec<bool>,
    /// Half-hour practice sessions, resizable.
    pub uebungsfahrten_halb: Vec<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The five drive arrays a toggle can target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FahrtKind {
    Ueberlandfahrten,
    Autobahnfahrten,
    Nachtfahrten,
    UebungsfahrtenGanz,
    UebungsfahrtenHalb,
}

/// The two resizable practice arrays. Add/remove is only exposed for these;
/// the fixed-purpose arrays permit toggling alone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PracticeKind {
    Ganz,
    Halb,
}

impl From<PracticeKind> for FahrtKind {
    fn from(kind: PracticeKind) -> Self {
        match kind {
            PracticeKind::Ganz => FahrtKind::UebungsfahrtenGanz,
            PracticeKind::Halb => FahrtKind::UebungsfahrtenHalb,
        }
    }
}

impl Student {
    pub fn fahrten(&self, kind: FahrtKind) -> &[bool] {
        match kind {
            FahrtKind::Ueberlandfahrten => &self.ueberlandfahrten,
            FahrtKind::Autobahnfahrten => &self.autobahnfahrten,
            FahrtKind::Nachtfahrten => &self.nachtfahrten,
            FahrtKind::UebungsfahrtenGanz => &self.uebungsfahrten_ganz,
            FahrtKind::UebungsfahrtenHalb => &self.uebungsfahrten_halb,
        }
    }

    fn fahrten_mut(&mut self, kind: FahrtKind) -> &mut Vec<bool> {
        match kind {
            FahrtKind::Ueberlandfahrten => &mut self.ueberlandfahrten,
            FahrtKind::Autobahnfahrten => &mut self.autobahnfahrten,
            FahrtKind::Nachtfahrten => &mut self.nachtfahrten,
            FahrtKind::UebungsfahrtenGanz => &mut self.uebungsfahrten_ganz,
            FahrtKind::UebungsfahrtenHalb => &mut self.uebungsfahrten_halb,
        }
    }

    /// Flip one drive slot in place.
    pub fn toggle_fahrt(&mut self, kind: FahrtKind, index: usize) -> Result<()> {
        let fahrten = self.fahrten_mut(kind);
        let slot = fahrten
            .get_mut(index)
            .ok_or_else(|| anyhow::anyhow!("Fahrt index {} out of range", index))?;
        *slot = !*slot;
        Ok(())
    }

    /// Append an open practice slot. No upper bound.
    pub fn append_uebungsfahrt(&mut self, kind: PracticeKind) {
        self.fahrten_mut(kind.into()).push(false);
    }

    /// Remove a practice slot, shifting later entries down. Entries carry no
    /// identity beyond position, so later slots are renumbered. Returns
    /// `false` without removing when the array holds a single element.
    pub fn remove_uebungsfahrt(&mut self, kind: PracticeKind, index: usize) -> Result<bool> {
        let fahrten = self.fahrten_mut(kind.into());
        if fahrten.len() <= 1 {
            return Ok(false);
        }
        if index >= fahrten.len() {
            anyhow::bail!("Fahrt index {} out of range", index);
        }
        fahrten.remove(index);
        Ok(true)
    }
}

fn default_ueberlandfahrten() -> Vec<bool> {
    vec![false; 5]
}

fn default_autobahnfahrten() -> Vec<bool> {
    vec![false; 4]
}

fn default_nachtfahrten() -> Vec<bool> {
    vec![false; 3]
}

fn default_uebungsfahrten() -> Vec<bool> {
    vec![false; 5]
}

/// Input for creating a new student. Absent drive arrays start at the slot
/// counts the registration form pre-renders (5/4/3 fixed, 5 practice each).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudentInput {
    pub name: String,
    pub surname: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub wears_glasses: Option<bool>,
    pub theory_exam_date: Option<NaiveDate>,
    #[serde(default)]
    pub theory_exam_passed: bool,
    pub practical_exam_date: Option<NaiveDate>,
    #[serde(default)]
    pub practical_exam_passed: bool,
    pub license_number: Option<String>,
    pub instructor_notes: Option<String>,
    #[serde(default = "default_ueberlandfahrten")]
    pub ueberlandfahrten: Vec<bool>,
    #[serde(default = "default_autobahnfahrten")]
    pub autobahnfahrten: Vec<bool>,
    #[serde(default = "default_nachtfahrten")]
    pub nachtfahrten: Vec<bool>,
    #[serde(default = "default_uebungsfahrten")]
    pub uebungsfahrten_ganz: Vec<bool>,
    #[serde(default = "default_uebungsfahrten")]
    pub uebungsfahrten_halb: Vec<bool>,
}

impl CreateStudentInput {
    /// Materialize a full record with a fresh id and timestamps.
    pub fn into_student(self, now: DateTime<Utc>) -> Student {
        Student {
            id: Uuid::new_v4(),
            name: self.name,
            surname: self.surname,
            date_of_birth: self.date_of_birth,
            address: self.address,
            phone: self.phone,
            start_date: self.start_date,
            wears_glasses: self.wears_glasses,
            theory_exam_date: self.theory_exam_date,
            theory_exam_passed: self.theory_exam_passed,
            practical_exam_date: self.practical_exam_date,
            practical_exam_passed: self.practical_exam_passed,
            license_number: self.license_number,
            instructor_notes: self.instructor_notes,
            ueberlandfahrten: self.ueberlandfahrten,
            autobahnfahrten: self.autobahnfahrten,
            nachtfahrten: self.nachtfahrten,
            uebungsfahrten_ganz: self.uebungsfahrten_ganz,
            uebungsfahrten_halb: self.uebungsfahrten_halb,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for updating an existing student. All fields are optional for
/// partial updates; absent fields keep their prior values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStudentInput {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub wears_glasses: Option<bool>,
    pub theory_exam_date: Option<NaiveDate>,
    pub theory_exam_passed: Option<bool>,
    pub practical_exam_date: Option<NaiveDate>,
    pub practical_exam_passed: Option<bool>,
    pub license_number: Option<String>,
    pub instructor_notes: Option<String>,
    pub ueberlandfahrten: Option<Vec<bool>>,
    pub autobahnfahrten: Option<Vec<bool>>,
    pub nachtfahrten: Option<Vec<bool>>,
    pub uebungsfahrten_ganz: Option<Vec<bool>>,
    pub uebungsfahrten_halb: Option<Vec<bool>>,
}

impl UpdateStudentInput {
    /// Fold the update into an existing record, refreshing `updated_at`.
    pub fn apply(self, existing: &mut Student, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            existing.name = name;
        }
        if let Some(surname) = self.surname {
            existing.surname = surname;
        }
        existing.date_of_birth = self.date_of_birth.or(existing.date_of_birth);
        existing.address = self.address.or(existing.address.take());
        existing.phone = self.phone.or(existing.phone.take());
        existing.start_date = self.start_date.or(existing.start_date);
        existing.wears_glasses = self.wears_glasses.or(existing.wears_glasses);
        existing.theory_exam_date = self.theory_exam_date.or(existing.theory_exam_date);
        existing.theory_exam_passed = self
            .theory_exam_passed
            .unwrap_or(existing.theory_exam_passed);
        existing.practical_exam_date = self.practical_exam_date.or(existing.practical_exam_date);
        existing.practical_exam_passed = self
            .practical_exam_passed
            .unwrap_or(existing.practical_exam_passed);
        existing.license_number = self.license_number.or(existing.license_number.take());
        existing.instructor_notes = self.instructor_notes.or(existing.instructor_notes.take());
        if let Some(fahrten) = self.ueberlandfahrten {
            existing.ueberlandfahrten = fahrten;
        }
        if let Some(fahrten) = self.autobahnfahrten {
            existing.autobahnfahrten = fahrten;
        }
        if let Some(fahrten) = self.nachtfahrten {
            existing.nachtfahrten = fahrten;
        }
        if let Some(fahrten) = self.uebungsfahrten_ganz {
            existing.uebungsfahrten_ganz = fahrten;
        }
        if let Some(fahrten) = self.uebungsfahrten_halb {
            existing.uebungsfahrten_halb = fahrten;
        }
        existing.updated_at = now;
    }
}

/// Partial update of any of the five drive arrays. Each mutation from a
/// client ships whole arrays; there is no delta persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FahrtenUpdate {
    pub ueberlandfahrten: Option<Vec<bool>>,
    pub autobahnfahrten: Option<Vec<bool>>,
    pub nachtfahrten: Option<Vec<bool>>,
    pub uebungsfahrten_ganz: Option<Vec<bool>>,
    pub uebungsfahrten_halb: Option<Vec<bool>>,
}

impl FahrtenUpdate {
    pub fn apply(self, existing: &mut Student, now: DateTime<Utc>) {
        if let Some(fahrten) = self.ueberlandfahrten {
            existing.ueberlandfahrten = fahrten;
        }
        if let Some(fahrten) = self.autobahnfahrten {
            existing.autobahnfahrten = fahrten;
        }
        if let Some(fahrten) = self.nachtfahrten {
            existing.nachtfahrten = fahrten;
        }
        if let Some(fahrten) = self.uebungsfahrten_ganz {
            existing.uebungsfahrten_ganz = fahrten;
        }
        if let Some(fahrten) = self.uebungsfahrten_halb {
            existing.uebungsfahrten_halb = fahrten;
        }
        existing.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Student {
        CreateStudentInput {
            name: "Anna".to_string(),
            surname: "Schmidt".to_string(),
            date_of_birth: None,
            address: None,
            phone: None,
            start_date: None,
            wears_glasses: None,
            theory_exam_date: None,
            theory_exam_passed: false,
            practical_exam_date: None,
            practical_exam_passed: false,
            license_number: None,
            instructor_notes: None,
            ueberlandfahrten: vec![false; 5],
            autobahnfahrten: vec![false; 4],
            nachtfahrten: vec![false; 3],
            uebungsfahrten_ganz: vec![false; 2],
            uebungsfahrten_halb: vec![false],
        }
        .into_student(Utc::now())
    }

    #[test]
    fn toggle_flips_in_place() {
        let mut s = student();
        s.toggle_fahrt(FahrtKind::Ueberlandfahrten, 2).unwrap();
        assert_eq!(s.ueberlandfahrten, vec![false, false, true, false, false]);
        s.toggle_fahrt(FahrtKind::Ueberlandfahrten, 2).unwrap();
        assert_eq!(s.ueberlandfahrten, vec![false; 5]);
    }

    #[test]
    fn toggle_out_of_range_is_an_error() {
        let mut s = student();
        assert!(s.toggle_fahrt(FahrtKind::Nachtfahrten, 3).is_err());
    }

    #[test]
    fn append_then_remove_last_restores_prior_array() {
        let mut s = student();
        let prior = s.uebungsfahrten_ganz.clone();
        s.append_uebungsfahrt(PracticeKind::Ganz);
        let last = s.uebungsfahrten_ganz.len() - 1;
        assert!(s.remove_uebungsfahrt(PracticeKind::Ganz, last).unwrap());
        assert_eq!(s.uebungsfahrten_ganz, prior);
    }

    #[test]
    fn remove_refuses_to_empty_the_array() {
        let mut s = student();
        assert_eq!(s.uebungsfahrten_halb.len(), 1);
        assert!(!s.remove_uebungsfahrt(PracticeKind::Halb, 0).unwrap());
        assert_eq!(s.uebungsfahrten_halb.len(), 1);
    }

    #[test]
    fn remove_shifts_later_entries_down() {
        let mut s = student();
        s.uebungsfahrten_ganz = vec![true, false, true, false];
        assert!(s.remove_uebungsfahrt(PracticeKind::Ganz, 1).unwrap());
        assert_eq!(s.uebungsfahrten_ganz, vec![true, true, false]);
    }

    #[test]
    fn update_keeps_absent_fields() {
        let mut s = student();
        s.phone = Some("+49 123 456789".to_string());
        let update = UpdateStudentInput {
            surname: Some("Meier".to_string()),
            ..Default::default()
        };
        update.apply(&mut s, Utc::now());
        assert_eq!(s.surname, "Meier");
        assert_eq!(s.name, "Anna");
        assert_eq!(s.phone.as_deref(), Some("+49 123 456789"));
    }
}
