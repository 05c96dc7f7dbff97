mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::*;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

const STUDENT_COLUMNS: &str = "id, name, surname, date_of_birth, address, phone, start_date, \
     wears_glasses, theory_exam_date, theory_exam_passed, practical_exam_date, \
     practical_exam_passed, license_number, instructor_notes, ueberlandfahrten, \
     autobahnfahrten, nachtfahrten, uebungsfahrten_ganz, uebungsfahrten_halb, \
     created_at, updated_at";

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "fahrschule")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("fahrschule.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Student operations
    // ============================================================

    pub fn get_all_students(&self) -> Result<Vec<Student>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM students ORDER BY surname, name",
            STUDENT_COLUMNS
        ))?;

        let students = stmt
            .query_map([], student_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(students)
    }

    pub fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM students WHERE id = ?",
            STUDENT_COLUMNS
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(student_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_student(&self, input: CreateStudentInput) -> Result<Student> {
        let student = input.into_student(Utc::now());
        let conn = self.conn.lock().expect("database lock poisoned");
        write_student(&conn, &student)?;
        Ok(student)
    }

    pub fn update_student(&self, id: Uuid, input: UpdateStudentInput) -> Result<Option<Student>> {
        let Some(mut student) = self.get_student(id)? else {
            return Ok(None);
        };
        input.apply(&mut student, Utc::now());

        let conn = self.conn.lock().expect("database lock poisoned");
        write_student(&conn, &student)?;
        Ok(Some(student))
    }

    /// Partial update of any of the five drive arrays. The whole record is
    /// rewritten; there is no delta persistence.
    pub fn update_fahrten(&self, id: Uuid, update: FahrtenUpdate) -> Result<Option<Student>> {
        let Some(mut student) = self.get_student(id)? else {
            return Ok(None);
        };
        update.apply(&mut student, Utc::now());

        let conn = self.conn.lock().expect("database lock poisoned");
        write_student(&conn, &student)?;
        Ok(Some(student))
    }

    /// Delete a student and cascade to all their progress entries.
    pub fn delete_student(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "DELETE FROM progress WHERE student_id = ?",
            [id.to_string()],
        )?;
        let rows = conn.execute("DELETE FROM students WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Progress operations
    // ============================================================

    pub fn get_progress_by_student(&self, student_id: Uuid) -> Result<Vec<ProgressEntry>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT student_id, category, subcategory, item, status, notes, last_updated
             FROM progress WHERE student_id = ? ORDER BY category, subcategory, item",
        )?;

        let entries = stmt
            .query_map([student_id.to_string()], progress_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    pub fn get_progress_entry(
        &self,
        student_id: Uuid,
        category: &str,
        subcategory: &str,
        item: &str,
    ) -> Result<Option<ProgressEntry>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT student_id, category, subcategory, item, status, notes, last_updated
             FROM progress
             WHERE student_id = ? AND category = ? AND subcategory = ? AND item = ?",
        )?;

        let mut rows = stmt.query((student_id.to_string(), category, subcategory, item))?;
        match rows.next()? {
            Some(row) => Ok(Some(progress_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Lazily create or update the entry for one checklist item. Absent notes
    /// in the input leave previously stored notes untouched.
    pub fn upsert_progress(
        &self,
        student_id: Uuid,
        category: &str,
        subcategory: &str,
        item: &str,
        input: UpsertProgressInput,
    ) -> Result<ProgressEntry> {
        let now = Utc::now();
        {
            let conn = self.conn.lock().expect("database lock poisoned");
            conn.execute(
                "INSERT INTO progress (student_id, category, subcategory, item, status, notes, last_updated)
                 VALUES (?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT (student_id, category, subcategory, item) DO UPDATE SET
                     status = excluded.status,
                     notes = COALESCE(excluded.notes, progress.notes),
                     last_updated = excluded.last_updated",
                (
                    student_id.to_string(),
                    category,
                    subcategory,
                    item,
                    input.status.as_str(),
                    &input.notes,
                    now.to_rfc3339(),
                ),
            )?;
        }

        self.get_progress_entry(student_id, category, subcategory, item)?
            .ok_or_else(|| anyhow::anyhow!("Progress entry vanished after upsert"))
    }

    // ============================================================
    // Legacy practice-hour log
    // ============================================================

    pub fn get_practice_hours(&self) -> Result<Vec<PracticeHour>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, duration, date, created_at FROM practice_hours ORDER BY date",
        )?;

        let hours = stmt
            .query_map([], |row| {
                Ok(PracticeHour {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    duration: row.get(1)?,
                    date: parse_datetime(row.get::<_, String>(2)?),
                    created_at: parse_datetime(row.get::<_, String>(3)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(hours)
    }

    pub fn add_practice_hour(&self, input: CreatePracticeHourInput) -> Result<PracticeHour> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO practice_hours (id, duration, date, created_at) VALUES (?, ?, ?, ?)",
            (
                id.to_string(),
                input.duration,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(PracticeHour {
            id,
            duration: input.duration,
            date: now,
            created_at: now,
        })
    }

    pub fn remove_practice_hour(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM practice_hours WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn write_student(conn: &Connection, student: &Student) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO students ({})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            STUDENT_COLUMNS
        ),
        rusqlite::params![
            student.id.to_string(),
            student.name,
            student.surname,
            student.date_of_birth.map(|d| d.to_string()),
            student.address,
            student.phone,
            student.start_date.map(|d| d.to_string()),
            student.wears_glasses.map(i32::from),
            student.theory_exam_date.map(|d| d.to_string()),
            i32::from(student.theory_exam_passed),
            student.practical_exam_date.map(|d| d.to_string()),
            i32::from(student.practical_exam_passed),
            student.license_number,
            student.instructor_notes,
            serde_json::to_string(&student.ueberlandfahrten)?,
            serde_json::to_string(&student.autobahnfahrten)?,
            serde_json::to_string(&student.nachtfahrten)?,
            serde_json::to_string(&student.uebungsfahrten_ganz)?,
            serde_json::to_string(&student.uebungsfahrten_halb)?,
            student.created_at.to_rfc3339(),
            student.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn student_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        surname: row.get(2)?,
        date_of_birth: row.get::<_, Option<String>>(3)?.and_then(parse_date),
        address: row.get(4)?,
        phone: row.get(5)?,
        start_date: row.get::<_, Option<String>>(6)?.and_then(parse_date),
        wears_glasses: row.get::<_, Option<i32>>(7)?.map(|v| v != 0),
        theory_exam_date: row.get::<_, Option<String>>(8)?.and_then(parse_date),
        theory_exam_passed: row.get::<_, i32>(9)? != 0,
        practical_exam_date: row.get::<_, Option<String>>(10)?.and_then(parse_date),
        practical_exam_passed: row.get::<_, i32>(11)? != 0,
        license_number: row.get(12)?,
        instructor_notes: row.get(13)?,
        ueberlandfahrten: parse_bools(row.get::<_, String>(14)?),
        autobahnfahrten: parse_bools(row.get::<_, String>(15)?),
        nachtfahrten: parse_bools(row.get::<_, String>(16)?),
        uebungsfahrten_ganz: parse_bools(row.get::<_, String>(17)?),
        uebungsfahrten_halb: parse_bools(row.get::<_, String>(18)?),
        created_at: parse_datetime(row.get::<_, String>(19)?),
        updated_at: parse_datetime(row.get::<_, String>(20)?),
    })
}

fn progress_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProgressEntry> {
    Ok(ProgressEntry {
        student_id: parse_uuid(row.get::<_, String>(0)?),
        category: row.get(1)?,
        subcategory: row.get(2)?,
        item: row.get(3)?,
        status: ProgressStatus::from_str(&row.get::<_, String>(4)?)
            .unwrap_or(ProgressStatus::NotStarted),
        notes: row.get(5)?,
        last_updated: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_date(s: String) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

fn parse_bools(s: String) -> Vec<bool> {
    serde_json::from_str(&s).unwrap_or_default()
}
