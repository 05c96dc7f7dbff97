use axum::http::StatusCode;
use axum_test::TestServer;
use fahrschule::api::create_router;
use fahrschule::db::Database;
use fahrschule::models::*;
use serde_json::json;

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);
    TestServer::new(app).expect("Failed to create test server")
}

async fn create_test_student(server: &TestServer) -> Student {
    server
        .post("/api/students")
        .json(&json!({
            "name": "Anna",
            "surname": "Schmidt",
        }))
        .await
        .json::<Student>()
}

mod students {
    use super::*;

    #[tokio::test]
    async fn create_assigns_default_drive_arrays() {
        let server = setup();

        let response = server
            .post("/api/students")
            .json(&json!({ "name": "Anna", "surname": "Schmidt" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let student: Student = response.json();
        assert_eq!(student.ueberlandfahrten.len(), 5);
        assert_eq!(student.autobahnfahrten.len(), 4);
        assert_eq!(student.nachtfahrten.len(), 3);
        assert_eq!(student.uebungsfahrten_ganz.len(), 5);
        assert_eq!(student.uebungsfahrten_halb.len(), 5);
        assert!(!student.theory_exam_passed);
        assert!(student.wears_glasses.is_none());
    }

    #[tokio::test]
    async fn list_returns_students_ordered_by_surname() {
        let server = setup();

        server
            .post("/api/students")
            .json(&json!({ "name": "Max", "surname": "Zimmer" }))
            .await;
        server
            .post("/api/students")
            .json(&json!({ "name": "Anna", "surname": "Albrecht" }))
            .await;

        let response = server.get("/api/students").await;
        response.assert_status_ok();
        let students: Vec<Student> = response.json();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].surname, "Albrecht");
        assert_eq!(students[1].surname, "Zimmer");
    }

    #[tokio::test]
    async fn get_unknown_student_returns_404() {
        let server = setup();

        let response = server
            .get(&format!("/api/students/{}", uuid::Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_is_partial_and_keeps_absent_fields() {
        let server = setup();
        let student = create_test_student(&server).await;

        let response = server
            .put(&format!("/api/students/{}", student.id))
            .json(&json!({
                "phone": "+49 123 456789",
                "theory_exam_passed": true,
            }))
            .await;

        response.assert_status_ok();
        let updated: Student = response.json();
        assert_eq!(updated.name, "Anna");
        assert_eq!(updated.surname, "Schmidt");
        assert_eq!(updated.phone.as_deref(), Some("+49 123 456789"));
        assert!(updated.theory_exam_passed);
    }

    #[tokio::test]
    async fn delete_removes_the_student() {
        let server = setup();
        let student = create_test_student(&server).await;

        let response = server.delete(&format!("/api/students/{}", student.id)).await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server.get(&format!("/api/students/{}", student.id)).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}

mod fahrten {
    use super::*;

    #[tokio::test]
    async fn put_updates_only_the_given_arrays() {
        let server = setup();
        let student = create_test_student(&server).await;

        let response = server
            .put(&format!("/api/students/{}/fahrten", student.id))
            .json(&json!({
                "ueberlandfahrten": [true, true, false, true, false],
            }))
            .await;

        response.assert_status_ok();
        let updated: Student = response.json();
        assert_eq!(
            updated.ueberlandfahrten,
            vec![true, true, false, true, false]
        );
        assert_eq!(updated.autobahnfahrten, student.autobahnfahrten);
        assert_eq!(updated.nachtfahrten, student.nachtfahrten);
    }

    #[tokio::test]
    async fn put_for_unknown_student_returns_404() {
        let server = setup();

        let response = server
            .put(&format!("/api/students/{}/fahrten", uuid::Uuid::new_v4()))
            .json(&json!({ "nachtfahrten": [true, false, false] }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}

mod training_categories {
    use super::*;

    #[tokio::test]
    async fn returns_the_four_static_categories() {
        let server = setup();

        let response = server.get("/api/training-categories").await;
        response.assert_status_ok();

        let categories: serde_json::Value = response.json();
        let keys: Vec<&str> = categories
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["key"].as_str().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec![
                "grundstufe",
                "situative_bausteine",
                "fahrerassistenzsysteme",
                "reife_teststufe"
            ]
        );
    }

    #[tokio::test]
    async fn nested_sections_keep_their_tree_shape() {
        let server = setup();

        let categories: serde_json::Value = server.get("/api/training-categories").await.json();
        let situative = &categories[1];
        let checkliste = &situative["sections"][0];
        assert_eq!(checkliste["key"], "fahrtechnische_vorbereitung");
        assert!(checkliste["sections"].is_array());
        assert!(checkliste.get("items").is_none());
    }
}

mod progress {
    use super::*;

    #[tokio::test]
    async fn upsert_creates_the_entry_lazily() {
        let server = setup();
        let student = create_test_student(&server).await;

        let empty: Vec<ProgressEntry> = server
            .get(&format!("/api/students/{}/progress", student.id))
            .await
            .json();
        assert!(empty.is_empty());

        let response = server
            .post(&format!("/api/students/{}/progress", student.id))
            .add_query_param("category", "grundstufe")
            .add_query_param("subcategory", "einstellen")
            .add_query_param("item", "Spiegel")
            .json(&json!({ "status": "once" }))
            .await;

        response.assert_status_ok();
        let entry: ProgressEntry = response.json();
        assert_eq!(entry.status, ProgressStatus::Once);
        assert_eq!(entry.category, "grundstufe");
        assert_eq!(entry.subcategory, "einstellen");
        assert_eq!(entry.item, "Spiegel");

        let entries: Vec<ProgressEntry> = server
            .get(&format!("/api/students/{}/progress", student.id))
            .await
            .json();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn upsert_rejects_unknown_training_items() {
        let server = setup();
        let student = create_test_student(&server).await;

        let response = server
            .post(&format!("/api/students/{}/progress", student.id))
            .add_query_param("category", "grundstufe")
            .add_query_param("subcategory", "einstellen")
            .add_query_param("item", "Heckspoiler")
            .json(&json!({ "status": "once" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upsert_for_unknown_student_returns_404() {
        let server = setup();

        let response = server
            .post(&format!("/api/students/{}/progress", uuid::Uuid::new_v4()))
            .add_query_param("category", "grundstufe")
            .add_query_param("subcategory", "einstellen")
            .add_query_param("item", "Spiegel")
            .json(&json!({ "status": "once" }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_only_upsert_keeps_stored_notes() {
        let server = setup();
        let student = create_test_student(&server).await;
        let url = format!("/api/students/{}/progress", student.id);

        server
            .post(&url)
            .add_query_param("category", "grundstufe")
            .add_query_param("subcategory", "pedale")
            .add_query_param("item", "Pedale")
            .json(&json!({ "status": "once", "notes": "Kupplung üben" }))
            .await;

        let entry: ProgressEntry = server
            .post(&url)
            .add_query_param("category", "grundstufe")
            .add_query_param("subcategory", "pedale")
            .add_query_param("item", "Pedale")
            .json(&json!({ "status": "twice" }))
            .await
            .json();

        assert_eq!(entry.status, ProgressStatus::Twice);
        assert_eq!(entry.notes.as_deref(), Some("Kupplung üben"));
    }

    #[tokio::test]
    async fn progress_stats_cover_every_category() {
        let server = setup();
        let student = create_test_student(&server).await;

        server
            .post(&format!("/api/students/{}/progress", student.id))
            .add_query_param("category", "reife_teststufe")
            .add_query_param("subcategory", "selbststandiges_fahren")
            .add_query_param("item", "innerorts")
            .json(&json!({ "status": "twice" }))
            .await;

        let response = server
            .get(&format!("/api/students/{}/progress-stats", student.id))
            .await;
        response.assert_status_ok();

        let stats: std::collections::BTreeMap<String, ProgressStats> = response.json();
        assert_eq!(stats.len(), 4);

        // reife_teststufe holds five leaves; one is marked twice.
        let reife = &stats["reife_teststufe"];
        assert_eq!(reife.total_items, 5);
        assert_eq!(reife.total_completed, 1);
        assert_eq!(reife.completion_percentage, 20);
        assert_eq!(reife.completed_items.twice, 1);
        assert_eq!(reife.completed_items.once, 0);

        let grundstufe = &stats["grundstufe"];
        assert_eq!(grundstufe.total_completed, 0);
        assert_eq!(grundstufe.completion_percentage, 0);
    }

    #[tokio::test]
    async fn overall_progress_matches_the_same_walk() {
        let server = setup();
        let student = create_test_student(&server).await;

        server
            .post(&format!("/api/students/{}/progress", student.id))
            .add_query_param("category", "fahrerassistenzsysteme")
            .add_query_param("subcategory", "bedienung")
            .add_query_param("item", "Bedienung der Fahrerassistenzsysteme")
            .json(&json!({ "status": "thrice" }))
            .await;

        let overall: ProgressStats = server
            .get(&format!("/api/students/{}/overall-progress", student.id))
            .await
            .json();
        let stats: std::collections::BTreeMap<String, ProgressStats> = server
            .get(&format!("/api/students/{}/progress-stats", student.id))
            .await
            .json();

        let summed: u32 = stats.values().map(|s| s.total_completed).sum();
        assert_eq!(overall.total_completed, summed);
        assert_eq!(overall.total_completed, 1);
        assert!(overall.completion_percentage <= 100);
    }

    #[tokio::test]
    async fn empty_progress_reports_zero_percent() {
        let server = setup();
        let student = create_test_student(&server).await;

        let overall: ProgressStats = server
            .get(&format!("/api/students/{}/overall-progress", student.id))
            .await
            .json();

        assert!(overall.total_items > 0);
        assert_eq!(overall.total_completed, 0);
        assert_eq!(overall.completion_percentage, 0);
    }
}

mod practice_hours {
    use super::*;

    #[tokio::test]
    async fn rejects_durations_other_than_half_and_full_hours() {
        let server = setup();

        let response = server
            .post("/api/practice-hours")
            .json(&json!({ "duration": 0.75 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logs_and_lists_practice_hours() {
        let server = setup();

        let created = server
            .post("/api/practice-hours")
            .json(&json!({ "duration": 0.5 }))
            .await;
        created.assert_status(StatusCode::CREATED);
        let hour: PracticeHour = created.json();
        assert_eq!(hour.duration, 0.5);

        let hours: Vec<PracticeHour> = server.get("/api/practice-hours").await.json();
        assert_eq!(hours.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_the_entry_or_404s() {
        let server = setup();

        let hour: PracticeHour = server
            .post("/api/practice-hours")
            .json(&json!({ "duration": 1.0 }))
            .await
            .json();

        let response = server
            .delete(&format!("/api/practice-hours/{}", hour.id))
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server
            .delete(&format!("/api/practice-hours/{}", hour.id))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();
        let response = server.get("/api/health").await;
        response.assert_status_ok();
    }
}
