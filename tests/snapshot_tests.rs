use chrono::NaiveDate;
use serde_json::Value;
use taskflow::snapshot::{export_file_name, ImportDocument, EXPORT_VERSION};
use taskflow::{MemoryStorage, Priority, TaskError, TaskStore};

fn seeded_store() -> TaskStore<MemoryStorage> {
    let mut store = TaskStore::open(MemoryStorage::new());
    let a = store.add("Pay rent", Priority::High, NaiveDate::from_ymd_opt(2026, 11, 1)).unwrap();
    store.add("Water plants", Priority::Low, None).unwrap();
    let c = store.add("Read book", Priority::Medium, None).unwrap();
    store.set_notes(c.id, "chapter 4").unwrap();
    store.toggle(a.id).unwrap();
    store
}

#[test]
fn test_export_document_shape() {
    let store = seeded_store();
    let doc = store.export_snapshot();
    assert_eq!(doc.version, EXPORT_VERSION);
    assert_eq!(doc.total_tasks, 3);
    assert_eq!(doc.completed_tasks, 1);

    let json: Value = serde_json::from_str(&doc.to_json()).unwrap();
    assert_eq!(json["version"], "1.0");
    assert_eq!(json["totalTasks"], 3);
    assert_eq!(json["completedTasks"], 1);
    assert!(json["exportDate"].as_str().unwrap().ends_with('Z'));

    let first = &json["tasks"][0];
    assert_eq!(first["text"], "Read book");
    assert_eq!(first["priority"], "medium");
    assert_eq!(first["deadline"], Value::Null);
    assert_eq!(first["notes"], "chapter 4");
    assert!(first["createdAt"].is_string());

    let last = &json["tasks"][2];
    assert_eq!(last["deadline"], "2026-11-01");
    assert_eq!(last["completed"], true);
}

#[test]
fn test_export_then_import_round_trip() {
    let source = seeded_store();
    let exported = source.export_snapshot().to_json();

    let mut target = TaskStore::open(MemoryStorage::new());
    let count = target.import_merge(&exported).unwrap();
    assert_eq!(count, 3);
    assert_eq!(target.tasks(), source.tasks());
}

#[test]
fn test_import_appends_after_existing_tasks() {
    let source = seeded_store();
    let exported = source.export_snapshot().to_json();

    let mut target = TaskStore::open(MemoryStorage::new());
    let mine = target.add("Mine", Priority::Medium, None).unwrap();
    target.import_merge(&exported).unwrap();

    assert_eq!(target.tasks().len(), 4);
    assert_eq!(target.tasks()[0].id, mine.id);
    assert_eq!(target.tasks()[1].text, "Read book");
}

#[test]
fn test_import_keeps_duplicate_ids_and_later_adds_stay_unique() {
    let mut store = seeded_store();
    let exported = store.export_snapshot().to_json();
    store.import_merge(&exported).unwrap();
    assert_eq!(store.tasks().len(), 6);

    let fresh = store.add("Fresh", Priority::Medium, None).unwrap();
    assert_eq!(store.tasks().iter().filter(|t| t.id == fresh.id).count(), 1);
}

#[test]
fn test_import_rejects_missing_tasks_array() {
    let mut store = seeded_store();
    let before = store.tasks().to_vec();

    for doc in [
        r#"{"version":"1.0"}"#,
        r#"{"tasks":{"id":1}}"#,
        r#"{"tasks":null}"#,
        r#"[{"id":1,"text":"bare array"}]"#,
        "not json at all",
    ] {
        match store.import_merge(doc) {
            Err(TaskError::InvalidFormat(_)) => {}
            other => panic!("expected InvalidFormat for {doc}, got {other:?}"),
        }
    }
    assert_eq!(store.tasks(), before.as_slice());
}

#[test]
fn test_import_rejects_non_object_records_without_partial_import() {
    let mut store = TaskStore::open(MemoryStorage::new());
    let doc = r#"{"tasks":[{"id":1,"text":"ok"}, 42]}"#;
    assert!(matches!(store.import_merge(doc), Err(TaskError::InvalidFormat(_))));
    assert!(store.tasks().is_empty());
}

#[test]
fn test_import_is_lenient_about_record_fields() {
    let doc = r#"{
        "exportDate": "2026-01-01T00:00:00.000Z",
        "somethingElse": true,
        "tasks": [
            {"id": 7, "text": "Minimal"},
            {"text": "No id", "priority": "urgent", "deadline": "soon"},
            {"id": 9, "text": "Full", "completed": true, "priority": "high",
             "deadline": "2026-02-03", "createdAt": "2026-01-01T10:00:00.000Z", "notes": "n"}
        ]
    }"#;
    let parsed = ImportDocument::parse(doc).unwrap();
    assert_eq!(parsed.len(), 3);

    let mut store = TaskStore::open(MemoryStorage::new());
    assert_eq!(store.merge(parsed), 3);

    let tasks = store.tasks();
    assert_eq!(tasks[0].id, 7);
    assert_eq!(tasks[0].priority, Priority::Medium);
    assert!(!tasks[0].completed);
    assert_eq!(tasks[0].notes, "");

    assert!(tasks[1].id > 9, "missing ids get a fresh one");
    assert_eq!(tasks[1].priority, Priority::Medium);
    assert_eq!(tasks[1].deadline, None);

    assert_eq!(tasks[2].id, 9);
    assert!(tasks[2].completed);
    assert_eq!(tasks[2].priority, Priority::High);
    assert_eq!(tasks[2].deadline, NaiveDate::from_ymd_opt(2026, 2, 3));
    assert_eq!(tasks[2].created_at.to_rfc3339(), "2026-01-01T10:00:00+00:00");
}

#[test]
fn test_import_minted_ids_clear_later_explicit_ids() {
    let doc = r#"{"tasks":[
        {"text": "no id"},
        {"id": 4000000000000, "text": "far future"},
        {"id": 4000000000001, "text": "farther"}
    ]}"#;
    let mut store = TaskStore::open(MemoryStorage::new());
    assert_eq!(store.import_merge(doc).unwrap(), 3);

    let ids: Vec<u64> = store.tasks().iter().map(|t| t.id).collect();
    assert_eq!(ids[1], 4_000_000_000_000);
    assert_eq!(ids[2], 4_000_000_000_001);
    assert!(ids[0] > 4_000_000_000_001, "minted id {} collides with the import", ids[0]);
}

#[test]
fn test_import_of_max_id_does_not_break_add() {
    let doc = r#"{"tasks":[{"id":18446744073709551615,"text":"big"}]}"#;
    let mut store = TaskStore::open(MemoryStorage::new());
    assert_eq!(store.import_merge(doc).unwrap(), 1);

    let next = store.add("next", Priority::Medium, None).unwrap();
    let after = store.add("after", Priority::Medium, None).unwrap();
    assert_ne!(next.id, u64::MAX);
    assert_ne!(after.id, u64::MAX);
    assert_ne!(next.id, after.id);
    assert_eq!(store.tasks().len(), 3);
}

#[test]
fn test_import_of_max_id_with_missing_ids() {
    let doc = r#"{"tasks":[{"text":"a"},{"id":18446744073709551615,"text":"big"},{"id":0,"text":"zero"}]}"#;
    let mut store = TaskStore::open(MemoryStorage::new());
    store.import_merge(doc).unwrap();

    let ids: Vec<u64> = store.tasks().iter().map(|t| t.id).collect();
    assert_eq!(ids[1..], [u64::MAX, 0]);
    assert!(ids[0] != u64::MAX && ids[0] != 0);
}

#[test]
fn test_export_file_name() {
    let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    assert_eq!(export_file_name(date), "taskflow_export_2026-10-18.json");
}
