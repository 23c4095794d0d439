use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use chrono::NaiveDate;
use taskflow::storage::{save_tasks, KeyValueStore, MemoryStorage, TASKS_KEY};
use taskflow::StorageError;
use taskflow::{Filter, Priority, Stats, StoreEvent, TaskError, TaskStore};

fn new_store() -> TaskStore<MemoryStorage> {
    TaskStore::open(MemoryStorage::new())
}

fn ids(store: &TaskStore<MemoryStorage>) -> Vec<u64> {
    store.tasks().iter().map(|t| t.id).collect()
}

#[test]
fn test_add_inserts_at_front_with_unique_ids() {
    let mut store = new_store();
    let mut seen = HashSet::new();
    for i in 0..50 {
        let task = store.add(&format!("Task {}", i), Priority::Medium, None).unwrap();
        assert!(!task.completed);
        assert!(seen.insert(task.id), "duplicate id {}", task.id);
        assert_eq!(store.tasks()[0].id, task.id);
    }
    assert_eq!(store.tasks().len(), 50);
    // Newest first, so ids are strictly decreasing down the list.
    assert!(ids(&store).windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn test_add_trims_and_sets_defaults() {
    let mut store = new_store();
    let deadline = NaiveDate::from_ymd_opt(2026, 12, 1);
    let task = store.add("  Write report  ", Priority::High, deadline).unwrap();
    assert_eq!(task.text, "Write report");
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.deadline, deadline);
    assert_eq!(task.notes, "");
}

#[test]
fn test_add_rejects_blank_text() {
    let mut store = new_store();
    store.add("keep", Priority::Low, None).unwrap();
    assert_eq!(store.add("", Priority::Medium, None), Err(TaskError::EmptyText));
    assert_eq!(store.add("   ", Priority::Medium, None), Err(TaskError::EmptyText));
    assert_eq!(store.tasks().len(), 1);
}

#[test]
fn test_toggle_twice_and_completion_signal() {
    let mut store = new_store();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    store.subscribe(move |e| sink.borrow_mut().push(e.clone()));

    let task = store.add("Ship it", Priority::Medium, None).unwrap();

    assert!(store.toggle(task.id).unwrap().completed);
    assert_eq!(events.borrow().len(), 1);
    assert_eq!(
        events.borrow()[0],
        StoreEvent::TaskCompleted { id: task.id, text: "Ship it".into() }
    );

    assert!(!store.toggle(task.id).unwrap().completed);
    assert_eq!(events.borrow().len(), 1, "reopening must not signal completion");

    assert_eq!(store.toggle(42), Err(TaskError::NotFound(42)));
}

#[test]
fn test_delete_and_field_setters() {
    let mut store = new_store();
    let a = store.add("A", Priority::Medium, None).unwrap();
    let b = store.add("B", Priority::Medium, None).unwrap();

    let date = NaiveDate::from_ymd_opt(2027, 1, 15).unwrap();
    store.set_priority(a.id, Priority::Low).unwrap();
    store.set_deadline(a.id, Some(date)).unwrap();
    store.set_notes(a.id, "call Bob").unwrap();
    store.set_text(a.id, " A2 ").unwrap();

    let a_now = store.get(a.id).unwrap();
    assert_eq!(a_now.priority, Priority::Low);
    assert_eq!(a_now.deadline, Some(date));
    assert_eq!(a_now.notes, "call Bob");
    assert_eq!(a_now.text, "A2");
    assert_eq!(a_now.created_at, a.created_at);

    assert_eq!(store.set_text(a.id, "  "), Err(TaskError::EmptyText));
    assert_eq!(store.get(a.id).unwrap().text, "A2");

    store.set_deadline(a.id, None).unwrap();
    assert_eq!(store.get(a.id).unwrap().deadline, None);

    store.delete(b.id).unwrap();
    assert_eq!(ids(&store), vec![a.id]);
    assert_eq!(store.delete(b.id), Err(TaskError::NotFound(b.id)));
    assert_eq!(store.set_notes(b.id, "x"), Err(TaskError::NotFound(b.id)));
    assert_eq!(store.set_priority(b.id, Priority::High), Err(TaskError::NotFound(b.id)));
    assert_eq!(store.set_deadline(b.id, None), Err(TaskError::NotFound(b.id)));
}

#[test]
fn test_reorder_is_a_self_inverse_swap() {
    let mut store = new_store();
    for name in ["one", "two", "three", "four"] {
        store.add(name, Priority::Medium, None).unwrap();
    }
    let original = ids(&store);
    let (a, b) = (original[0], original[3]);

    store.reorder(a, b).unwrap();
    assert_eq!(ids(&store), vec![original[3], original[1], original[2], original[0]]);

    store.reorder(a, b).unwrap();
    assert_eq!(ids(&store), original);

    assert_eq!(store.reorder(a, 7), Err(TaskError::NotFound(7)));
    assert_eq!(ids(&store), original);
}

#[test]
fn test_clear_completed() {
    let mut store = new_store();
    let a = store.add("a", Priority::Medium, None).unwrap();
    let b = store.add("b", Priority::Medium, None).unwrap();
    let c = store.add("c", Priority::Medium, None).unwrap();
    store.toggle(a.id).unwrap();
    store.toggle(c.id).unwrap();

    assert_eq!(store.clear_completed(), 2);
    assert_eq!(ids(&store), vec![b.id]);
    assert_eq!(store.clear_completed(), 0);
}

#[test]
fn test_query_filter_and_search_compose() {
    let mut store = new_store();
    let groceries = store.add("Buy FOOD", Priority::Medium, None).unwrap();
    let cook = store.add("Cook dinner", Priority::Medium, None).unwrap();
    let report = store.add("Write report", Priority::Medium, None).unwrap();
    store.set_notes(cook.id, "need food first").unwrap();
    store.toggle(groceries.id).unwrap();

    store.set_filter(Filter::Completed);
    let done: Vec<u64> = store.query().iter().map(|t| t.id).collect();
    assert_eq!(done, vec![groceries.id]);

    store.set_filter(Filter::Active);
    let active: Vec<u64> = store.query().iter().map(|t| t.id).collect();
    assert_eq!(active, vec![report.id, cook.id]);

    store.set_filter(Filter::All);
    store.set_search("food");
    let found: Vec<u64> = store.query().iter().map(|t| t.id).collect();
    assert_eq!(found, vec![cook.id, groceries.id]);

    store.set_filter(Filter::Active);
    let found: Vec<u64> = store.query().iter().map(|t| t.id).collect();
    assert_eq!(found, vec![cook.id]);

    store.set_search("   ");
    assert_eq!(store.query().len(), 2);
}

#[test]
fn test_stats() {
    let mut store = new_store();
    assert_eq!(store.stats(), Stats { total: 0, completed: 0, percentage: 0 });

    let a = store.add("a", Priority::Medium, None).unwrap();
    store.add("b", Priority::Medium, None).unwrap();
    store.add("c", Priority::Medium, None).unwrap();
    store.toggle(a.id).unwrap();
    assert_eq!(store.stats(), Stats { total: 3, completed: 1, percentage: 33 });

    store.set_filter(Filter::Completed);
    assert_eq!(store.stats().total, 3, "stats ignore the filter");
}

#[test]
fn test_query_state_is_not_persisted() {
    let mut store = new_store();
    store.add("a", Priority::Medium, None).unwrap();
    store.set_filter(Filter::Completed);
    store.set_search("zzz");

    let reopened = TaskStore::open(store.storage().clone());
    assert_eq!(reopened.filter(), Filter::All);
    assert_eq!(reopened.search(), "");
    assert_eq!(reopened.query().len(), 1);
}

#[test]
fn test_every_mutation_is_persisted() {
    let mut store = new_store();
    let a = store.add("a", Priority::Medium, None).unwrap();
    store.add("b", Priority::Medium, None).unwrap();
    store.toggle(a.id).unwrap();
    store.set_notes(a.id, "noted").unwrap();

    let reopened = TaskStore::open(store.storage().clone());
    assert_eq!(reopened.tasks(), store.tasks());
}

#[test]
fn test_malformed_storage_loads_empty() {
    let mut storage = MemoryStorage::new();
    storage.set(TASKS_KEY, "{ not json").unwrap();
    let store = TaskStore::open(storage);
    assert!(store.tasks().is_empty());
}

#[test]
fn test_ids_stay_ahead_of_loaded_tasks() {
    let mut seed = new_store();
    let first = seed.add("first", Priority::Medium, None).unwrap();
    let mut far_future = first.clone();
    far_future.id = u64::MAX / 2;

    let mut storage = MemoryStorage::new();
    save_tasks(&mut storage, &[far_future]).unwrap();
    let mut store = TaskStore::open(storage);
    let next = store.add("next", Priority::Medium, None).unwrap();
    assert_eq!(next.id, u64::MAX / 2 + 1);
}

/// Reads nothing and refuses every write.
struct ReadOnlyStorage;

impl KeyValueStore for ReadOnlyStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
    }
}

#[test]
fn test_failed_saves_keep_in_memory_changes() {
    let mut store = TaskStore::open(ReadOnlyStorage);
    let a = store.add("a", Priority::Medium, None).unwrap();
    let b = store.add("b", Priority::High, None).unwrap();
    assert_eq!(store.tasks().len(), 2);

    assert!(store.toggle(a.id).unwrap().completed);
    assert!(store.get(a.id).unwrap().completed);

    store.set_notes(b.id, "kept").unwrap();
    assert_eq!(store.get(b.id).unwrap().notes, "kept");

    store.delete(b.id).unwrap();
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.clear_completed(), 1);
    assert!(store.tasks().is_empty());
}

#[test]
fn test_unknown_ids_and_self_swap() {
    let mut store = new_store();
    let a = store.add("a", Priority::Medium, None).unwrap();
    let b = store.add("b", Priority::Medium, None).unwrap();
    let before = ids(&store);

    assert_eq!(store.toggle(999), Err(TaskError::NotFound(999)));
    assert_eq!(store.set_text(999, "x"), Err(TaskError::NotFound(999)));
    assert_eq!(store.set_text(999, "  "), Err(TaskError::NotFound(999)));

    store.reorder(a.id, a.id).unwrap();
    assert_eq!(ids(&store), before);
    assert_eq!(store.reorder(999, 999), Err(TaskError::NotFound(999)));
    assert_eq!(store.get(b.id).unwrap().text, "b");
}
