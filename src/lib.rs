//! TaskFlow - a local task list engine with CLI and terminal UI front-ends.

pub mod commands;
pub mod deadline;
pub mod error;
pub mod models;
pub mod share;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod theme;
pub mod tui;

pub use error::{StorageError, TaskError};
pub use models::{Filter, Priority, Stats, Task};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use store::{StoreEvent, TaskStore};
pub use theme::Theme;
