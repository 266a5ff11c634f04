//! Key/value persistence consumed by the task list.
//!
//! Values are opaque strings. The task list serializes each collection to a
//! JSON array and stores it under a fixed key (see [`collections`]).

pub mod collections;
pub mod json_store;
pub mod memory;

use crate::error::AppError;

pub use json_store::JsonFileStore;
pub use memory::MemoryStore;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError>;

    fn remove(&mut self, key: &str) -> Result<(), AppError>;

    /// Applies every write and removal as one unit. Stores that can commit
    /// atomically override this; the default applies them in order.
    fn commit(&mut self, writes: &[(&str, String)], removals: &[&str]) -> Result<(), AppError> {
        for (key, value) in writes {
            self.set(key, value)?;
        }
        for key in removals {
            self.remove(key)?;
        }
        Ok(())
    }
}
