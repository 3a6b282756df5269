//! Department domain model.

use std::cell::Cell;
use std::rc::Rc;

use super::id::UNSAVED_ID;

/// Shared handle to a department. The cache and its callers hold the same
/// allocation, so identity is `Rc::ptr_eq`, never field equality.
pub type DepartmentRef = Rc<Department>;

#[derive(Debug)]
pub struct Department {
    id: Cell<i64>,
    name: String,
}

impl Department {
    /// Create an unsaved department carrying the placeholder id.
    pub fn new(name: impl Into<String>) -> DepartmentRef {
        Self::with_id(UNSAVED_ID, name)
    }

    pub(crate) fn with_id(id: i64, name: impl Into<String>) -> DepartmentRef {
        Rc::new(Self {
            id: Cell::new(id),
            name: name.into(),
        })
    }

    pub fn id(&self) -> i64 {
        self.id.get()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the store has assigned this department an id.
    pub fn is_persisted(&self) -> bool {
        self.id.get() != UNSAVED_ID
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Department name cannot be empty".to_string());
        }
        Ok(())
    }

    pub(crate) fn assign_id(&self, id: i64) {
        self.id.set(id);
    }
}
