//! Role domain model.

use std::cell::Cell;
use std::rc::Rc;

use super::department::DepartmentRef;
use super::id::UNSAVED_ID;

pub type RoleRef = Rc<Role>;

/// A job title with a salary, owned by exactly one department.
#[derive(Debug)]
pub struct Role {
    id: Cell<i64>,
    title: String,
    salary: f64,
    department: DepartmentRef,
}

impl Role {
    /// Create an unsaved role in the given department.
    pub fn new(title: impl Into<String>, salary: f64, department: &DepartmentRef) -> RoleRef {
        Self::with_id(UNSAVED_ID, title, salary, department)
    }

    pub(crate) fn with_id(
        id: i64,
        title: impl Into<String>,
        salary: f64,
        department: &DepartmentRef,
    ) -> RoleRef {
        Rc::new(Self {
            id: Cell::new(id),
            title: title.into(),
            salary,
            department: Rc::clone(department),
        })
    }

    pub fn id(&self) -> i64 {
        self.id.get()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn salary(&self) -> f64 {
        self.salary
    }

    pub fn department(&self) -> &DepartmentRef {
        &self.department
    }

    /// Id of the owning department, read through the held reference.
    pub fn department_id(&self) -> i64 {
        self.department.id()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.get() != UNSAVED_ID
    }

    /// Validate fields before the role is written to the store.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Role title cannot be empty".to_string());
        }
        if !self.salary.is_finite() || self.salary < 0.0 {
            return Err(format!("Role salary must be a non-negative number, got {}", self.salary));
        }
        Ok(())
    }

    pub(crate) fn assign_id(&self, id: i64) {
        self.id.set(id);
    }
}
