//! Employee domain model.
//!
//! The manager relation is a back-reference by id. It is resolved through
//! the cache (`OrgCache::manager_of`) so that an employee never owns the
//! employee that manages them. Until the employee is inserted, a manager
//! given to [`Employee::new`] is held weakly and its id is read live, so the
//! manager may be saved after the report was built.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::id::UNSAVED_ID;
use super::role::RoleRef;

pub type EmployeeRef = Rc<Employee>;

#[derive(Debug)]
pub struct Employee {
    id: Cell<i64>,
    first_name: String,
    last_name: String,
    role: RefCell<RoleRef>,
    manager_id: Cell<Option<i64>>,
    pending_manager: RefCell<Option<Weak<Employee>>>,
}

impl Employee {
    /// Create an unsaved employee holding `role`, optionally reporting to
    /// `manager`.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: &RoleRef,
        manager: Option<&EmployeeRef>,
    ) -> EmployeeRef {
        let employee = Self::with_id(
            UNSAVED_ID,
            first_name,
            last_name,
            role,
            manager.map(|m| m.id()),
        );
        *employee.pending_manager.borrow_mut() = manager.map(Rc::downgrade);
        employee
    }

    pub(crate) fn with_id(
        id: i64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: &RoleRef,
        manager_id: Option<i64>,
    ) -> EmployeeRef {
        Rc::new(Self {
            id: Cell::new(id),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role: RefCell::new(Rc::clone(role)),
            manager_id: Cell::new(manager_id),
            pending_manager: RefCell::new(None),
        })
    }

    pub fn id(&self) -> i64 {
        self.id.get()
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn role(&self) -> RoleRef {
        Rc::clone(&self.role.borrow())
    }

    pub fn role_id(&self) -> i64 {
        self.role.borrow().id()
    }

    /// Id of the owning department, through the held role.
    pub fn department_id(&self) -> i64 {
        self.role.borrow().department_id()
    }

    pub fn manager_id(&self) -> Option<i64> {
        match self.pending_manager.borrow().as_ref().and_then(Weak::upgrade) {
            Some(manager) => Some(manager.id()),
            None => self.manager_id.get(),
        }
    }

    pub fn has_manager(&self) -> bool {
        self.manager_id().is_some()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.get() != UNSAVED_ID
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() {
            return Err("Employee first name cannot be empty".to_string());
        }
        if self.last_name.trim().is_empty() {
            return Err("Employee last name cannot be empty".to_string());
        }
        match self.manager_id() {
            Some(UNSAVED_ID) => {
                return Err(format!("Manager of {} has not been saved", self.full_name()));
            }
            Some(id) if self.is_persisted() && id == self.id() => {
                return Err(format!("Employee {} cannot be their own manager", self.id()));
            }
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn assign_id(&self, id: i64) {
        self.id.set(id);
    }

    pub(crate) fn set_role(&self, role: RoleRef) {
        *self.role.borrow_mut() = role;
    }

    pub(crate) fn set_manager_id(&self, manager_id: Option<i64>) {
        self.pending_manager.borrow_mut().take();
        self.manager_id.set(manager_id);
    }

    /// Replace the weak manager link with the manager's current id.
    pub(crate) fn pin_manager(&self) {
        self.set_manager_id(self.manager_id());
    }
}
