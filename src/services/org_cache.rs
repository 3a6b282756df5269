//! Write-through cache of the organization tables.
//!
//! `OrgCache` mirrors `departments_table`, `roles_table` and
//! `employees_table` in memory. Reads are served from the mirrors only.
//! Every mutation is persisted through the gateway first and applied to the
//! mirrors second, so a failed statement leaves both sides untouched.
//!
//! Deletes cascade department → roles → employees, and removing an employee
//! clears the manager of everyone who reported to them. The store applies
//! the same rules through its foreign keys.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AsEntityId, Department, DepartmentRef, Employee, EmployeeRef, Role, RoleRef,
};
use crate::domain::ports::{PersistenceGateway, SqlValue};

const INSERT_DEPARTMENT: &str = "INSERT INTO departments_table(name) VALUES (?);";
const INSERT_ROLE: &str = "INSERT INTO roles_table(title, salary, department_id) VALUES (?, ?, ?);";
const INSERT_EMPLOYEE: &str =
    "INSERT INTO employees_table(first_name, last_name, role_id, manager_id) VALUES (?, ?, ?, ?);";
const UPDATE_EMPLOYEE_ROLE: &str = "UPDATE employees_table SET role_id = ? WHERE id = ?;";
const UPDATE_EMPLOYEE_MANAGER: &str = "UPDATE employees_table SET manager_id = ? WHERE id = ?;";
const DELETE_DEPARTMENT: &str = "DELETE FROM departments_table WHERE id = ?;";
const DELETE_ROLE: &str = "DELETE FROM roles_table WHERE id = ?;";
const DELETE_EMPLOYEE: &str = "DELETE FROM employees_table WHERE id = ?;";
const SELECT_DEPARTMENTS: &str = "SELECT id, name FROM departments_table;";
const SELECT_ROLES: &str = "SELECT id, title, salary, department_id FROM roles_table;";
const SELECT_EMPLOYEES: &str =
    "SELECT id, first_name, last_name, role_id, manager_id FROM employees_table;";

/// Lifecycle of the cache and its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    NotStarted,
    Starting,
    Started,
    Closed,
}

impl CacheState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Starting => "starting",
            Self::Started => "started",
            Self::Closed => "closed",
        }
    }
}

/// In-memory mirror of the organization, synchronized with a
/// [`PersistenceGateway`].
pub struct OrgCache<G: PersistenceGateway> {
    gateway: G,
    state: CacheState,
    departments: Vec<DepartmentRef>,
    roles: Vec<RoleRef>,
    employees: Vec<EmployeeRef>,
}

impl<G: PersistenceGateway> OrgCache<G> {
    /// Wrap a gateway. Nothing is loaded until [`OrgCache::start`].
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: CacheState::NotStarted,
            departments: Vec::new(),
            roles: Vec::new(),
            employees: Vec::new(),
        }
    }

    // Lifecycle

    /// Open the connection, bootstrap the schema and load every table.
    ///
    /// Starting a started cache is rejected. A failed start closes the
    /// connection again so the cache can be started later.
    pub async fn start(&mut self) -> DomainResult<()> {
        if self.state == CacheState::Started {
            return Err(DomainError::AlreadyStarted);
        }

        info!("starting organization cache");
        self.state = CacheState::Starting;

        if let Err(err) = self.open_and_load().await {
            warn!(error = %err, "organization cache failed to start");
            self.gateway.close().await;
            self.state = CacheState::Closed;
            return Err(err);
        }

        self.state = CacheState::Started;
        info!(
            departments = self.departments.len(),
            roles = self.roles.len(),
            employees = self.employees.len(),
            "organization cache started"
        );
        Ok(())
    }

    async fn open_and_load(&mut self) -> DomainResult<()> {
        self.gateway.open().await?;
        self.gateway.bootstrap().await?;
        self.refresh_caches().await
    }

    /// Close the connection. The mirrors keep their last contents but are
    /// stale until the next start.
    pub async fn close(&mut self) {
        self.gateway.close().await;
        self.state = CacheState::Closed;
        info!("organization cache closed");
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state != CacheState::Started
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    // Collections

    pub fn departments(&self) -> Vec<DepartmentRef> {
        self.departments.clone()
    }

    pub fn roles(&self) -> Vec<RoleRef> {
        self.roles.clone()
    }

    pub fn employees(&self) -> Vec<EmployeeRef> {
        self.employees.clone()
    }

    // Lookups

    pub fn get_department_by_id(&self, id: impl AsEntityId) -> Option<DepartmentRef> {
        let id = id.as_entity_id()?;
        self.departments.iter().find(|d| d.id() == id).cloned()
    }

    pub fn get_role_by_id(&self, id: impl AsEntityId) -> Option<RoleRef> {
        let id = id.as_entity_id()?;
        self.roles.iter().find(|r| r.id() == id).cloned()
    }

    pub fn get_employee_by_id(&self, id: impl AsEntityId) -> Option<EmployeeRef> {
        let id = id.as_entity_id()?;
        self.employees.iter().find(|e| e.id() == id).cloned()
    }

    /// Resolve an employee's manager back-reference through the cache.
    pub fn manager_of(&self, employee: &Employee) -> Option<EmployeeRef> {
        self.get_employee_by_id(employee.manager_id()?)
    }

    // Relational queries

    pub fn get_roles_by_department(&self, department: &Department) -> Vec<RoleRef> {
        self.get_roles_by_department_id(department.id())
    }

    pub fn get_roles_by_department_id(&self, id: impl AsEntityId) -> Vec<RoleRef> {
        let Some(id) = id.as_entity_id() else {
            return Vec::new();
        };
        self.roles
            .iter()
            .filter(|r| r.department_id() == id)
            .cloned()
            .collect()
    }

    pub fn get_employees_by_department(&self, department: &Department) -> Vec<EmployeeRef> {
        self.get_employees_by_department_id(department.id())
    }

    pub fn get_employees_by_department_id(&self, id: impl AsEntityId) -> Vec<EmployeeRef> {
        let Some(id) = id.as_entity_id() else {
            return Vec::new();
        };
        self.employees
            .iter()
            .filter(|e| e.department_id() == id)
            .cloned()
            .collect()
    }

    pub fn get_employees_by_role(&self, role: &Role) -> Vec<EmployeeRef> {
        self.get_employees_by_role_id(role.id())
    }

    pub fn get_employees_by_role_id(&self, id: impl AsEntityId) -> Vec<EmployeeRef> {
        let Some(id) = id.as_entity_id() else {
            return Vec::new();
        };
        self.employees
            .iter()
            .filter(|e| e.role_id() == id)
            .cloned()
            .collect()
    }

    /// Direct reports of `manager`.
    pub fn get_employees_by_manager(&self, manager: &Employee) -> Vec<EmployeeRef> {
        self.get_employees_by_manager_id(manager.id())
    }

    pub fn get_employees_by_manager_id(&self, id: impl AsEntityId) -> Vec<EmployeeRef> {
        let Some(id) = id.as_entity_id() else {
            return Vec::new();
        };
        self.employees
            .iter()
            .filter(|e| e.manager_id() == Some(id))
            .cloned()
            .collect()
    }

    /// Total salary of every employee holding a role in `department`.
    pub fn department_budget(&self, department: &Department) -> f64 {
        self.get_employees_by_department(department)
            .iter()
            .map(|e| e.role().salary())
            .sum()
    }

    // Add

    /// Insert `department` and cache the same handle under its new id.
    pub async fn add_department(&mut self, department: &DepartmentRef) -> DomainResult<()> {
        ensure_unsaved("Department", department.id(), department.is_persisted())?;
        department.validate().map_err(DomainError::ValidationFailed)?;

        let result = self
            .gateway
            .execute(INSERT_DEPARTMENT, &[department.name().into()])
            .await?;

        department.assign_id(result.insert_id);
        self.departments.push(Rc::clone(department));
        debug!(id = department.id(), name = department.name(), "department added");
        Ok(())
    }

    pub async fn add_role(&mut self, role: &RoleRef) -> DomainResult<()> {
        ensure_unsaved("Role", role.id(), role.is_persisted())?;
        role.validate().map_err(DomainError::ValidationFailed)?;

        let params: [SqlValue; 3] = [
            role.title().into(),
            role.salary().into(),
            role.department_id().into(),
        ];
        let result = self.gateway.execute(INSERT_ROLE, &params).await?;

        role.assign_id(result.insert_id);
        self.roles.push(Rc::clone(role));
        debug!(id = role.id(), department_id = role.department_id(), "role added");
        Ok(())
    }

    pub async fn add_employee(&mut self, employee: &EmployeeRef) -> DomainResult<()> {
        ensure_unsaved("Employee", employee.id(), employee.is_persisted())?;
        employee.validate().map_err(DomainError::ValidationFailed)?;

        let params: [SqlValue; 4] = [
            employee.first_name().into(),
            employee.last_name().into(),
            employee.role_id().into(),
            employee.manager_id().into(),
        ];
        let result = self.gateway.execute(INSERT_EMPLOYEE, &params).await?;

        employee.assign_id(result.insert_id);
        employee.pin_manager();
        self.employees.push(Rc::clone(employee));
        debug!(
            id = employee.id(),
            role_id = employee.role_id(),
            manager_id = ?employee.manager_id(),
            "employee added"
        );
        Ok(())
    }

    // Update

    /// Give `employee` a new role. Last writer wins.
    pub async fn update_employee_role(&mut self, employee: &Employee, role: &RoleRef) -> DomainResult<()> {
        self.gateway
            .execute(UPDATE_EMPLOYEE_ROLE, &[role.id().into(), employee.id().into()])
            .await?;

        employee.set_role(Rc::clone(role));
        debug!(id = employee.id(), role_id = role.id(), "employee role updated");
        Ok(())
    }

    /// Assign or clear `employee`'s manager. Self-management is rejected;
    /// longer cycles are not checked.
    pub async fn update_employee_manager(
        &mut self,
        employee: &Employee,
        manager: Option<&EmployeeRef>,
    ) -> DomainResult<()> {
        if let Some(manager) = manager {
            if std::ptr::eq(Rc::as_ptr(manager), employee) || manager.id() == employee.id() {
                return Err(DomainError::SelfManagement(employee.id()));
            }
        }

        let manager_id = manager.map(|m| m.id());
        self.gateway
            .execute(UPDATE_EMPLOYEE_MANAGER, &[manager_id.into(), employee.id().into()])
            .await?;

        employee.set_manager_id(manager_id);
        debug!(id = employee.id(), manager_id = ?manager_id, "employee manager updated");
        Ok(())
    }

    // Delete

    /// Delete `department`, its roles and every employee holding them.
    pub async fn delete_department(&mut self, department: &Department) -> DomainResult<()> {
        let id = department.id();
        self.gateway.execute(DELETE_DEPARTMENT, &[id.into()]).await?;

        let removed_roles: HashSet<i64> = self
            .roles
            .iter()
            .filter(|r| r.department_id() == id)
            .map(|r| r.id())
            .collect();
        let removed_employees = self.employee_ids_holding(&removed_roles);

        self.departments.retain(|d| d.id() != id);
        self.roles.retain(|r| !removed_roles.contains(&r.id()));
        let repaired = self.remove_employees(&removed_employees);

        info!(
            id,
            roles = removed_roles.len(),
            employees = removed_employees.len(),
            managers_cleared = repaired,
            "department deleted"
        );
        Ok(())
    }

    /// Delete `role` and every employee holding it.
    pub async fn delete_role(&mut self, role: &Role) -> DomainResult<()> {
        let id = role.id();
        self.gateway.execute(DELETE_ROLE, &[id.into()]).await?;

        let removed_employees = self.employee_ids_holding(&HashSet::from([id]));
        self.roles.retain(|r| r.id() != id);
        let repaired = self.remove_employees(&removed_employees);

        info!(
            id,
            employees = removed_employees.len(),
            managers_cleared = repaired,
            "role deleted"
        );
        Ok(())
    }

    /// Delete `employee`; their direct reports lose their manager.
    pub async fn delete_employee(&mut self, employee: &Employee) -> DomainResult<()> {
        let id = employee.id();
        self.gateway.execute(DELETE_EMPLOYEE, &[id.into()]).await?;

        let repaired = self.remove_employees(&HashSet::from([id]));
        info!(id, managers_cleared = repaired, "employee deleted");
        Ok(())
    }

    /// Delete the cached department with `id`. Returns `None` without
    /// touching the store when no such department is cached.
    pub async fn delete_department_by_id(&mut self, id: impl AsEntityId) -> DomainResult<Option<DepartmentRef>> {
        let Some(department) = self.get_department_by_id(id) else {
            return Ok(None);
        };
        self.delete_department(&department).await?;
        Ok(Some(department))
    }

    pub async fn delete_role_by_id(&mut self, id: impl AsEntityId) -> DomainResult<Option<RoleRef>> {
        let Some(role) = self.get_role_by_id(id) else {
            return Ok(None);
        };
        self.delete_role(&role).await?;
        Ok(Some(role))
    }

    pub async fn delete_employee_by_id(&mut self, id: impl AsEntityId) -> DomainResult<Option<EmployeeRef>> {
        let Some(employee) = self.get_employee_by_id(id) else {
            return Ok(None);
        };
        self.delete_employee(&employee).await?;
        Ok(Some(employee))
    }

    fn employee_ids_holding(&self, role_ids: &HashSet<i64>) -> HashSet<i64> {
        self.employees
            .iter()
            .filter(|e| role_ids.contains(&e.role_id()))
            .map(|e| e.id())
            .collect()
    }

    /// Drop every employee in `removed` and clear manager references that
    /// pointed at them, visiting the collection once. Returns how many
    /// managers were cleared.
    fn remove_employees(&mut self, removed: &HashSet<i64>) -> usize {
        let mut repaired = 0;
        self.employees.retain(|employee| {
            if removed.contains(&employee.id()) {
                return false;
            }
            if employee.manager_id().is_some_and(|m| removed.contains(&m)) {
                employee.set_manager_id(None);
                repaired += 1;
            }
            true
        });
        repaired
    }

    // Refresh

    /// Reload all three tables. Departments must be loaded before roles and
    /// roles before employees, since each resolves against the previous.
    pub async fn refresh_caches(&mut self) -> DomainResult<()> {
        self.refresh_departments_cache().await?;
        self.refresh_roles_cache().await?;
        self.refresh_employees_cache().await?;
        Ok(())
    }

    pub async fn refresh_departments_cache(&mut self) -> DomainResult<Vec<DepartmentRef>> {
        let rows = self.gateway.query(SELECT_DEPARTMENTS).await?;

        self.departments = rows
            .iter()
            .map(|row| -> DomainResult<DepartmentRef> {
                Ok(Department::with_id(row.get_i64("id")?, row.get_string("name")?))
            })
            .collect::<DomainResult<_>>()?;

        debug!(count = self.departments.len(), "departments cache refreshed");
        Ok(self.departments())
    }

    /// Reload roles, resolving each against the department cache. Rows
    /// whose department is not cached are skipped.
    pub async fn refresh_roles_cache(&mut self) -> DomainResult<Vec<RoleRef>> {
        let rows = self.gateway.query(SELECT_ROLES).await?;

        let mut roles = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = row.get_i64("id")?;
            let department_id = row.get_i64("department_id")?;
            let Some(department) = self.get_department_by_id(department_id) else {
                warn!(id, department_id, "skipping role with unknown department");
                continue;
            };
            roles.push(Role::with_id(
                id,
                row.get_string("title")?,
                row.get_f64("salary")?,
                &department,
            ));
        }

        self.roles = roles;
        debug!(count = self.roles.len(), "roles cache refreshed");
        Ok(self.roles())
    }

    /// Reload employees with two-pass manager linking.
    ///
    /// Rows are not ordered by hierarchy, so a manager may appear after
    /// their reports. Pass 1 materializes every employee with no manager and
    /// indexes them by id; pass 2 resolves each stored `manager_id` against
    /// that index. Zero, NULL, self and unknown ids resolve to no manager.
    pub async fn refresh_employees_cache(&mut self) -> DomainResult<Vec<EmployeeRef>> {
        let rows = self.gateway.query(SELECT_EMPLOYEES).await?;

        let mut pending = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = row.get_i64("id")?;
            let role_id = row.get_i64("role_id")?;
            let Some(role) = self.get_role_by_id(role_id) else {
                warn!(id, role_id, "skipping employee with unknown role");
                continue;
            };
            let employee = Employee::with_id(
                id,
                row.get_string("first_name")?,
                row.get_string("last_name")?,
                &role,
                None,
            );
            pending.push((employee, row.get_optional_i64("manager_id")?));
        }

        let by_id: HashMap<i64, EmployeeRef> = pending
            .iter()
            .map(|(employee, _)| (employee.id(), Rc::clone(employee)))
            .collect();

        for (employee, stored_manager_id) in &pending {
            let Some(manager_id) = stored_manager_id.filter(|&m| m != 0) else {
                continue;
            };
            match by_id.get(&manager_id) {
                Some(manager) if !Rc::ptr_eq(manager, employee) => {
                    employee.set_manager_id(Some(manager.id()));
                }
                _ => warn!(id = employee.id(), manager_id, "ignoring unresolvable manager"),
            }
        }

        self.employees = pending.into_iter().map(|(employee, _)| employee).collect();
        debug!(count = self.employees.len(), "employees cache refreshed");
        Ok(self.employees())
    }
}

fn ensure_unsaved(entity: &'static str, id: i64, persisted: bool) -> DomainResult<()> {
    if persisted {
        return Err(DomainError::AlreadyPersisted { entity, id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::SqliteGateway;
    use crate::domain::ports::{ExecuteResult, Row};
    use async_trait::async_trait;

    async fn started_cache() -> OrgCache<SqliteGateway> {
        let mut cache = OrgCache::new(SqliteGateway::in_memory());
        cache.start().await.expect("failed to start cache");
        cache
    }

    async fn seed(cache: &mut OrgCache<SqliteGateway>) -> (DepartmentRef, RoleRef, EmployeeRef) {
        let department = Department::new("Engineering");
        cache.add_department(&department).await.unwrap();
        let role = Role::new("Engineer", 120_000.0, &department);
        cache.add_role(&role).await.unwrap();
        let employee = Employee::new("Ada", "Lovelace", &role, None);
        cache.add_employee(&employee).await.unwrap();
        (department, role, employee)
    }

    /// Gateway whose statements always fail, for persist-first checks.
    struct FailingGateway;

    #[async_trait]
    impl PersistenceGateway for FailingGateway {
        async fn open(&mut self) -> DomainResult<()> {
            Ok(())
        }

        async fn bootstrap(&self) -> DomainResult<()> {
            Ok(())
        }

        async fn execute(&self, _: &str, _: &[SqlValue]) -> DomainResult<ExecuteResult> {
            Err(DomainError::DatabaseError("disk I/O error".to_string()))
        }

        async fn query(&self, _: &str) -> DomainResult<Vec<Row>> {
            Ok(Vec::new())
        }

        async fn close(&mut self) {}

        fn is_open(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let mut cache = OrgCache::new(SqliteGateway::in_memory());
        assert_eq!(cache.state(), CacheState::NotStarted);
        assert!(cache.is_closed());

        cache.start().await.unwrap();
        assert_eq!(cache.state(), CacheState::Started);
        assert!(!cache.is_closed());
        assert!(cache.gateway().is_open());

        assert!(matches!(cache.start().await, Err(DomainError::AlreadyStarted)));

        cache.close().await;
        assert_eq!(cache.state(), CacheState::Closed);
        assert!(!cache.gateway().is_open());

        cache.start().await.expect("restart after close should succeed");
        assert_eq!(cache.state(), CacheState::Started);
    }

    #[tokio::test]
    async fn test_add_assigns_store_id_to_same_handle() {
        let mut cache = started_cache().await;
        let department = Department::new("Sales");

        cache.add_department(&department).await.unwrap();

        assert!(department.is_persisted());
        let found = cache.get_department_by_id(department.id()).unwrap();
        assert!(Rc::ptr_eq(&found, &department));
        assert_eq!(cache.departments().len(), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_persisted_entity() {
        let mut cache = started_cache().await;
        let (department, ..) = seed(&mut cache).await;

        let result = cache.add_department(&department).await;
        assert!(matches!(result, Err(DomainError::AlreadyPersisted { entity: "Department", .. })));
        assert_eq!(cache.departments().len(), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_role() {
        let mut cache = started_cache().await;
        let (department, ..) = seed(&mut cache).await;

        let role = Role::new("Intern", -5.0, &department);
        assert!(matches!(cache.add_role(&role).await, Err(DomainError::ValidationFailed(_))));
        assert!(!role.is_persisted());
        assert_eq!(cache.roles().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_normalizes_ids() {
        let mut cache = started_cache().await;
        let (_, _, employee) = seed(&mut cache).await;
        let text_id = employee.id().to_string();

        assert!(cache.get_employee_by_id(text_id.as_str()).is_some());
        assert!(cache.get_employee_by_id(&text_id).is_some());
        assert!(cache.get_employee_by_id("not a number").is_none());
        assert!(cache.get_employee_by_id(9_999_u32).is_none());
    }

    #[tokio::test]
    async fn test_relational_queries_return_fresh_lists() {
        let mut cache = started_cache().await;
        let (department, role, employee) = seed(&mut cache).await;

        let mut roles = cache.get_roles_by_department(&department);
        roles.clear();
        assert_eq!(cache.get_roles_by_department(&department).len(), 1);

        let by_role = cache.get_employees_by_role(&role);
        assert!(Rc::ptr_eq(&by_role[0], &employee));
        let by_department = cache.get_employees_by_department_id(department.id());
        assert!(Rc::ptr_eq(&by_department[0], &employee));
    }

    #[tokio::test]
    async fn test_update_employee_role_mutates_in_place() {
        let mut cache = started_cache().await;
        let (department, _, employee) = seed(&mut cache).await;
        let lead = Role::new("Lead", 150_000.0, &department);
        cache.add_role(&lead).await.unwrap();

        cache.update_employee_role(&employee, &lead).await.unwrap();

        assert!(Rc::ptr_eq(&employee.role(), &lead));
        let cached = cache.get_employee_by_id(employee.id()).unwrap();
        assert_eq!(cached.role_id(), lead.id());
    }

    #[tokio::test]
    async fn test_update_employee_manager() {
        let mut cache = started_cache().await;
        let (_, role, manager) = seed(&mut cache).await;
        let report = Employee::new("Grace", "Hopper", &role, None);
        cache.add_employee(&report).await.unwrap();

        cache.update_employee_manager(&report, Some(&manager)).await.unwrap();
        assert_eq!(report.manager_id(), Some(manager.id()));
        assert!(Rc::ptr_eq(&cache.manager_of(&report).unwrap(), &manager));
        assert_eq!(cache.get_employees_by_manager(&manager).len(), 1);

        cache.update_employee_manager(&report, None).await.unwrap();
        assert_eq!(report.manager_id(), None);
        assert!(cache.manager_of(&report).is_none());
    }

    #[tokio::test]
    async fn test_update_employee_manager_rejects_self() {
        let mut cache = started_cache().await;
        let (_, _, employee) = seed(&mut cache).await;

        let result = cache.update_employee_manager(&employee, Some(&employee)).await;
        assert!(matches!(result, Err(DomainError::SelfManagement(_))));
        assert_eq!(employee.manager_id(), None);
    }

    #[tokio::test]
    async fn test_delete_by_unknown_id_is_noop() {
        let mut cache = started_cache().await;
        seed(&mut cache).await;

        assert!(cache.delete_department_by_id(404).await.unwrap().is_none());
        assert!(cache.delete_role_by_id("404").await.unwrap().is_none());
        assert!(cache.delete_employee_by_id(404_u64).await.unwrap().is_none());
        assert_eq!(cache.employees().len(), 1);
    }

    #[tokio::test]
    async fn test_department_budget() {
        let mut cache = started_cache().await;
        let (department, role, _) = seed(&mut cache).await;
        let second = Employee::new("Alan", "Turing", &role, None);
        cache.add_employee(&second).await.unwrap();

        let budget = cache.department_budget(&department);
        assert!((budget - 240_000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_add_report_built_before_manager_was_saved() {
        let mut cache = started_cache().await;
        let (_, role, _) = seed(&mut cache).await;

        let boss = Employee::new("Barbara", "Liskov", &role, None);
        let report = Employee::new("Frances", "Allen", &role, Some(&boss));
        cache.add_employee(&boss).await.unwrap();
        cache.add_employee(&report).await.unwrap();

        assert_eq!(report.manager_id(), Some(boss.id()));
        assert!(Rc::ptr_eq(&cache.manager_of(&report).unwrap(), &boss));

        cache.refresh_employees_cache().await.unwrap();
        let reloaded = cache.get_employee_by_id(report.id()).unwrap();
        assert_eq!(reloaded.manager_id(), Some(boss.id()));
    }

    #[tokio::test]
    async fn test_add_rejects_report_of_unsaved_manager() {
        let mut cache = started_cache().await;
        let (_, role, _) = seed(&mut cache).await;

        let boss = Employee::new("Barbara", "Liskov", &role, None);
        let report = Employee::new("Frances", "Allen", &role, Some(&boss));

        let result = cache.add_employee(&report).await;
        assert!(matches!(result, Err(DomainError::ValidationFailed(_))));
        assert!(!report.is_persisted());
        assert_eq!(cache.employees().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_employee_untouched() {
        let mut cache = OrgCache::new(FailingGateway);
        cache.start().await.unwrap();

        let department = Department::with_id(1, "Engineering");
        let engineer = Role::with_id(1, "Engineer", 100_000.0, &department);
        let lead = Role::with_id(2, "Lead", 150_000.0, &department);
        let employee = Employee::with_id(2, "Grace", "Hopper", &engineer, Some(1));
        let other = Employee::with_id(3, "Alan", "Turing", &engineer, None);

        assert!(cache.update_employee_role(&employee, &lead).await.is_err());
        assert!(Rc::ptr_eq(&employee.role(), &engineer));

        assert!(cache.update_employee_manager(&employee, Some(&other)).await.is_err());
        assert_eq!(employee.manager_id(), Some(1));
        assert!(cache.update_employee_manager(&employee, None).await.is_err());
        assert_eq!(employee.manager_id(), Some(1));
    }

    #[tokio::test]
    async fn test_failed_statement_leaves_cache_untouched() {
        let mut cache = OrgCache::new(FailingGateway);
        cache.start().await.unwrap();

        let department = Department::new("Ghost");
        assert!(cache.add_department(&department).await.is_err());
        assert!(!department.is_persisted());
        assert!(cache.departments().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_mirror() {
        let mut cache = started_cache().await;
        let (_, role, employee) = seed(&mut cache).await;
        cache.close().await;

        assert!(matches!(cache.delete_role(&role).await, Err(DomainError::NotConnected)));
        assert!(cache.get_role_by_id(role.id()).is_some());
        assert!(cache.get_employee_by_id(employee.id()).is_some());
    }
}
