//! Shared fixtures for integration tests.

#![allow(dead_code)]

use employee_tracker::{
    Department, DepartmentRef, Employee, EmployeeRef, OrgCache, PersistenceGateway, Role, RoleRef,
    SqliteGateway,
};

/// A small organization spanning two departments.
///
/// ```text
/// Engineering: Lead Engineer      -> ada
///              Engineer           -> grace (reports to ada)
/// Sales:       Account Executive  -> linus (reports to ada), ken (reports to linus)
/// ```
pub struct Org {
    pub engineering: DepartmentRef,
    pub sales: DepartmentRef,
    pub lead: RoleRef,
    pub engineer: RoleRef,
    pub account_exec: RoleRef,
    pub ada: EmployeeRef,
    pub grace: EmployeeRef,
    pub linus: EmployeeRef,
    pub ken: EmployeeRef,
}

/// Start a cache over a fresh in-memory database.
pub async fn started_cache() -> OrgCache<SqliteGateway> {
    let mut cache = OrgCache::new(SqliteGateway::in_memory());
    cache.start().await.expect("Failed to start cache");
    cache
}

/// Populate `cache` with [`Org`].
pub async fn seed_org(cache: &mut OrgCache<SqliteGateway>) -> Org {
    let engineering = Department::new("Engineering");
    let sales = Department::new("Sales");
    cache.add_department(&engineering).await.unwrap();
    cache.add_department(&sales).await.unwrap();

    let lead = Role::new("Lead Engineer", 180_000.0, &engineering);
    let engineer = Role::new("Engineer", 120_000.0, &engineering);
    let account_exec = Role::new("Account Executive", 90_000.0, &sales);
    for role in [&lead, &engineer, &account_exec] {
        cache.add_role(role).await.unwrap();
    }

    let ada = Employee::new("Ada", "Lovelace", &lead, None);
    cache.add_employee(&ada).await.unwrap();
    let grace = Employee::new("Grace", "Hopper", &engineer, Some(&ada));
    cache.add_employee(&grace).await.unwrap();
    let linus = Employee::new("Linus", "Torvalds", &account_exec, Some(&ada));
    cache.add_employee(&linus).await.unwrap();
    let ken = Employee::new("Ken", "Thompson", &account_exec, Some(&linus));
    cache.add_employee(&ken).await.unwrap();

    Org {
        engineering,
        sales,
        lead,
        engineer,
        account_exec,
        ada,
        grace,
        linus,
        ken,
    }
}

/// Count rows in a table through the gateway, bypassing the mirror.
pub async fn store_count(cache: &OrgCache<SqliteGateway>, table: &str) -> i64 {
    let rows = cache
        .gateway()
        .query(&format!("SELECT COUNT(*) AS n FROM {table};"))
        .await
        .expect("Failed to count rows");
    rows[0].get_i64("n").expect("count column")
}

/// Stored manager id of one employee row.
pub async fn stored_manager_id(cache: &OrgCache<SqliteGateway>, employee_id: i64) -> Option<i64> {
    let rows = cache
        .gateway()
        .query(&format!(
            "SELECT manager_id FROM employees_table WHERE id = {employee_id};"
        ))
        .await
        .expect("Failed to read manager");
    rows[0].get_optional_i64("manager_id").expect("manager column")
}

/// Sorted ids of a collection of handles.
pub fn sorted_ids(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids
}
