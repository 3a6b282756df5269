//! Rehydration tests: rows written straight through the gateway and loaded
//! back into the mirror.

mod common;

use std::rc::Rc;

use common::{seed_org, sorted_ids, started_cache};
use employee_tracker::{CacheState, Department, DomainError, OrgCache, PersistenceGateway, SqliteGateway};

#[tokio::test]
async fn test_refresh_links_forward_manager_reference() {
    let mut cache = started_cache().await;
    let gateway = cache.gateway();

    let dept = gateway
        .execute("INSERT INTO departments_table(name) VALUES (?);", &["Research".into()])
        .await
        .unwrap()
        .insert_id;
    let role = gateway
        .execute(
            "INSERT INTO roles_table(title, salary, department_id) VALUES (?, ?, ?);",
            &["Scientist".into(), 95_000.5.into(), dept.into()],
        )
        .await
        .unwrap()
        .insert_id;
    let insert_employee =
        "INSERT INTO employees_table(first_name, last_name, role_id, manager_id) VALUES (?, ?, ?, ?);";
    let report = gateway
        .execute(insert_employee, &["Rosalind".into(), "Franklin".into(), role.into(), None::<i64>.into()])
        .await
        .unwrap()
        .insert_id;
    let manager = gateway
        .execute(insert_employee, &["Marie".into(), "Curie".into(), role.into(), None::<i64>.into()])
        .await
        .unwrap()
        .insert_id;
    // the report's row precedes its manager's
    gateway
        .execute(
            "UPDATE employees_table SET manager_id = ? WHERE id = ?;",
            &[manager.into(), report.into()],
        )
        .await
        .unwrap();

    assert!(cache.employees().is_empty());
    cache.refresh_caches().await.unwrap();

    let department = cache.get_department_by_id(dept).unwrap();
    assert_eq!(department.name(), "Research");

    let scientist = cache.get_role_by_id(role).unwrap();
    assert!(Rc::ptr_eq(scientist.department(), &department));
    assert!((scientist.salary() - 95_000.5).abs() < f64::EPSILON);

    let rosalind = cache.get_employee_by_id(report).unwrap();
    let marie = cache.get_employee_by_id(manager).unwrap();
    assert!(Rc::ptr_eq(&rosalind.role(), &scientist));
    assert_eq!(rosalind.manager_id(), Some(manager));
    assert!(Rc::ptr_eq(&cache.manager_of(&rosalind).unwrap(), &marie));
    assert!(!marie.has_manager());
}

#[tokio::test]
async fn test_refresh_twice_is_stable() {
    let mut cache = started_cache().await;
    seed_org(&mut cache).await;

    cache.refresh_caches().await.unwrap();
    let first = (
        sorted_ids(cache.departments().iter().map(|d| d.id())),
        sorted_ids(cache.roles().iter().map(|r| r.id())),
        sorted_ids(cache.employees().iter().map(|e| e.id())),
    );
    let managers: Vec<Option<i64>> = cache.employees().iter().map(|e| e.manager_id()).collect();

    cache.refresh_caches().await.unwrap();
    let second = (
        sorted_ids(cache.departments().iter().map(|d| d.id())),
        sorted_ids(cache.roles().iter().map(|r| r.id())),
        sorted_ids(cache.employees().iter().map(|e| e.id())),
    );

    assert_eq!(first, second);
    assert_eq!((first.0.len(), first.1.len(), first.2.len()), (2, 3, 4));
    let managers_again: Vec<Option<i64>> = cache.employees().iter().map(|e| e.manager_id()).collect();
    assert_eq!(managers, managers_again);
}

#[tokio::test]
async fn test_refresh_replaces_handles() {
    let mut cache = started_cache().await;
    let org = seed_org(&mut cache).await;

    let refreshed = cache.refresh_departments_cache().await.unwrap();
    assert_eq!(refreshed.len(), 2);
    let engineering = cache.get_department_by_id(org.engineering.id()).unwrap();
    assert!(!Rc::ptr_eq(&engineering, &org.engineering));
    assert_eq!(engineering.name(), org.engineering.name());
}

#[tokio::test]
async fn test_cache_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("org.sqlite").display());

    let mut cache = OrgCache::new(SqliteGateway::new(url.clone(), Default::default()));
    cache.start().await.unwrap();
    let org = seed_org(&mut cache).await;
    cache.delete_employee(&org.ada).await.unwrap();
    cache.close().await;
    assert_eq!(cache.state(), CacheState::Closed);

    let mut reopened = OrgCache::new(SqliteGateway::new(url, Default::default()));
    reopened.start().await.unwrap();
    assert_eq!(reopened.departments().len(), 2);
    assert_eq!(reopened.roles().len(), 3);
    assert_eq!(reopened.employees().len(), 3);
    let grace = reopened.get_employee_by_id(org.grace.id()).unwrap();
    assert_eq!(grace.manager_id(), None);
    let ken = reopened.get_employee_by_id(org.ken.id()).unwrap();
    assert_eq!(ken.manager_id(), Some(org.linus.id()));
    reopened.close().await;
}

#[tokio::test]
async fn test_restart_after_close() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("org.sqlite").display());
    let mut cache = OrgCache::new(SqliteGateway::new(url, Default::default()));

    cache.start().await.unwrap();
    assert!(matches!(cache.start().await, Err(DomainError::AlreadyStarted)));
    cache.add_department(&Department::new("Ops")).await.unwrap();
    cache.close().await;
    assert!(cache.is_closed());

    cache.start().await.unwrap();
    assert_eq!(cache.state(), CacheState::Started);
    assert_eq!(cache.departments().len(), 1);
    cache.close().await;
}
