//! Integration tests for admin user management, projects, budgets and stats.

mod common;

use axum::http::StatusCode;
use common::*;
use persistence::entities::UserRoleDb;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn test_admin_routes_reject_other_roles() {
    let (pool, app) = setup().await;

    for role in [UserRoleDb::Employee, UserRoleDb::Approver, UserRoleDb::Checker] {
        let user = create_user(&pool, &app, role).await;
        let (status, _) = get(&app, "/api/admin/users", &user.token).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = get(&app, "/api/admin/stats", &user.token).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = post(&app, "/api/projects", &user.token, json!({ "name": "Nope" })).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn test_admin_user_lifecycle() {
    let (pool, app) = setup().await;
    let admin = create_user(&pool, &app, UserRoleDb::Admin).await;
    let email = unique_test_email();

    let (status, created) = post(
        &app,
        "/api/admin/users",
        &admin.token,
        json!({
            "name": "Sita Sharma",
            "email": email,
            "password": "Annapurna#2024",
            "role": "checker",
            "department": "Finance"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["role"], "checker");
    assert!(created.get("passwordHash").is_none());
    let user_uri = format!("/api/admin/users/{}", created["id"].as_str().unwrap());

    // The new account can sign in
    login(&app, &email, "Annapurna#2024").await;

    let (status, body) = post(
        &app,
        "/api/admin/users",
        &admin.token,
        json!({
            "name": "Duplicate",
            "email": email.to_uppercase(),
            "password": "Annapurna#2024",
            "role": "employee"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);

    let (status, body) = post(
        &app,
        "/api/admin/users",
        &admin.token,
        json!({
            "name": "Weak",
            "email": unique_test_email(),
            "password": "weak",
            "role": "employee"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, updated) = patch(
        &app,
        &user_uri,
        &admin.token,
        json!({ "role": "approver", "designation": "Senior Officer" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "approver");
    assert_eq!(updated["designation"], "Senior Officer");
    assert_eq!(updated["department"], "Finance");

    let (status, page) = get(&app, "/api/admin/users?role=approver&perPage=100", &admin.token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|u| u["email"] == email.as_str()));

    let (status, _) = delete(&app, &user_uri, &admin.token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = delete(&app, &user_uri, &admin.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_cannot_demote_or_delete_self() {
    let (pool, app) = setup().await;
    let admin = create_user(&pool, &app, UserRoleDb::Admin).await;
    let own_uri = format!("/api/admin/users/{}", admin.id);

    let (status, _) = patch(&app, &own_uri, &admin.token, json!({ "role": "employee" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = delete(&app, &own_uri, &admin.token).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_projects_and_budgets() {
    let (pool, app) = setup().await;
    let admin = create_user(&pool, &app, UserRoleDb::Admin).await;
    let employee = create_user(&pool, &app, UserRoleDb::Employee).await;

    let (status, project) = post(
        &app,
        "/api/projects",
        &admin.token,
        json!({ "name": format!("Hydro {}", admin.id), "description": "Micro hydro" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", project);
    assert_eq!(project["active"], true);
    let project_id = project["id"].as_str().unwrap().to_string();

    let (status, budget) = post(
        &app,
        "/api/budgets",
        &admin.token,
        json!({ "projectId": project_id, "amount": "25000.50", "fiscalYear": "2024/25" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", budget);
    assert_eq!(decimal(&budget["amount"]), dec!(25000.50));

    let (status, _) = post(
        &app,
        "/api/budgets",
        &admin.token,
        json!({ "projectId": uuid::Uuid::new_v4(), "amount": 10, "fiscalYear": "2024" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(
        &app,
        "/api/budgets",
        &employee.token,
        json!({ "projectId": project_id, "amount": 10, "fiscalYear": "2024" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Everyone signed in can read projects and budgets
    let (status, projects) = get(&app, "/api/projects", &employee.token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(projects
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["id"] == project["id"]));

    let (status, budgets) = get(
        &app,
        &format!("/api/budgets?projectId={}", project_id),
        &employee.token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(budgets.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_stats_reflect_requests() {
    let (pool, app) = setup().await;
    let admin = create_user(&pool, &app, UserRoleDb::Admin).await;
    let employee = create_user(&pool, &app, UserRoleDb::Employee).await;

    let (_, before) = get(&app, "/api/admin/stats", &admin.token).await;

    post(&app, "/api/requests", &employee.token, travel_request_body("Stats trip")).await;
    post(
        &app,
        "/api/valley-requests",
        &employee.token,
        json!({
            "project": "Valley Clinics",
            "purpose": "Stats errand",
            "expenseDate": "2024-05-01",
            "expenses": [{ "category": "meals", "amount": 120 }]
        }),
    )
    .await;

    let (status, after) = get(&app, "/api/admin/stats", &admin.token).await;
    assert_eq!(status, StatusCode::OK, "{}", after);

    let count = |stats: &serde_json::Value, field: &str| stats[field].as_u64().unwrap_or(0);
    assert!(count(&after, "totalRequests") >= count(&before, "totalRequests") + 2);
    assert!(count(&after, "travelRequests") > count(&before, "travelRequests"));
    assert!(count(&after, "valleyRequests") > count(&before, "valleyRequests"));
    assert!(after["byStatus"]["pending"].as_u64().unwrap() >= 2);
    assert!(after["usersByRole"]["admin"].as_u64().unwrap() >= 1);
}
