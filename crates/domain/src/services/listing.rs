//! In-memory filtering, sorting and paging of request and user collections.

use serde::Deserialize;
use std::cmp::Ordering;

use shared::pagination::{paginate, Page, PageError, PageRequest};

use crate::models::{Actor, RequestRecord, RequestStatus, RequestType, User, UserRole};

/// Sort key for request listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    TotalAmount,
    EmployeeName,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Query parameters accepted by request listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestListQuery {
    pub status: Option<RequestStatus>,
    pub request_type: Option<RequestType>,
    pub department: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortField,
    #[serde(default)]
    pub order: SortOrder,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl RequestListQuery {
    pub fn page_request(&self) -> Result<PageRequest, PageError> {
        PageRequest::new(self.page, self.per_page)
    }

    fn matches(&self, record: &RequestRecord) -> bool {
        if self.status.is_some_and(|s| s != record.status()) {
            return false;
        }
        if self.request_type.is_some_and(|t| t != record.request_type()) {
            return false;
        }
        if let Some(department) = non_empty(&self.department) {
            if !record.department().eq_ignore_ascii_case(department) {
                return false;
            }
        }
        if let Some(search) = non_empty(&self.search) {
            let needle = search.to_lowercase();
            let hit = [record.employee_name(), record.purpose(), record.project()]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn compare(a: &RequestRecord, b: &RequestRecord, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
        SortField::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
        SortField::TotalAmount => a.total_amount().cmp(&b.total_amount()),
        SortField::EmployeeName => a
            .employee_name()
            .to_lowercase()
            .cmp(&b.employee_name().to_lowercase()),
    }
}

/// Keeps only the requests `actor` may see: employees see their own.
pub fn visible_to(actor: &Actor, records: Vec<RequestRecord>) -> Vec<RequestRecord> {
    if actor.role.sees_all_requests() {
        records
    } else {
        records
            .into_iter()
            .filter(|r| r.employee_id() == actor.user_id)
            .collect()
    }
}

/// Filters, sorts and pages a request collection.
pub fn list_requests(
    records: Vec<RequestRecord>,
    query: &RequestListQuery,
) -> Result<Page<RequestRecord>, PageError> {
    let page = query.page_request()?;

    let mut selected: Vec<RequestRecord> =
        records.into_iter().filter(|r| query.matches(r)).collect();

    selected.sort_by(|a, b| {
        let ordering = compare(a, b, query.sort);
        match query.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    Ok(paginate(selected, page))
}

/// Query parameters accepted by the admin user listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Filters users by role and name/email search, sorted by name.
pub fn list_users(users: Vec<User>, query: &UserListQuery) -> Result<Page<User>, PageError> {
    let page = PageRequest::new(query.page, query.per_page)?;
    let needle = non_empty(&query.search).map(str::to_lowercase);

    let mut selected: Vec<User> = users
        .into_iter()
        .filter(|u| query.role.map_or(true, |role| u.role == role))
        .filter(|u| {
            needle.as_ref().map_or(true, |n| {
                u.name.to_lowercase().contains(n) || u.email.to_lowercase().contains(n)
            })
        })
        .collect();
    selected.sort_by_key(|u| u.name.to_lowercase());

    Ok(paginate(selected, page))
}
