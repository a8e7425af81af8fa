//! User account and role models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Role of a user in the reimbursement workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Employee,
    Approver,
    Checker,
    Admin,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::Employee,
        UserRole::Approver,
        UserRole::Checker,
        UserRole::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Employee => "employee",
            UserRole::Approver => "approver",
            UserRole::Checker => "checker",
            UserRole::Admin => "admin",
        }
    }

    /// Whether this role may see every employee's requests.
    pub fn sees_all_requests(&self) -> bool {
        !matches!(self, UserRole::Employee)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "employee" => Ok(UserRole::Employee),
            "approver" => Ok(UserRole::Approver),
            "checker" => Ok(UserRole::Checker),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user account in the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)] // Never serialize password hash to API responses
    pub password_hash: String,
    pub role: UserRole,
    pub department: String,
    pub designation: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The authenticated caller, resolved from the token subject and the users row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
    pub name: String,
    pub department: String,
    pub designation: String,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            name: user.name.clone(),
            department: user.department.clone(),
            designation: user.designation.clone(),
        }
    }
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Request payload for logging in.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response payload for a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

/// Request payload for an admin creating a user.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,

    pub role: UserRole,

    #[validate(length(max = 100, message = "Department must be at most 100 characters"))]
    #[serde(default)]
    pub department: String,

    #[validate(length(max = 100, message = "Designation must be at most 100 characters"))]
    #[serde(default)]
    pub designation: String,
}

/// Request payload for an admin updating a user. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    pub role: Option<UserRole>,

    #[validate(length(max = 100, message = "Department must be at most 100 characters"))]
    pub department: Option<String>,

    #[validate(length(max = 100, message = "Designation must be at most 100 characters"))]
    pub designation: Option<String>,

    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Asha Gurung".to_string(),
            email: SafeEmail().fake(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            role: UserRole::Checker,
            department: "Finance".to_string(),
            designation: "Accountant".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(UserRole::from_str("Approver").unwrap(), UserRole::Approver);
        assert!(UserRole::from_str("superuser").is_err());
    }

    #[test]
    fn test_role_visibility() {
        assert!(!UserRole::Employee.sees_all_requests());
        assert!(UserRole::Approver.sees_all_requests());
        assert!(UserRole::Checker.sees_all_requests());
        assert!(UserRole::Admin.sees_all_requests());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "checker");
    }

    #[test]
    fn test_actor_from_user() {
        let user = sample_user();
        let actor = Actor::from(&user);
        assert_eq!(actor.user_id, user.id);
        assert_eq!(actor.role, UserRole::Checker);
        assert!(!actor.is_admin());
    }

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            email: "asha@example.org".to_string(),
            password: "pw".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        assert!(bad.validate().is_err());
    }
}
