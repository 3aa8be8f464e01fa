//! User Model

use serde::{Deserialize, Serialize};

/// Staff role (fixed RBAC vocabulary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
    Kitchen,
    Waiter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Cashier => "cashier",
            Role::Kitchen => "kitchen",
            Role::Waiter => "waiter",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "cashier" => Some(Role::Cashier),
            "kitchen" => Some(Role::Kitchen),
            "waiter" => Some(Role::Waiter),
            _ => None,
        }
    }

    /// Permission grants for this role.
    ///
    /// `"all"` is the admin wildcard; `"x:*"` grants every action on a
    /// resource. Checked by the auth middleware on every protected route.
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::Admin => &["all"],
            Role::Cashier => &[
                "menu:read",
                "orders:*",
                "payments:*",
                "reports:read",
                "tables:read",
                "settings:read",
                "dashboard:read",
            ],
            Role::Kitchen => &["menu:read", "orders:read", "orders:update", "kitchen:*"],
            Role::Waiter => &[
                "menu:read",
                "orders:create",
                "orders:read",
                "orders:update",
                "tables:read",
                "dashboard:read",
            ],
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity (员工账号)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 hash, never serialized in API responses
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub is_active: bool,
    pub last_login: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login result: bearer token plus the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Register payload (admin only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
}

/// Update user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        for name in ["admin", "cashier", "kitchen", "waiter"] {
            assert_eq!(Role::parse(name).unwrap().as_str(), name);
        }
        assert!(Role::parse("manager").is_none());
    }
}
