use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Authorization tag carried by a user and by its bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum Role {
    #[default]
    #[serde(rename = "user")]
    User,
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "")]
    None,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::None => "",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "" => Ok(Role::None),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    // argon2id PHC string, never sent back to clients
    #[serde(skip_serializing, default)]
    pub password: String,
    pub mail: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    /// Firstname of the user
    #[schema(example = "John", min_length = 3)]
    pub first_name: String,
    /// Lastname of the user
    #[schema(example = "Doe", min_length = 3)]
    pub last_name: String,
    /// Username of the user
    #[schema(example = "Johny", min_length = 3)]
    pub user_name: String,
    /// Password of the user
    #[schema(example = "Qkf5fAbSm", min_length = 8)]
    pub password: String,
    /// Email of the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "tartampion@gmail.com")]
    pub mail: Option<String>,
}

/// Partial update. An absent `role` means `user`, so every update rewrites the role.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    /// Unique id of the user, equal to the path id
    #[schema(example = 1)]
    pub id: i64,
    /// Firstname of the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "John", min_length = 3)]
    pub first_name: Option<String>,
    /// Lastname of the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Doe", min_length = 3)]
    pub last_name: Option<String>,
    /// Username of the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Johny", min_length = 3)]
    pub user_name: Option<String>,
    /// Password of the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Qkf5fAbSm", min_length = 8)]
    pub password: Option<String>,
    /// Role of the user
    #[serde(default)]
    #[schema(example = "user", default = "user")]
    pub role: Role,
    /// Email of the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "tartampion@gmail.com")]
    pub mail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserId {
    /// Unique id of the user, equal to the path id
    #[schema(example = 1)]
    pub id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    /// Email of the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "tartampion@gmail.com")]
    pub mail: Option<String>,
    /// Password of the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Qkf5fAbSm", min_length = 8)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Session {
    /// Bearer token to send as `Authorization: Bearer <token>`
    pub token: String,
}
