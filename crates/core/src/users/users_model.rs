use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::validation::{require_non_empty, validate_email, validate_password};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Analyst,
    Reader,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Analyst => "analyst",
            Role::Reader => "reader",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "analyst" => Ok(Role::Analyst),
            "reader" => Ok(Role::Reader),
            _ => Err(Error::invalid(
                "Invalid role. Must be one of: admin, analyst, reader",
            )),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain model representing a platform user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub company_id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for self-service signup. Creates a company, its first user and
/// that user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub company_name: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub country: String,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<Role> {
        require_non_empty(&self.company_name, "Company name")?;
        require_non_empty(&self.full_name, "Full name")?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        Role::from_str(&self.role)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub company_id: String,
    pub email: String,
    pub name: String,
    pub hashed_password: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}
