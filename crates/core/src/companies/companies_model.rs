use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::validation::require_non_empty;
use crate::Result;

/// A tenant. Every user belongs to exactly one company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub plan: String,
    pub assets_limit: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewCompany {
    pub id: String,
    pub name: String,
    pub plan: String,
    pub assets_limit: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub plan: Option<String>,
}

impl CompanyUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_non_empty(name, "Account name")?;
        }
        if let Some(plan) = &self.plan {
            require_non_empty(plan, "Plan")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Invitation {
    pub email: String,
    pub role: String,
}
