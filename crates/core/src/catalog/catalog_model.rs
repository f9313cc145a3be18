use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceStatus {
    Available,
    ComingSoon,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: ServiceStatus,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Purchase,
    Activate,
    Deactivate,
}

impl ServiceAction {
    /// Past tense used in responses.
    pub fn past_tense(&self) -> &'static str {
        match self {
            ServiceAction::Purchase => "purchased",
            ServiceAction::Activate => "activated",
            ServiceAction::Deactivate => "deactivated",
        }
    }

    pub fn requires_availability(&self) -> bool {
        !matches!(self, ServiceAction::Deactivate)
    }
}
