use log::info;

use super::catalog_model::{ServiceAction, ServiceInfo, ServiceStatus};
use crate::errors::{Error, Result};
use crate::users::User;

const CATALOG: &[(&str, &str, &str, ServiceStatus)] = &[
    (
        "asm",
        "Attack Surface Management",
        "Continuously discover and manage all your external assets",
        ServiceStatus::Available,
    ),
    (
        "vs",
        "Vulnerability Scanning",
        "High-fidelity vulnerability scanning with prioritization",
        ServiceStatus::Available,
    ),
    (
        "bas",
        "Breach & Attack Simulation",
        "Automated adversary emulation",
        ServiceStatus::ComingSoon,
    ),
    (
        "threat-intel",
        "Threat Intelligence",
        "Real-time threat feeds and IOC correlation",
        ServiceStatus::ComingSoon,
    ),
    (
        "ir",
        "Incident Response Orchestration",
        "Automated playbooks and response workflows",
        ServiceStatus::ComingSoon,
    ),
    (
        "compliance",
        "Compliance & Audit",
        "Automated compliance checks and audit reports",
        ServiceStatus::ComingSoon,
    ),
];

pub trait CatalogServiceTrait: Send + Sync {
    fn list_services(&self) -> Vec<ServiceInfo>;
    fn get_service(&self, service_id: &str) -> Result<ServiceInfo>;
    /// Applies `action` and returns the response message.
    fn apply(&self, user: &User, service_id: &str, action: ServiceAction) -> Result<String>;
}

#[derive(Default)]
pub struct CatalogService;

impl CatalogService {
    pub fn new() -> Self {
        Self
    }
}

fn to_info(entry: &(&str, &str, &str, ServiceStatus)) -> ServiceInfo {
    let (id, name, description, status) = *entry;
    ServiceInfo {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        status,
        price: None,
    }
}

impl CatalogServiceTrait for CatalogService {
    fn list_services(&self) -> Vec<ServiceInfo> {
        CATALOG.iter().map(to_info).collect()
    }

    fn get_service(&self, service_id: &str) -> Result<ServiceInfo> {
        CATALOG
            .iter()
            .find(|(id, ..)| *id == service_id)
            .map(to_info)
            .ok_or_else(|| Error::not_found("Service not found"))
    }

    fn apply(&self, user: &User, service_id: &str, action: ServiceAction) -> Result<String> {
        let service = self.get_service(service_id)?;
        if action.requires_availability() && service.status == ServiceStatus::ComingSoon {
            return Err(Error::invalid(format!(
                "Service {} is not available yet",
                service.id
            )));
        }
        info!(
            "User {} {} service {}",
            user.id,
            action.past_tense(),
            service.id
        );
        Ok(format!("Service {} {}", service.id, action.past_tense()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::test_support::member;
    use crate::users::Role;

    #[test]
    fn lists_six_services_in_order() {
        let ids: Vec<_> = CatalogService::new()
            .list_services()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, ["asm", "vs", "bas", "threat-intel", "ir", "compliance"]);
    }

    #[test]
    fn status_serializes_kebab_case() {
        let svc = CatalogService::new().get_service("bas").unwrap();
        let value = serde_json::to_value(&svc).unwrap();
        assert_eq!(value["status"], "coming-soon");
        assert!(value["price"].is_null());
    }

    #[test]
    fn coming_soon_cannot_be_purchased() {
        let catalog = CatalogService::new();
        let user = member("u1", "c1", Role::Admin);
        assert_eq!(
            catalog.apply(&user, "asm", ServiceAction::Purchase).unwrap(),
            "Service asm purchased"
        );
        assert!(catalog.apply(&user, "ir", ServiceAction::Activate).is_err());
        assert_eq!(
            catalog.apply(&user, "ir", ServiceAction::Deactivate).unwrap(),
            "Service ir deactivated"
        );
        assert!(catalog
            .apply(&user, "nope", ServiceAction::Purchase)
            .unwrap_err()
            .is_not_found());
    }
}
