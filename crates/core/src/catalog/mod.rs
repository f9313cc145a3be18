//! Catalog of platform services a company can enable.

mod catalog_model;
mod catalog_service;

pub use catalog_model::{ServiceAction, ServiceInfo, ServiceStatus};
pub use catalog_service::{CatalogService, CatalogServiceTrait};
