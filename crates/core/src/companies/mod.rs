//! Companies module - tenant accounts and their membership rules.

mod companies_model;
mod companies_service;
mod companies_traits;

pub use companies_model::{Company, CompanyUpdate, Invitation, NewCompany};
pub use companies_service::CompanyService;
pub use companies_traits::{CompanyRepositoryTrait, CompanyServiceTrait};
