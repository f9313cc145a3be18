pub mod pagination;
pub mod validation;

pub use pagination::{Page, PageRequest};
