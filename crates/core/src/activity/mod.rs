//! Activity module - per-user activity feed and company audit log.

mod activity_model;
mod activity_service;
mod activity_traits;

pub use activity_model::{Activity, ActivityKind, ActivityList, NewActivity};
pub use activity_service::ActivityService;
pub use activity_traits::{ActivityRepositoryTrait, ActivityServiceTrait};
