//! Users module - users, roles, profiles and credential handling.

mod users_model;
mod users_service;
mod users_traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use users_model::{
    NewProfile, NewUser, PasswordChange, Profile, ProfileUpdate, Role, SignupRequest, User,
    UserUpdate,
};
pub use users_service::UserService;
pub use users_traits::{CredentialHasher, UserRepositoryTrait, UserServiceTrait};
