//! Repository and service traits for per-user settings.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;
use crate::users::User;

#[async_trait]
pub trait SettingsRepositoryTrait: Send + Sync {
    /// Stored settings object, if the user ever saved one.
    fn get_settings(&self, user_id: &str) -> Result<Option<Value>>;

    async fn save_settings(&self, user_id: &str, settings: &Value) -> Result<()>;
}

#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    fn get_settings(&self, user: &User) -> Result<Value>;

    /// Replaces the user's settings. The value must be a JSON object.
    async fn update_settings(&self, user: &User, settings: Value) -> Result<Value>;
}
