use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::sync::Arc;

use super::settings_model::default_settings;
use super::settings_traits::{SettingsRepositoryTrait, SettingsServiceTrait};
use crate::activity::{ActivityKind, ActivityServiceTrait, NewActivity};
use crate::errors::{Error, Result};
use crate::users::User;

pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
    activity: Arc<dyn ActivityServiceTrait>,
}

impl SettingsService {
    pub fn new(
        settings_repository: Arc<dyn SettingsRepositoryTrait>,
        activity: Arc<dyn ActivityServiceTrait>,
    ) -> Self {
        Self {
            settings_repository,
            activity,
        }
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_settings(&self, user: &User) -> Result<Value> {
        Ok(self
            .settings_repository
            .get_settings(&user.id)?
            .unwrap_or_else(default_settings))
    }

    async fn update_settings(&self, user: &User, settings: Value) -> Result<Value> {
        if !settings.is_object() {
            return Err(Error::invalid("Settings must be a JSON object"));
        }
        self.settings_repository
            .save_settings(&user.id, &settings)
            .await?;
        debug!("Saved settings for user {}", user.id);
        self.activity
            .record(NewActivity::new(
                user.id.clone(),
                Some(user.company_id.clone()),
                ActivityKind::SettingsUpdated,
                "Updated settings".to_string(),
            ))
            .await;
        Ok(settings)
    }
}
