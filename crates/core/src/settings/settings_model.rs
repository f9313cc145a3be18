use serde_json::{json, Value};

/// Settings returned for a user who never saved any.
pub fn default_settings() -> Value {
    json!({
        "notifications": {
            "email": true,
            "slack": false,
            "push": true
        },
        "preferences": {
            "theme": "light",
            "language": "en",
            "timezone": "UTC"
        }
    })
}
