//! Shared domain models.
//!
//! Records coming from the remote directory are opaque JSON objects. Only the
//! identity field of each is typed; every other field is carried through
//! untouched so the durable mirror round-trips losslessly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User record as served by the directory. Identity is `email`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Login email, unique within the directory.
    pub email: String,
    /// Remaining fields (`id`, `name`, `password`, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl UserRecord {
    /// Record with only an email set.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style helper to attach an extra field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Borrow an extra field by name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Login form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Email entered by the user.
    pub email: String,
    /// Password entered by the user.
    pub password: String,
}

impl Credentials {
    /// Convenience constructor.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Transport route. Identity is `id`, compared as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Stable identifier assigned by the catalog.
    pub id: Value,
    /// Remaining fields (`name`, `type`, `stops`, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Route {
    /// Route with only an id set.
    pub fn new(id: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style helper to attach an extra field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Whether this route has the identifier `id`.
    pub fn has_id(&self, id: &Value) -> bool {
        &self.id == id
    }

    /// Human-readable label, falling back to the id.
    pub fn display_name(&self) -> String {
        match self.fields.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => match &self.id {
                Value::String(id) => id.clone(),
                other => other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_survive_round_trip() -> serde_json::Result<()> {
        let raw = json!({"id": "7", "name": "Harbour Line", "stops": ["A", "B"]});
        let route: Route = serde_json::from_value(raw.clone())?;
        assert_eq!(route.id, json!("7"));
        assert_eq!(route.display_name(), "Harbour Line");
        assert_eq!(serde_json::to_value(&route)?, raw);

        let user: UserRecord =
            serde_json::from_value(json!({"email": "a@b.com", "id": "3", "name": "Ana"}))?;
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.field("name"), Some(&json!("Ana")));
        Ok(())
    }

    #[test]
    fn records_without_identity_are_rejected() {
        assert!(serde_json::from_value::<Route>(json!({"name": "x"})).is_err());
        assert!(serde_json::from_value::<UserRecord>(json!({"name": "x"})).is_err());
    }

    #[test]
    fn display_name_falls_back_to_id() {
        assert_eq!(Route::new(json!(12)).display_name(), "12");
        assert_eq!(Route::new("R1").display_name(), "R1");
    }
}
