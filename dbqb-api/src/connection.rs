use std::fmt;

use serde::{Deserialize, Serialize};

/// Everything a driver needs to open a session against a registered data source.
///
/// The credential is never printed: the [`fmt::Debug`] implementation redacts it and it is
/// skipped when serializing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    /// Logical name the data source is registered under.
    pub name: String,
    pub host: String,
    pub port: u16,
    /// Name of the database to connect to.
    pub database: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn descriptor() -> ConnectionDescriptor {
        ConnectionDescriptor {
            name: "shop".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            database: "shop".to_string(),
            user: "postgres".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn test_should_redact_password() {
        let descriptor = descriptor();
        let debug = format!("{descriptor:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_should_not_serialize_password() {
        let json = serde_json::to_value(descriptor()).expect("failed to serialize");
        assert!(json.get("password").is_none());
        assert_eq!(json["user"], "postgres");
        assert!(!json.to_string().contains("hunter2"));
    }
}
