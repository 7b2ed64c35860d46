use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user who can authenticate and own posts and comments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique user identifier
    pub id: i64,
    /// Unique login email
    pub email: String,
    /// Display name
    pub name: String,
    /// Salted password hash, never written to responses
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a principal; the id is assigned by the store
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

impl Principal {
    /// Whether this principal is recorded as the owner
    pub fn owns(&self, owner_id: i64) -> bool {
        self.id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal() -> Principal {
        Principal {
            id: 7,
            email: "a@x.com".to_string(),
            name: "A".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(principal()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["id"], 7);
    }

    #[test]
    fn test_owns() {
        let p = principal();
        assert!(p.owns(7));
        assert!(!p.owns(8));
    }
}
