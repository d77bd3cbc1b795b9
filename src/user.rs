use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account. Credential hashing and session issuance happen at
/// the web layer; the pipeline only ever reads the public fields when it
/// builds user-page contexts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub uuid: Uuid,

    /// Sign-in address, globally unique.
    pub email: String,

    /// Hashed credential, opaque to this crate.
    #[serde(default)]
    pub credential: String,

    /// Public display name, rendered on user pages.
    #[serde(default)]
    pub name: String,

    /// Publicly shown contact address; distinct from the sign-in address.
    #[serde(default)]
    pub public_email: String,

    /// Billing reference, opaque to this crate.
    #[serde(default)]
    pub customer_id: String,

    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, credential: &str, name: &str) -> User {
        User {
            uuid: Uuid::new_v4(),
            email: email.to_owned(),
            credential: credential.to_owned(),
            name: name.to_owned(),
            public_email: String::new(),
            customer_id: String::new(),
            created: Utc::now(),
        }
    }
}
