use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,            // count + 1 at submission time, may repeat
    pub name: String,
    pub email: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Fields posted by the contact form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactForm {
    /// Checks that every field is filled in. The returned message has id 0
    /// until it is stored.
    pub fn into_message(self, now: DateTime<Utc>) -> Result<Message, CatalogError> {
        let non_empty = |field: Option<String>| field.filter(|s| !s.is_empty());
        match (non_empty(self.name), non_empty(self.email), non_empty(self.message)) {
            (Some(name), Some(email), Some(message)) => Ok(Message {
                id: 0,
                name,
                email,
                message,
                timestamp: now,
            }),
            _ => Err(CatalogError::Validation("All fields are required".to_string())),
        }
    }
}
