use crate::shared::entity::{Entity, ID};

const DEFAULT_DISPLAY_NAME: &str = "User";

/// The owner of `Reminder`s and the person that gets notified
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ID,
    pub name: String,
    pub email: String,
    /// Device token for push notifications. Not every `User` has
    /// a device registered.
    pub push_token: Option<String>,
    pub created: i64,
}

impl User {
    pub fn new(name: String, email: String, push_token: Option<String>, created: i64) -> Self {
        Self {
            id: Default::default(),
            name,
            email,
            push_token,
            created,
        }
    }

    pub fn contact(&self) -> Contact {
        let display_name = match self.name.trim() {
            "" => DEFAULT_DISPLAY_NAME.to_string(),
            name => name.to_string(),
        };
        Contact {
            display_name,
            email: self.email.clone(),
            push_token: self.push_token.clone().filter(|t| !t.trim().is_empty()),
        }
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Delivery targets for notifying a `User`
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub display_name: String,
    pub email: String,
    pub push_token: Option<String>,
}
