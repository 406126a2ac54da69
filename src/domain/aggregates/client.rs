//! Client Aggregate

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ClientId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Role,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub const fn as_token(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "USER" => Some(Self::User),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// The subset of client data shown next to an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContact {
    pub id: ClientId,
    pub full_name: String,
    pub phone: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    #[serde(flatten)]
    pub client: Client,
    pub orders_count: u64,
}

impl Client {
    pub fn register(full_name: impl Into<String>, phone: impl Into<String>, role: Role) -> Self {
        Self { id: ClientId::generate(), full_name: full_name.into(), phone: phone.into(), email: None, address: None, role }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self { self.email = Some(email.into()); self }
    pub fn with_address(mut self, address: impl Into<String>) -> Self { self.address = Some(address.into()); self }

    pub fn contact(&self) -> ClientContact {
        ClientContact { id: self.id, full_name: self.full_name.clone(), phone: self.phone.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_defaults() {
        let c = Client::register("Anna Petrova", "+7 900 000-00-00", Role::User).with_email("anna@example.com");
        assert_eq!(c.role, Role::User);
        assert_eq!(c.email.as_deref(), Some("anna@example.com"));
        assert_eq!(c.contact().full_name, "Anna Petrova");
    }

    #[test]
    fn test_role_tokens() {
        assert_eq!(Role::from_token(Role::Admin.as_token()), Some(Role::Admin));
        assert_eq!(Role::from_token("admin"), None);
    }
}
