//! Request and response bodies of the `/auth` and `/users` endpoints.

use serde::{Deserialize, Serialize};

use crate::core::User;

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Registration {
    pub fn validate(&self) -> crate::Result<()> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(crate::Error::Validation("A valid email is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(crate::Error::Validation("Password is required".to_string()));
        }
        Ok(())
    }
}

/// The login response carries a token, a user, or both, depending on how
/// the backend is set up.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default, alias = "accessToken", alias = "access_token")]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
}
