//! Signed-in user model

use serde::{Deserialize, Serialize};

/// The account a session belongs to, as returned by `/auth/me` and `/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub username: String,
}
