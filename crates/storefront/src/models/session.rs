//! Session-related types.
//!
//! The external sign-in flow writes [`CurrentUser`] into the session; the
//! storefront only reads it.

use serde::{Deserialize, Serialize};

use saffron_core::{Role, UserId};

/// Session-stored account identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account database ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Account role.
    #[serde(default)]
    pub role: Role,
}

/// Session keys.
pub mod keys {
    /// Key for storing the signed-in account.
    pub const CURRENT_USER: &str = "current_user";
}
