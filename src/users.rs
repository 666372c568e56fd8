//! Users

use serde::{Deserialize, Serialize};

/// The signed-in shopper, as persisted under the `user` storage key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier
    #[serde(default)]
    pub id: Option<String>,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Contact email
    #[serde(default)]
    pub email: Option<String>,

    /// Account role, e.g. `customer` or `admin`
    #[serde(default)]
    pub role: Option<String>,
}
