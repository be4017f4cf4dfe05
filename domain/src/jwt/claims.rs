//! Claims carried by the bearer credentials issued by the identity subsystem.
//!
//! Only the subject is needed here; the remaining claims are tolerated so that
//! tokens issued for the rest of the platform validate unchanged.

use entity::Id;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AccessClaims {
    /// The authenticated user's id. Older tokens carry it as `id`.
    #[serde(alias = "id")]
    pub(crate) sub: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<String>,
    pub(crate) exp: usize,
    #[serde(default)]
    pub(crate) iat: usize,
}
