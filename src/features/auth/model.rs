use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Identity resolved from a bearer token.
///
/// `role` is carried for the account subsystem; file access decisions ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(user_id: Uuid, role: Option<String>) -> Self {
        Self { user_id, role }
    }
}

/// Identity that may be absent; `None` means the caller is anonymous
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl MaybeUser {
    pub fn identity(&self) -> Option<&AuthenticatedUser> {
        self.0.as_ref()
    }
}
