//! Access decisions for stored files.
//!
//! Rules, first match wins:
//! - the owner may read, update and delete
//! - anyone else (authenticated or anonymous) may read a shareable file
//! - everything else is denied
//!
//! Roles are ignored and a file whose shareable flag was never set counts as private.

use uuid::Uuid;

use crate::features::auth::AuthenticatedUser;
use crate::features::files::models::FileRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Update,
    Delete,
}

/// How the requester relates to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Owner,
    NonOwner,
    Anonymous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(Relation),
    Deny(Relation),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow(_))
    }

    pub fn relation(self) -> Relation {
        match self {
            Decision::Allow(relation) | Decision::Deny(relation) => relation,
        }
    }
}

/// Stateless access policy evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn relation(requester: Option<&AuthenticatedUser>, owner_id: Uuid) -> Relation {
        match requester {
            Some(user) if user.user_id == owner_id => Relation::Owner,
            Some(_) => Relation::NonOwner,
            None => Relation::Anonymous,
        }
    }

    pub fn evaluate(
        &self,
        requester: Option<&AuthenticatedUser>,
        record: &FileRecord,
        operation: Operation,
    ) -> Decision {
        let relation = Self::relation(requester, record.owner_id);

        match (relation, operation) {
            (Relation::Owner, _) => Decision::Allow(relation),
            (_, Operation::Read) if record.shareable.is_shareable() => Decision::Allow(relation),
            _ => Decision::Deny(relation),
        }
    }
}
