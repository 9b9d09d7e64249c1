use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Which collection an entity lives in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Role,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Role => "role",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::User => write!(f, "User"),
            EntityKind::Role => write!(f, "Role"),
        }
    }
}

/// Failures raised by the entity store and passed through the services untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RbacError {
    #[error("{entity} not found")]
    NotFound { entity: EntityKind, id: String },
}

impl RbacError {
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, RbacError>;
