//! Service error taxonomy and its HTTP status contract.

use crate::db::DbError;
use crate::model::category::CategoryId;
use crate::model::validation::ValidationError;
use crate::repo::{EntityRef, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Status for a successful create.
pub const SUCCESS_CREATED: u16 = 201;
/// Status for a successful read, update or delete.
pub const SUCCESS_OK: u16 = 200;

/// Result type used by every core service.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Coarse error class used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Cycle,
    Storage,
}

impl ErrorKind {
    /// HTTP status a request handler should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            Self::Validation | Self::Cycle => 422,
            Self::NotFound => 404,
            Self::Storage => 500,
        }
    }
}

/// Errors returned by core services. Services never retry.
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed or missing input field.
    Validation(ValidationError),
    /// Unique name already owned by another record.
    DuplicateName { entity: &'static str, name: String },
    /// Referenced id does not resolve.
    NotFound(EntityRef),
    /// Parent assignment would make a category its own ancestor, or a
    /// stored cycle was met while walking parent pointers.
    Cycle {
        category_id: CategoryId,
        parent_id: CategoryId,
    },
    /// No collision-free step id was produced within the attempt budget.
    StepIdExhausted { attempts: usize },
    /// Category row is gone but its objects could not be removed.
    CascadeIncomplete {
        category_id: CategoryId,
        source: RepoError,
    },
    /// Storage failure.
    Repo(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::DuplicateName { .. } => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Cycle { .. } => ErrorKind::Cycle,
            Self::StepIdExhausted { .. } | Self::CascadeIncomplete { .. } | Self::Repo(_) => {
                ErrorKind::Storage
            }
        }
    }

    pub fn http_status(&self) -> u16 {
        self.kind().http_status()
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateName { entity, name } => {
                write!(f, "{entity} name `{name}` is already taken")
            }
            Self::NotFound(entity) => write!(f, "could not find {entity}"),
            Self::Cycle {
                category_id,
                parent_id,
            } => write!(
                f,
                "parent {parent_id} would make category {category_id} its own ancestor"
            ),
            Self::StepIdExhausted { attempts } => {
                write!(f, "no unique step id after {attempts} attempts")
            }
            Self::CascadeIncomplete {
                category_id,
                source,
            } => write!(
                f,
                "category {category_id} deleted but object cascade failed: {source}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::CascadeIncomplete { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(entity) => Self::NotFound(entity),
            RepoError::DuplicateName { entity, name } => Self::DuplicateName { entity, name },
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, ServiceError, SUCCESS_CREATED, SUCCESS_OK};
    use crate::model::validation::ValidationError;
    use crate::repo::{EntityRef, RepoError};
    use uuid::Uuid;

    #[test]
    fn kinds_map_to_documented_statuses() {
        assert_eq!(ErrorKind::Validation.http_status(), 422);
        assert_eq!(ErrorKind::Cycle.http_status(), 422);
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::Storage.http_status(), 500);
        assert_eq!(SUCCESS_CREATED, 201);
        assert_eq!(SUCCESS_OK, 200);
    }

    #[test]
    fn repo_not_found_becomes_service_not_found() {
        let id = Uuid::new_v4();
        let err = ServiceError::from(RepoError::NotFound(EntityRef::Quest(id)));
        assert!(matches!(err, ServiceError::NotFound(EntityRef::Quest(found)) if found == id));
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn duplicate_name_is_a_validation_failure() {
        let err = ServiceError::from(RepoError::DuplicateName {
            entity: "boss",
            name: "Ancient Wyvern".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("Ancient Wyvern"));
    }

    #[test]
    fn cascade_failure_is_storage_and_keeps_source() {
        let err = ServiceError::CascadeIncomplete {
            category_id: Uuid::new_v4(),
            source: RepoError::InvalidData("disk".to_string()),
        };
        assert_eq!(err.http_status(), 500);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(
            ServiceError::from(ValidationError::BlankField("name")).http_status(),
            422
        );
    }
}
