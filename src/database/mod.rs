pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use models::{Cohort, CohortFields, NewUser, Student, StudentInput, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by storage backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Duplicate value for unique field: {0}")]
    Duplicate(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Parse a path identifier into a record id
pub fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

/// Credential storage. Email uniqueness is enforced here, not by callers.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a user; a taken email fails with [`StoreError::Duplicate`]
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
}

#[async_trait]
pub trait CohortStore: Send + Sync {
    async fn list_cohorts(&self) -> Result<Vec<Cohort>, StoreError>;

    async fn find_cohort(&self, id: Uuid) -> Result<Option<Cohort>, StoreError>;

    /// Fetch every cohort whose id is in `ids`; unknown ids are skipped
    async fn find_cohorts(&self, ids: &[Uuid]) -> Result<Vec<Cohort>, StoreError>;

    async fn create_cohort(&self, fields: CohortFields) -> Result<Cohort, StoreError>;

    /// Apply the fields present in `patch`; `None` when the cohort is absent
    async fn update_cohort(
        &self,
        id: Uuid,
        patch: CohortFields,
    ) -> Result<Option<Cohort>, StoreError>;

    /// Remove a cohort. Students referencing it are left untouched.
    async fn delete_cohort(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn list_students(&self) -> Result<Vec<Student>, StoreError>;

    async fn list_students_by_cohort(&self, cohort_id: Uuid) -> Result<Vec<Student>, StoreError>;

    async fn find_student(&self, id: Uuid) -> Result<Option<Student>, StoreError>;

    async fn create_student(&self, input: StudentInput) -> Result<Student, StoreError>;

    async fn update_student(
        &self,
        id: Uuid,
        patch: StudentInput,
    ) -> Result<Option<Student>, StoreError>;

    async fn delete_student(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Everything the HTTP layer needs from a backend
#[async_trait]
pub trait Storage: UserStore + CohortStore + StudentStore {
    /// Cheap connectivity probe for health checks
    async fn ping(&self) -> Result<(), StoreError>;
}
