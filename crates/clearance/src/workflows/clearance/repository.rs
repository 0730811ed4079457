use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{ClearanceCase, ClearanceItem, StudentId};

/// Storage abstraction around one case per student. Mutations go through
/// `update`, which must be applied atomically against the stored version:
/// the incoming case carries `stored.version + 1`, and a mismatch is a
/// `Conflict`. That keeps the duplicate-vote check sound when two staff
/// decide the same form concurrently. Cases for different students are
/// independent.
pub trait CaseRepository: Send + Sync {
    fn insert(&self, case: ClearanceCase) -> Result<(), RepositoryError>;
    fn update(&self, case: ClearanceCase) -> Result<(), RepositoryError>;
    fn fetch(&self, student_id: &StudentId) -> Result<Option<ClearanceCase>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("case version conflict, refetch and retry")]
    Conflict,
    #[error("case not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification emitted after a state transition commits. Delivery
/// is fire-and-forget: a publish failure never rolls the transition back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearanceEvent {
    pub student_id: StudentId,
    pub item: ClearanceItem,
    pub new_status: &'static str,
    pub actor_id: String,
    pub occurred_at: DateTime<Utc>,
}

/// Trait describing the outbound notification hook (e-mail, in-app, etc.).
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: ClearanceEvent) -> Result<(), EventError>;
}

/// Event dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("event transport unavailable: {0}")]
    Transport(String),
}
