//! Clearance workflow and approval-routing engine.
//!
//! A [`ClearanceCase`] is the unit of consistency: it holds every form and
//! document record for one student, exposes the only mutating operations
//! (`submit`, `decide`, `upload`), and recomputes derived lock state after
//! every mutation. Role policy lives in [`authority`], approval aggregation
//! in [`aggregate`], and the unlock rules in [`dependency`]. Persistence and
//! notification are trait boundaries so the engine stays pure compute.

pub mod aggregate;
pub mod authority;
mod case;
pub mod dependency;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use case::ClearanceError;
pub use domain::{
    ActorContext, AffidavitDetails, ApprovalVote, ClearanceCase, ClearanceItem, Decision,
    Department, DocumentRecord, DocumentStatus, DocumentType, FormPayload, FormRecord, FormStatus,
    FormType, NewClearanceDetails, NextOfKinDetails, PersonalRecordDetails, ProvAdmissionDetails,
    ReviewDecision, Role, StudentId,
};
pub use repository::{
    CaseRepository, ClearanceEvent, EventError, EventPublisher, RepositoryError,
};
pub use router::clearance_router;
pub use service::{ClearanceService, ClearanceServiceError};
pub use views::{CaseView, DocumentView, FormView, VoteView};
