use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use super::case::ClearanceError;
use super::domain::{
    ActorContext, ClearanceCase, ClearanceItem, Department, DocumentStatus, DocumentType,
    FormPayload, FormStatus, FormType, ReviewDecision, Role, StudentId,
};
use super::repository::{CaseRepository, ClearanceEvent, EventPublisher, RepositoryError};

/// Facade composing the case state machine with the repository and the
/// notification hook. Each operation loads one case, applies the engine,
/// persists under the optimistic version check, then publishes.
pub struct ClearanceService<R, N> {
    repository: Arc<R>,
    events: Arc<N>,
}

impl<R, N> ClearanceService<R, N>
where
    R: CaseRepository + 'static,
    N: EventPublisher + 'static,
{
    pub fn new(repository: Arc<R>, events: Arc<N>) -> Self {
        Self { repository, events }
    }

    /// Full case projection for rendering lock state.
    pub fn case(&self, student_id: &StudentId) -> Result<ClearanceCase, ClearanceServiceError> {
        self.repository
            .fetch(student_id)?
            .ok_or(ClearanceServiceError::Policy(ClearanceError::NotFound))
    }

    /// Submit a form, lazily creating the case the first time the student
    /// touches any form.
    pub fn submit_form(
        &self,
        student_id: &StudentId,
        student_department: &Department,
        payload: FormPayload,
        actor_id: &str,
    ) -> Result<ClearanceCase, ClearanceServiceError> {
        let now = Utc::now();
        let (mut case, fresh) = match self.repository.fetch(student_id)? {
            Some(case) => (case, false),
            None => (
                ClearanceCase::new(student_id.clone(), student_department.clone()),
                true,
            ),
        };

        let form_type = payload.form_type();
        let status = case.submit_form(payload, now)?;
        self.persist(&mut case, fresh)?;
        self.emit(ClearanceEvent {
            student_id: student_id.clone(),
            item: ClearanceItem::Form(form_type),
            new_status: status.label(),
            actor_id: actor_id.to_string(),
            occurred_at: now,
        });

        Ok(case)
    }

    /// Record one role's decision on a form. Events fire only when the
    /// aggregate turns terminal; an intermediate vote is silent.
    pub fn decide_form(
        &self,
        student_id: &StudentId,
        form_type: FormType,
        slot: Role,
        actor: &ActorContext,
        decision: ReviewDecision,
        comments: Option<&str>,
    ) -> Result<ClearanceCase, ClearanceServiceError> {
        let now = Utc::now();
        let mut case = self.case(student_id)?;
        let status = case.decide_form(form_type, slot, actor, decision, comments, now)?;
        self.persist(&mut case, false)?;

        if status.is_terminal() {
            self.emit(ClearanceEvent {
                student_id: student_id.clone(),
                item: ClearanceItem::Form(form_type),
                new_status: status.label(),
                actor_id: actor.user_id.clone(),
                occurred_at: now,
            });
        }

        Ok(case)
    }

    /// Register a document upload once the gate is open.
    pub fn upload_document(
        &self,
        student_id: &StudentId,
        doc_type: DocumentType,
        storage_key: String,
        actor_id: &str,
    ) -> Result<ClearanceCase, ClearanceServiceError> {
        let now = Utc::now();
        let mut case = self.case(student_id)?;
        let status = case.upload_document(doc_type, storage_key, now)?;
        self.persist(&mut case, false)?;
        self.emit(ClearanceEvent {
            student_id: student_id.clone(),
            item: ClearanceItem::Document(doc_type),
            new_status: status.label(),
            actor_id: actor_id.to_string(),
            occurred_at: now,
        });

        Ok(case)
    }

    /// Decide an uploaded document; single approver slot, always terminal.
    pub fn decide_document(
        &self,
        student_id: &StudentId,
        doc_type: DocumentType,
        actor: &ActorContext,
        decision: ReviewDecision,
        comments: Option<&str>,
    ) -> Result<ClearanceCase, ClearanceServiceError> {
        let now = Utc::now();
        let mut case = self.case(student_id)?;
        let status = case.decide_document(doc_type, actor, decision, comments, now)?;
        self.persist(&mut case, false)?;

        if matches!(status, DocumentStatus::Approved | DocumentStatus::Rejected) {
            self.emit(ClearanceEvent {
                student_id: student_id.clone(),
                item: ClearanceItem::Document(doc_type),
                new_status: status.label(),
                actor_id: actor.user_id.clone(),
                occurred_at: now,
            });
        }

        Ok(case)
    }

    fn persist(&self, case: &mut ClearanceCase, fresh: bool) -> Result<(), ClearanceServiceError> {
        case.version += 1;
        if fresh {
            self.repository.insert(case.clone())?;
        } else {
            self.repository.update(case.clone())?;
        }
        Ok(())
    }

    fn emit(&self, event: ClearanceEvent) {
        if let Err(err) = self.events.publish(event) {
            warn!(error = %err, "clearance event dropped");
        }
    }
}

/// Error raised by the clearance service.
#[derive(Debug, thiserror::Error)]
pub enum ClearanceServiceError {
    #[error(transparent)]
    Policy(#[from] ClearanceError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
