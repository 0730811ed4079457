//! Clearance case state machine. Every operation validates fully before
//! mutating, so a policy error always leaves the case unchanged.

use chrono::{DateTime, Utc};

use super::aggregate;
use super::authority;
use super::dependency;
use super::domain::{
    ActorContext, ApprovalVote, ClearanceCase, ClearanceItem, Decision, DocumentStatus,
    DocumentType, FormPayload, FormStatus, FormType, ReviewDecision, Role,
};

/// Policy violations raised by the engine. All are terminal from the
/// engine's perspective; nothing here is retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClearanceError {
    #[error("clearance case or item not found")]
    NotFound,
    #[error("item is locked until the new clearance form is approved")]
    NotUnlocked,
    #[error("item has already been submitted")]
    AlreadySubmitted,
    #[error("item is not awaiting a decision")]
    NotSubmitted,
    #[error("actor is not authorized to decide this item")]
    Unauthorized,
    #[error("this role has already voted on the item")]
    DuplicateVote,
    #[error("comments are required when rejecting")]
    CommentRequired,
}

fn normalized_comments(comments: Option<&str>) -> Option<String> {
    comments
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

impl ClearanceCase {
    /// Submit a form. Rejected forms re-enter through the same path: the
    /// previous votes are discarded and a fresh Pending slate is seeded, one
    /// vote per required role.
    pub fn submit_form(
        &mut self,
        payload: FormPayload,
        now: DateTime<Utc>,
    ) -> Result<FormStatus, ClearanceError> {
        let form_type = payload.form_type();
        let record = self.form_mut(form_type);

        match record.status {
            FormStatus::Locked => return Err(ClearanceError::NotUnlocked),
            FormStatus::Submitted | FormStatus::Approved => {
                return Err(ClearanceError::AlreadySubmitted)
            }
            FormStatus::Unlocked | FormStatus::Rejected => {}
        }

        record.status = FormStatus::Submitted;
        record.payload = Some(payload);
        record.submitted_at = Some(now);
        record.decided_at = None;
        record.approvals = authority::required_roles(form_type)
            .iter()
            .copied()
            .map(ApprovalVote::pending)
            .collect();

        Ok(FormStatus::Submitted)
    }

    /// Record one role's decision on a submitted form and recompute the
    /// derived status. Approving NewClearance triggers the unlock cascade.
    pub fn decide_form(
        &mut self,
        form_type: FormType,
        slot: Role,
        actor: &ActorContext,
        decision: ReviewDecision,
        comments: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<FormStatus, ClearanceError> {
        let owner_department = self.student_department.clone();
        let record = self.form_mut(form_type);

        if record.status != FormStatus::Submitted {
            return Err(ClearanceError::NotSubmitted);
        }

        if !authority::can_act_as(actor, slot, form_type, &owner_department) {
            return Err(ClearanceError::Unauthorized);
        }

        if let Some(predecessor) = authority::sequential_predecessor(form_type, slot) {
            let predecessor_approved = record
                .vote(predecessor)
                .map(|vote| vote.decision == Decision::Approved)
                .unwrap_or(false);
            if !predecessor_approved {
                return Err(ClearanceError::Unauthorized);
            }
        }

        let vote = record
            .approvals
            .iter_mut()
            .find(|vote| vote.required_role == slot)
            .ok_or(ClearanceError::Unauthorized)?;
        if vote.decision != Decision::Pending {
            return Err(ClearanceError::DuplicateVote);
        }

        let comments = normalized_comments(comments);
        if decision == ReviewDecision::Rejected && comments.is_none() {
            return Err(ClearanceError::CommentRequired);
        }

        vote.decision = decision.into();
        vote.actor_id = Some(actor.user_id.clone());
        vote.comments = comments;
        vote.decided_at = Some(now);

        match aggregate::derive_status(&record.approvals) {
            Decision::Approved => {
                record.status = FormStatus::Approved;
                record.decided_at = Some(now);
            }
            Decision::Rejected => {
                record.status = FormStatus::Rejected;
                record.decided_at = Some(now);
            }
            Decision::Pending => {}
        }

        let new_status = record.status;
        if form_type == FormType::NewClearance && new_status == FormStatus::Approved {
            self.unlock_dependents();
        }

        Ok(new_status)
    }

    /// Document gate: upload eligibility coupled to the unlock cascade.
    pub fn can_upload(&self, doc_type: DocumentType) -> bool {
        dependency::documents_unlocked(self)
            && matches!(
                self.document(doc_type).status,
                DocumentStatus::NotUploaded | DocumentStatus::Rejected
            )
    }

    /// Register an uploaded document. Re-upload after rejection discards the
    /// previous vote.
    pub fn upload_document(
        &mut self,
        doc_type: DocumentType,
        storage_key: String,
        now: DateTime<Utc>,
    ) -> Result<DocumentStatus, ClearanceError> {
        if !dependency::documents_unlocked(self) {
            return Err(ClearanceError::NotUnlocked);
        }

        let record = self.document_mut(doc_type);
        match record.status {
            DocumentStatus::Uploaded | DocumentStatus::Approved => {
                return Err(ClearanceError::AlreadySubmitted)
            }
            DocumentStatus::NotUploaded | DocumentStatus::Rejected => {}
        }

        record.status = DocumentStatus::Uploaded;
        record.storage_key = Some(storage_key);
        record.uploaded_at = Some(now);
        record.vote = None;
        record.decided_at = None;

        Ok(DocumentStatus::Uploaded)
    }

    /// Decide an uploaded document. Documents carry a single approver slot,
    /// so the first recorded decision is terminal; a second authorized
    /// officer hitting the same slot gets `DuplicateVote`.
    pub fn decide_document(
        &mut self,
        doc_type: DocumentType,
        actor: &ActorContext,
        decision: ReviewDecision,
        comments: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<DocumentStatus, ClearanceError> {
        let owner_department = self.student_department.clone();
        let record = self.document_mut(doc_type);

        match record.status {
            DocumentStatus::Uploaded => {}
            DocumentStatus::Approved | DocumentStatus::Rejected => {
                return Err(ClearanceError::DuplicateVote)
            }
            DocumentStatus::NotUploaded => return Err(ClearanceError::NotSubmitted),
        }

        if !authority::can_approve_document(actor, doc_type, &owner_department) {
            return Err(ClearanceError::Unauthorized);
        }

        let comments = normalized_comments(comments);
        if decision == ReviewDecision::Rejected && comments.is_none() {
            return Err(ClearanceError::CommentRequired);
        }

        let vote = ApprovalVote {
            required_role: actor.role,
            decision: decision.into(),
            actor_id: Some(actor.user_id.clone()),
            comments,
            decided_at: Some(now),
        };

        record.status = match aggregate::derive_status(std::slice::from_ref(&vote)) {
            Decision::Approved => DocumentStatus::Approved,
            Decision::Rejected => DocumentStatus::Rejected,
            Decision::Pending => DocumentStatus::Uploaded,
        };
        record.vote = Some(vote);
        record.decided_at = Some(now);

        Ok(record.status)
    }

    /// Every currently reachable form and document.
    pub fn unlocked_items(&self) -> Vec<ClearanceItem> {
        dependency::unlocked_items(self)
    }

    fn unlock_dependents(&mut self) {
        for (form_type, record) in &mut self.forms {
            if *form_type != FormType::NewClearance && record.status == FormStatus::Locked {
                record.status = FormStatus::Unlocked;
            }
        }
    }
}
