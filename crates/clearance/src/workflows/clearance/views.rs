use chrono::{DateTime, Utc};
use serde::Serialize;

use super::dependency;
use super::domain::{ApprovalVote, ClearanceCase, FormRecord, FormType};

/// Sanitized projection of one case for API responses. Lock state is
/// derived here once so no screen recomputes it.
#[derive(Debug, Clone, Serialize)]
pub struct CaseView {
    pub student_id: String,
    pub student_department: String,
    pub cleared: bool,
    pub forms: Vec<FormView>,
    pub documents: Vec<DocumentView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub form_type: &'static str,
    pub status: &'static str,
    pub unlocked: bool,
    pub votes: Vec<VoteView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoteView {
    pub role: &'static str,
    pub decision: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub document_type: &'static str,
    pub status: &'static str,
    pub unlocked: bool,
    pub can_upload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote: Option<VoteView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

impl CaseView {
    pub fn project(case: &ClearanceCase) -> Self {
        let documents_open = dependency::documents_unlocked(case);

        let forms = case
            .forms
            .iter()
            .map(|(form_type, record)| {
                form_view(record, dependency::form_unlocked(*form_type, case), *form_type)
            })
            .collect();

        let documents = case
            .documents
            .iter()
            .map(|(doc_type, record)| DocumentView {
                document_type: doc_type.label(),
                status: record.status.label(),
                unlocked: documents_open,
                can_upload: case.can_upload(*doc_type),
                vote: record.vote.as_ref().map(vote_view),
                uploaded_at: record.uploaded_at,
                decided_at: record.decided_at,
            })
            .collect();

        Self {
            student_id: case.student_id.0.clone(),
            student_department: case.student_department.0.clone(),
            cleared: case.is_cleared(),
            forms,
            documents,
        }
    }
}

fn form_view(record: &FormRecord, unlocked: bool, form_type: FormType) -> FormView {
    FormView {
        form_type: form_type.label(),
        status: record.status.label(),
        unlocked,
        votes: record.approvals.iter().map(vote_view).collect(),
        submitted_at: record.submitted_at,
        decided_at: record.decided_at,
    }
}

fn vote_view(vote: &ApprovalVote) -> VoteView {
    VoteView {
        role: vote.required_role.label(),
        decision: vote.decision.label(),
        actor_id: vote.actor_id.clone(),
        comments: vote.comments.clone(),
        decided_at: vote.decided_at,
    }
}
