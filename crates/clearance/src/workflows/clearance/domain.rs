use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for students owning a clearance case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub String);

/// Academic or administrative department, matched by name ignoring case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Department(pub String);

impl Department {
    pub const REGISTRAR: &'static str = "Registrar";
    pub const STUDENT_SUPPORT: &'static str = "StudentSupport";
    pub const FINANCE: &'static str = "Finance";
    pub const HEALTH_SERVICES: &'static str = "HealthServices";
    pub const LIBRARY: &'static str = "Library";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.0.trim().eq_ignore_ascii_case(name)
    }

    pub fn matches(&self, other: &Department) -> bool {
        self.is_named(other.0.trim())
    }

    /// Departmental heads operate out of offices carrying "HOD" as a word
    /// in the name. Matching whole tokens keeps names like "Methodist
    /// Studies" out of scope.
    pub fn is_hod_office(&self) -> bool {
        self.0
            .split_whitespace()
            .any(|token| token.eq_ignore_ascii_case("HOD"))
    }

    /// Administrative departments never own students, so a school officer
    /// cannot act for them.
    pub fn is_administrative(&self) -> bool {
        self.is_hod_office()
            || [
                Self::REGISTRAR,
                Self::STUDENT_SUPPORT,
                Self::FINANCE,
                Self::HEALTH_SERVICES,
                Self::LIBRARY,
            ]
            .iter()
            .any(|name| self.is_named(name))
    }
}

/// Staff roles the policy table recognizes. `Admin` is the superuser
/// override and may act on any item regardless of department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    DeputyRegistrar,
    SchoolOfficer,
    DepartmentHead,
    StudentSupport,
    Finance,
    Library,
    Health,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::DeputyRegistrar => "deputyRegistrar",
            Role::SchoolOfficer => "schoolOfficer",
            Role::DepartmentHead => "departmentHead",
            Role::StudentSupport => "studentSupport",
            Role::Finance => "finance",
            Role::Library => "library",
            Role::Health => "health",
            Role::Admin => "admin",
        }
    }
}

/// Caller identity supplied by the external authentication collaborator on
/// every engine call. The engine never issues or validates credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub user_id: String,
    pub department: Department,
    pub role: Role,
    #[serde(default)]
    pub managed_departments: Vec<Department>,
}

/// The five clearance forms, in portal order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    NewClearance,
    ProvAdmission,
    PersonalRecord,
    PersonalRecord2,
    Affidavit,
}

impl FormType {
    pub const ALL: [FormType; 5] = [
        FormType::NewClearance,
        FormType::ProvAdmission,
        FormType::PersonalRecord,
        FormType::PersonalRecord2,
        FormType::Affidavit,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            FormType::NewClearance => "new_clearance",
            FormType::ProvAdmission => "prov_admission",
            FormType::PersonalRecord => "personal_record",
            FormType::PersonalRecord2 => "personal_record2",
            FormType::Affidavit => "affidavit",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|form| form.label() == raw)
    }
}

/// Supporting documents the portal collects. The JAMB/WAEC family is routed
/// by `managed_departments` rather than a single authorizing department.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    AdmissionLetter,
    JambResult,
    JambAdmissionLetter,
    WaecResult,
    BirthCertificate,
    StateOfOrigin,
    MedicalReport,
    Transcript,
}

impl DocumentType {
    pub const ALL: [DocumentType; 8] = [
        DocumentType::AdmissionLetter,
        DocumentType::JambResult,
        DocumentType::JambAdmissionLetter,
        DocumentType::WaecResult,
        DocumentType::BirthCertificate,
        DocumentType::StateOfOrigin,
        DocumentType::MedicalReport,
        DocumentType::Transcript,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            DocumentType::AdmissionLetter => "admission_letter",
            DocumentType::JambResult => "jamb_result",
            DocumentType::JambAdmissionLetter => "jamb_admission_letter",
            DocumentType::WaecResult => "waec_result",
            DocumentType::BirthCertificate => "birth_certificate",
            DocumentType::StateOfOrigin => "state_of_origin",
            DocumentType::MedicalReport => "medical_report",
            DocumentType::Transcript => "transcript",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|doc| doc.label() == raw)
    }

    pub const fn is_jamb_family(self) -> bool {
        matches!(
            self,
            DocumentType::JambResult
                | DocumentType::JambAdmissionLetter
                | DocumentType::WaecResult
        )
    }
}

/// Either side of the clearance checklist, used by unlock projections and
/// outbound events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "item", rename_all = "snake_case")]
pub enum ClearanceItem {
    Form(FormType),
    Document(DocumentType),
}

impl ClearanceItem {
    pub const fn label(self) -> &'static str {
        match self {
            ClearanceItem::Form(form) => form.label(),
            ClearanceItem::Document(doc) => doc.label(),
        }
    }
}

/// Per-form lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Locked,
    Unlocked,
    Submitted,
    Approved,
    Rejected,
}

impl FormStatus {
    pub const fn label(self) -> &'static str {
        match self {
            FormStatus::Locked => "locked",
            FormStatus::Unlocked => "unlocked",
            FormStatus::Submitted => "submitted",
            FormStatus::Approved => "approved",
            FormStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, FormStatus::Approved | FormStatus::Rejected)
    }
}

/// Per-document lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    NotUploaded,
    Uploaded,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentStatus::NotUploaded => "not_uploaded",
            DocumentStatus::Uploaded => "uploaded",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
        }
    }
}

/// One required role's standing on a form or document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Pending,
    Approved,
    Rejected,
}

impl Decision {
    pub const fn label(self) -> &'static str {
        match self {
            Decision::Pending => "pending",
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }
}

/// Decision supplied by a staff member. `Pending` is never a valid input,
/// so the request type excludes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for Decision {
    fn from(value: ReviewDecision) -> Self {
        match value {
            ReviewDecision::Approved => Decision::Approved,
            ReviewDecision::Rejected => Decision::Rejected,
        }
    }
}

/// One required role's pending/approved/rejected vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalVote {
    pub required_role: Role,
    pub decision: Decision,
    pub actor_id: Option<String>,
    pub comments: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl ApprovalVote {
    pub fn pending(required_role: Role) -> Self {
        Self {
            required_role,
            decision: Decision::Pending,
            actor_id: None,
            comments: None,
            decided_at: None,
        }
    }
}

/// Form-type-specific payloads, discriminated by form type so a submission
/// can never carry a mismatched body. The engine stores them opaquely and
/// never validates field contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum FormPayload {
    NewClearance(NewClearanceDetails),
    ProvAdmission(ProvAdmissionDetails),
    PersonalRecord(PersonalRecordDetails),
    PersonalRecord2(NextOfKinDetails),
    Affidavit(AffidavitDetails),
}

impl FormPayload {
    pub const fn form_type(&self) -> FormType {
        match self {
            FormPayload::NewClearance(_) => FormType::NewClearance,
            FormPayload::ProvAdmission(_) => FormType::ProvAdmission,
            FormPayload::PersonalRecord(_) => FormType::PersonalRecord,
            FormPayload::PersonalRecord2(_) => FormType::PersonalRecord2,
            FormPayload::Affidavit(_) => FormType::Affidavit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClearanceDetails {
    pub jamb_registration_number: String,
    pub matriculation_number: String,
    pub mode_of_entry: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvAdmissionDetails {
    pub admission_session: String,
    pub faculty: String,
    pub programme: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalRecordDetails {
    pub surname: String,
    pub first_name: String,
    pub date_of_birth: NaiveDate,
    pub nationality: String,
    pub state_of_origin: String,
    pub contact_address: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextOfKinDetails {
    pub next_of_kin_name: String,
    pub relationship: String,
    pub next_of_kin_address: String,
    pub next_of_kin_phone: String,
    pub sponsor_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffidavitDetails {
    pub deponent_name: String,
    pub sworn_before: String,
    pub sworn_on: NaiveDate,
}

/// Lifecycle record for one form. Never deleted, only transitioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    pub status: FormStatus,
    pub payload: Option<FormPayload>,
    pub approvals: Vec<ApprovalVote>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl FormRecord {
    fn with_status(status: FormStatus) -> Self {
        Self {
            status,
            payload: None,
            approvals: Vec::new(),
            submitted_at: None,
            decided_at: None,
        }
    }

    pub fn vote(&self, role: Role) -> Option<&ApprovalVote> {
        self.approvals.iter().find(|vote| vote.required_role == role)
    }
}

/// Lifecycle record for one supporting document. File bytes live with the
/// external storage collaborator; only the storage key passes through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub status: DocumentStatus,
    pub storage_key: Option<String>,
    pub vote: Option<ApprovalVote>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl DocumentRecord {
    fn not_uploaded() -> Self {
        Self {
            status: DocumentStatus::NotUploaded,
            storage_key: None,
            vote: None,
            uploaded_at: None,
            decided_at: None,
        }
    }
}

/// The full approval state for one student across all forms and documents.
///
/// `version` backs the optimistic concurrency check in the repository: a
/// mutation bumps it by one and the store only applies the write when the
/// stored version is exactly one behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceCase {
    pub student_id: StudentId,
    pub student_department: Department,
    pub version: u64,
    pub forms: BTreeMap<FormType, FormRecord>,
    pub documents: BTreeMap<DocumentType, DocumentRecord>,
}

impl ClearanceCase {
    /// Lazy-create seed: every form Locked except NewClearance, every
    /// document NotUploaded.
    pub fn new(student_id: StudentId, student_department: Department) -> Self {
        let forms = FormType::ALL
            .into_iter()
            .map(|form| {
                let status = if form == FormType::NewClearance {
                    FormStatus::Unlocked
                } else {
                    FormStatus::Locked
                };
                (form, FormRecord::with_status(status))
            })
            .collect();

        let documents = DocumentType::ALL
            .into_iter()
            .map(|doc| (doc, DocumentRecord::not_uploaded()))
            .collect();

        Self {
            student_id,
            student_department,
            version: 0,
            forms,
            documents,
        }
    }

    pub fn form(&self, form_type: FormType) -> &FormRecord {
        self.forms
            .get(&form_type)
            .expect("form record seeded for every form type")
    }

    pub(crate) fn form_mut(&mut self, form_type: FormType) -> &mut FormRecord {
        self.forms
            .get_mut(&form_type)
            .expect("form record seeded for every form type")
    }

    pub fn document(&self, doc_type: DocumentType) -> &DocumentRecord {
        self.documents
            .get(&doc_type)
            .expect("document record seeded for every document type")
    }

    pub(crate) fn document_mut(&mut self, doc_type: DocumentType) -> &mut DocumentRecord {
        self.documents
            .get_mut(&doc_type)
            .expect("document record seeded for every document type")
    }

    /// The portal's final verdict: every form and every document approved.
    pub fn is_cleared(&self) -> bool {
        self.forms
            .values()
            .all(|record| record.status == FormStatus::Approved)
            && self
                .documents
                .values()
                .all(|record| record.status == DocumentStatus::Approved)
    }
}
