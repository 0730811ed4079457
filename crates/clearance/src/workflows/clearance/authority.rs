//! Role-authority resolver: the single policy table deciding which staff
//! member may act on which form or document. Every caller depends on this
//! module; none reimplements the mapping.

use super::domain::{ActorContext, ClearanceItem, Department, DocumentType, FormType, Role};

/// Required approver roles per form, in portal order. NewClearance is
/// sequential (deputy registrar before school officer); ProvAdmission is
/// parallel and order-free.
pub fn required_roles(form_type: FormType) -> &'static [Role] {
    match form_type {
        FormType::NewClearance => &[Role::DeputyRegistrar, Role::SchoolOfficer],
        FormType::ProvAdmission => &[
            Role::DeputyRegistrar,
            Role::DepartmentHead,
            Role::StudentSupport,
            Role::Finance,
            Role::Library,
            Role::Health,
        ],
        FormType::PersonalRecord | FormType::PersonalRecord2 => &[Role::StudentSupport],
        FormType::Affidavit => &[Role::DeputyRegistrar],
    }
}

/// A slot that may only be decided after another slot's Approved vote.
pub fn sequential_predecessor(form_type: FormType, slot: Role) -> Option<Role> {
    match (form_type, slot) {
        (FormType::NewClearance, Role::SchoolOfficer) => Some(Role::DeputyRegistrar),
        _ => None,
    }
}

/// Which department may sign off a document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentAuthority {
    /// A single named administrative department.
    Department(&'static str),
    /// Any department whose name contains "HOD".
    HodOffice,
    /// Staff whose `managed_departments` contains the owner's department
    /// (the JAMB/WAEC family).
    ManagedDepartment,
}

pub fn document_authority(doc_type: DocumentType) -> DocumentAuthority {
    match doc_type {
        DocumentType::AdmissionLetter | DocumentType::BirthCertificate => {
            DocumentAuthority::Department(Department::REGISTRAR)
        }
        DocumentType::StateOfOrigin => DocumentAuthority::Department(Department::STUDENT_SUPPORT),
        DocumentType::MedicalReport => DocumentAuthority::Department(Department::HEALTH_SERVICES),
        DocumentType::Transcript => DocumentAuthority::HodOffice,
        DocumentType::JambResult
        | DocumentType::JambAdmissionLetter
        | DocumentType::WaecResult => DocumentAuthority::ManagedDepartment,
    }
}

fn department_matches(actor: &ActorContext, slot: Role, owner_department: &Department) -> bool {
    match slot {
        Role::DeputyRegistrar => actor.department.is_named(Department::REGISTRAR),
        Role::SchoolOfficer => {
            actor.department.matches(owner_department) && !owner_department.is_administrative()
        }
        Role::DepartmentHead => actor.department.is_hod_office(),
        Role::StudentSupport => actor.department.is_named(Department::STUDENT_SUPPORT),
        Role::Finance => actor.department.is_named(Department::FINANCE),
        Role::Library => actor.department.is_named(Department::LIBRARY),
        Role::Health => actor.department.is_named(Department::HEALTH_SERVICES),
        Role::Admin => true,
    }
}

/// May the actor decide the given role slot on the given form? Returns
/// `false` rather than erroring; callers turn refusal into `Unauthorized`
/// at the boundary.
pub fn can_act_as(
    actor: &ActorContext,
    slot: Role,
    form_type: FormType,
    owner_department: &Department,
) -> bool {
    if !required_roles(form_type).contains(&slot) {
        return false;
    }
    if actor.role == Role::Admin {
        return true;
    }
    actor.role == slot && department_matches(actor, slot, owner_department)
}

/// May the actor decide the given document for the given owner?
pub fn can_approve_document(
    actor: &ActorContext,
    doc_type: DocumentType,
    owner_department: &Department,
) -> bool {
    if actor.role == Role::Admin {
        return true;
    }
    match document_authority(doc_type) {
        DocumentAuthority::Department(name) => actor.department.is_named(name),
        DocumentAuthority::HodOffice => actor.department.is_hod_office(),
        DocumentAuthority::ManagedDepartment => actor
            .managed_departments
            .iter()
            .any(|department| department.matches(owner_department)),
    }
}

/// Coarse "may approve" projection over any item, used by screens to decide
/// what to render as actionable. The NewClearance sequential gate is state
/// dependent and enforced by the case, not here.
pub fn can_approve(actor: &ActorContext, item: ClearanceItem, owner_department: &Department) -> bool {
    match item {
        ClearanceItem::Form(form_type) => required_roles(form_type)
            .iter()
            .any(|slot| can_act_as(actor, *slot, form_type, owner_department)),
        ClearanceItem::Document(doc_type) => {
            can_approve_document(actor, doc_type, owner_department)
        }
    }
}
