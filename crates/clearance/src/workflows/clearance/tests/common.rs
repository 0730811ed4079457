use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::workflows::clearance::domain::{
    ActorContext, AffidavitDetails, ClearanceCase, Department, FormPayload, NewClearanceDetails,
    NextOfKinDetails, PersonalRecordDetails, ProvAdmissionDetails, ReviewDecision, Role, StudentId,
};
use crate::workflows::clearance::repository::{
    CaseRepository, ClearanceEvent, EventError, EventPublisher, RepositoryError,
};
use crate::workflows::clearance::service::ClearanceService;
use crate::workflows::clearance::FormType;

pub(super) const OWNER_DEPARTMENT: &str = "Computer Science";

pub(super) fn student() -> StudentId {
    StudentId("CSC/2024/0042".to_string())
}

pub(super) fn owner_department() -> Department {
    Department::new(OWNER_DEPARTMENT)
}

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn actor(user_id: &str, department: &str, role: Role) -> ActorContext {
    ActorContext {
        user_id: user_id.to_string(),
        department: Department::new(department),
        role,
        managed_departments: Vec::new(),
    }
}

pub(super) fn deputy_registrar() -> ActorContext {
    actor("staff-dr-01", Department::REGISTRAR, Role::DeputyRegistrar)
}

pub(super) fn school_officer() -> ActorContext {
    actor("staff-so-07", OWNER_DEPARTMENT, Role::SchoolOfficer)
}

pub(super) fn department_head() -> ActorContext {
    actor("staff-hod-03", "HOD Computer Science", Role::DepartmentHead)
}

pub(super) fn student_support_officer() -> ActorContext {
    actor("staff-ss-11", Department::STUDENT_SUPPORT, Role::StudentSupport)
}

pub(super) fn finance_officer() -> ActorContext {
    actor("staff-fin-05", Department::FINANCE, Role::Finance)
}

pub(super) fn librarian() -> ActorContext {
    actor("staff-lib-02", Department::LIBRARY, Role::Library)
}

pub(super) fn health_officer() -> ActorContext {
    actor("staff-med-09", Department::HEALTH_SERVICES, Role::Health)
}

pub(super) fn admin() -> ActorContext {
    actor("staff-admin-00", "ICT", Role::Admin)
}

pub(super) fn jamb_officer(managed: &[&str]) -> ActorContext {
    let mut officer = actor("staff-jamb-04", "Admissions", Role::SchoolOfficer);
    officer.managed_departments = managed.iter().map(|name| Department::new(*name)).collect();
    officer
}

pub(super) fn new_clearance_payload() -> FormPayload {
    FormPayload::NewClearance(NewClearanceDetails {
        jamb_registration_number: "20246001234AB".to_string(),
        matriculation_number: "CSC/2024/0042".to_string(),
        mode_of_entry: "UTME".to_string(),
    })
}

pub(super) fn prov_admission_payload() -> FormPayload {
    FormPayload::ProvAdmission(ProvAdmissionDetails {
        admission_session: "2024/2025".to_string(),
        faculty: "Physical Sciences".to_string(),
        programme: "B.Sc. Computer Science".to_string(),
    })
}

pub(super) fn personal_record_payload() -> FormPayload {
    FormPayload::PersonalRecord(PersonalRecordDetails {
        surname: "Adeyemi".to_string(),
        first_name: "Chinedu".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(2005, 6, 14).expect("valid date"),
        nationality: "Nigerian".to_string(),
        state_of_origin: "Anambra".to_string(),
        contact_address: "14 University Road".to_string(),
        phone: "+2348012345678".to_string(),
    })
}

pub(super) fn next_of_kin_payload() -> FormPayload {
    FormPayload::PersonalRecord2(NextOfKinDetails {
        next_of_kin_name: "Ngozi Adeyemi".to_string(),
        relationship: "Mother".to_string(),
        next_of_kin_address: "22 Market Street".to_string(),
        next_of_kin_phone: "+2348098765432".to_string(),
        sponsor_name: "Ngozi Adeyemi".to_string(),
    })
}

pub(super) fn affidavit_payload() -> FormPayload {
    FormPayload::Affidavit(AffidavitDetails {
        deponent_name: "Chinedu Adeyemi".to_string(),
        sworn_before: "High Court Registry, Awka".to_string(),
        sworn_on: NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid date"),
    })
}

/// Fresh case with NewClearance unlocked and nothing submitted.
pub(super) fn fresh_case() -> ClearanceCase {
    ClearanceCase::new(student(), owner_department())
}

/// Case driven through submission and both sequential approvals, so the
/// unlock cascade has fired.
pub(super) fn cascaded_case() -> ClearanceCase {
    let mut case = fresh_case();
    case.submit_form(new_clearance_payload(), fixed_now())
        .expect("submit succeeds");
    case.decide_form(
        FormType::NewClearance,
        Role::DeputyRegistrar,
        &deputy_registrar(),
        ReviewDecision::Approved,
        None,
        fixed_now(),
    )
    .expect("deputy approves");
    case.decide_form(
        FormType::NewClearance,
        Role::SchoolOfficer,
        &school_officer(),
        ReviewDecision::Approved,
        None,
        fixed_now(),
    )
    .expect("school officer approves");
    case
}

#[derive(Default, Clone)]
pub(super) struct MemoryCaseRepository {
    pub(super) cases: Arc<Mutex<HashMap<StudentId, ClearanceCase>>>,
}

impl CaseRepository for MemoryCaseRepository {
    fn insert(&self, case: ClearanceCase) -> Result<(), RepositoryError> {
        let mut guard = self.cases.lock().expect("repository mutex poisoned");
        if guard.contains_key(&case.student_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(case.student_id.clone(), case);
        Ok(())
    }

    fn update(&self, case: ClearanceCase) -> Result<(), RepositoryError> {
        let mut guard = self.cases.lock().expect("repository mutex poisoned");
        let stored = guard
            .get(&case.student_id)
            .ok_or(RepositoryError::NotFound)?;
        if case.version != stored.version + 1 {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(case.student_id.clone(), case);
        Ok(())
    }

    fn fetch(&self, student_id: &StudentId) -> Result<Option<ClearanceCase>, RepositoryError> {
        let guard = self.cases.lock().expect("repository mutex poisoned");
        Ok(guard.get(student_id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryEvents {
    events: Arc<Mutex<Vec<ClearanceEvent>>>,
}

impl MemoryEvents {
    pub(super) fn events(&self) -> Vec<ClearanceEvent> {
        self.events.lock().expect("event mutex poisoned").clone()
    }
}

impl EventPublisher for MemoryEvents {
    fn publish(&self, event: ClearanceEvent) -> Result<(), EventError> {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .push(event);
        Ok(())
    }
}

/// Publisher that always fails, for asserting fire-and-forget delivery.
pub(super) struct FailingEvents;

impl EventPublisher for FailingEvents {
    fn publish(&self, _event: ClearanceEvent) -> Result<(), EventError> {
        Err(EventError::Transport("notifier offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    ClearanceService<MemoryCaseRepository, MemoryEvents>,
    Arc<MemoryCaseRepository>,
    Arc<MemoryEvents>,
) {
    let repository = Arc::new(MemoryCaseRepository::default());
    let events = Arc::new(MemoryEvents::default());
    let service = ClearanceService::new(repository.clone(), events.clone());
    (service, repository, events)
}
