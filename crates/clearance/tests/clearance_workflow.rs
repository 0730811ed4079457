//! Integration specifications for the clearance workflow engine.
//!
//! Scenarios drive the public service facade and HTTP router end to end so
//! the unlock cascade, approval routing, and error mapping are validated
//! without reaching into private modules.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use clearance::workflows::clearance::{
        ActorContext, CaseRepository, ClearanceCase, ClearanceEvent, ClearanceService, Department,
        EventError, EventPublisher, FormPayload, NewClearanceDetails, PersonalRecordDetails,
        ProvAdmissionDetails, RepositoryError, Role, StudentId,
    };

    pub(super) const OWNER_DEPARTMENT: &str = "Computer Science";

    pub(super) fn student() -> StudentId {
        StudentId("CSC-2024-0042".to_string())
    }

    pub(super) fn owner_department() -> Department {
        Department::new(OWNER_DEPARTMENT)
    }

    pub(super) fn actor(user_id: &str, department: &str, role: Role) -> ActorContext {
        ActorContext {
            user_id: user_id.to_string(),
            department: Department::new(department),
            role,
            managed_departments: Vec::new(),
        }
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

    #[derive(Default, Clone)]
    pub(super) struct MemoryRepository {
        cases: Arc<Mutex<HashMap<StudentId, ClearanceCase>>>,
    }

    impl CaseRepository for MemoryRepository {
        fn insert(&self, case: ClearanceCase) -> Result<(), RepositoryError> {
            let mut guard = self.cases.lock().expect("lock");
            if guard.contains_key(&case.student_id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(case.student_id.clone(), case);
            Ok(())
        }

        fn update(&self, case: ClearanceCase) -> Result<(), RepositoryError> {
            let mut guard = self.cases.lock().expect("lock");
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
            let guard = self.cases.lock().expect("lock");
            Ok(guard.get(student_id).cloned())
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryEvents {
        events: Arc<Mutex<Vec<ClearanceEvent>>>,
    }

    impl MemoryEvents {
        pub(super) fn events(&self) -> Vec<ClearanceEvent> {
            self.events.lock().expect("lock").clone()
        }
    }

    impl EventPublisher for MemoryEvents {
        fn publish(&self, event: ClearanceEvent) -> Result<(), EventError> {
            self.events.lock().expect("lock").push(event);
            Ok(())
        }
    }

    pub(super) fn build_service() -> (
        ClearanceService<MemoryRepository, MemoryEvents>,
        Arc<MemoryRepository>,
        Arc<MemoryEvents>,
    ) {
        let repository = Arc::new(MemoryRepository::default());
        let events = Arc::new(MemoryEvents::default());
        let service = ClearanceService::new(repository.clone(), events.clone());
        (service, repository, events)
    }
}

mod cascade {
    use super::common::*;
    use clearance::workflows::clearance::{
        ClearanceError, ClearanceItem, ClearanceServiceError, DocumentType, FormStatus, FormType,
        ReviewDecision, Role,
    };

    #[test]
    fn nothing_is_reachable_before_new_clearance_approval() {
        let (service, _, _) = build_service();
        let case = service
            .submit_form(&student(), &owner_department(), new_clearance_payload(), "s-42")
            .expect("submission");

        assert_eq!(
            case.unlocked_items(),
            vec![ClearanceItem::Form(FormType::NewClearance)]
        );

        match service.submit_form(&student(), &owner_department(), prov_admission_payload(), "s-42")
        {
            Err(ClearanceServiceError::Policy(ClearanceError::NotUnlocked)) => {}
            other => panic!("expected NotUnlocked, got {other:?}"),
        }
    }

    #[test]
    fn sequential_approvals_flip_every_gate_at_once() {
        let (service, _, _) = build_service();
        service
            .submit_form(&student(), &owner_department(), new_clearance_payload(), "s-42")
            .expect("submission");

        let case = service
            .decide_form(
                &student(),
                FormType::NewClearance,
                Role::DeputyRegistrar,
                &actor("staff-dr", "Registrar", Role::DeputyRegistrar),
                ReviewDecision::Approved,
                None,
            )
            .expect("deputy approves");
        assert_eq!(
            case.form(FormType::NewClearance).status,
            FormStatus::Submitted,
            "one of two required votes"
        );

        let case = service
            .decide_form(
                &student(),
                FormType::NewClearance,
                Role::SchoolOfficer,
                &actor("staff-so", OWNER_DEPARTMENT, Role::SchoolOfficer),
                ReviewDecision::Approved,
                None,
            )
            .expect("school officer approves");

        assert_eq!(case.form(FormType::NewClearance).status, FormStatus::Approved);
        assert_eq!(
            case.unlocked_items().len(),
            FormType::ALL.len() + DocumentType::ALL.len(),
            "all forms and documents unlock simultaneously"
        );

        // The other four forms become submittable immediately.
        service
            .submit_form(&student(), &owner_department(), personal_record_payload(), "s-42")
            .expect("personal record now reachable");
    }
}

mod voting {
    use super::common::*;
    use clearance::workflows::clearance::{
        ClearanceError, ClearanceServiceError, FormStatus, FormType, ReviewDecision, Role,
    };

    fn cascaded_service() -> (
        clearance::workflows::clearance::ClearanceService<MemoryRepository, MemoryEvents>,
        std::sync::Arc<MemoryEvents>,
    ) {
        let (service, _, events) = build_service();
        service
            .submit_form(&student(), &owner_department(), new_clearance_payload(), "s-42")
            .expect("submission");
        service
            .decide_form(
                &student(),
                FormType::NewClearance,
                Role::DeputyRegistrar,
                &actor("staff-dr", "Registrar", Role::DeputyRegistrar),
                ReviewDecision::Approved,
                None,
            )
            .expect("deputy approves");
        service
            .decide_form(
                &student(),
                FormType::NewClearance,
                Role::SchoolOfficer,
                &actor("staff-so", OWNER_DEPARTMENT, Role::SchoolOfficer),
                ReviewDecision::Approved,
                None,
            )
            .expect("school officer approves");
        (service, events)
    }

    #[test]
    fn school_officer_cannot_jump_the_deputy_registrar() {
        let (service, _, _) = build_service();
        service
            .submit_form(&student(), &owner_department(), new_clearance_payload(), "s-42")
            .expect("submission");

        match service.decide_form(
            &student(),
            FormType::NewClearance,
            Role::SchoolOfficer,
            &actor("staff-so", OWNER_DEPARTMENT, Role::SchoolOfficer),
            ReviewDecision::Approved,
            None,
        ) {
            Err(ClearanceServiceError::Policy(ClearanceError::Unauthorized)) => {}
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[test]
    fn one_rejection_fails_prov_admission_outright() {
        let (service, _) = cascaded_service();
        service
            .submit_form(&student(), &owner_department(), prov_admission_payload(), "s-42")
            .expect("submission");

        service
            .decide_form(
                &student(),
                FormType::ProvAdmission,
                Role::Library,
                &actor("staff-lib", "Library", Role::Library),
                ReviewDecision::Approved,
                None,
            )
            .expect("library approves");

        let case = service
            .decide_form(
                &student(),
                FormType::ProvAdmission,
                Role::Finance,
                &actor("staff-fin", "Finance", Role::Finance),
                ReviewDecision::Rejected,
                Some("outstanding acceptance fee"),
            )
            .expect("finance rejects");

        assert_eq!(case.form(FormType::ProvAdmission).status, FormStatus::Rejected);
    }

    #[test]
    fn rejected_form_reopens_for_resubmission() {
        let (service, _) = cascaded_service();
        service
            .submit_form(&student(), &owner_department(), prov_admission_payload(), "s-42")
            .expect("submission");
        service
            .decide_form(
                &student(),
                FormType::ProvAdmission,
                Role::Finance,
                &actor("staff-fin", "Finance", Role::Finance),
                ReviewDecision::Rejected,
                Some("outstanding acceptance fee"),
            )
            .expect("finance rejects");

        let case = service
            .submit_form(&student(), &owner_department(), prov_admission_payload(), "s-42")
            .expect("resubmission succeeds");
        assert_eq!(case.form(FormType::ProvAdmission).status, FormStatus::Submitted);
    }

    #[test]
    fn terminal_decisions_publish_events() {
        let (service, events) = cascaded_service();
        service
            .submit_form(&student(), &owner_department(), prov_admission_payload(), "s-42")
            .expect("submission");
        service
            .decide_form(
                &student(),
                FormType::ProvAdmission,
                Role::Finance,
                &actor("staff-fin", "Finance", Role::Finance),
                ReviewDecision::Rejected,
                Some("outstanding acceptance fee"),
            )
            .expect("finance rejects");

        let statuses: Vec<_> = events
            .events()
            .iter()
            .map(|event| event.new_status)
            .collect();
        assert_eq!(
            statuses,
            vec!["submitted", "approved", "submitted", "rejected"]
        );
    }
}

mod routing {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::common::*;
    use clearance::workflows::clearance::clearance_router;

    fn build_router() -> axum::Router {
        let (service, _, _) = build_service();
        clearance_router(Arc::new(service))
    }

    async fn post_json(router: &axum::Router, uri: &str, body: Value) -> axum::response::Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
            .expect("request");
        router.clone().oneshot(request).await.expect("dispatch")
    }

    #[tokio::test]
    async fn submit_then_fetch_projection() {
        let (service, _, _) = build_service();
        let router = clearance_router(Arc::new(service));

        let submit = post_json(
            &router,
            "/api/v1/clearance-cases/s-1/forms/new_clearance/submit",
            json!({
                "actor_id": "s-1",
                "department": OWNER_DEPARTMENT,
                "payload": {
                    "form": "new_clearance",
                    "jamb_registration_number": "20246001234AB",
                    "matriculation_number": "CSC/2024/0042",
                    "mode_of_entry": "UTME"
                }
            }),
        )
        .await;
        assert_eq!(submit.status(), StatusCode::ACCEPTED);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/clearance-cases/s-1")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.get("student_id"), Some(&json!("s-1")));
        assert_eq!(
            payload
                .get("documents")
                .and_then(Value::as_array)
                .map(Vec::len),
            Some(8)
        );
    }

    #[tokio::test]
    async fn wrong_department_document_decision_is_forbidden() {
        let router = build_router();
        post_json(
            &router,
            "/api/v1/clearance-cases/s-1/forms/new_clearance/submit",
            json!({
                "actor_id": "s-1",
                "department": OWNER_DEPARTMENT,
                "payload": {
                    "form": "new_clearance",
                    "jamb_registration_number": "20246001234AB",
                    "matriculation_number": "CSC/2024/0042",
                    "mode_of_entry": "UTME"
                }
            }),
        )
        .await;
        post_json(
            &router,
            "/api/v1/clearance-cases/s-1/forms/new_clearance/decide",
            json!({
                "actor": { "user_id": "staff-dr", "department": "Registrar", "role": "deputyRegistrar" },
                "role": "deputyRegistrar",
                "decision": "approved"
            }),
        )
        .await;
        post_json(
            &router,
            "/api/v1/clearance-cases/s-1/forms/new_clearance/decide",
            json!({
                "actor": { "user_id": "staff-so", "department": OWNER_DEPARTMENT, "role": "schoolOfficer" },
                "role": "schoolOfficer",
                "decision": "approved"
            }),
        )
        .await;
        let upload = post_json(
            &router,
            "/api/v1/clearance-cases/s-1/documents/medical_report/upload",
            json!({ "actor_id": "s-1", "storage_key": "files/medical.pdf" }),
        )
        .await;
        assert_eq!(upload.status(), StatusCode::ACCEPTED);

        // Finance staff attempting a medical report decision.
        let decide = post_json(
            &router,
            "/api/v1/clearance-cases/s-1/documents/medical_report/decide",
            json!({
                "actor": { "user_id": "staff-fin", "department": "Finance", "role": "finance" },
                "decision": "approved"
            }),
        )
        .await;
        assert_eq!(decide.status(), StatusCode::FORBIDDEN);
    }
}
