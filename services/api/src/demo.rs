use crate::infra::{InMemoryCaseRepository, InMemoryEventPublisher};
use chrono::NaiveDate;
use clap::Args;
use clearance::error::AppError;
use clearance::workflows::clearance::authority::{
    document_authority, required_roles, DocumentAuthority,
};
use clearance::workflows::clearance::{
    ActorContext, AffidavitDetails, CaseView, ClearanceService, Department, DocumentType,
    FormPayload, FormType, NewClearanceDetails, NextOfKinDetails, PersonalRecordDetails,
    ProvAdmissionDetails, ReviewDecision, Role, StudentId,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Student identifier for the walkthrough
    #[arg(long, default_value = "CSC/2024/0042")]
    pub(crate) student_id: String,
    /// Owning academic department for the student
    #[arg(long, default_value = "Computer Science")]
    pub(crate) department: String,
    /// Print the final case projection as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        student_id,
        department,
        json,
    } = args;

    let student = StudentId(student_id);
    let owner = Department::new(department);

    let repository = Arc::new(InMemoryCaseRepository::default());
    let events = Arc::new(InMemoryEventPublisher::default());
    let service = ClearanceService::new(repository, events.clone());

    println!("Clearance workflow demo for {}", student.0);

    println!("\nStep 1: submit the new clearance form");
    let case = service.submit_form(&student, &owner, new_clearance_payload(), &student.0)?;
    println!(
        "- new_clearance status: {} | unlocked items: {}",
        case.form(FormType::NewClearance).status.label(),
        case.unlocked_items().len()
    );

    println!("\nStep 2: deputy registrar then school officer approve");
    for slot in required_roles(FormType::NewClearance) {
        let actor = staff_for(*slot, &owner);
        let case = service.decide_form(
            &student,
            FormType::NewClearance,
            *slot,
            &actor,
            ReviewDecision::Approved,
            None,
        )?;
        println!(
            "- {} approved as {} | form status: {} | unlocked items: {}",
            actor.user_id,
            slot.label(),
            case.form(FormType::NewClearance).status.label(),
            case.unlocked_items().len()
        );
    }

    println!("\nStep 3: submit and clear the remaining forms");
    for form_type in FormType::ALL {
        if form_type == FormType::NewClearance {
            continue;
        }
        service.submit_form(&student, &owner, payload_for(form_type), &student.0)?;
        for slot in required_roles(form_type) {
            let actor = staff_for(*slot, &owner);
            service.decide_form(
                &student,
                form_type,
                *slot,
                &actor,
                ReviewDecision::Approved,
                None,
            )?;
        }
        let case = service.case(&student)?;
        println!(
            "- {}: {} ({} approver{})",
            form_type.label(),
            case.form(form_type).status.label(),
            required_roles(form_type).len(),
            if required_roles(form_type).len() == 1 { "" } else { "s" }
        );
    }

    println!("\nStep 4: upload and verify the supporting documents");
    for doc_type in DocumentType::ALL {
        let storage_key = format!("uploads/{}/{}.pdf", student.0, doc_type.label());
        service.upload_document(&student, doc_type, storage_key, &student.0)?;
        let reviewer = reviewer_for(doc_type, &owner);
        let case = service.decide_document(
            &student,
            doc_type,
            &reviewer,
            ReviewDecision::Approved,
            None,
        )?;
        println!(
            "- {}: {} (verified by {})",
            doc_type.label(),
            case.document(doc_type).status.label(),
            reviewer.user_id
        );
    }

    let case = service.case(&student)?;
    println!(
        "\nFinal verdict: {}",
        if case.is_cleared() {
            "CLEARED"
        } else {
            "NOT CLEARED"
        }
    );

    println!("\nEvent log ({} events):", events.events().len());
    for event in events.events() {
        println!(
            "- {} -> {} (by {})",
            event.item.label(),
            event.new_status,
            event.actor_id
        );
    }

    if json {
        let view = CaseView::project(&case);
        let rendered = serde_json::to_string_pretty(&view)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("\n{rendered}");
    }

    Ok(())
}

fn staff_for(slot: Role, owner: &Department) -> ActorContext {
    let (user_id, department) = match slot {
        Role::DeputyRegistrar => ("demo-deputy-registrar", Department::REGISTRAR.to_string()),
        Role::SchoolOfficer => ("demo-school-officer", owner.0.clone()),
        Role::DepartmentHead => ("demo-hod", format!("HOD {}", owner.0)),
        Role::StudentSupport => ("demo-student-support", Department::STUDENT_SUPPORT.to_string()),
        Role::Finance => ("demo-bursar", Department::FINANCE.to_string()),
        Role::Library => ("demo-librarian", Department::LIBRARY.to_string()),
        Role::Health => ("demo-medical-officer", Department::HEALTH_SERVICES.to_string()),
        Role::Admin => ("demo-admin", "ICT".to_string()),
    };

    ActorContext {
        user_id: user_id.to_string(),
        department: Department::new(department),
        role: slot,
        managed_departments: Vec::new(),
    }
}

fn reviewer_for(doc_type: DocumentType, owner: &Department) -> ActorContext {
    match document_authority(doc_type) {
        DocumentAuthority::Department(name) => {
            let slot = match name {
                Department::STUDENT_SUPPORT => Role::StudentSupport,
                Department::HEALTH_SERVICES => Role::Health,
                _ => Role::DeputyRegistrar,
            };
            staff_for(slot, owner)
        }
        DocumentAuthority::HodOffice => staff_for(Role::DepartmentHead, owner),
        DocumentAuthority::ManagedDepartment => ActorContext {
            user_id: "demo-exams-records".to_string(),
            department: Department::new("Exams and Records"),
            role: Role::StudentSupport,
            managed_departments: vec![owner.clone()],
        },
    }
}

fn payload_for(form_type: FormType) -> FormPayload {
    match form_type {
        FormType::NewClearance => new_clearance_payload(),
        FormType::ProvAdmission => FormPayload::ProvAdmission(ProvAdmissionDetails {
            admission_session: "2024/2025".to_string(),
            faculty: "Physical Sciences".to_string(),
            programme: "B.Sc. Computer Science".to_string(),
        }),
        FormType::PersonalRecord => FormPayload::PersonalRecord(PersonalRecordDetails {
            surname: "Adeyemi".to_string(),
            first_name: "Chinedu".to_string(),
            date_of_birth: demo_date(2005, 6, 14),
            nationality: "Nigerian".to_string(),
            state_of_origin: "Anambra".to_string(),
            contact_address: "14 University Road, Awka".to_string(),
            phone: "+2348012345678".to_string(),
        }),
        FormType::PersonalRecord2 => FormPayload::PersonalRecord2(NextOfKinDetails {
            next_of_kin_name: "Ngozi Adeyemi".to_string(),
            relationship: "Mother".to_string(),
            next_of_kin_address: "22 Market Street, Onitsha".to_string(),
            next_of_kin_phone: "+2348098765432".to_string(),
            sponsor_name: "Ngozi Adeyemi".to_string(),
        }),
        FormType::Affidavit => FormPayload::Affidavit(AffidavitDetails {
            deponent_name: "Chinedu Adeyemi".to_string(),
            sworn_before: "Commissioner for Oaths, Awka".to_string(),
            sworn_on: demo_date(2026, 2, 20),
        }),
    }
}

fn new_clearance_payload() -> FormPayload {
    FormPayload::NewClearance(NewClearanceDetails {
        jamb_registration_number: "20246001234AB".to_string(),
        matriculation_number: "CSC/2024/0042".to_string(),
        mode_of_entry: "UTME".to_string(),
    })
}

fn demo_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
