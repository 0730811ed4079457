//! Form dependency graph. The dependency is deliberately flat: NewClearance
//! gates everything else, and the remaining four forms plus all documents
//! unlock simultaneously once it is approved. There is no chain among them.

use super::domain::{ClearanceCase, ClearanceItem, DocumentType, FormStatus, FormType};

fn new_clearance_approved(case: &ClearanceCase) -> bool {
    case.form(FormType::NewClearance).status == FormStatus::Approved
}

/// Is this form reachable for the student right now?
pub fn form_unlocked(form_type: FormType, case: &ClearanceCase) -> bool {
    form_type == FormType::NewClearance || new_clearance_approved(case)
}

/// Documents share the single NewClearance gate.
pub fn documents_unlocked(case: &ClearanceCase) -> bool {
    new_clearance_approved(case)
}

/// Pure projection of every currently reachable form and document; called by
/// every screen to decide what to render as actionable.
pub fn unlocked_items(case: &ClearanceCase) -> Vec<ClearanceItem> {
    let mut items: Vec<ClearanceItem> = FormType::ALL
        .into_iter()
        .filter(|form| form_unlocked(*form, case))
        .map(ClearanceItem::Form)
        .collect();

    if documents_unlocked(case) {
        items.extend(DocumentType::ALL.into_iter().map(ClearanceItem::Document));
    }

    items
}
