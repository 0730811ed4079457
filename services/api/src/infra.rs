use clearance::workflows::clearance::{
    CaseRepository, ClearanceCase, ClearanceEvent, EventError, EventPublisher, RepositoryError,
    StudentId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCaseRepository {
    cases: Arc<Mutex<HashMap<StudentId, ClearanceCase>>>,
}

impl CaseRepository for InMemoryCaseRepository {
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
pub(crate) struct InMemoryEventPublisher {
    events: Arc<Mutex<Vec<ClearanceEvent>>>,
}

impl EventPublisher for InMemoryEventPublisher {
    fn publish(&self, event: ClearanceEvent) -> Result<(), EventError> {
        let mut guard = self.events.lock().expect("event mutex poisoned");
        guard.push(event);
        Ok(())
    }
}

impl InMemoryEventPublisher {
    pub(crate) fn events(&self) -> Vec<ClearanceEvent> {
        self.events.lock().expect("event mutex poisoned").clone()
    }
}
