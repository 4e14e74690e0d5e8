use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventReport
/// Ephemeral, in-memory counters for resolution and parse calls.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub operations: BTreeMap<String, OperationCounters>,
    pub entities: BTreeMap<String, OperationCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Schema lifecycle
    pub resolutions: u64,
    pub cycles: u64,
    pub bootstraps: u64,

    // Parse entrypoints
    pub parse_calls: u64,
    pub parse_failures: u64,
    pub issues_total: u64,
}

///
/// OperationCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct OperationCounters {
    pub calls: u64,
    pub failures: u64,
    pub issues: u64,
}

impl OperationCounters {
    pub(crate) const fn add(&mut self, issues: u64) {
        self.calls = self.calls.saturating_add(1);
        if issues > 0 {
            self.failures = self.failures.saturating_add(1);
            self.issues = self.issues.saturating_add(issues);
        }
    }
}

thread_local! {
    static EVENT_STATE: RefCell<EventReport> = RefCell::new(EventReport::default());
}

/// Borrow counters immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventReport) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow counters mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventReport) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters.
pub(crate) fn reset() {
    with_state_mut(|m| *m = EventReport::default());
}
