//! Event sink boundary.
//!
//! Schema and validation code emit `ValidationEvent`s through `record`; only
//! this module writes to the counters in `obs::metrics`.

use crate::obs::metrics;
use derive_more::Display;
use serde::Serialize;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn EventSink>>> = RefCell::new(None);
}

///
/// Operation
/// Parse entrypoint that produced an event.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[remain::sorted]
pub enum Operation {
    Aggregate,
    Create,
    CreateMany,
    Entity,
    EntityWithRelations,
    Filter,
    FindMany,
    FindUnique,
    GroupBy,
    Having,
    OrderBy,
    UniqueSelector,
    Update,
    UpdateMany,
    Upsert,
}

///
/// ValidationEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationEvent {
    Resolved {
        entity: &'static str,
    },
    CycleDetected {
        entity: &'static str,
    },
    Bootstrapped {
        entities: usize,
    },
    ParseFinished {
        operation: Operation,
        entity: &'static str,
        issues: usize,
    },
}

///
/// EventSink
///

pub trait EventSink {
    fn record(&self, event: ValidationEvent);
}

/// GlobalEventSink
/// Default sink that writes into the thread's counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalEventSink;

impl EventSink for GlobalEventSink {
    fn record(&self, event: ValidationEvent) {
        match event {
            ValidationEvent::Resolved { .. } => metrics::with_state_mut(|m| {
                m.ops.resolutions = m.ops.resolutions.saturating_add(1);
            }),

            ValidationEvent::CycleDetected { .. } => metrics::with_state_mut(|m| {
                m.ops.cycles = m.ops.cycles.saturating_add(1);
            }),

            ValidationEvent::Bootstrapped { .. } => metrics::with_state_mut(|m| {
                m.ops.bootstraps = m.ops.bootstraps.saturating_add(1);
            }),

            ValidationEvent::ParseFinished {
                operation,
                entity,
                issues,
            } => {
                let issues = u64::try_from(issues).unwrap_or(u64::MAX);

                metrics::with_state_mut(|m| {
                    m.ops.parse_calls = m.ops.parse_calls.saturating_add(1);
                    if issues > 0 {
                        m.ops.parse_failures = m.ops.parse_failures.saturating_add(1);
                        m.ops.issues_total = m.ops.issues_total.saturating_add(issues);
                    }

                    m.operations
                        .entry(operation.to_string())
                        .or_default()
                        .add(issues);
                    m.entities.entry(entity.to_string()).or_default().add(issues);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_EVENT_SINK: GlobalEventSink = GlobalEventSink;

pub(crate) fn record(event: ValidationEvent) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match override_sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_EVENT_SINK.record(event),
    }
}

/// Snapshot the current thread's counters.
#[must_use]
pub fn event_report() -> metrics::EventReport {
    metrics::with_state(Clone::clone)
}

/// Reset the current thread's counters.
pub fn event_reset() {
    metrics::reset();
}

/// Run a closure with a temporary sink override on this thread.
pub fn with_event_sink<T>(sink: Rc<dyn EventSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn EventSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0.take();
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///
