//! Observability: validation counters and the sink they flow through.
//!
//! Resolution and parsing never touch the counters directly; every event is
//! routed through `sink::record`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, OperationCounters};
pub use sink::{EventSink, Operation, ValidationEvent, event_report, event_reset, with_event_sink};
