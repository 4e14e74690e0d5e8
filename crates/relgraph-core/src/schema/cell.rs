use crate::error::SchemaError;
use std::{
    sync::{Mutex, OnceLock, PoisonError},
    thread::{self, ThreadId},
};

type Thunk<C, T> = Box<dyn Fn(&C) -> Result<T, SchemaError> + Send + Sync>;

///
/// LazyCell
///
/// A value computed at most once from a thunk that receives a shared context.
///
/// `value` holds the result; `init` serializes concurrent computations;
/// `resolving` records which thread is running the thunk so a re-entrant
/// request from that same thread is reported as a cycle instead of
/// deadlocking on `init`.
///

pub(crate) struct LazyCell<C, T> {
    value: OnceLock<T>,
    init: Mutex<()>,
    resolving: Mutex<Option<ThreadId>>,
    thunk: Thunk<C, T>,
}

impl<C, T> LazyCell<C, T> {
    pub(crate) fn new(
        thunk: impl Fn(&C) -> Result<T, SchemaError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            value: OnceLock::new(),
            init: Mutex::new(()),
            resolving: Mutex::new(None),
            thunk: Box::new(thunk),
        }
    }

    pub(crate) fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Return the memoized value, running the thunk if this is the first call.
    ///
    /// `name` only labels the cycle error. A thunk error leaves the cell empty.
    pub(crate) fn get_or_try_init(&self, ctx: &C, name: &str) -> Result<&T, SchemaError> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let me = thread::current().id();
        if *self.lock_resolving() == Some(me) {
            return Err(SchemaError::Cycle {
                entity: name.to_string(),
            });
        }

        let _init = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        *self.lock_resolving() = Some(me);
        let _reset = ResetOnDrop(&self.resolving);

        let value = (self.thunk)(ctx)?;

        Ok(self.value.get_or_init(|| value))
    }

    fn lock_resolving(&self) -> std::sync::MutexGuard<'_, Option<ThreadId>> {
        self.resolving.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// Clears the resolving marker on every exit, including unwind.
struct ResetOnDrop<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
