//! Serialized method dispatch against server-held components.
//!
//! Each registered component runs at most one call at a time. A call that
//! arrives while the component is busy is queued and answered with
//! [`CallOutcome::Queued`]; the caller already running drains the queue
//! before it returns, so its response reflects every queued call. The
//! queue is drained in arrival order, even when the draining caller's own
//! call fails.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, TryLockError};

use serde_json::Value;

use crate::ast::Literal;
use crate::call::MethodCall;
use crate::error::DispatchError;
use crate::processor::ArgParser;

/// A stateful object whose methods can be invoked by name.
pub trait Component: Send {
    /// Run `method` with positional `args`. Arity and type checks are the
    /// component's job.
    fn call(&mut self, method: &str, args: Vec<Literal>) -> Result<(), DispatchError>;

    /// Current state, serialized for the client.
    fn state(&self) -> Value;
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The call ran; `executed` counts it plus any queued calls drained
    /// with it, and `failed` counts the drained calls that returned an error.
    Completed {
        state: Value,
        executed: usize,
        failed: usize,
    },
    /// Another call was running; this one will be executed by that caller.
    /// Its failure is logged, never returned to the caller running it.
    Queued,
}

struct Slot {
    component: Mutex<Box<dyn Component>>,
    pending: Mutex<VecDeque<MethodCall>>,
}

/// Registry of components addressed by id.
#[derive(Default)]
pub struct Dispatcher {
    parser: ArgParser,
    components: RwLock<HashMap<String, Arc<Slot>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `parser` for the arguments of every dispatched call.
    pub fn with_parser(parser: ArgParser) -> Self {
        Self {
            parser,
            components: RwLock::default(),
        }
    }

    /// Register `component` under `id`, replacing any previous one.
    pub fn register(&self, id: impl Into<String>, component: impl Component + 'static) {
        let slot = Arc::new(Slot {
            component: Mutex::new(Box::new(component)),
            pending: Mutex::new(VecDeque::new()),
        });
        self.components
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.into(), slot);
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.components
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
    }

    /// Parse `call_spec` and run it against the component `id`.
    ///
    /// Argument errors are reported before anything is queued.
    pub fn dispatch(&self, id: &str, call_spec: &str) -> Result<CallOutcome, DispatchError> {
        let call = MethodCall::parse_with(&self.parser, call_spec)?;
        let slot = self
            .components
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
            .ok_or_else(|| DispatchError::ComponentNotFound { id: id.to_owned() })?;

        // The pending lock is held while the component lock is tried, and
        // again while it is released, so no call can be queued behind a
        // caller that has already stopped draining.
        let mut pending = lock(&slot.pending, id)?;
        let mut component = match slot.component.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                tracing::debug!(component = id, method = %call.name, "component busy, queued call");
                pending.push_back(call);
                return Ok(CallOutcome::Queued);
            }
            Err(TryLockError::Poisoned(_)) => {
                return Err(DispatchError::Poisoned { id: id.to_owned() });
            }
        };
        drop(pending);

        // The queue is drained even when this caller's own call fails, so a
        // queued call never waits for an unrelated later dispatch.
        let MethodCall { name, args } = call;
        tracing::debug!(component = id, method = %name, args = args.len(), "calling method");
        let own = component.call(&name, args);
        let mut executed = 1;
        let mut failed = 0;
        loop {
            let mut pending = lock(&slot.pending, id)?;
            let Some(next) = pending.pop_front() else {
                let state = component.state();
                drop(component);
                drop(pending);
                tracing::debug!(component = id, executed, failed, "dispatch complete");
                own?;
                return Ok(CallOutcome::Completed {
                    state,
                    executed,
                    failed,
                });
            };
            drop(pending);

            let MethodCall { name, args } = next;
            tracing::debug!(component = id, method = %name, args = args.len(), "calling queued method");
            executed += 1;
            if let Err(error) = component.call(&name, args) {
                tracing::warn!(component = id, method = %name, %error, "queued call failed");
                failed += 1;
            }
        }
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, id: &str) -> Result<MutexGuard<'a, T>, DispatchError> {
    mutex
        .lock()
        .map_err(|_| DispatchError::Poisoned { id: id.to_owned() })
}
