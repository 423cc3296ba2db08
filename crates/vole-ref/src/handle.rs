// RefTensor — deferred handle produced by the reference engine
//
// A handle is an Arc around one node record. The record knows its shape up
// front; its completion arrives later over a one-shot channel fed by the
// node's worker thread.
//
// RESOLUTION:
//
//   The first caller of `resolve` takes the receiver out of its mutex and
//   blocks on it; the value lands in a OnceLock. Concurrent callers block in
//   `get_or_init` until that happens. Every later call reads the stored
//   value without blocking.

use std::fmt;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, OnceLock};

use vole_core::{Completion, DType, Scale, TensorHandle};

/// Outcome of a node as stored in its record. Failures are kept as text so
/// the same outcome can be handed to every waiter.
pub(crate) type Outcome = std::result::Result<Completion, String>;

struct NodeRecord {
    id: usize,
    op: &'static str,
    shape: Scale,
    dtype: DType,
    pending: Mutex<Option<Receiver<Outcome>>>,
    outcome: OnceLock<Outcome>,
}

/// Handle to a node owned by a [`RefEngine`](crate::RefEngine).
#[derive(Clone)]
pub struct RefTensor {
    inner: Arc<NodeRecord>,
}

impl RefTensor {
    /// A node whose completion will be sent on `rx`.
    pub(crate) fn pending(
        id: usize,
        op: &'static str,
        shape: Scale,
        dtype: DType,
        rx: Receiver<Outcome>,
    ) -> Self {
        Self {
            inner: Arc::new(NodeRecord {
                id,
                op,
                shape,
                dtype,
                pending: Mutex::new(Some(rx)),
                outcome: OnceLock::new(),
            }),
        }
    }

    /// A node that is complete from the moment it exists.
    pub(crate) fn ready(id: usize, op: &'static str, shape: Scale, dtype: DType) -> Self {
        let outcome = OnceLock::new();
        let _ = outcome.set(Ok(Completion::Tensor));
        Self {
            inner: Arc::new(NodeRecord {
                id,
                op,
                shape,
                dtype,
                pending: Mutex::new(None),
                outcome,
            }),
        }
    }

    pub fn id(&self) -> usize {
        self.inner.id
    }

    /// Name of the operator that produces this tensor (`"zeros"` for
    /// allocations).
    pub fn op(&self) -> &'static str {
        self.inner.op
    }

    pub fn dtype(&self) -> DType {
        self.inner.dtype
    }

    /// Whether the node has finished, without blocking.
    pub fn is_complete(&self) -> bool {
        self.inner.outcome.get().is_some()
    }

    /// Block until the node has finished and return its outcome.
    pub(crate) fn resolve(&self) -> &Outcome {
        self.inner.outcome.get_or_init(|| {
            let rx = match self.inner.pending.lock() {
                Ok(mut guard) => guard.take(),
                Err(_) => return Err(format!("node {} state poisoned", self.inner.id)),
            };
            match rx {
                Some(rx) => rx.recv().unwrap_or_else(|_| {
                    Err(format!(
                        "worker for node {} ({}) exited without completing",
                        self.inner.id, self.inner.op
                    ))
                }),
                None => Err(format!("node {} has no pending result", self.inner.id)),
            }
        })
    }
}

impl TensorHandle for RefTensor {
    fn shape(&self) -> &Scale {
        &self.inner.shape
    }
}

impl fmt::Debug for RefTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefTensor")
            .field("id", &self.inner.id)
            .field("op", &self.inner.op)
            .field("shape", &self.inner.shape)
            .field("complete", &self.is_complete())
            .finish()
    }
}
