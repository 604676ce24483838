use std::cell::RefCell;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{LocalBoxFuture, Shared};

use crate::foundation::error::{ImprintError, ImprintResult};

/// Counting one-shot latch that opens once every registered node has been acknowledged.
///
/// The count starts at zero. Reaching zero through [`CompletionBarrier::decrement`], or calling
/// [`CompletionBarrier::wait`] while it is zero, settles the barrier exactly once. Any mutation
/// after settlement, or a decrement at zero, is an error.
pub struct CompletionBarrier {
    state: RefCell<BarrierState>,
    done: Shared<oneshot::Receiver<()>>,
}

struct BarrierState {
    count: usize,
    signal: Option<oneshot::Sender<()>>,
}

impl Default for CompletionBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CompletionBarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionBarrier")
            .field("count", &self.count())
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl CompletionBarrier {
    /// A fresh, unsettled barrier with a zero count.
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            state: RefCell::new(BarrierState {
                count: 0,
                signal: Some(tx),
            }),
            done: rx.shared(),
        }
    }

    /// Add `n` outstanding registrations.
    pub fn increment(&self, n: usize) -> ImprintResult<()> {
        let mut state = self.state.borrow_mut();
        if state.signal.is_none() {
            return Err(ImprintError::BarrierAlreadySettled);
        }
        state.count += n;
        Ok(())
    }

    /// Acknowledge one registration; settles the barrier when the count reaches zero.
    pub fn decrement(&self) -> ImprintResult<()> {
        let mut state = self.state.borrow_mut();
        if state.signal.is_none() {
            return Err(ImprintError::BarrierAlreadySettled);
        }
        if state.count == 0 {
            return Err(ImprintError::BarrierUnderflow);
        }
        state.count -= 1;
        if state.count == 0 {
            settle(&mut state);
        }
        Ok(())
    }

    /// Outstanding registrations.
    pub fn count(&self) -> usize {
        self.state.borrow().count
    }

    /// Whether the signal has fired.
    pub fn is_settled(&self) -> bool {
        self.state.borrow().signal.is_none()
    }

    /// Future resolving once the barrier settles. Safe to call any number of times.
    pub fn wait(&self) -> LocalBoxFuture<'static, ()> {
        {
            let mut state = self.state.borrow_mut();
            if state.count == 0 {
                settle(&mut state);
            }
        }
        self.done.clone().map(|_| ()).boxed_local()
    }
}

fn settle(state: &mut BarrierState) {
    if let Some(tx) = state.signal.take() {
        // The receiver lives in `done` for as long as the barrier does.
        let _ = tx.send(());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/barrier.rs"]
mod tests;
