use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::{LineError, LineProvider, OutputLine};

#[derive(Debug, Default)]
struct LineState {
    high: Cell<bool>,
    writes: Cell<usize>,
}

/// In-memory line provider.
///
/// Backs the test suite and the demo binary's dry-run mode: lines exist only
/// as recorded state, but the exclusive-claim rule is enforced exactly like
/// on real hardware.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    claims: Rc<RefCell<HashMap<String, Rc<LineState>>>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        MemoryProvider::default()
    }

    /// Observe a currently claimed line without touching its claim.
    ///
    /// Returns `None` when nobody holds the line. The probe stays valid
    /// after the line is released and keeps showing its final state.
    pub fn probe(&self, identifier: &str) -> Option<LineProbe> {
        self.claims
            .borrow()
            .get(identifier)
            .map(|state| LineProbe {
                state: Rc::clone(state),
            })
    }
}

impl LineProvider for MemoryProvider {
    type Line = MemoryLine;

    fn open_line(&self, identifier: &str) -> Result<MemoryLine, LineError> {
        let mut claims = self.claims.borrow_mut();
        if claims.contains_key(identifier) {
            return Err(LineError::Claimed(identifier.to_string()));
        }
        let state = Rc::new(LineState::default());
        claims.insert(identifier.to_string(), Rc::clone(&state));
        debug!("claimed memory line {identifier}");
        Ok(MemoryLine {
            identifier: identifier.to_string(),
            state,
            claims: Rc::clone(&self.claims),
        })
    }
}

/// An in-memory output line. Dropping it releases the claim.
#[derive(Debug)]
pub struct MemoryLine {
    identifier: String,
    state: Rc<LineState>,
    claims: Rc<RefCell<HashMap<String, Rc<LineState>>>>,
}

impl OutputLine for MemoryLine {
    fn set_state(&mut self, high: bool) -> Result<(), LineError> {
        self.state.high.set(high);
        self.state.writes.set(self.state.writes.get() + 1);
        debug!(
            "memory line {} set {}",
            self.identifier,
            if high { "high" } else { "low" }
        );
        Ok(())
    }
}

impl Drop for MemoryLine {
    fn drop(&mut self) {
        self.claims.borrow_mut().remove(&self.identifier);
        debug!("released memory line {}", self.identifier);
    }
}

/// Read-only view on a [`MemoryLine`]'s recorded state.
#[derive(Debug)]
pub struct LineProbe {
    state: Rc<LineState>,
}

impl LineProbe {
    /// Current logical state of the line.
    pub fn is_high(&self) -> bool {
        self.state.high.get()
    }

    /// Number of writes the line has seen since it was opened.
    pub fn writes(&self) -> usize {
        self.state.writes.get()
    }
}
