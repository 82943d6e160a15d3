//! Reference-counted busy indicator.
//!
//! Every in-flight request holds the gate. The listener is told `true` when
//! the first holder arrives and `false` when the last one leaves, so
//! overlapping requests keep the overlay up until all of them are done.

use std::cell::Cell;
use std::fmt;

use tracing::warn;

pub struct TaskGate {
    outstanding: Cell<usize>,
    on_change: Box<dyn Fn(bool)>,
}

impl TaskGate {
    pub fn new(on_change: impl Fn(bool) + 'static) -> Self {
        Self {
            outstanding: Cell::new(0),
            on_change: Box::new(on_change),
        }
    }

    pub fn begin(&self) {
        let held = self.outstanding.get();
        self.outstanding.set(held + 1);
        if held == 0 {
            (self.on_change)(true);
        }
    }

    pub fn end(&self) {
        match self.outstanding.get() {
            0 => warn!("task gate released more times than it was taken"),
            1 => {
                self.outstanding.set(0);
                (self.on_change)(false);
            }
            held => self.outstanding.set(held - 1),
        }
    }

    /// Hold the gate until the returned guard is dropped.
    pub fn scoped(&self) -> GateGuard<'_> {
        self.begin();
        GateGuard { gate: self }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.get()
    }

    pub fn is_engaged(&self) -> bool {
        self.outstanding.get() > 0
    }
}

impl Default for TaskGate {
    fn default() -> Self {
        Self::new(|_| {})
    }
}

impl fmt::Debug for TaskGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGate")
            .field("outstanding", &self.outstanding.get())
            .finish()
    }
}

#[must_use = "the gate is released as soon as the guard is dropped"]
pub struct GateGuard<'a> {
    gate: &'a TaskGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.end();
    }
}
