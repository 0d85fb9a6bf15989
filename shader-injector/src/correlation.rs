//! Per-thread state tying a pipeline library's load and store calls to the pipeline
//! creation that issued them.
//!
//! The host asks its library for a cached pipeline, and later stores the one it compiled,
//! on the same thread that is creating the pipeline. The load is postponed into creation
//! so the stream can be patched first, and a store is skipped when creation already went
//! through the library.

use std::cell::RefCell;

use crate::TechniqueKey;

/// A library lookup postponed until the pipeline is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad<L> {
    pub library: L,
    pub name: Vec<u16>,
    pub technique: TechniqueKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationSlots<L> {
    pub load: Option<PendingLoad<L>>,
    pub skip_store: Option<TechniqueKey>,
}

impl<L> Default for CorrelationSlots<L> {
    fn default() -> Self {
        CorrelationSlots {
            load: None,
            skip_store: None,
        }
    }
}

/// One thread's correlation slots.
///
/// Every accessor borrows for the duration of the call only, so a cell is never held
/// borrowed across a call into the host.
#[derive(Debug)]
pub struct CorrelationCell<L> {
    slots: RefCell<CorrelationSlots<L>>,
}

impl<L> Default for CorrelationCell<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> CorrelationCell<L> {
    pub const fn new() -> Self {
        CorrelationCell {
            slots: RefCell::new(CorrelationSlots {
                load: None,
                skip_store: None,
            }),
        }
    }

    /// Records a library lookup, replacing any earlier one.
    pub fn arm_load(&self, pending: PendingLoad<L>) {
        self.slots.borrow_mut().load = Some(pending);
    }

    pub fn take_load(&self) -> Option<PendingLoad<L>> {
        self.slots.borrow_mut().load.take()
    }

    pub fn set_skip_store(&self, technique: Option<TechniqueKey>) {
        self.slots.borrow_mut().skip_store = technique;
    }

    pub fn take_skip_store(&self) -> Option<TechniqueKey> {
        self.slots.borrow_mut().skip_store.take()
    }

    /// Empties both slots, releasing any recorded library.
    pub fn clear(&self) {
        *self.slots.borrow_mut() = CorrelationSlots::default();
    }

    pub fn is_empty(&self) -> bool {
        let slots = self.slots.borrow();
        slots.load.is_none() && slots.skip_store.is_none()
    }

    pub fn snapshot(&self) -> CorrelationSlots<L>
    where
        L: Clone,
    {
        self.slots.borrow().clone()
    }
}
