use crate::backend::arm32::error::{BackendError, BackendResult};
use crate::backend::arm32::platform::{SCRATCH_FIRST, SCRATCH_LAST};
use crate::middleend::ir::module::ValueRef;
use std::collections::HashMap;

/// On-demand allocator over a free/busy bitmap of `r0..r10`. Scratch
/// requests are served from `r4..r10` lowest-first; `r0..r3` are only
/// taken by explicit reservation around calls. There is no spilling: an
/// exhausted pool is an error.
pub struct SimpleRegisterAllocator {
    busy: [bool; (SCRATCH_LAST + 1) as usize],
    bindings: HashMap<ValueRef, u8>,
}

impl SimpleRegisterAllocator {
    pub fn new() -> Self {
        Self {
            busy: [false; (SCRATCH_LAST + 1) as usize],
            bindings: HashMap::new(),
        }
    }

    /// Register currently bound to `value`, if any.
    pub fn binding(&self, value: ValueRef) -> Option<u8> {
        self.bindings.get(&value).copied()
    }

    /// Acquire any free scratch register; when a value is supplied the
    /// binding is recorded (and reused if it already exists).
    pub fn allocate(&mut self, value: Option<ValueRef>, context: &str) -> BackendResult<u8> {
        if let Some(value) = value {
            if let Some(&reg) = self.bindings.get(&value) {
                return Ok(reg);
            }
        }
        for reg in SCRATCH_FIRST..=SCRATCH_LAST {
            if !self.busy[reg as usize] {
                self.busy[reg as usize] = true;
                if let Some(value) = value {
                    self.bindings.insert(value, reg);
                }
                return Ok(reg);
            }
        }
        Err(BackendError::RegisterSpillNotSupported {
            context: context.to_string(),
        })
    }

    /// Force-acquire a specific register (the argument registers around
    /// a call). Returns false when it was already busy.
    pub fn reserve(&mut self, reg: u8) -> bool {
        let was_free = !self.busy[reg as usize];
        self.busy[reg as usize] = true;
        was_free
    }

    pub fn release(&mut self, reg: u8) {
        self.busy[reg as usize] = false;
        self.bindings.retain(|_, &mut bound| bound != reg);
    }

    pub fn release_value(&mut self, value: ValueRef) {
        if let Some(reg) = self.bindings.remove(&value) {
            self.busy[reg as usize] = false;
        }
    }
}

impl Default for SimpleRegisterAllocator {
    fn default() -> Self {
        Self::new()
    }
}
