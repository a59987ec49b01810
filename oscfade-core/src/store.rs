//! Mirrored fader values, one slot per console fader.
//!
//! Each slot stores an `f32` as its bit pattern in an `AtomicU32`, so the
//! response listener and any number of command handlers can read and write
//! concurrently without locks. Ordering is `Relaxed`: a stale read only shifts
//! where one fade starts from.

use std::sync::atomic::{AtomicU32, Ordering};

use oscfade_types::{ParamId, ParameterClass};

/// Last known value of every fader, either reported by the console or
/// optimistically set to the target of the most recent fade.
pub struct ParameterStore {
    channels: [AtomicU32; ParameterClass::Channel.count()],
    aux_ins: [AtomicU32; ParameterClass::AuxIn.count()],
    buses: [AtomicU32; ParameterClass::Bus.count()],
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterStore {
    /// All faders start at 0.0.
    pub fn new() -> Self {
        Self {
            channels: std::array::from_fn(|_| AtomicU32::new(0.0_f32.to_bits())),
            aux_ins: std::array::from_fn(|_| AtomicU32::new(0.0_f32.to_bits())),
            buses: std::array::from_fn(|_| AtomicU32::new(0.0_f32.to_bits())),
        }
    }

    fn slots(&self, class: ParameterClass) -> &[AtomicU32] {
        match class {
            ParameterClass::Channel => &self.channels,
            ParameterClass::AuxIn => &self.aux_ins,
            ParameterClass::Bus => &self.buses,
        }
    }

    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.slots(id.class())[id.slot()].load(Ordering::Relaxed))
    }

    pub fn set(&self, id: ParamId, value: f32) {
        self.slots(id.class())[id.slot()].store(value.to_bits(), Ordering::Relaxed);
    }

    /// Copy of every slot in `class`, zero-based.
    pub fn snapshot(&self, class: ParameterClass) -> Vec<f32> {
        self.slots(class)
            .iter()
            .map(|v| f32::from_bits(v.load(Ordering::Relaxed)))
            .collect()
    }
}
