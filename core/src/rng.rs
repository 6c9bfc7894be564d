//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through a `RandomSource`. The default source is a
//! PCG stream derived from (master_seed, subsystem slot, day), so:
//!   - Adding a new subsystem never changes existing subsystems' streams.
//!   - A session restored from a save at day D draws exactly what a live
//!     session would have drawn at day D.
//!
//! Tests replace the stream with `FixedRng` to force outcomes.

use crate::types::Day;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// The random operations the simulation needs.
pub trait RandomSource: Send {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;

    /// Roll a u64 in [0, n). `n` must be > 0.
    fn next_u64_below(&mut self, n: u64) -> u64;

    /// Bernoulli trial: returns true with probability p.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// A named, deterministic RNG for a single subsystem.
pub struct SubsystemRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    /// Create a subsystem RNG from the master seed and a stable
    /// subsystem index. The index must never change once assigned.
    pub fn new(master_seed: u64, subsystem_index: u64) -> Self {
        let derived_seed = master_seed ^ (subsystem_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl RandomSource for SubsystemRng {
    fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }
}

/// Derives per-subsystem, per-day streams from one master seed.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_subsystem_at_tick(&self, slot: SubsystemSlot, day: Day) -> SubsystemRng {
        let day_seed = self.master_seed ^ day.wrapping_mul(0xbf58_476d_1ce4_e5b9);
        SubsystemRng::new(day_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable subsystem slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every subsystem's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SubsystemSlot {
    Effects = 0,
    Crisis = 1,
    // Add new subsystems here — append only.
}

impl SubsystemSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Effects => "effects",
            Self::Crisis => "crisis",
        }
    }
}

/// A scripted source: every float roll returns `roll`, every index pick
/// returns `pick` (clamped into range).
///
/// `FixedRng::always()` makes every chance succeed, `FixedRng::never()`
/// makes every chance fail.
#[derive(Debug, Clone, Copy)]
pub struct FixedRng {
    pub roll: f64,
    pub pick: u64,
}

impl FixedRng {
    pub fn always() -> Self {
        Self { roll: 0.0, pick: 0 }
    }

    pub fn never() -> Self {
        Self { roll: 0.999_999, pick: 0 }
    }

    pub fn picking(mut self, pick: u64) -> Self {
        self.pick = pick;
        self
    }
}

impl RandomSource for FixedRng {
    fn next_f64(&mut self) -> f64 {
        self.roll
    }

    fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.pick.min(n - 1)
    }
}
