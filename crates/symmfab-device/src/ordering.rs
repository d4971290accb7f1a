//! Memory-ordering semantics for cross-device atomics
//!
//! Every synchronization primitive in this crate is parameterized by an
//! ordering token resolved at compile time. The token selects the visibility
//! guarantee of the underlying system-scope atomic:
//!
//! - `Relaxed`: atomicity only, no cross-device ordering
//! - `Acquire`: reads after this point observe writes that happened-before
//!   the matching `Release`
//! - `Release`: writes before this point become visible to a matching
//!   `Acquire`
//! - `AcqRel`: both
//!
//! A primitive instantiated with a given token must use that token on both
//! the producing and consuming side of a synchronization, or the ordering
//! guarantee is void. The token set is closed: [`Semantics`] is sealed, so
//! an ordering outside the four variants is rejected at compile time.

use std::fmt;
use std::sync::atomic::Ordering;

// ================================================================================================
// Runtime Ordering Value
// ================================================================================================

/// Memory-ordering semantics of an atomic signal operation
///
/// Runtime mirror of the compile-time tokens, for diagnostics and
/// configuration. Dispatch never branches on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MemOrder {
    Relaxed,
    Acquire,
    Release,
    AcqRel,
}

impl fmt::Display for MemOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemOrder::Relaxed => write!(f, "relaxed"),
            MemOrder::Acquire => write!(f, "acquire"),
            MemOrder::Release => write!(f, "release"),
            MemOrder::AcqRel => write!(f, "acq_rel"),
        }
    }
}

// ================================================================================================
// Compile-Time Ordering Tokens
// ================================================================================================

mod sealed {
    pub trait Sealed {}
}

/// Compile-time ordering token
///
/// Implemented only by the four marker types in this module. The associated
/// constants give the orderings applied to the success and failure edges of
/// a compare-exchange: the failure edge is a pure load, so `Release` decays
/// to `Relaxed` and `AcqRel` to `Acquire` there.
pub trait Semantics: sealed::Sealed + Copy + Send + Sync + 'static {
    /// Runtime mirror of this token
    const ORDER: MemOrder;

    /// Ordering applied when the compare-exchange succeeds
    const SUCCESS: Ordering;

    /// Ordering applied when the compare-exchange fails
    const FAILURE: Ordering;
}

/// No cross-device ordering guarantee beyond atomicity
#[derive(Debug, Clone, Copy)]
pub struct Relaxed;

/// Subsequent reads observe writes that happened-before the matching release
#[derive(Debug, Clone, Copy)]
pub struct Acquire;

/// Prior writes become visible to a matching acquire
#[derive(Debug, Clone, Copy)]
pub struct Release;

/// Combined acquire and release semantics
#[derive(Debug, Clone, Copy)]
pub struct AcqRel;

impl sealed::Sealed for Relaxed {}
impl sealed::Sealed for Acquire {}
impl sealed::Sealed for Release {}
impl sealed::Sealed for AcqRel {}

impl Semantics for Relaxed {
    const ORDER: MemOrder = MemOrder::Relaxed;
    const SUCCESS: Ordering = Ordering::Relaxed;
    const FAILURE: Ordering = Ordering::Relaxed;
}

impl Semantics for Acquire {
    const ORDER: MemOrder = MemOrder::Acquire;
    const SUCCESS: Ordering = Ordering::Acquire;
    const FAILURE: Ordering = Ordering::Acquire;
}

impl Semantics for Release {
    const ORDER: MemOrder = MemOrder::Release;
    const SUCCESS: Ordering = Ordering::Release;
    const FAILURE: Ordering = Ordering::Relaxed;
}

impl Semantics for AcqRel {
    const ORDER: MemOrder = MemOrder::AcqRel;
    const SUCCESS: Ordering = Ordering::AcqRel;
    const FAILURE: Ordering = Ordering::Acquire;
}

// ================================================================================================
// Tests
// ================================================================================================
