//! Block-granular synchronization across ranks
//!
//! [`sync_remote_blocks`] coordinates the thread blocks with matching block
//! index across all ranks. It is not a barrier over all remote threads, but
//! it composes with a block-local barrier into several patterns:
//!
//! Pattern 0 — make writes from previous kernels, on any device, visible to
//! the current kernel:
//!
//! ```text
//! sync_remote_blocks::<Relaxed>(...);
//! block_local_barrier();
//! ```
//!
//! Pattern 1 — make writes from the current block visible to all remote
//! blocks with the matching index:
//!
//! ```text
//! block_local_barrier();
//! sync_remote_blocks::<AcqRel>(...);
//! block_local_barrier();
//! ```
//!
//! Pattern 2 — make buffers read by the current kernel safe for writing by
//! subsequent kernels on any device:
//!
//! ```text
//! block_local_barrier();
//! sync_remote_blocks::<Relaxed>(...);
//! ```
//!
//! Addressing (which blocks rendezvous) is carried by the block index while
//! ordering strength is a compile-time token, so one signal-pad table serves
//! arbitrarily many call sites with different ordering needs at zero runtime
//! branching cost.

use crate::ordering::{AcqRel, Acquire, Relaxed, Release, Semantics};
use crate::signal::{put_signal, wait_signal, SignalPadTable};

// ================================================================================================
// Lane Context
// ================================================================================================

/// Position of the calling lane within the launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneCtx {
    /// Block index within the grid
    pub block_idx: u32,

    /// Lane index within the block
    pub lane_idx: u32,
}

impl LaneCtx {
    /// Create a new lane context
    pub const fn new(block_idx: u32, lane_idx: u32) -> Self {
        Self { block_idx, lane_idx }
    }
}

// ================================================================================================
// Synchronization Semantics
// ================================================================================================

mod sealed {
    pub trait Sealed {}
}

/// Ordering instantiations of [`sync_remote_blocks`]
///
/// Closed over exactly two tokens:
///
/// - [`Relaxed`]: put and wait are both relaxed. A pure cross-device
///   rendezvous point; combine with a local barrier for patterns 0 and 2.
/// - [`AcqRel`]: put releases, wait acquires. Required whenever producer and
///   consumer blocks on different devices communicate through the symmetric
///   buffer between calls.
///
/// `Acquire` or `Release` alone do not instantiate the protocol; the trait
/// is sealed and implemented for nothing else.
pub trait SyncSemantics: sealed::Sealed {
    /// Token used for the put half of the handshake
    type Put: Semantics;

    /// Token used for the wait half of the handshake
    type Wait: Semantics;
}

impl sealed::Sealed for Relaxed {}
impl sealed::Sealed for AcqRel {}

impl SyncSemantics for Relaxed {
    type Put = Relaxed;
    type Wait = Relaxed;
}

impl SyncSemantics for AcqRel {
    type Put = Release;
    type Wait = Acquire;
}

// ================================================================================================
// Block Synchronization
// ================================================================================================

/// Rendezvous with the remote blocks holding this block's index.
///
/// Each of the first `world_size` lanes (lane index = target rank `r`) puts
/// its own rank's slot on rank `r`'s pad at `(block_idx, rank)`, then waits
/// on its own pad at `(block_idx, r)`. Lanes at or beyond `world_size`
/// return immediately. All participating lanes complete independently; the
/// block as a whole has rendezvoused once every participating lane returns.
///
/// Post-condition: every slot touched by a completed epoch is back at 0.
///
/// # Safety
///
/// - `rank < world_size` and `world_size == pads.world_size()`.
/// - `ctx.block_idx` addresses the same slot row on every rank, so all
///   participating blocks must pass matching block indices.
/// - Every rank's block with this index must eventually call this function
///   with the same token `S`, or all participants hang (liveness contract).
/// - A slot row must not be reused before the previous epoch on it completed.
#[inline]
pub unsafe fn sync_remote_blocks<S: SyncSemantics>(
    pads: &SignalPadTable,
    rank: usize,
    world_size: usize,
    ctx: LaneCtx,
) {
    debug_assert_eq!(world_size, pads.world_size());
    debug_assert!(rank < world_size);

    if (ctx.lane_idx as usize) < world_size {
        let target = ctx.lane_idx as usize;
        put_signal::<S::Put>(pads.slot(target, ctx.block_idx, rank));
        wait_signal::<S::Wait>(pads.slot(rank, ctx.block_idx, target));
    }
}

// ================================================================================================
// Tests
// ================================================================================================
