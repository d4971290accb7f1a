//! Atomic signal primitives and the per-rank signal pad table
//!
//! The base primitive is a compare-and-swap on a 32-bit signal slot with a
//! compile-time ordering token. On top of it, [`put_signal`] / [`wait_signal`]
//! form a single-use, single-producer/single-consumer binary semaphore:
//! exactly one `put` must be matched by exactly one `wait` per epoch.
//!
//! Both primitives busy-wait. There is no timeout, no descheduling, and no
//! backoff: a peer that never reaches its matching operation hangs every
//! waiter transitively. Liveness (all participants eventually arrive) is a
//! contract the calling collective layer must uphold.

use std::sync::atomic::AtomicU32;

use crate::constants::MAX_WORLD_SIZE;
use crate::error::{FabricError, Result};
use crate::ordering::Semantics;

// ================================================================================================
// Compare-And-Swap
// ================================================================================================

/// Atomically compare `*slot` against `compare` and, if equal, write `value`.
///
/// Always returns the value observed before the attempt, whether or not the
/// swap happened. The ordering token `S` selects the visibility guarantee;
/// tokens outside the closed set do not exist ([`Semantics`] is sealed).
///
/// # Safety
///
/// `slot` must be non-null, 4-byte aligned, and valid for reads and writes
/// for the duration of the call. All concurrent access to the slot must go
/// through the atomic primitives of this module.
#[inline]
pub unsafe fn cas<S: Semantics>(slot: *mut u32, compare: u32, value: u32) -> u32 {
    let atom = AtomicU32::from_ptr(slot);
    match atom.compare_exchange(compare, value, S::SUCCESS, S::FAILURE) {
        Ok(prev) | Err(prev) => prev,
    }
}

// ================================================================================================
// Signal Put / Wait
// ================================================================================================

/// Spin until this caller transitions the slot 0→1.
///
/// # Safety
///
/// Same pointer requirements as [`cas`]. The slot must be logically owned by
/// exactly one producer/consumer pair for the current epoch; a second
/// concurrent producer on the same slot is a protocol violation.
#[inline]
pub unsafe fn put_signal<S: Semantics>(slot: *mut u32) {
    while cas::<S>(slot, 0, 1) != 0 {
        std::hint::spin_loop();
    }
}

/// Spin until this caller observes and clears a 1 (transitions the slot 1→0).
///
/// # Safety
///
/// Same requirements as [`put_signal`].
#[inline]
pub unsafe fn wait_signal<S: Semantics>(slot: *mut u32) {
    while cas::<S>(slot, 1, 0) != 1 {
        std::hint::spin_loop();
    }
}

// ================================================================================================
// Signal Pad Table
// ================================================================================================

/// Per-rank table of signal pad device pointers
///
/// One pad per participating rank, resolved once per kernel launch by the
/// allocation layer and read-only to this crate. Each pad is an array of
/// 32-bit slots indexed `(block_idx, peer_rank)`; slot
/// `block_idx * world_size + producer` on rank `target`'s pad is owned, for
/// one epoch, by the (`producer` → `target`) pair of blocks with that index.
///
/// The table is `Copy` and register-sized: the pointer array is inline,
/// bounded by [`MAX_WORLD_SIZE`].
#[derive(Debug, Clone, Copy)]
pub struct SignalPadTable {
    pads: [*mut u32; MAX_WORLD_SIZE],
    world_size: usize,
}

// SAFETY: the pads point into the symmetric-memory allocation, which outlives
// every kernel launch, and all slot access goes through 32-bit atomics. The
// table itself is immutable after construction.
unsafe impl Send for SignalPadTable {}
unsafe impl Sync for SignalPadTable {}

impl SignalPadTable {
    /// Build a table from one pad pointer per rank.
    ///
    /// Each pad must provide [`crate::constants::signal_pad_slots`] slots of
    /// zero-initialized memory; capacity cannot be checked here and is the
    /// allocation layer's contract.
    ///
    /// # Errors
    ///
    /// Returns an error if the world size is outside `1..=MAX_WORLD_SIZE`, or
    /// if any pad pointer is null or not 4-byte aligned.
    pub fn new(pads: &[*mut u32]) -> Result<Self> {
        let world_size = pads.len();
        if world_size == 0 || world_size > MAX_WORLD_SIZE {
            return Err(FabricError::WorldSizeOutOfRange(world_size));
        }
        let mut table = [std::ptr::null_mut(); MAX_WORLD_SIZE];
        for (rank, &pad) in pads.iter().enumerate() {
            if pad.is_null() {
                return Err(FabricError::NullDevicePointer(rank));
            }
            if pad as usize % 4 != 0 {
                return Err(FabricError::MisalignedDevicePointer {
                    rank,
                    addr: pad as usize,
                    required: 4,
                });
            }
            table[rank] = pad;
        }
        tracing::debug!(target: "symmfab_device::signal", world_size, "signal pad table resolved");
        Ok(Self {
            pads: table,
            world_size,
        })
    }

    /// Number of participating ranks
    pub fn world_size(&self) -> usize {
        self.world_size
    }

    /// Slot on `target`'s pad owned by `producer` for the given block index.
    pub fn slot(&self, target: usize, block_idx: u32, producer: usize) -> *mut u32 {
        debug_assert!(target < self.world_size);
        debug_assert!(producer < self.world_size);
        debug_assert!((block_idx as usize) < crate::constants::MAX_BLOCKS);
        unsafe { self.pads[target].add(block_idx as usize * self.world_size + producer) }
    }
}

// ================================================================================================
// Tests
// ================================================================================================
