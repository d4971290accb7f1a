//! Multicast load-reduce and store operations
//!
//! A multicast address resolves to every device mapped to a symmetric
//! buffer: loads fan in (read all replicas, reduce), stores fan out (every
//! replica receives the same bytes). In the reference memory model the
//! address is a per-rank replica pointer table and the single hardware
//! instruction becomes a relaxed 32-bit-atomic sweep over the replicas —
//! per-word atomic, no ordering between words or with any other operation.
//! Callers needing ordering add it via [`crate::sync::sync_remote_blocks`].
//!
//! The element set of the reduction is closed ([`McReducible`]: `f32` and
//! `bf16` only); instantiating with any other type fails to compile.
//! Summation order across replicas and float rounding are fabric-defined —
//! treat results as a hardware accumulate, not bit-reproducible.

use std::sync::atomic::{AtomicU32, Ordering};

use half::bf16;

use crate::constants::MAX_WORLD_SIZE;
use crate::error::{FabricError, Result};
use crate::fault::device_trap;
use crate::vec::VecPayload;

// ================================================================================================
// Multicast Pointer
// ================================================================================================

/// Pointer into the multicast address space of a symmetric buffer
///
/// Carries one replica pointer per rank plus the fabric's multicast
/// capability, both resolved by the allocation layer. `Copy` and
/// register-sized: the replica table is inline, bounded by
/// [`MAX_WORLD_SIZE`].
///
/// Whether the fabric actually maps the buffer for multicast is a runtime
/// property of the address; the device operations trap fatally when the
/// capability is absent rather than return a wrong result.
#[derive(Debug)]
pub struct McPtr<T> {
    replicas: [*mut T; MAX_WORLD_SIZE],
    world_size: usize,
    multicast: bool,
}

impl<T> Clone for McPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for McPtr<T> {}

// SAFETY: replicas point into the symmetric-memory allocation, which outlives
// every kernel launch; all access goes through 32-bit atomics. The pointer
// value itself is immutable after construction.
unsafe impl<T> Send for McPtr<T> {}
unsafe impl<T> Sync for McPtr<T> {}

impl<T> McPtr<T> {
    /// Resolve a multicast address from one replica pointer per rank.
    ///
    /// # Errors
    ///
    /// Returns an error if the world size is outside `1..=MAX_WORLD_SIZE`,
    /// or if any replica pointer is null or not 4-byte aligned (the lane
    /// granularity of the reference model).
    pub fn from_replicas(replicas: &[*mut T]) -> Result<Self> {
        Self::build(replicas, true)
    }

    /// Resolve an address on a fabric without a multicast mapping.
    ///
    /// Any device operation through the result traps. Models hardware
    /// generations or build configurations lacking multicast support.
    pub fn without_multicast(replicas: &[*mut T]) -> Result<Self> {
        Self::build(replicas, false)
    }

    fn build(replicas: &[*mut T], multicast: bool) -> Result<Self> {
        let world_size = replicas.len();
        if world_size == 0 || world_size > MAX_WORLD_SIZE {
            return Err(FabricError::WorldSizeOutOfRange(world_size));
        }
        let mut table = [std::ptr::null_mut(); MAX_WORLD_SIZE];
        for (rank, &ptr) in replicas.iter().enumerate() {
            if ptr.is_null() {
                return Err(FabricError::NullDevicePointer(rank));
            }
            if ptr as usize % 4 != 0 {
                return Err(FabricError::MisalignedDevicePointer {
                    rank,
                    addr: ptr as usize,
                    required: 4,
                });
            }
            table[rank] = ptr;
        }
        Ok(Self {
            replicas: table,
            world_size,
            multicast,
        })
    }

    /// Number of ranks mapped to this address
    pub fn world_size(&self) -> usize {
        self.world_size
    }

    /// Whether the fabric maps this buffer for multicast
    pub fn has_multicast(&self) -> bool {
        self.multicast
    }

    /// Offset the address by `count` elements on every replica.
    ///
    /// # Safety
    ///
    /// The offset must stay within the symmetric allocation on every rank.
    pub unsafe fn add(mut self, count: usize) -> Self {
        for rank in 0..self.world_size {
            self.replicas[rank] = self.replicas[rank].add(count);
        }
        self
    }

    fn replica(&self, rank: usize) -> *mut T {
        debug_assert!(rank < self.world_size);
        self.replicas[rank]
    }
}

// ================================================================================================
// Reducible Element Types
// ================================================================================================

mod sealed {
    pub trait Sealed {}
}

/// Element types the multicast reduction is defined for
///
/// Closed set: `f32` (one element per 32-bit lane) and `bf16` (two elements
/// per lane, packed low/high). Elementwise addition is expressed on the
/// packed lane so the reduce loop stays element-type-agnostic.
pub trait McReducible: sealed::Sealed + Copy + 'static {
    /// Elements packed into one 32-bit lane
    const LANE_ELEMS: usize;

    /// Elementwise add of two packed lanes
    fn lane_add(a: u32, b: u32) -> u32;
}

impl sealed::Sealed for f32 {}
impl sealed::Sealed for bf16 {}

impl McReducible for f32 {
    const LANE_ELEMS: usize = 1;

    #[inline]
    fn lane_add(a: u32, b: u32) -> u32 {
        (f32::from_bits(a) + f32::from_bits(b)).to_bits()
    }
}

impl McReducible for bf16 {
    const LANE_ELEMS: usize = 2;

    #[inline]
    fn lane_add(a: u32, b: u32) -> u32 {
        let lo = bf16::from_bits(a as u16) + bf16::from_bits(b as u16);
        let hi = bf16::from_bits((a >> 16) as u16) + bf16::from_bits((b >> 16) as u16);
        u32::from(lo.to_bits()) | (u32::from(hi.to_bits()) << 16)
    }
}

// ================================================================================================
// Multicast Operations
// ================================================================================================

/// Fan-in read with elementwise add-reduction across all mapped replicas.
///
/// Reads `V::BYTES` bytes from every replica and sums corresponding
/// elements, returning the packed result. Accumulation starts from the
/// additive identity; the order replicas contribute in is fabric-defined.
///
/// Traps fatally when the address lacks a multicast mapping.
///
/// # Safety
///
/// `mc` must be `V::BYTES`-aligned on every replica (use
/// [`crate::align::alignment_of_ptr`] to select the width) and valid for
/// `V::BYTES` bytes of access on every rank.
#[inline]
pub unsafe fn multimem_ld_reduce_add<V: VecPayload, T: McReducible>(mc: McPtr<T>) -> V {
    if !mc.has_multicast() {
        device_trap("multimem.ld_reduce on a fabric without a multicast mapping");
    }
    let mut lanes = [0u32; 4];
    for rank in 0..mc.world_size() {
        let base = mc.replica(rank).cast::<u32>();
        for lane in 0..V::U32_LANES {
            let word = AtomicU32::from_ptr(base.add(lane)).load(Ordering::Relaxed);
            lanes[lane] = T::lane_add(lanes[lane], word);
        }
    }
    V::from_u32_lanes(lanes)
}

/// Fan-out store of a vector payload to all mapped replicas.
///
/// Every replica receives the same bytes, with relaxed ordering only:
/// callers needing acquire/release coupling synchronize via
/// [`crate::sync::sync_remote_blocks`].
///
/// Traps fatally when the address lacks a multicast mapping.
///
/// # Safety
///
/// Same alignment and validity requirements as [`multimem_ld_reduce_add`].
#[inline]
pub unsafe fn multimem_st<V: VecPayload, T>(mc: McPtr<T>, value: V) {
    if !mc.has_multicast() {
        device_trap("multimem.st on a fabric without a multicast mapping");
    }
    let lanes = value.to_u32_lanes();
    for rank in 0..mc.world_size() {
        let base = mc.replica(rank).cast::<u32>();
        for lane in 0..V::U32_LANES {
            AtomicU32::from_ptr(base.add(lane)).store(lanes[lane], Ordering::Relaxed);
        }
    }
}

// ================================================================================================
// Tests
// ================================================================================================
