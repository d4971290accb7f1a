//! Device-side synchronization primitives for symmetric-memory fabrics
//!
//! A symmetric-memory region is allocated at matching offsets on every
//! participating device, so each device can directly address a peer's
//! buffer. This crate provides the correctness-critical foundation beneath
//! collective operators built on such a region:
//!
//! - **Ordering tokens**: compile-time memory-ordering selection
//!   (relaxed/acquire/release/acq_rel) with zero runtime branching
//! - **Atomic signals**: CAS-based put/wait spin primitives on 32-bit slots
//! - **Block synchronization**: rendezvous of same-index blocks across all
//!   ranks through a per-rank signal pad
//! - **Multicast operations**: fan-in load-reduce and fan-out store over a
//!   closed element set, with vector payloads of 4/8/16 bytes
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Collective Operators (callers)              │
//! │        all-reduce, all-gather, barrier, ...              │
//! └───────────────────────┬─────────────────────────────────┘
//!                         │ rank, world size, pad table, mc ptr
//!                         ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                   symmfab-device                         │
//! │  sync_remote_blocks ── put/wait ── cas ── ordering token │
//! │  multimem_ld_reduce_add / multimem_st ── vector payloads │
//! └───────────────────────┬─────────────────────────────────┘
//!                         │ system-scope 32-bit atomics
//!                         ▼
//!              symmetric-memory allocation (peer pads,
//!              peer data buffers, multicast mapping)
//! ```
//!
//! Allocation and registration of the region, rank discovery, and kernel
//! launch all belong to the calling layer: it hands this crate a rank, a
//! world size, and resolved device pointers, and invokes the primitives
//! from simulated device lanes.
//!
//! # Failure surface
//!
//! Host-side constructors validate capabilities and return
//! [`FabricError`]. Device-side operations have no error channel: an
//! unsupported path ([`McPtr`] without a multicast mapping) traps fatally
//! via [`device_trap`], and precondition violations (misaligned pointers,
//! mismatched put/wait pairing, slot reuse before epoch completion) are
//! undefined behavior by contract — documented, never detected.

pub mod align;
pub mod constants;
pub mod error;
pub mod fault;
pub mod multicast;
pub mod ordering;
pub mod signal;
pub mod sync;
pub mod vec;

// Re-export public API
pub use align::{alignment_of, alignment_of_ptr};
pub use error::{FabricError, Result};
pub use fault::device_trap;
pub use multicast::{multimem_ld_reduce_add, multimem_st, McPtr, McReducible};
pub use ordering::{AcqRel, Acquire, MemOrder, Relaxed, Release, Semantics};
pub use signal::{cas, put_signal, wait_signal, SignalPadTable};
pub use sync::{sync_remote_blocks, LaneCtx, SyncSemantics};
pub use vec::{Vec16, Vec4, Vec8, VecPayload};
