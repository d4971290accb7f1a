//! Error types for host-side fabric validation
//!
//! Only the host-visible constructors ([`crate::SignalPadTable::new`],
//! [`crate::McPtr::from_replicas`]) report errors. Device-side operations
//! have no error channel: their single failure surface is the fatal trap in
//! [`crate::fault`].

use crate::constants::MAX_WORLD_SIZE;

/// Result type for host-side fabric operations
pub type Result<T> = std::result::Result<T, FabricError>;

/// Errors that can occur while validating fabric capabilities
#[derive(Debug, thiserror::Error)]
pub enum FabricError {
    /// World size outside the supported fabric domain
    #[error("world size {0} out of range (1..={MAX_WORLD_SIZE})")]
    WorldSizeOutOfRange(usize),

    /// Rank index outside the world
    #[error("rank {rank} out of range for world size {world_size}")]
    RankOutOfRange { rank: usize, world_size: usize },

    /// Null device pointer in a per-rank table
    #[error("null device pointer for rank {0}")]
    NullDevicePointer(usize),

    /// Device pointer not aligned for 32-bit atomic access
    #[error("device pointer for rank {rank} misaligned: {addr:#x} (requires {required}-byte alignment)")]
    MisalignedDevicePointer {
        rank: usize,
        addr: usize,
        required: usize,
    },
}
