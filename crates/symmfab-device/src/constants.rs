//! Constants defining the symmetric-memory fabric limits

/// Maximum number of lanes (threads) per block participating in a kernel
pub const MAX_THREADS_PER_BLOCK: usize = 1024;

/// Maximum number of blocks that may rendezvous through one signal pad
pub const MAX_BLOCKS: usize = 8;

/// Maximum number of ranks in a one-hop fabric domain
///
/// Bounds the inline pointer tables ([`crate::SignalPadTable`],
/// [`crate::McPtr`]) so device-side values stay `Copy` and register-resident.
pub const MAX_WORLD_SIZE: usize = 8;

/// Number of 32-bit slots a signal pad must provide for `world_size` ranks
///
/// Slots are indexed `(block_idx, peer_rank)`, so each pad carries one slot
/// per peer for each of the [`MAX_BLOCKS`] possible blocks.
pub const fn signal_pad_slots(world_size: usize) -> usize {
    MAX_BLOCKS * world_size
}

/// Byte size of a signal pad sized for `world_size` ranks
pub const fn signal_pad_bytes(world_size: usize) -> usize {
    signal_pad_slots(world_size) * core::mem::size_of::<u32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_validity() {
        assert_eq!(MAX_THREADS_PER_BLOCK, 1024);
        assert_eq!(MAX_BLOCKS, 8);
        assert_eq!(MAX_WORLD_SIZE, 8);
        assert!(MAX_WORLD_SIZE <= MAX_THREADS_PER_BLOCK);
    }

    #[test]
    fn test_signal_pad_sizing() {
        assert_eq!(signal_pad_slots(2), 16);
        assert_eq!(signal_pad_slots(8), 64);
        assert_eq!(signal_pad_bytes(4), 128);
    }
}
