//! Fatal device-side trap
//!
//! Reaching an unsupported code path at device level (multicast operation on
//! a fabric without a multicast mapping) is an invariant violation, not a
//! recoverable error. The trap halts the simulated kernel: the panic unwinds
//! the lane's thread and surfaces to the host as a failed launch join. There
//! is no return-code or exception path at this layer.

/// Abort the executing lane.
///
/// Logs the reason at error level, then panics with a fixed prefix so launch
/// harnesses can distinguish a trap from an ordinary test failure.
#[cold]
#[inline(never)]
pub fn device_trap(reason: &str) -> ! {
    tracing::error!(target: "symmfab_device::fault", reason, "fatal device trap");
    panic!("device trap: {reason}");
}
