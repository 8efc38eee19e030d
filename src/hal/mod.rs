//! Hardware boundary for the kernel
//!
//! The scheduler drives the processor through this trait only; the
//! Cortex-M implementation lives in `cortex` and host tests use the
//! recording mock.

#[cfg(feature = "device")]
pub mod cortex;
#[cfg(test)]
pub mod mock;

#[cfg(feature = "device")]
pub use cortex::CortexMPort;

use crate::rtos::scheduler::Error;
use crate::rtos::task::StatusCell;

pub trait Port {
    /// Context-switch interrupt at the lowest priority, tick and syscall at
    /// the highest.
    fn set_interrupt_priorities(&mut self);

    /// Starts the periodic tick timer. Fails with `InvalidParameter` when
    /// the platform cannot count the requested period.
    fn start_tick_timer(&mut self, period: u32) -> Result<(), Error>;

    /// Masks all maskable interrupts.
    fn disable_interrupts(&mut self);

    fn enable_interrupts(&mut self);

    /// Publishes the status cell of the task selected to run, for the
    /// handler-return trap.
    fn publish_current(&mut self, status: *const StatusCell);

    /// Hands the outgoing and incoming stack-pointer slots to the context
    /// switch and raises its interrupt. Never called when the two tasks are
    /// the same.
    fn stage_context_switch(&mut self, outgoing_sp: *mut usize, incoming_sp: *mut usize);

    /// Requests a reschedule from unprivileged task code.
    fn request_reschedule(&mut self);
}
