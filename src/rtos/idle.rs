//! Idle task: the always-present fallback occupying slot 0
//!
//! Runs whenever no user task is ready. Never blocks and never returns.

use core::ptr;

use crate::config;
use crate::hal::Port;
use crate::rtos::scheduler::{Error, Kernel};
use crate::rtos::task::StackWord;

static mut IDLE_STACK: [StackWord; config::IDLE_STACK_WORDS] = [0; config::IDLE_STACK_WORDS];

/// Registers the idle task. Called once from `Kernel::init`, while the
/// table is still empty, so the task lands in slot 0.
pub(crate) fn init<P: Port>(kernel: &mut Kernel<P>) -> Result<(), Error> {
    kernel.bind_slot(idle_entry, ptr::null_mut(), unsafe {
        &mut *ptr::addr_of_mut!(IDLE_STACK)
    })
}

extern "C" fn idle_entry(_params: *mut ()) {
    loop {
        #[cfg(feature = "device")]
        cortex_m::asm::wfi();
        #[cfg(not(feature = "device"))]
        core::hint::spin_loop();
    }
}
