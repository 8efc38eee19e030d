//! Singleton kernel instance and the device-facing API
//!
//! One statically allocated kernel per system, reached from thread mode
//! through the functions below and from handler mode through the SysTick
//! and SVCall entries. Access from thread mode goes through a critical
//! section; the handlers are serialized by their shared priority level.

use core::ptr::addr_of_mut;

use cortex_m::interrupt;
use cortex_m_rt::exception;

use crate::config;
use crate::hal::cortex::{self, CortexMPort};
use crate::rtos::scheduler::{Error, Kernel};
use crate::rtos::task::{StackWord, TaskHandler, TaskStatus};

static mut KERNEL: Kernel<CortexMPort> = Kernel::new(CortexMPort::new());

fn kernel_ptr() -> *mut Kernel<CortexMPort> {
    unsafe { addr_of_mut!(KERNEL) }
}

/// Initializes the kernel and the idle task. Call once, before anything
/// else.
pub fn init() -> Result<(), Error> {
    interrupt::free(|_| unsafe { (*kernel_ptr()).init() })
}

/// Registers a task. The top 16 words of `stack` are consumed by the
/// initial register image.
pub fn create_task(
    handler: TaskHandler,
    params: *mut (),
    stack: &'static mut [StackWord],
) -> Result<(), Error> {
    interrupt::free(|_| unsafe { (*kernel_ptr()).create_task(handler, params, stack) })
}

/// Starts the scheduler and enters the first task in unprivileged thread
/// mode. Returns only on error; afterwards all scheduling happens in the
/// handlers.
pub fn start(tick_period: u32) -> Result<(), Error> {
    let first = unsafe { (*kernel_ptr()).start(tick_period) }?;
    unsafe { cortex::launch_first_task(first) }
}

/// Blocks the calling task for `ticks` timer periods. Zero yields the
/// processor without waiting.
pub fn delay(ticks: u32) -> Result<(), Error> {
    let cell = unsafe { (*kernel_ptr()).begin_delay(ticks) }?;

    if let Some(status) = cell {
        // The reschedule has already switched us out; spinning here covers
        // the window until the tick service flips the status back.
        while unsafe { (*status).load() } == TaskStatus::Waiting {
            core::hint::spin_loop();
        }
    }
    Ok(())
}

/// Writes the kernel event log to `out`. Meant for a console dump before
/// `start` or from a fault handler.
pub fn dump_log<W: ufmt::uWrite>(out: &mut W) -> Result<(), W::Error> {
    unsafe { (*kernel_ptr()).logger().dump(out) }
}

/// Millisecond delay provider on top of the kernel tick.
pub struct TickDelay;

impl embedded_hal::blocking::delay::DelayMs<u32> for TickDelay {
    fn delay_ms(&mut self, ms: u32) {
        let ticks = ms.saturating_mul(config::TICK_HZ) / 1000;
        let _ = delay(ticks);
    }
}

#[exception]
fn SysTick() {
    unsafe { (*kernel_ptr()).systick() };
}

/// SVCall entry. Hands the stacked frame to the dispatcher so it can read
/// the request number back out of the trapping instruction.
#[no_mangle]
#[unsafe(naked)]
unsafe extern "C" fn SVCall() {
    core::arch::naked_asm!(
        "mrs r0, psp",
        "b {dispatch}",
        dispatch = sym svcall_dispatch,
    )
}

/// Stacked exception frame, ascending from the faulting stack pointer:
///
/// ```text
/// +------+
/// | xPSR |  frame[7]
/// |  PC  |  frame[6]
/// |  LR  |
/// |  R12 |
/// |  R3  |
/// |  R2  |
/// |  R1  |
/// |  R0  |  frame[0]
/// +------+
/// ```
///
/// The SVC immediate sits in the low byte of the instruction two bytes
/// behind the stacked PC.
extern "C" fn svcall_dispatch(frame: *const u32) {
    let request = unsafe {
        let pc = *frame.add(6);
        *(pc as *const u8).sub(2)
    };
    unsafe { (*kernel_ptr()).syscall(request) };
}
