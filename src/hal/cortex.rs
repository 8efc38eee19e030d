//! Cortex-M implementation of the hardware boundary (Armv7-M and up)
//!
//! Owns the pieces of the architecture the portable kernel must not touch:
//! exception priorities, the SysTick timer, the PendSV register
//! save/restore and the unprivileged launch of the first task.

use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SCB;

use crate::config;
use crate::hal::Port;
use crate::rtos::scheduler::{Error, FirstTask};
use crate::rtos::task::{self, StatusCell, FRAME_WORDS};

/// Stack-pointer slot of the task being switched out. PendSV stores the
/// live process stack pointer through it.
#[no_mangle]
static OS_CURR_SP_SLOT: AtomicPtr<usize> = AtomicPtr::new(ptr::null_mut());

/// Stack-pointer slot of the task being switched in.
#[no_mangle]
static OS_NEXT_SP_SLOT: AtomicPtr<usize> = AtomicPtr::new(ptr::null_mut());

pub struct CortexMPort {
    _private: (),
}

impl CortexMPort {
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Port for CortexMPort {
    fn set_interrupt_priorities(&mut self) {
        // PendSV must run only once no other handler is active; SVCall and
        // SysTick share the top level so they never preempt each other.
        unsafe {
            let mut peripherals = cortex_m::Peripherals::steal();
            peripherals.SCB.set_priority(SystemHandler::PendSV, 0xff);
            peripherals.SCB.set_priority(SystemHandler::SVCall, 0x00);
            peripherals.SCB.set_priority(SystemHandler::SysTick, 0x00);
        }
    }

    fn start_tick_timer(&mut self, period: u32) -> Result<(), Error> {
        if period == 0 || period > config::MAX_TIMER_PERIOD {
            return Err(Error::InvalidParameter);
        }

        let mut syst = unsafe { cortex_m::Peripherals::steal() }.SYST;
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(period - 1);
        syst.clear_current();
        syst.enable_interrupt();
        syst.enable_counter();
        Ok(())
    }

    fn disable_interrupts(&mut self) {
        cortex_m::interrupt::disable();
    }

    fn enable_interrupts(&mut self) {
        unsafe { cortex_m::interrupt::enable() };
    }

    fn publish_current(&mut self, status: *const StatusCell) {
        task::publish_current_status(status);
    }

    fn stage_context_switch(&mut self, outgoing_sp: *mut usize, incoming_sp: *mut usize) {
        OS_CURR_SP_SLOT.store(outgoing_sp, Ordering::Release);
        OS_NEXT_SP_SLOT.store(incoming_sp, Ordering::Release);
        SCB::set_pendsv();
    }

    fn request_reschedule(&mut self) {
        // Carries SVC_RESCHEDULE; the SVCall handler reads the immediate
        // back out of the instruction.
        unsafe { core::arch::asm!("svc 0x01") };
    }
}

/// Drops to unprivileged thread mode on the first task's stack and enters
/// its handler. The initial register image is skipped rather than restored;
/// LR is preloaded with the return trap so a returning handler is caught
/// like any other.
pub unsafe fn launch_first_task(first: FirstTask) -> ! {
    let stack_top = first.sp + FRAME_WORDS * core::mem::size_of::<u32>();
    let trap = task::task_finished as usize;

    core::arch::asm!(
        "msr psp, r2",
        "msr control, r4", // unprivileged thread mode, PSP
        "isb",
        "mov lr, r3",
        "bx r1",
        in("r0") first.params as usize,
        in("r1") first.handler as usize,
        in("r2") stack_top,
        in("r3") trap,
        in("r4") 0x03u32,
        options(noreturn),
    )
}

/// Context switch. Saves R4-R11 of the outgoing task below its hardware
/// frame, stores the resulting stack pointer through the staged slot, then
/// restores the incoming task the same way. Frame layout, ascending:
/// R8-R11, R4-R7, then the hardware frame R0-R3, R12, LR, PC, xPSR.
#[no_mangle]
#[unsafe(naked)]
unsafe extern "C" fn PendSV() {
    core::arch::naked_asm!(
        "mrs r0, psp",
        "stmdb r0!, {{r4-r7}}",
        "stmdb r0!, {{r8-r11}}",
        "ldr r1, ={curr}",
        "ldr r1, [r1]",
        "str r0, [r1]",
        "ldr r1, ={next}",
        "ldr r1, [r1]",
        "ldr r0, [r1]",
        "ldmia r0!, {{r8-r11}}",
        "ldmia r0!, {{r4-r7}}",
        "msr psp, r0",
        "ldr lr, =0xfffffffd", // return to thread mode on PSP
        "bx lr",
        curr = sym OS_CURR_SP_SLOT,
        next = sym OS_NEXT_SP_SLOT,
    )
}
