//! Recording stand-in for the hardware boundary, for host tests

use core::ptr;

use crate::config;
use crate::hal::Port;
use crate::rtos::scheduler::Error;
use crate::rtos::task::StatusCell;

pub struct MockPort {
    pub priorities_configured: bool,
    pub timer_period: Option<u32>,
    pub irq_disables: u32,
    pub irq_enables: u32,
    pub reschedule_requests: u32,
    pub published_status: *const StatusCell,
    staged: [(usize, usize); 16],
    staged_len: usize,
}

impl MockPort {
    pub fn new() -> Self {
        Self {
            priorities_configured: false,
            timer_period: None,
            irq_disables: 0,
            irq_enables: 0,
            reschedule_requests: 0,
            published_status: ptr::null(),
            staged: [(0, 0); 16],
            staged_len: 0,
        }
    }

    /// Number of context switches staged so far.
    pub fn staged_switches(&self) -> usize {
        self.staged_len
    }

    pub fn staged(&self) -> &[(usize, usize)] {
        &self.staged[..self.staged_len]
    }
}

impl Port for MockPort {
    fn set_interrupt_priorities(&mut self) {
        self.priorities_configured = true;
    }

    fn start_tick_timer(&mut self, period: u32) -> Result<(), Error> {
        // Same range rule as the SysTick reload register.
        if period == 0 || period > config::MAX_TIMER_PERIOD {
            return Err(Error::InvalidParameter);
        }
        self.timer_period = Some(period);
        Ok(())
    }

    fn disable_interrupts(&mut self) {
        self.irq_disables += 1;
    }

    fn enable_interrupts(&mut self) {
        self.irq_enables += 1;
    }

    fn publish_current(&mut self, status: *const StatusCell) {
        self.published_status = status;
    }

    fn stage_context_switch(&mut self, outgoing_sp: *mut usize, incoming_sp: *mut usize) {
        if self.staged_len < self.staged.len() {
            self.staged[self.staged_len] = (outgoing_sp as usize, incoming_sp as usize);
        }
        self.staged_len += 1;
    }

    fn request_reschedule(&mut self) {
        self.reschedule_requests += 1;
    }
}
