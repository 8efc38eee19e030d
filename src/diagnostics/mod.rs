//! Fault reporting sink
//!
//! The destination for unrecoverable conditions, invoked synchronously from
//! whatever context detected them. Keeps a counter and the most recent
//! fault; an optional handler gets called with each report and is allowed
//! to never return.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::rtos::scheduler::Error;

static FAULT_COUNT: AtomicU32 = AtomicU32::new(0);
static LAST_FAULT: AtomicU32 = AtomicU32::new(0);
static FAULT_HANDLER: AtomicUsize = AtomicUsize::new(0);

/// Installs a handler invoked on every fault report.
pub fn set_fault_handler(handler: fn(Error)) {
    FAULT_HANDLER.store(handler as usize, Ordering::Release);
}

pub fn report_fault(error: Error) {
    LAST_FAULT.store(encode(error), Ordering::Release);
    FAULT_COUNT.fetch_add(1, Ordering::Release);

    let raw = FAULT_HANDLER.load(Ordering::Acquire);
    if raw != 0 {
        let handler: fn(Error) = unsafe { core::mem::transmute(raw) };
        handler(error);
    }
}

pub fn fault_count() -> u32 {
    FAULT_COUNT.load(Ordering::Acquire)
}

pub fn last_fault() -> Option<Error> {
    decode(LAST_FAULT.load(Ordering::Acquire))
}

/// Clears the counter and the last-fault record.
pub fn reset() {
    FAULT_COUNT.store(0, Ordering::Release);
    LAST_FAULT.store(0, Ordering::Release);
}

fn encode(error: Error) -> u32 {
    match error {
        Error::WrongState => 1,
        Error::OutOfMemory => 2,
        Error::InvalidParameter => 3,
        Error::TaskFinished => 4,
    }
}

fn decode(raw: u32) -> Option<Error> {
    match raw {
        1 => Some(Error::WrongState),
        2 => Some(Error::OutOfMemory),
        3 => Some(Error::InvalidParameter),
        4 => Some(Error::TaskFinished),
        _ => None,
    }
}
