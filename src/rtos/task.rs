//! Task control blocks and initial execution contexts

use core::ptr;
use core::sync::atomic::{AtomicPtr, AtomicU8, AtomicUsize, Ordering};

use crate::diagnostics;
use crate::rtos::scheduler::Error;

/// One word of task stack, as saved and restored by the context switch.
pub type StackWord = u32;

/// Task entry point. Receives the opaque parameter passed at registration.
pub type TaskHandler = extern "C" fn(*mut ());

/// Words reserved at the top of each stack for the saved register image:
/// R8-R11, R4-R7, then the hardware frame R0-R3, R12, LR, PC, xPSR.
pub const FRAME_WORDS: usize = 16;

/// Default xPSR for a fresh task: Thumb state, thread mode, no exception
/// active.
pub const INITIAL_XPSR: StackWord = 0x0100_0000;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum TaskStatus {
    /// Ready to run
    Idle = 1,
    /// Currently selected to run
    Active = 2,
    /// Blocked on the tick timer
    Waiting = 3,
    /// Handler returned; the slot is permanently out of rotation
    Finished = 4,
}

/// Task status shared between the running task, the tick handler and the
/// return trap. Release/acquire so a delaying task observes the tick
/// handler's wakeup store.
pub struct StatusCell(AtomicU8);

impl StatusCell {
    pub const fn new(status: TaskStatus) -> Self {
        Self(AtomicU8::new(status as u8))
    }

    pub fn load(&self) -> TaskStatus {
        match self.0.load(Ordering::Acquire) {
            1 => TaskStatus::Idle,
            2 => TaskStatus::Active,
            3 => TaskStatus::Waiting,
            _ => TaskStatus::Finished,
        }
    }

    pub fn store(&self, status: TaskStatus) {
        self.0.store(status as u8, Ordering::Release);
    }
}

/// Per-task state record.
pub struct TaskControl {
    /// Saved process stack pointer. Written by the context-switch handler
    /// through the pointer staged at reschedule time.
    pub(crate) sp: AtomicUsize,
    pub(crate) handler: TaskHandler,
    pub(crate) params: usize,
    pub(crate) wait_ticks: u32,
    pub(crate) status: StatusCell,
}

impl TaskControl {
    /// An unoccupied slot. Slots at or past the table size are never
    /// scanned, so the placeholder handler is unreachable.
    pub(crate) const VACANT: TaskControl = TaskControl {
        sp: AtomicUsize::new(0),
        handler: vacant_task,
        params: 0,
        wait_ticks: 0,
        status: StatusCell::new(TaskStatus::Idle),
    };
}

extern "C" fn vacant_task(_params: *mut ()) {}

/// Writes the synthetic register image into the top of `stack` so that the
/// first restore of this context resumes in `handler(params)`, and returns
/// the initial stack pointer (the address of the lowest saved word).
///
/// Remaining register slots are zeroed; with the `debug` feature they carry
/// `(slot + 1) * 1000 + register_number` instead, so a register restored
/// from the wrong place shows up as a recognizable value.
pub(crate) fn build_initial_frame(
    stack: &mut [StackWord],
    handler: TaskHandler,
    params: *mut (),
    slot: usize,
) -> Result<usize, Error> {
    let len = stack.len();
    if len < FRAME_WORDS {
        return Err(Error::InvalidParameter);
    }

    let frame = &mut stack[len - FRAME_WORDS..];
    for word in frame.iter_mut() {
        *word = 0;
    }

    frame[15] = INITIAL_XPSR;
    frame[14] = handler as usize as StackWord;
    frame[13] = task_finished as usize as StackWord;
    frame[8] = params as usize as StackWord;

    #[cfg(feature = "debug")]
    seed_scratch_registers(frame, slot);
    #[cfg(not(feature = "debug"))]
    let _ = slot;

    Ok(frame.as_ptr() as usize)
}

#[cfg(feature = "debug")]
fn seed_scratch_registers(frame: &mut [StackWord], slot: usize) {
    let base = ((slot + 1) * 1000) as StackWord;
    frame[12] = base + 12; // R12
    frame[11] = base + 3; // R3
    frame[10] = base + 2; // R2
    frame[9] = base + 1; // R1
    // frame[8] is R0
    frame[7] = base + 7; // R7
    frame[6] = base + 6; // R6
    frame[5] = base + 5; // R5
    frame[4] = base + 4; // R4
    frame[3] = base + 11; // R11
    frame[2] = base + 10; // R10
    frame[1] = base + 9; // R9
    frame[0] = base + 8; // R8
}

/// Status cell of the task currently selected to run. Published by the
/// device port on every scheduling decision; the return trap uses it to
/// park a finished task without going through the scheduler.
static CURRENT_STATUS: AtomicPtr<StatusCell> = AtomicPtr::new(ptr::null_mut());

pub(crate) fn publish_current_status(cell: *const StatusCell) {
    CURRENT_STATUS.store(cell as *mut StatusCell, Ordering::Release);
}

/// Return trap for task handlers. A handler that returns ends up here via
/// the LR slot of its initial frame: report the fault, take the slot out of
/// rotation and spin. The rest of the system keeps running.
pub(crate) extern "C" fn task_finished() -> ! {
    diagnostics::report_fault(Error::TaskFinished);

    let cell = CURRENT_STATUS.load(Ordering::Acquire);
    if !cell.is_null() {
        unsafe { (*cell).store(TaskStatus::Finished) };
    }

    loop {
        core::hint::spin_loop();
    }
}
