//! On-target check of the kernel API contract, followed by a live run.
//!
//! Exercises the lifecycle error paths against the singleton kernel, then
//! starts a small task set and lets a supervisor task verify that the
//! others actually get scheduled. Exits through semihosting, so it can run
//! under QEMU.

#![no_std]
#![no_main]

use panic_halt as _;

use core::ptr;
use core::ptr::addr_of_mut;
use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m_rt::entry;
use cortex_m_semihosting::{debug, hio, hprintln};

use cortexm_rtos::check_eq;
use cortexm_rtos::testing::{TestCase, TestResult, TestRunner};
use cortexm_rtos::{config, os, Error, StackWord};

const STACK_WORDS: usize = 128;
const WORKERS: usize = config::MAX_TASKS - 1;

static mut STACKS: [[StackWord; STACK_WORDS]; config::MAX_TASKS + 1] =
    [[0; STACK_WORDS]; config::MAX_TASKS + 1];

static WORK_DONE: AtomicU32 = AtomicU32::new(0);

fn stack(index: usize) -> &'static mut [StackWord] {
    unsafe { &mut (*addr_of_mut!(STACKS))[index][..] }
}

struct CreateBeforeInit;
impl TestCase for CreateBeforeInit {
    fn name(&self) -> &'static str {
        "create before init"
    }
    fn run(&self) -> TestResult {
        check_eq!(
            os::create_task(worker_task, ptr::null_mut(), stack(0)),
            Err(Error::WrongState),
            "expected WrongState"
        );
        TestResult::Pass
    }
}

struct DelayBeforeStart;
impl TestCase for DelayBeforeStart {
    fn name(&self) -> &'static str {
        "delay before start"
    }
    fn run(&self) -> TestResult {
        check_eq!(os::delay(1), Err(Error::WrongState), "expected WrongState");
        TestResult::Pass
    }
}

struct InitOnce;
impl TestCase for InitOnce {
    fn name(&self) -> &'static str {
        "init"
    }
    fn run(&self) -> TestResult {
        check_eq!(os::init(), Ok(()), "init failed");
        check_eq!(os::init(), Err(Error::WrongState), "second init accepted");
        TestResult::Pass
    }
}

struct StartWithoutTasks;
impl TestCase for StartWithoutTasks {
    fn name(&self) -> &'static str {
        "start without tasks"
    }
    fn run(&self) -> TestResult {
        check_eq!(
            os::start(config::TICK_PERIOD),
            Err(Error::WrongState),
            "expected WrongState"
        );
        TestResult::Pass
    }
}

struct RejectBadPeriod;
impl TestCase for RejectBadPeriod {
    fn name(&self) -> &'static str {
        "reject bad tick period"
    }
    fn run(&self) -> TestResult {
        check_eq!(
            os::create_task(supervisor_task, ptr::null_mut(), stack(0)),
            Ok(()),
            "supervisor registration failed"
        );
        check_eq!(
            os::start(0),
            Err(Error::InvalidParameter),
            "expected InvalidParameter"
        );
        TestResult::Pass
    }
}

struct FillTable;
impl TestCase for FillTable {
    fn name(&self) -> &'static str {
        "table capacity"
    }
    fn run(&self) -> TestResult {
        for i in 0..WORKERS {
            check_eq!(
                os::create_task(worker_task, ptr::null_mut(), stack(1 + i)),
                Ok(()),
                "worker registration failed"
            );
        }
        check_eq!(
            os::create_task(worker_task, ptr::null_mut(), stack(config::MAX_TASKS)),
            Err(Error::OutOfMemory),
            "expected OutOfMemory"
        );
        TestResult::Pass
    }
}

#[entry]
fn main() -> ! {
    let stdout = hio::hstdout().unwrap();
    let mut runner = TestRunner::new(SemiOut(stdout));

    let passed = runner.run_suite(
        "kernel api",
        &[
            &CreateBeforeInit,
            &DelayBeforeStart,
            &InitOnce,
            &StartWithoutTasks,
            &RejectBadPeriod,
            &FillTable,
        ],
    );

    if !passed {
        debug::exit(debug::EXIT_FAILURE);
    }

    // Table is fully populated; hand over to the scheduler and let the
    // supervisor finish the job.
    os::start(config::TICK_PERIOD).unwrap();

    loop {}
}

extern "C" fn worker_task(_params: *mut ()) {
    loop {
        WORK_DONE.fetch_add(1, Ordering::Relaxed);
        os::delay(5).ok();
    }
}

extern "C" fn supervisor_task(_params: *mut ()) {
    os::delay(100).ok();

    let done = WORK_DONE.load(Ordering::Relaxed);
    hprintln!("supervisor: {} worker iterations", done);
    if done > 0 {
        hprintln!("self test passed");
        debug::exit(debug::EXIT_SUCCESS);
    } else {
        hprintln!("self test FAILED: workers never ran");
        debug::exit(debug::EXIT_FAILURE);
    }
    loop {}
}

struct SemiOut(hio::HStdout);

impl ufmt::uWrite for SemiOut {
    type Error = ();

    fn write_str(&mut self, s: &str) -> Result<(), ()> {
        use core::fmt::Write;
        self.0.write_str(s).map_err(|_| ())
    }
}
