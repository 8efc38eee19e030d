//! Kernel lifecycle, task table and round-robin scheduler

use core::sync::atomic::Ordering;

use crate::config;
use crate::hal::Port;
use crate::logger::{Event, Logger};
use crate::rtos::idle;
use crate::rtos::task::{self, StackWord, StatusCell, TaskControl, TaskHandler, TaskStatus};

/// Task table capacity: configured maximum plus the idle task.
pub(crate) const TASK_SLOTS: usize = config::MAX_TASKS + 1;

/// Slot permanently reserved for the idle task.
const IDLE_SLOT: usize = 0;

/// Syscall request code handled by the gateway: run the scheduler.
pub const SVC_RESCHEDULE: u8 = 0x01;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// Operation called outside its required lifecycle state
    WrongState,
    /// Task table is full
    OutOfMemory,
    /// A configuration value was rejected
    InvalidParameter,
    /// A task handler returned
    TaskFinished,
}

/// Kernel lifecycle. Transitions run strictly forward.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum State {
    Default,
    Initialized,
    TasksInitialized,
    Started,
}

/// Everything `start` needs to hand the processor to the first task. The
/// device layer performs the actual privilege drop and jump.
pub struct FirstTask {
    pub sp: usize,
    pub handler: TaskHandler,
    pub params: *mut (),
}

/// The kernel instance. One per system: the hardware boundary it drives is
/// itself singular, so the device build holds exactly one in a static and
/// multiple instances only appear in host tests against the mock port.
pub struct Kernel<P: Port> {
    port: P,
    state: State,
    tasks: [TaskControl; TASK_SLOTS],
    current: usize,
    size: usize,
    log: Logger,
}

impl<P: Port> Kernel<P> {
    pub const fn new(port: P) -> Self {
        Self {
            port,
            state: State::Default,
            tasks: [TaskControl::VACANT; TASK_SLOTS],
            current: 0,
            size: 0,
            log: Logger::new(),
        }
    }

    /// Clears the table, installs the idle task in slot 0 and moves to
    /// `Initialized`. Slot 1 becomes the default start point.
    pub fn init(&mut self) -> Result<(), Error> {
        if self.state != State::Default {
            return Err(Error::WrongState);
        }

        self.current = 0;
        self.size = 0;
        for slot in self.tasks.iter_mut() {
            *slot = TaskControl::VACANT;
        }

        self.state = State::Initialized;
        if let Err(err) = idle::init(self) {
            self.state = State::Default;
            return Err(err);
        }

        self.current = 1;
        self.log.record(Event::Init, 0);
        Ok(())
    }

    /// Registers a task. The stack must stay alive for the life of the
    /// kernel; its top 16 words are consumed by the initial register image.
    pub fn create_task(
        &mut self,
        handler: TaskHandler,
        params: *mut (),
        stack: &'static mut [StackWord],
    ) -> Result<(), Error> {
        match self.state {
            State::Initialized | State::TasksInitialized => {}
            _ => return Err(Error::WrongState),
        }

        self.bind_slot(handler, params, stack)?;
        self.state = State::TasksInitialized;
        self.log.record(Event::TaskCreated, (self.size - 1) as u32);
        Ok(())
    }

    pub(crate) fn bind_slot(
        &mut self,
        handler: TaskHandler,
        params: *mut (),
        stack: &'static mut [StackWord],
    ) -> Result<(), Error> {
        if self.size >= self.tasks.len() {
            return Err(Error::OutOfMemory);
        }

        let index = self.size;
        let sp = task::build_initial_frame(stack, handler, params, index)?;

        let slot = &mut self.tasks[index];
        slot.handler = handler;
        slot.params = params as usize;
        slot.wait_ticks = 0;
        slot.sp.store(sp, Ordering::Release);
        slot.status.store(TaskStatus::Idle);

        self.size = index + 1;
        Ok(())
    }

    /// Configures interrupt priorities and the tick timer, publishes the
    /// first task and moves to `Started`. The returned context is what the
    /// caller jumps into; on the device that jump never comes back.
    pub fn start(&mut self, tick_period: u32) -> Result<FirstTask, Error> {
        if self.state != State::TasksInitialized {
            return Err(Error::WrongState);
        }

        self.port.set_interrupt_priorities();
        self.port.start_tick_timer(tick_period)?;

        let first = &self.tasks[self.current];
        self.port.publish_current(&first.status as *const StatusCell);
        self.state = State::Started;
        self.log.record(Event::Started, self.current as u32);

        Ok(FirstTask {
            sp: first.sp.load(Ordering::Acquire),
            handler: first.handler,
            params: first.params as *mut (),
        })
    }

    /// Marks the running task Waiting for `ticks` periods and requests a
    /// reschedule. Returns the task's status cell; the caller polls it until
    /// the tick service clears the wait. Zero ticks is a plain yield.
    pub fn begin_delay(&mut self, ticks: u32) -> Result<Option<*const StatusCell>, Error> {
        if self.state != State::Started {
            return Err(Error::WrongState);
        }

        if ticks == 0 {
            self.port.request_reschedule();
            return Ok(None);
        }

        let index = self.current;
        self.port.disable_interrupts();
        let slot = &mut self.tasks[index];
        slot.wait_ticks = ticks;
        slot.status.store(TaskStatus::Waiting);
        self.port.enable_interrupts();

        self.port.request_reschedule();
        Ok(Some(&self.tasks[index].status as *const StatusCell))
    }

    /// Tick service. Ages every waiting task by one tick, waking those that
    /// reach zero, then runs the scheduler.
    pub fn systick(&mut self) {
        for i in 1..self.size {
            let slot = &mut self.tasks[i];
            if slot.status.load() == TaskStatus::Waiting {
                slot.wait_ticks -= 1;
                if slot.wait_ticks == 0 {
                    slot.status.store(TaskStatus::Idle);
                }
            }
        }

        self.reschedule();
    }

    /// Syscall gateway. One sanctioned request; everything else is ignored.
    pub fn syscall(&mut self, request: u8) {
        match request {
            SVC_RESCHEDULE => self.reschedule(),
            _ => {}
        }
    }

    /// Picks the next task to run and stages the context switch.
    ///
    /// Masked for its whole body even though the tick and syscall entries
    /// share a priority level; a port with a different interrupt model may
    /// still need it.
    fn reschedule(&mut self) {
        self.port.disable_interrupts();

        let previous = self.current;
        let mut ready = false;

        if previous != IDLE_SLOT && self.tasks[previous].status.load() == TaskStatus::Active {
            // Preempted mid-run rather than blocked: eligible again this
            // round.
            self.tasks[previous].status.store(TaskStatus::Idle);
            ready = true;
        } else {
            for i in 1..self.size {
                if self.tasks[i].status.load() == TaskStatus::Idle {
                    ready = true;
                    break;
                }
            }
        }

        let next = if ready {
            // Round robin forward from the previous task, wrapping past the
            // end of the table and never landing on the idle slot.
            let mut i = previous;
            loop {
                i += 1;
                if i >= self.size {
                    i = 1;
                }
                if self.tasks[i].status.load() == TaskStatus::Idle {
                    break i;
                }
            }
        } else {
            IDLE_SLOT
        };

        self.current = next;
        self.tasks[next].status.store(TaskStatus::Active);
        self.port.publish_current(&self.tasks[next].status as *const StatusCell);

        if next != previous {
            self.port.stage_context_switch(
                self.tasks[previous].sp.as_ptr(),
                self.tasks[next].sp.as_ptr(),
            );
        }

        self.port.enable_interrupts();
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Number of occupied slots, idle task included.
    pub fn task_count(&self) -> usize {
        self.size
    }

    pub fn current_task(&self) -> usize {
        self.current
    }

    pub fn task_status(&self, index: usize) -> TaskStatus {
        self.tasks[index].status.load()
    }

    pub fn logger(&self) -> &Logger {
        &self.log
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    #[cfg(test)]
    pub(crate) fn wait_ticks(&self, index: usize) -> u32 {
        self.tasks[index].wait_ticks
    }
}
