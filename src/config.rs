//! Configuration constants for the kernel

/// Maximum number of user tasks; the table holds one extra slot for the
/// idle task.
pub const MAX_TASKS: usize = 8;

/// Scheduler tick frequency in Hz
pub const TICK_HZ: u32 = 1000;

/// Core clock frequency in Hz
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// SysTick reload value for one scheduler tick
pub const TICK_PERIOD: u32 = SYSTEM_CLOCK_HZ / TICK_HZ;

/// Idle task stack size in words
pub const IDLE_STACK_WORDS: usize = 64;

/// Largest value the tick timer can count down from
pub const MAX_TIMER_PERIOD: u32 = 0x0100_0000;
