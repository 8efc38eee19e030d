//! Preemptive round-robin kernel for Arm Cortex-M microcontrollers.
//!
//! A fixed-size task table, a tick-driven round-robin scheduler, a delay
//! facility and the privilege/interrupt glue between them. Task bodies run
//! in unprivileged thread mode on the process stack; scheduling happens in
//! handler mode, driven by SysTick and the SVC yield request, with the
//! actual register save/restore done by the PendSV handler at the lowest
//! interrupt priority.
//!
//! The scheduler and table logic are portable and tested on the host
//! against a recording mock of the hardware boundary; the `device` feature
//! adds the Cortex-M port and the singleton kernel instance.

#![no_std]

pub mod config;
pub mod diagnostics;
pub mod hal;
pub mod logger;
pub mod rtos;
pub mod testing;

#[cfg(feature = "device")]
pub mod os;

pub use rtos::scheduler::{Error, FirstTask, Kernel, State, SVC_RESCHEDULE};
pub use rtos::task::{StackWord, TaskHandler, TaskStatus};
