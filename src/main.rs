#![no_std]
#![no_main]

use panic_halt as _;

use core::ptr::addr_of_mut;
use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m_rt::entry;
use cortex_m_semihosting::{hio, hprintln};

use cortexm_rtos::{config, os, StackWord};

static mut BLINK_STACK: [StackWord; 256] = [0; 256];
static mut MONITOR_STACK: [StackWord; 256] = [0; 256];

static BLINKS: AtomicU32 = AtomicU32::new(0);

#[entry]
fn main() -> ! {
    hprintln!("cortexm_rtos v0.1.0");

    os::init().unwrap();
    os::create_task(blink_task, core::ptr::null_mut(), unsafe {
        &mut *addr_of_mut!(BLINK_STACK)
    })
    .unwrap();
    os::create_task(monitor_task, core::ptr::null_mut(), unsafe {
        &mut *addr_of_mut!(MONITOR_STACK)
    })
    .unwrap();

    if let Ok(stdout) = hio::hstdout() {
        os::dump_log(&mut SemiOut(stdout)).ok();
    }

    hprintln!("starting scheduler");
    os::start(config::TICK_PERIOD).unwrap();

    loop {}
}

extern "C" fn blink_task(_params: *mut ()) {
    let mut led_on = false;
    loop {
        led_on = !led_on;
        BLINKS.fetch_add(1, Ordering::Relaxed);
        hprintln!("LED: {}", if led_on { "ON" } else { "OFF" });
        os::delay(500).ok();
    }
}

extern "C" fn monitor_task(_params: *mut ()) {
    loop {
        os::delay(2000).ok();
        hprintln!("monitor: {} blinks", BLINKS.load(Ordering::Relaxed));
    }
}

struct SemiOut(hio::HStdout);

impl ufmt::uWrite for SemiOut {
    type Error = ();

    fn write_str(&mut self, s: &str) -> Result<(), ()> {
        use core::fmt::Write;
        self.0.write_str(s).map_err(|_| ())
    }
}
