//! Kernel event log
//!
//! Fixed-capacity ring of lifecycle events kept in RAM, owned by the
//! kernel instance. Cheap enough to stay on in production builds; dump it
//! through any `uWrite` sink when a console is available.

use ufmt::{uwrite, uWrite};

pub const LOG_CAPACITY: usize = 32;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Event {
    Init,
    TaskCreated,
    Started,
}

#[derive(Copy, Clone)]
pub struct LogEntry {
    pub event: Event,
    pub data: u32,
}

pub struct Logger {
    entries: [LogEntry; LOG_CAPACITY],
    head: usize,
    count: usize,
}

const EMPTY_ENTRY: LogEntry = LogEntry {
    event: Event::Init,
    data: 0,
};

impl Logger {
    pub const fn new() -> Self {
        Self {
            entries: [EMPTY_ENTRY; LOG_CAPACITY],
            head: 0,
            count: 0,
        }
    }

    pub fn record(&mut self, event: Event, data: u32) {
        self.entries[self.head] = LogEntry { event, data };
        self.head = (self.head + 1) % LOG_CAPACITY;
        if self.count < LOG_CAPACITY {
            self.count += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        let start = (self.head + LOG_CAPACITY - self.count) % LOG_CAPACITY;
        (0..self.count).map(move |i| &self.entries[(start + i) % LOG_CAPACITY])
    }

    pub fn dump<W: uWrite>(&self, out: &mut W) -> Result<(), W::Error> {
        for entry in self.iter() {
            let name = match entry.event {
                Event::Init => "init",
                Event::TaskCreated => "task",
                Event::Started => "start",
            };
            uwrite!(out, "{} {}\r\n", name, entry.data)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut log = Logger::new();
        log.record(Event::Init, 0);
        log.record(Event::TaskCreated, 1);
        log.record(Event::TaskCreated, 2);

        assert_eq!(log.len(), 3);
        let mut it = log.iter();
        assert_eq!(it.next().unwrap().event, Event::Init);
        assert_eq!(it.next().unwrap().data, 1);
        assert_eq!(it.next().unwrap().data, 2);
        assert!(it.next().is_none());
    }

    #[test]
    fn ring_drops_the_oldest_entries() {
        let mut log = Logger::new();
        for i in 0..(LOG_CAPACITY as u32 + 2) {
            log.record(Event::TaskCreated, i);
        }

        assert_eq!(log.len(), LOG_CAPACITY);
        assert_eq!(log.iter().next().unwrap().data, 2);
        assert_eq!(log.iter().last().unwrap().data, LOG_CAPACITY as u32 + 1);
    }
}
