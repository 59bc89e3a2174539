/// Monotonic timestamp source, microseconds since boot.
pub trait Clock {
    fn now_us(&self) -> u64;
}

#[cfg(test)]
pub(crate) mod test_clock {
    use core::cell::Cell;

    use super::Clock;

    pub(crate) struct ManualClock {
        now: Cell<u64>,
    }

    impl ManualClock {
        pub(crate) fn new(start_us: u64) -> Self {
            Self {
                now: Cell::new(start_us),
            }
        }

        pub(crate) fn advance(&self, us: u64) {
            self.now.set(self.now.get() + us);
        }
    }

    impl Clock for ManualClock {
        fn now_us(&self) -> u64 {
            self.now.get()
        }
    }
}
