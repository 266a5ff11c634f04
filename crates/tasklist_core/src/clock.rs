//! Time source used for task timestamps, task ids and deferred work.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use time::OffsetDateTime;

/// Number of decimal digits kept from the millisecond timestamp in a task id.
pub const ID_WIDTH: usize = 10;
const ID_MODULUS: u64 = 10_000_000_000;

pub trait Clock {
    fn now_utc(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock that only moves when told to. Clones share the same instant, so a
/// test can keep a handle while the manager owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<OffsetDateTime>>,
}

impl ManualClock {
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> OffsetDateTime {
        self.now.get()
    }
}

/// Issues task ids from the clock's millisecond timestamp, truncated to
/// [`ID_WIDTH`] digits and kept strictly increasing within a session.
#[derive(Debug, Clone, Default)]
pub struct IdSequence {
    last: Option<u64>,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues after the highest numeric id already in use.
    pub fn seeded<'a, I>(existing: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let last = existing
            .into_iter()
            .filter_map(|id| id.parse::<u64>().ok())
            .max();
        Self { last }
    }

    pub fn next_id(&mut self, now: OffsetDateTime) -> String {
        let millis = u64::try_from(now.unix_timestamp_nanos() / 1_000_000).unwrap_or(0);
        let candidate = millis % ID_MODULUS;
        let value = match self.last {
            Some(last) if candidate <= last => (last + 1) % ID_MODULUS,
            _ => candidate,
        };
        self.last = Some(value);
        format!("{value:0width$}", width = ID_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ID_WIDTH, IdSequence, ManualClock};
    use std::time::Duration;
    use time::macros::datetime;

    #[test]
    fn id_keeps_last_ten_digits_of_millis() {
        let mut ids = IdSequence::new();
        let id = ids.next_id(datetime!(2025-12-20 00:00:00.123 UTC));

        assert_eq!(id.len(), ID_WIDTH);
        assert_eq!(id, "6188800123");
    }

    #[test]
    fn ids_stay_increasing_when_clock_stalls() {
        let clock = ManualClock::new(datetime!(2025-12-20 00:00 UTC));
        let mut ids = IdSequence::new();

        let first = ids.next_id(clock.now_utc());
        let second = ids.next_id(clock.now_utc());
        clock.advance(Duration::from_millis(5));
        let third = ids.next_id(clock.now_utc());

        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn seeded_sequence_skips_existing_ids() {
        let mut ids = IdSequence::seeded(["6188800500", "not-a-number", "0000000001"]);
        let next = ids.next_id(datetime!(2025-12-20 00:00 UTC));

        assert_eq!(next, "6188800501");
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(datetime!(2025-12-20 00:00 UTC));
        let handle = clock.clone();
        handle.advance(Duration::from_secs(2));

        assert_eq!(clock.now_utc(), datetime!(2025-12-20 00:00:02 UTC));
    }
}
