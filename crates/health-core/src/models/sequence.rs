use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

static LAST: AtomicI64 = AtomicI64::new(0);

/// Process-wide generator of report sequence numbers.
///
/// Values are seeded from wall-clock microseconds so a restarted reporter
/// keeps producing numbers newer than the ones it sent before, and are
/// strictly increasing within the process.
pub struct SequenceNumber;

impl SequenceNumber {
    pub fn next() -> i64 {
        let now = Utc::now().timestamp_micros();
        let mut current = LAST.load(Ordering::Relaxed);
        loop {
            let next = now.max(current.saturating_add(1));
            match LAST.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strictly_increasing_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..1000).map(|_| SequenceNumber::next()).collect::<Vec<_>>()))
            .collect();
        let mut all: Vec<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let len = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), len);
    }
}
