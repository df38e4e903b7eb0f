//! Monotonic interval clock used to bracket probe operations.
//!
//! Readings are seconds as `f64` in the monotonic clock domain. They are only
//! meaningful as differences: the origin is arbitrary (boot time on Linux) and
//! not comparable with wall-clock time.

/// Source of monotonic timestamps.
pub trait Clock {
    /// Current instant in seconds. Never decreases between calls.
    fn now(&self) -> f64;
}

/// The system monotonic clock.
///
/// On Unix this reads `CLOCK_MONOTONIC` directly, which is immune to NTP and
/// manual wall-clock adjustments. Elsewhere it falls back to `std::time::Instant`
/// relative to a process-local epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[cfg(unix)]
    fn now(&self) -> f64 {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: `ts` is a valid, writable timespec and CLOCK_MONOTONIC is
        // supported on every Unix target we build for.
        let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
        if rc != 0 {
            return process_epoch_secs();
        }
        ts.tv_sec as f64 + ts.tv_nsec as f64 * 1e-9
    }

    #[cfg(not(unix))]
    fn now(&self) -> f64 {
        process_epoch_secs()
    }
}

fn process_epoch_secs() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let epoch = EPOCH.get_or_init(Instant::now);
    epoch.elapsed().as_secs_f64()
}
