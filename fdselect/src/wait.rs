//! Handle-level waiting helpers.
//!
//! These functions sit on top of [`Poller`] and work with std handles
//! (anything implementing [`AsDescriptor`]) and [`Duration`]s instead of raw
//! descriptors and milliseconds.

use crate::descriptor::{AsDescriptor, Descriptor};
use crate::event::Event;
use crate::poller::Poller;

use std::io;
use std::time::{Duration, Instant};

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
pub fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Computes the time left until `deadline`, or zero if it already passed.
pub fn time_remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

/// Waits on several handles until an event occurs or `timeout` elapses.
///
/// Each `(handle, event)` pair holds the events to wait for on `handle`.
/// On success every `event` is overwritten with the events that fired, so
/// all of them are [`Event::NONE`] after a timeout.
///
/// # Errors
///
/// Returns the platform error if the native wait failed, in which case the
/// events are left untouched, or `InvalidInput` if the same handle appears
/// twice.
pub fn wait_multiple(
    handles: &mut [(&dyn AsDescriptor, &mut Event)],
    timeout: Duration,
) -> io::Result<()> {
    let fds: Vec<Descriptor> = handles
        .iter()
        .map(|(handle, _)| handle.as_descriptor())
        .collect();
    let mut events: Vec<Event> = handles.iter().map(|(_, event)| **event).collect();

    Poller::new().select(duration_to_ms(timeout), &fds, &mut events)?;

    for ((_, event), fired) in handles.iter_mut().zip(events) {
        **event = fired;
    }

    Ok(())
}

/// Waiting and blocking-mode control for a single handle.
pub trait WaitForEvent {
    /// Waits until `self` is readable (or has an error pending).
    ///
    /// # Errors
    ///
    /// `TimedOut` if nothing happened within `timeout`, or the platform
    /// error of the native wait.
    fn wait_until_readable(&self, timeout: Duration) -> io::Result<()>;

    /// Waits until `self` is writable (or has an error pending).
    ///
    /// # Errors
    ///
    /// `TimedOut` if nothing happened within `timeout`, or the platform
    /// error of the native wait.
    fn wait_until_writable(&self, timeout: Duration) -> io::Result<()>;

    /// Makes `self` blocking (`true`) or non-blocking (`false`).
    fn set_blocking_mode(&self, blocking: bool) -> io::Result<()>;
}

impl<T: AsDescriptor> WaitForEvent for T {
    fn wait_until_readable(&self, timeout: Duration) -> io::Result<()> {
        wait_single(self.as_descriptor(), Event::READ | Event::ERROR, timeout)
    }

    fn wait_until_writable(&self, timeout: Duration) -> io::Result<()> {
        wait_single(self.as_descriptor(), Event::WRITE | Event::ERROR, timeout)
    }

    fn set_blocking_mode(&self, blocking: bool) -> io::Result<()> {
        Poller::new().set_blocking(self.as_descriptor(), blocking)
    }
}

fn wait_single(fd: Descriptor, interest: Event, timeout: Duration) -> io::Result<()> {
    let mut events = [interest];
    Poller::new().select(duration_to_ms(timeout), &[fd], &mut events)?;

    if events[0].is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "no readiness event before timeout",
        ));
    }

    Ok(())
}
