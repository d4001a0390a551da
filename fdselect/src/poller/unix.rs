//! POSIX `select(2)` backend.
//!
//! Descriptors are file descriptors (`c_int`), readiness is waited on with
//! `select(2)` and blocking mode is toggled through `fcntl(2)`.
//!
//! Failures are reported through `errno`. It is reset on entry so that a
//! stale value from an unrelated call is never reported, and captured with
//! [`io::Error::last_os_error`] right after the failing call.

use super::Selector;
use super::common::{invalid_input, split_timeout};
use crate::descriptor::Descriptor;
use crate::event::Event;

use libc::{
    F_GETFL, F_SETFL, FD_ISSET, FD_SET, FD_SETSIZE, FD_ZERO, O_NONBLOCK, c_int, fcntl, fd_set,
    select, suseconds_t, time_t, timeval,
};
use std::{io, mem};

/// Status reported by the foreign boundary for rejected arguments.
pub(crate) const EINVAL: i32 = libc::EINVAL;

/// `select(2)`-based selector.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixSelector;

impl Selector for UnixSelector {
    fn select(&self, timeout_ms: u64, fds: &[Descriptor], events: &mut [Event]) -> io::Result<()> {
        sys_select(timeout_ms, fds, events)
    }

    fn set_blocking(&self, fd: Descriptor, blocking: bool) -> io::Result<()> {
        sys_set_blocking(fd, blocking)
    }
}

/// Returns a pointer to the calling thread's `errno`.
#[cfg(any(target_os = "linux", target_os = "emscripten"))]
fn errno_location() -> Option<*mut c_int> {
    Some(unsafe { libc::__errno_location() })
}

#[cfg(any(target_vendor = "apple", target_os = "freebsd"))]
fn errno_location() -> Option<*mut c_int> {
    Some(unsafe { libc::__error() })
}

#[cfg(any(target_os = "android", target_os = "openbsd", target_os = "netbsd"))]
fn errno_location() -> Option<*mut c_int> {
    Some(unsafe { libc::__errno() })
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "emscripten",
    target_vendor = "apple",
    target_os = "freebsd",
    target_os = "android",
    target_os = "openbsd",
    target_os = "netbsd"
)))]
fn errno_location() -> Option<*mut c_int> {
    None
}

/// Clears `errno` for the calling thread.
pub(crate) fn errno_reset() {
    if let Some(errno) = errno_location() {
        unsafe { *errno = 0 };
    }
}

/// Converts a descriptor into a file descriptor usable with `fd_set`.
///
/// `FD_SET` on a descriptor at or above `FD_SETSIZE` writes outside the set,
/// so such descriptors are rejected.
fn to_select_fd(fd: Descriptor) -> io::Result<c_int> {
    if fd >= FD_SETSIZE as u64 {
        return Err(invalid_input("descriptor outside select(2) range"));
    }

    Ok(fd as c_int)
}

/// Returns a cleared `fd_set`.
fn empty_set() -> fd_set {
    let mut set: fd_set = unsafe { mem::zeroed() };
    unsafe { FD_ZERO(&mut set) };
    set
}

/// Waits for readiness on `fds` and overwrites `events` with what fired.
///
/// `events` is only written once `select` succeeded; on any error the
/// caller's masks are left as they were.
pub(crate) fn sys_select(
    timeout_ms: u64,
    fds: &[Descriptor],
    events: &mut [Event],
) -> io::Result<()> {
    errno_reset();

    let mut read_set = empty_set();
    let mut write_set = empty_set();
    let mut error_set = empty_set();

    // `select` scans descriptors below `nfds`.
    let mut nfds: c_int = 0;

    for (&fd, &interest) in fds.iter().zip(events.iter()) {
        // A descriptor with no interest stays out of every set.
        if interest.is_empty() {
            continue;
        }

        let raw = to_select_fd(fd)?;

        unsafe {
            if interest.is_readable() {
                FD_SET(raw, &mut read_set);
            }
            if interest.is_writable() {
                FD_SET(raw, &mut write_set);
            }
            if interest.is_error() {
                FD_SET(raw, &mut error_set);
            }
        }

        nfds = nfds.max(raw + 1);
    }

    let (secs, usecs) = split_timeout(timeout_ms);
    let mut timeout = timeval {
        tv_sec: secs.min(time_t::MAX as u64) as time_t,
        tv_usec: usecs as suseconds_t,
    };

    let rc = unsafe {
        select(
            nfds,
            &mut read_set,
            &mut write_set,
            &mut error_set,
            &mut timeout,
        )
    };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    for (&fd, event) in fds.iter().zip(events.iter_mut()) {
        if event.is_empty() {
            *event = Event::NONE;
            continue;
        }

        let raw = fd as c_int;
        let mut fired = Event::NONE;

        unsafe {
            if FD_ISSET(raw, &read_set) {
                fired |= Event::READ;
            }
            if FD_ISSET(raw, &write_set) {
                fired |= Event::WRITE;
            }
            if FD_ISSET(raw, &error_set) {
                fired |= Event::ERROR;
            }
        }

        // A descriptor listed twice shares its set bits between entries.
        *event = fired & *event;
    }

    Ok(())
}

/// Sets or clears `O_NONBLOCK`, keeping every other status flag.
pub(crate) fn sys_set_blocking(fd: Descriptor, blocking: bool) -> io::Result<()> {
    let fd = c_int::try_from(fd).map_err(|_| invalid_input("descriptor outside fcntl(2) range"))?;

    errno_reset();

    let flags = unsafe { fcntl(fd, F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }

    let flags = if blocking {
        flags & !O_NONBLOCK
    } else {
        flags | O_NONBLOCK
    };

    let rc = unsafe { fcntl(fd, F_SETFL, flags) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}
