//! C-callable boundary.
//!
//! Exposes the poller with the calling convention of the original
//! `libselect` C library:
//! - descriptors as `uint64_t`, terminated by [`INVALID_FD`],
//! - a parallel `uint8_t` array of event masks, updated in place,
//! - `int` status codes, `0` on success, the platform error code
//!   (`errno` / `WSAGetLastError`) otherwise.
//!
//! ```c
//! extern const uint8_t EVENT_NONE, EVENT_READ, EVENT_WRITE, EVENT_ERROR;
//! extern const uint64_t INVALID_FD;
//!
//! int wait_for_event(uint64_t timeout_ms, uint64_t const* fds, uint8_t* events);
//! int set_blocking_mode(uint64_t fd, uint8_t blocking);
//! ```

use crate::descriptor::{self, Descriptor};
use crate::event::{self, Event};
use crate::poller::{PollerBuilder, platform};

use std::ffi::c_int;
use std::io;
use std::slice;

#[unsafe(no_mangle)]
pub static EVENT_NONE: u8 = event::EVENT_NONE;

#[unsafe(no_mangle)]
pub static EVENT_READ: u8 = event::EVENT_READ;

#[unsafe(no_mangle)]
pub static EVENT_WRITE: u8 = event::EVENT_WRITE;

#[unsafe(no_mangle)]
pub static EVENT_ERROR: u8 = event::EVENT_ERROR;

#[unsafe(no_mangle)]
pub static INVALID_FD: u64 = descriptor::INVALID_FD;

/// Maps a result to a C status code.
///
/// Errors without an OS code (argument checks) become `EINVAL`/`WSAEINVAL`.
fn status(result: io::Result<()>) -> c_int {
    match result {
        Ok(()) => 0,
        Err(err) => err.raw_os_error().unwrap_or(platform::EINVAL),
    }
}

/// Waits up to `timeout_ms` milliseconds for events on `fds`.
///
/// `events[i]` holds the interest for `fds[i]` and is overwritten with the
/// events that fired. On failure `events` is not modified.
///
/// # Safety
///
/// - `fds` must point to an array terminated by `INVALID_FD`.
/// - `events` must point to a writable array with at least as many entries
///   as `fds` has before the sentinel.
/// - No descriptor may appear twice.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wait_for_event(
    timeout_ms: u64,
    fds: *const u64,
    events: *mut u8,
) -> c_int {
    if fds.is_null() || events.is_null() {
        return platform::EINVAL;
    }

    let mut len = 0;
    while unsafe { *fds.add(len) } != descriptor::INVALID_FD {
        len += 1;
    }

    let fds: &[Descriptor] = unsafe { slice::from_raw_parts(fds, len) };
    // `Event` is `repr(transparent)` over `u8`.
    let events: &mut [Event] = unsafe { slice::from_raw_parts_mut(events.cast::<Event>(), len) };

    let poller = PollerBuilder::new().validate(false).build();
    status(poller.select(timeout_ms, fds, events))
}

/// Makes `fd` blocking if `blocking` is non-zero, non-blocking otherwise.
#[unsafe(no_mangle)]
pub extern "C" fn set_blocking_mode(fd: u64, blocking: u8) -> c_int {
    let poller = PollerBuilder::new().build();
    status(poller.set_blocking(fd, blocking != 0))
}
