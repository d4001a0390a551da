//! WinSock `select` backend.
//!
//! Descriptors are `SOCKET`s. WinSock's `fd_set` is not a bitmap but a
//! counted array of sockets, so it is filled and queried by hand here
//! instead of through the C macros.
//!
//! Failures are reported through the per-thread WinSock error slot, which is
//! reset with `WSASetLastError(0)` on entry and read with `WSAGetLastError`
//! right after the failing call.
//!
//! Mirrors the unix backend function for function.

use super::Selector;
use super::common::{invalid_input, is_idle, split_timeout};
use crate::descriptor::Descriptor;
use crate::event::Event;

use std::io;
use std::mem;
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use windows_sys::Win32::Networking::WinSock::{
    FD_SET, FIONBIO, SOCKET, SOCKET_ERROR, TIMEVAL, WSADATA, WSAGetLastError, WSASetLastError,
    WSAStartup, ioctlsocket, select,
};

/// Status reported by the foreign boundary for rejected arguments.
pub(crate) const EINVAL: i32 = windows_sys::Win32::Networking::WinSock::WSAEINVAL;

/// WinSock `select`-based selector.
#[derive(Debug, Clone, Copy, Default)]
pub struct WinSockSelector;

impl Selector for WinSockSelector {
    fn select(&self, timeout_ms: u64, fds: &[Descriptor], events: &mut [Event]) -> io::Result<()> {
        sys_select(timeout_ms, fds, events)
    }

    fn set_blocking(&self, fd: Descriptor, blocking: bool) -> io::Result<()> {
        sys_set_blocking(fd, blocking)
    }
}

/// Creates a MAKEWORD value for the Winsock version.
#[inline]
const fn makeword(low: u8, high: u8) -> u16 {
    ((high as u16) << 8) | (low as u16)
}

/// Result code of the process-wide `WSAStartup` call.
static WINSOCK_INIT: OnceLock<i32> = OnceLock::new();

/// Initializes Winsock 2.2 once per process.
pub(crate) fn ensure_winsock() -> io::Result<()> {
    let rc = *WINSOCK_INIT.get_or_init(|| unsafe {
        let mut data: WSADATA = mem::zeroed();
        WSAStartup(makeword(2, 2), &mut data)
    });

    if rc != 0 {
        return Err(io::Error::from_raw_os_error(rc));
    }

    Ok(())
}

/// Captures the calling thread's last WinSock error.
fn last_wsa_error() -> io::Error {
    io::Error::from_raw_os_error(unsafe { WSAGetLastError() })
}

/// Converts a descriptor into a `SOCKET`.
fn to_socket(fd: Descriptor) -> io::Result<SOCKET> {
    SOCKET::try_from(fd).map_err(|_| invalid_input("descriptor outside SOCKET range"))
}

/// Returns an empty socket set.
fn empty_set() -> FD_SET {
    unsafe { mem::zeroed() }
}

/// Adds `socket` to `set`, ignoring sockets that are already present.
///
/// Fails once the fixed-capacity array is full.
fn set_insert(set: &mut FD_SET, socket: SOCKET) -> io::Result<()> {
    let count = set.fd_count as usize;
    if set.fd_array[..count].contains(&socket) {
        return Ok(());
    }

    if count == set.fd_array.len() {
        return Err(invalid_input("too many sockets for one select set"));
    }

    set.fd_array[count] = socket;
    set.fd_count += 1;
    Ok(())
}

/// Returns `true` if `socket` was left in `set` by `select`.
fn set_contains(set: &FD_SET, socket: SOCKET) -> bool {
    let count = (set.fd_count as usize).min(set.fd_array.len());
    set.fd_array[..count].contains(&socket)
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
    ensure_winsock()?;
    unsafe { WSASetLastError(0) };

    let mut read_set = empty_set();
    let mut write_set = empty_set();
    let mut error_set = empty_set();

    // Ignored by WinSock, kept for parity with the unix backend.
    let mut highest: SOCKET = 0;

    for (&fd, &interest) in fds.iter().zip(events.iter()) {
        if interest.is_empty() {
            continue;
        }

        let socket = to_socket(fd)?;

        if interest.is_readable() {
            set_insert(&mut read_set, socket)?;
        }
        if interest.is_writable() {
            set_insert(&mut write_set, socket)?;
        }
        if interest.is_error() {
            set_insert(&mut error_set, socket)?;
        }

        highest = highest.max(socket);
    }

    // WinSock fails with WSAEINVAL when all three sets are empty, while
    // select(2) just sleeps. Sleep here too.
    if is_idle(events) {
        thread::sleep(Duration::from_millis(timeout_ms));
        events.iter_mut().for_each(|event| *event = Event::NONE);
        return Ok(());
    }

    let (secs, usecs) = split_timeout(timeout_ms);
    let timeout = TIMEVAL {
        tv_sec: secs.min(i32::MAX as u64) as i32,
        tv_usec: usecs as i32,
    };

    let rc = unsafe {
        select(
            highest.saturating_add(1).min(i32::MAX as SOCKET) as i32,
            &mut read_set,
            &mut write_set,
            &mut error_set,
            &timeout,
        )
    };
    if rc == SOCKET_ERROR {
        return Err(last_wsa_error());
    }

    for (&fd, event) in fds.iter().zip(events.iter_mut()) {
        let socket = fd as SOCKET;
        let mut fired = Event::NONE;

        if set_contains(&read_set, socket) {
            fired |= Event::READ;
        }
        if set_contains(&write_set, socket) {
            fired |= Event::WRITE;
        }
        if set_contains(&error_set, socket) {
            fired |= Event::ERROR;
        }

        // A socket listed twice shares its set membership between entries.
        *event = fired & *event;
    }

    Ok(())
}

/// Switches a socket between blocking and non-blocking mode.
///
/// `FIONBIO` sets the whole mode at once, so no read-modify-write is needed.
pub(crate) fn sys_set_blocking(fd: Descriptor, blocking: bool) -> io::Result<()> {
    let socket = to_socket(fd)?;

    ensure_winsock()?;
    unsafe { WSASetLastError(0) };

    let mut mode: u32 = if blocking { 0 } else { 1 };
    if unsafe { ioctlsocket(socket, FIONBIO, &mut mode) } != 0 {
        return Err(last_wsa_error());
    }

    Ok(())
}
