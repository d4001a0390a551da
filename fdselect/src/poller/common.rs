use crate::descriptor::{Descriptor, INVALID_FD};
use crate::event::Event;

use std::io;

/// Splits a millisecond timeout into whole seconds and remaining microseconds,
/// the shape expected by `struct timeval`.
pub(crate) const fn split_timeout(timeout_ms: u64) -> (u64, u64) {
    (timeout_ms / 1000, (timeout_ms % 1000) * 1000)
}

/// Builds an `InvalidInput` error.
pub(crate) fn invalid_input(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

/// Checks that descriptors and masks are parallel arrays.
///
/// This check is always performed: backends index both slices with the
/// same position.
pub(crate) fn check_lengths(fds: &[Descriptor], events: &[Event]) -> io::Result<()> {
    if fds.len() != events.len() {
        return Err(invalid_input("descriptor and event slices differ in length"));
    }

    Ok(())
}

/// Rejects requests whose per-descriptor results would be meaningless:
/// - a sentinel inside the explicit-length list,
/// - the same descriptor listed twice.
///
/// Runs in `O(n²)` without allocating; `select` sets are small.
pub(crate) fn check_request(fds: &[Descriptor]) -> io::Result<()> {
    for (i, &fd) in fds.iter().enumerate() {
        if fd == INVALID_FD {
            return Err(invalid_input("sentinel descriptor inside request"));
        }

        if fds[..i].contains(&fd) {
            return Err(invalid_input("duplicate descriptor in request"));
        }
    }

    Ok(())
}

/// Returns `true` if no descriptor asks for any event.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn is_idle(events: &[Event]) -> bool {
    events.iter().all(|event| event.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_timeout() {
        assert_eq!(split_timeout(0), (0, 0));
        assert_eq!(split_timeout(999), (0, 999_000));
        assert_eq!(split_timeout(1000), (1, 0));
        assert_eq!(split_timeout(2_345), (2, 345_000));
        assert_eq!(split_timeout(u64::MAX), (u64::MAX / 1000, 615_000));
    }

    #[test]
    fn test_check_lengths() {
        assert!(check_lengths(&[1, 2], &[Event::READ, Event::WRITE]).is_ok());

        let err = check_lengths(&[1, 2], &[Event::READ]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_check_request_accepts_distinct() {
        assert!(check_request(&[]).is_ok());
        assert!(check_request(&[3, 4, 5]).is_ok());
    }

    #[test]
    fn test_check_request_rejects_sentinel() {
        let err = check_request(&[3, INVALID_FD, 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_check_request_rejects_duplicates() {
        let err = check_request(&[3, 4, 3]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_is_idle() {
        assert!(is_idle(&[]));
        assert!(is_idle(&[Event::NONE, Event::NONE]));
        assert!(!is_idle(&[Event::NONE, Event::ERROR]));
    }
}
