//! Platform-specific readiness polling.
//!
//! This module provides a unified interface over the platform `select`
//! primitives:
//! - `select(2)` + `fcntl(2)` on unix,
//! - WinSock `select` + `ioctlsocket` on Windows.
//!
//! Both backends implement [`Selector`]. The concrete one is selected at
//! compile time and exported as [`NativeSelector`]. [`Poller`] sits in
//! front of a selector and performs argument checks and logging before
//! delegating to it.

pub(crate) mod common;

#[cfg(unix)]
pub(crate) mod unix;

#[cfg(unix)]
pub(crate) use unix as platform;

#[cfg(windows)]
pub(crate) mod windows;

#[cfg(windows)]
pub(crate) use windows as platform;

#[cfg(unix)]
pub type NativeSelector = unix::UnixSelector;

#[cfg(windows)]
pub type NativeSelector = windows::WinSockSelector;

use crate::descriptor::Descriptor;
use crate::event::Event;
use common::{check_lengths, check_request};

use std::io;

/// A synchronous readiness primitive.
///
/// Implementations wait on native descriptors and report readiness in
/// place. They never retain `fds` or `events` past the call.
pub trait Selector {
    /// Waits up to `timeout_ms` milliseconds for any of `fds` to become ready.
    ///
    /// `events[i]` holds the interest for `fds[i]` on entry. On success it is
    /// overwritten with the subset of that interest which fired, possibly
    /// [`Event::NONE`] if the timeout elapsed. On failure `events` is left
    /// untouched.
    ///
    /// Callers guarantee `fds.len() == events.len()`.
    fn select(&self, timeout_ms: u64, fds: &[Descriptor], events: &mut [Event]) -> io::Result<()>;

    /// Switches `fd` between blocking and non-blocking mode.
    fn set_blocking(&self, fd: Descriptor, blocking: bool) -> io::Result<()>;
}

/// Front end over a [`Selector`].
///
/// `Poller` is cheap to create and holds no OS resources; it only carries
/// configuration. Build one with [`PollerBuilder`].
///
/// # Examples
///
/// ```rust,no_run
/// use fdselect::{AsDescriptor, Event, Poller};
/// use std::net::TcpListener;
///
/// let listener = TcpListener::bind("127.0.0.1:0")?;
/// let poller = Poller::new();
///
/// let fds = [listener.as_descriptor()];
/// let mut events = [Event::READ];
/// poller.select(100, &fds, &mut events)?;
///
/// if events[0].is_readable() {
///     let _ = listener.accept()?;
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Poller<S = NativeSelector> {
    /// Backend performing the native calls.
    selector: S,

    /// Whether sentinel and duplicate checks run before each poll.
    validate: bool,
}

impl Poller<NativeSelector> {
    /// Creates a poller over the native selector with default configuration.
    pub fn new() -> Self {
        PollerBuilder::new().build()
    }
}

impl Default for Poller<NativeSelector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Selector> Poller<S> {
    /// Returns `true` if requests are validated before polling.
    pub fn validates(&self) -> bool {
        self.validate
    }

    /// Returns the underlying selector.
    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// Waits up to `timeout_ms` milliseconds for readiness on `fds`.
    ///
    /// `events[i]` is the interest for `fds[i]`. On success every entry is
    /// overwritten with the events that fired, a subset of what was asked
    /// for. A timeout is a success with every mask reset to [`Event::NONE`].
    ///
    /// On error the masks are left exactly as the caller passed them.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the slices differ in length, a descriptor cannot
    ///   be placed in a native set, or (with validation enabled) the request
    ///   contains [`INVALID_FD`](crate::INVALID_FD) or a duplicate descriptor.
    /// - The platform error of the native wait otherwise. `Interrupted` is
    ///   returned as is; retrying is up to the caller.
    pub fn select(
        &self,
        timeout_ms: u64,
        fds: &[Descriptor],
        events: &mut [Event],
    ) -> io::Result<()> {
        log::trace!(
            "select: {} descriptor(s), timeout {}ms",
            fds.len(),
            timeout_ms
        );

        let checked = check_lengths(fds, events).and_then(|()| {
            if self.validate {
                check_request(fds)
            } else {
                Ok(())
            }
        });
        if let Err(err) = checked {
            log::debug!("select: request rejected: {err}");
            return Err(err);
        }

        match self.selector.select(timeout_ms, fds, events) {
            Ok(()) => {
                log::trace!(
                    "select: {} descriptor(s) ready",
                    events.iter().filter(|event| !event.is_empty()).count()
                );
                Ok(())
            }
            Err(err) => {
                log::debug!("select: native wait failed: {err}");
                Err(err)
            }
        }
    }

    /// Switches `fd` between blocking (`true`) and non-blocking (`false`)
    /// mode, leaving its other flags untouched.
    ///
    /// Setting the mode a descriptor already has is a successful no-op.
    pub fn set_blocking(&self, fd: Descriptor, blocking: bool) -> io::Result<()> {
        self.selector.set_blocking(fd, blocking).inspect_err(|err| {
            log::debug!("set_blocking({fd}, {blocking}) failed: {err}");
        })
    }
}

/// Builder for configuring and creating a [`Poller`].
///
/// # Examples
///
/// ```rust
/// use fdselect::PollerBuilder;
///
/// let poller = PollerBuilder::new()
///     .validate(false)
///     .build();
/// assert!(!poller.validates());
/// ```
#[derive(Debug, Clone)]
pub struct PollerBuilder {
    /// Whether sentinel and duplicate checks run before each poll.
    validate: bool,
}

impl PollerBuilder {
    /// Creates a new `PollerBuilder` with default configuration.
    ///
    /// Validation is enabled by default.
    pub fn new() -> Self {
        Self { validate: true }
    }

    /// Enables or disables request validation.
    ///
    /// When enabled, a request containing [`INVALID_FD`](crate::INVALID_FD)
    /// or the same descriptor twice is rejected with `InvalidInput` before
    /// any native call. When disabled such requests reach the native
    /// primitive and their per-descriptor results are unspecified.
    ///
    /// Length and range checks are not affected by this setting.
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Builds a poller over the native selector.
    pub fn build(self) -> Poller<NativeSelector> {
        self.build_with(NativeSelector::default())
    }

    /// Builds a poller over a custom selector.
    pub fn build_with<S: Selector>(self, selector: S) -> Poller<S> {
        Poller {
            selector,
            validate: self.validate,
        }
    }
}

impl Default for PollerBuilder {
    /// Creates a default `PollerBuilder`.
    fn default() -> Self {
        Self::new()
    }
}

/// Waits up to `timeout_ms` milliseconds for readiness using a default
/// [`Poller`].
///
/// See [`Poller::select`].
pub fn select(timeout_ms: u64, fds: &[Descriptor], events: &mut [Event]) -> io::Result<()> {
    Poller::new().select(timeout_ms, fds, events)
}

/// Switches `fd` between blocking and non-blocking mode using the native
/// selector.
///
/// See [`Poller::set_blocking`].
pub fn set_blocking(fd: Descriptor, blocking: bool) -> io::Result<()> {
    Poller::new().set_blocking(fd, blocking)
}
