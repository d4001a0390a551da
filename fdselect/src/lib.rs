//! # fdselect
//!
//! **fdselect** is a minimal, synchronous readiness poller over native
//! descriptors: unix file descriptors and WinSock sockets.
//!
//! Given a list of descriptors, each tagged with the events it is interested
//! in, it blocks the calling thread until one of them becomes ready or a
//! timeout elapses, and reports in place which events fired. It can also
//! switch a descriptor between blocking and non-blocking mode.
//!
//! It is built on the plain `select` primitive available everywhere rather
//! than on a scalable mechanism such as epoll or IOCP, and is meant to be
//! embedded in a higher-level event loop:
//!
//! - **Readiness polling** with [`Poller::select`] or [`select`]
//! - **Blocking-mode control** with [`Poller::set_blocking`] or [`set_blocking`]
//! - **Handle helpers** such as [`WaitForEvent`] and [`wait_multiple`] for std sockets
//! - **A C boundary** in [`ffi`] compatible with the `libselect` calling convention
//!
//! Errors are reported as [`std::io::Error`]s carrying the raw platform
//! error code; numeric codes are not normalized across platforms.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fdselect::{AsDescriptor, Event, select};
//! use std::net::TcpStream;
//!
//! let stream = TcpStream::connect("127.0.0.1:8080")?;
//!
//! let fds = [stream.as_descriptor()];
//! let mut events = [Event::READ | Event::ERROR];
//! select(1_000, &fds, &mut events)?;
//!
//! if events[0].is_readable() {
//!     println!("data is waiting");
//! }
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`event`]: Event masks and their raw values
//! - [`descriptor`]: The descriptor type and the [`AsDescriptor`] bridge
//! - [`poller`]: The [`Selector`] trait, native backends and [`Poller`]
//! - [`wait`]: Duration and handle based helpers
//! - [`ffi`]: The C-callable surface

pub mod descriptor;
pub mod event;
pub mod ffi;
pub mod poller;
pub mod wait;

pub use descriptor::{AsDescriptor, Descriptor, INVALID_FD};
pub use event::{EVENT_ERROR, EVENT_NONE, EVENT_READ, EVENT_WRITE, Event};
pub use poller::{NativeSelector, Poller, PollerBuilder, Selector, select, set_blocking};
pub use wait::{WaitForEvent, duration_to_ms, time_remaining, wait_multiple};
