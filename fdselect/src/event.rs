//! Readiness event masks.
//!
//! An [`Event`] is a tiny bitset over three readiness flags: readable,
//! writable and error. The same type is used for both directions of a
//! poll: the caller fills it with the events it is interested in, and the
//! poller overwrites it with the events that actually fired.
//!
//! The bit layout is part of the foreign boundary and is exported as plain
//! `u8` constants (see [`crate::ffi`]).

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

/// Raw value of an empty mask.
pub const EVENT_NONE: u8 = 0;

/// Raw bit for read readiness.
pub const EVENT_READ: u8 = 1 << 1;

/// Raw bit for write readiness.
pub const EVENT_WRITE: u8 = 1 << 2;

/// Raw bit for a pending error / exceptional condition.
pub const EVENT_ERROR: u8 = 1 << 3;

/// All bits understood by the poller.
const EVENT_ALL: u8 = EVENT_READ | EVENT_WRITE | EVENT_ERROR;

/// A set of readiness events.
///
/// `Event` is `repr(transparent)` over `u8`, so an array of raw masks coming
/// from C can be reinterpreted as `[Event]` in place.
///
/// # Examples
///
/// ```rust
/// use fdselect::Event;
///
/// let interest = Event::READ | Event::ERROR;
/// assert!(interest.is_readable());
/// assert!(!interest.is_writable());
/// ```
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Event(u8);

impl Event {
    /// No events.
    pub const NONE: Event = Event(EVENT_NONE);

    /// The descriptor can be read without blocking.
    pub const READ: Event = Event(EVENT_READ);

    /// The descriptor can be written without blocking.
    pub const WRITE: Event = Event(EVENT_WRITE);

    /// The descriptor has an error or exceptional condition pending.
    pub const ERROR: Event = Event(EVENT_ERROR);

    /// Builds a mask from its raw value.
    ///
    /// Returns `None` if `raw` carries bits that are not readiness flags.
    pub const fn from_bits(raw: u8) -> Option<Self> {
        if raw & !EVENT_ALL != 0 {
            None
        } else {
            Some(Event(raw))
        }
    }

    /// Builds a mask from its raw value, dropping unknown bits.
    pub const fn from_bits_truncate(raw: u8) -> Self {
        Event(raw & EVENT_ALL)
    }

    /// Returns the raw value of the mask.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if no readiness flag is set.
    ///
    /// Unknown bits are ignored, mirroring what the poller does with them.
    pub const fn is_empty(self) -> bool {
        self.0 & EVENT_ALL == 0
    }

    /// Returns `true` if every flag of `other` is also set in `self`.
    pub const fn contains(self, other: Event) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if `self` and `other` share at least one flag.
    pub const fn intersects(self, other: Event) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if the read flag is set.
    pub const fn is_readable(self) -> bool {
        self.0 & EVENT_READ != 0
    }

    /// Returns `true` if the write flag is set.
    pub const fn is_writable(self) -> bool {
        self.0 & EVENT_WRITE != 0
    }

    /// Returns `true` if the error flag is set.
    pub const fn is_error(self) -> bool {
        self.0 & EVENT_ERROR != 0
    }

    /// Adds the read flag.
    ///
    /// Returns a mutable reference to `self` to allow chaining.
    pub fn add_read(&mut self) -> &mut Self {
        self.0 |= EVENT_READ;
        self
    }

    /// Adds the write flag.
    ///
    /// Returns a mutable reference to `self` to allow chaining.
    pub fn add_write(&mut self) -> &mut Self {
        self.0 |= EVENT_WRITE;
        self
    }

    /// Adds the error flag.
    ///
    /// Returns a mutable reference to `self` to allow chaining.
    pub fn add_error(&mut self) -> &mut Self {
        self.0 |= EVENT_ERROR;
        self
    }
}

impl BitOr for Event {
    type Output = Event;

    fn bitor(self, rhs: Event) -> Event {
        Event(self.0 | rhs.0)
    }
}

impl BitOrAssign for Event {
    fn bitor_assign(&mut self, rhs: Event) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Event {
    type Output = Event;

    fn bitand(self, rhs: Event) -> Event {
        Event(self.0 & rhs.0)
    }
}

impl BitAndAssign for Event {
    fn bitand_assign(&mut self, rhs: Event) {
        self.0 &= rhs.0;
    }
}

impl From<Event> for u8 {
    fn from(event: Event) -> u8 {
        event.0
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Event(NONE)");
        }

        f.write_str("Event(")?;
        let mut first = true;
        for (flag, name) in [
            (Event::READ, "READ"),
            (Event::WRITE, "WRITE"),
            (Event::ERROR, "ERROR"),
        ] {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str(")")
    }
}
