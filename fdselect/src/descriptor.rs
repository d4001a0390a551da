//! Platform-neutral descriptors.
//!
//! POSIX file descriptors are small non-negative `int`s while WinSock
//! `SOCKET`s are pointer-sized unsigned integers. Both fit in a `u64`
//! without loss, which is the representation used everywhere in this crate.

/// A raw OS descriptor (unix file descriptor or WinSock socket).
pub type Descriptor = u64;

/// The end-of-list sentinel used by the foreign boundary.
///
/// All bits set, so it can never collide with a real descriptor.
pub const INVALID_FD: Descriptor = u64::MAX;

/// Unifies [`std::os::unix::io::AsRawFd`] and
/// [`std::os::windows::io::AsRawSocket`].
///
/// Every std handle that exposes its native descriptor (`TcpStream`,
/// `TcpListener`, `UdpSocket`, `UnixStream`, ...) implements this trait
/// through a blanket implementation.
pub trait AsDescriptor {
    /// Returns the underlying raw descriptor.
    fn as_descriptor(&self) -> Descriptor;
}

#[cfg(unix)]
impl<T: std::os::unix::io::AsRawFd> AsDescriptor for T {
    fn as_descriptor(&self) -> Descriptor {
        self.as_raw_fd() as Descriptor
    }
}

#[cfg(windows)]
impl<T: std::os::windows::io::AsRawSocket> AsDescriptor for T {
    fn as_descriptor(&self) -> Descriptor {
        self.as_raw_socket() as Descriptor
    }
}
