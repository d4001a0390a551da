use fdselect::{AsDescriptor, Event, PollerBuilder, select};
use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

fn connected_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to get local address");

    let client = TcpStream::connect(addr).expect("Failed to connect to listener");
    let (server, _) = listener.accept().expect("Failed to accept connection");

    (client, server)
}

#[test]
fn test_read_readiness_follows_write() {
    let (mut client, server) = connected_pair();
    let fds = [server.as_descriptor()];

    let mut events = [Event::READ];
    select(0, &fds, &mut events).expect("select failed");
    assert_eq!(events, [Event::NONE], "Nothing was written yet");

    client.write_all(b"hello").expect("Failed to write to stream");

    let mut events = [Event::READ];
    select(5_000, &fds, &mut events).expect("select failed");
    assert_eq!(events, [Event::READ], "Written data should be readable");
}

#[test]
fn test_zero_timeout_returns_immediately() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
    let (_client, server) = connected_pair();

    let fds = [listener.as_descriptor(), server.as_descriptor()];
    let mut events = [Event::READ, Event::READ | Event::ERROR];

    let start = Instant::now();
    select(0, &fds, &mut events).expect("select failed");

    assert!(start.elapsed() < Duration::from_millis(500));
    assert_eq!(events, [Event::NONE, Event::NONE]);
}

#[test]
fn test_no_interest_reports_nothing() {
    let (mut client, server) = connected_pair();
    client.write_all(b"pending").expect("Failed to write to stream");

    let fds = [client.as_descriptor(), server.as_descriptor()];
    let mut events = [Event::NONE, Event::NONE];

    select(20, &fds, &mut events).expect("select failed");
    assert_eq!(events, [Event::NONE, Event::NONE]);
}

#[test]
fn test_empty_request_succeeds() {
    let mut events: [Event; 0] = [];
    select(0, &[], &mut events).expect("select failed");

    let start = Instant::now();
    select(20, &[], &mut events).expect("select failed");
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_connected_socket_is_writable() {
    let (client, _server) = connected_pair();

    let fds = [client.as_descriptor()];
    let mut events = [Event::WRITE];
    select(5_000, &fds, &mut events).expect("select failed");

    assert_eq!(events, [Event::WRITE]);
}

#[test]
fn test_results_are_subset_of_interest() {
    let (mut client, server) = connected_pair();
    client.write_all(b"data").expect("Failed to write to stream");

    // Give the loopback a moment to deliver.
    let mut probe = [Event::READ];
    select(5_000, &[server.as_descriptor()], &mut probe).expect("select failed");
    assert!(probe[0].is_readable());

    let fds = [client.as_descriptor(), server.as_descriptor()];
    let requested = [Event::READ, Event::WRITE | Event::ERROR];
    let mut events = requested;

    select(100, &fds, &mut events).expect("select failed");

    for (fired, asked) in events.iter().zip(requested.iter()) {
        assert_eq!(fired.bits() & !asked.bits(), 0, "{fired:?} not within {asked:?}");
    }
    assert!(events[1].is_writable());
    assert!(!events[1].is_readable());
}

#[test]
fn test_accept_ready() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to get local address");

    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        TcpStream::connect(addr).expect("Failed to connect to listener")
    });

    let fds = [listener.as_descriptor()];
    let mut events = [Event::READ];
    select(7_000, &fds, &mut events).expect("select failed");

    assert_eq!(events, [Event::READ]);
    handle.join().expect("Thread panicked");
}

#[test]
fn test_accept_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");

    let fds = [listener.as_descriptor()];
    let mut events = [Event::READ];

    let start = Instant::now();
    select(100, &fds, &mut events).expect("select failed");

    assert_eq!(events, [Event::NONE]);
    assert!(
        start.elapsed() >= Duration::from_millis(80),
        "select should wait for the timeout"
    );
}

#[test]
fn test_peer_close_is_readable() {
    let (client, server) = connected_pair();
    drop(client);

    let fds = [server.as_descriptor()];
    let mut events = [Event::READ];
    select(5_000, &fds, &mut events).expect("select failed");

    assert!(events[0].is_readable(), "EOF should be reported as readable");
}

#[test]
fn test_duplicate_descriptor_is_rejected() {
    let (client, _server) = connected_pair();

    let fds = [client.as_descriptor(), client.as_descriptor()];
    let mut events = [Event::READ, Event::WRITE];

    let err = select(0, &fds, &mut events).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    assert_eq!(events, [Event::READ, Event::WRITE]);
}

#[test]
fn test_duplicate_descriptor_without_validation_stays_within_interest() {
    let (client, _server) = connected_pair();
    let poller = PollerBuilder::new().validate(false).build();

    let fds = [client.as_descriptor(), client.as_descriptor()];
    let mut events = [Event::READ, Event::WRITE];

    poller.select(1_000, &fds, &mut events).expect("select failed");
    assert_eq!(events[0], Event::NONE);
    assert_eq!(events[1], Event::WRITE);
}

#[cfg(unix)]
mod unix {
    use super::*;
    use fdselect::Poller;

    /// Returns a descriptor that was open and has just been closed.
    fn closed_fd() -> u64 {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
        listener.as_descriptor()
    }

    #[test]
    fn test_closed_descriptor_fails_and_keeps_masks() {
        let mut events = [Event::READ | Event::WRITE];

        let err = Poller::new()
            .select(100, &[closed_fd()], &mut events)
            .unwrap_err();

        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
        assert_eq!(events, [Event::READ | Event::WRITE]);
    }

    #[test]
    fn test_out_of_range_descriptor_without_interest_succeeds() {
        let (mut client, server) = connected_pair();
        client.write_all(b"hello").expect("Failed to write to stream");

        let fds = [4096, server.as_descriptor()];
        let mut events = [Event::NONE, Event::READ];

        select(5_000, &fds, &mut events).expect("select failed");
        assert_eq!(events, [Event::NONE, Event::READ]);
    }

    #[test]
    fn test_out_of_range_descriptor_is_rejected() {
        let mut events = [Event::READ];

        let err = Poller::new()
            .select(0, &[1 << 40], &mut events)
            .unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert_eq!(events, [Event::READ]);
    }
}
