use fdselect::AsDescriptor;
use fdselect::ffi::{INVALID_FD, wait_for_event};
use proptest::prelude::*;
use std::io::Write;
use std::net::{TcpListener, TcpStream};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Raw masks may carry bits the poller does not know about.
    #[test]
    fn fired_events_are_within_interest(
        client_mask in any::<u8>(),
        server_mask in any::<u8>(),
        send in any::<bool>(),
    ) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local address");
        let mut client = TcpStream::connect(addr).expect("Failed to connect to listener");
        let (server, _) = listener.accept().expect("Failed to accept connection");

        if send {
            client.write_all(b"x").expect("Failed to write to stream");
        }

        let fds = [client.as_descriptor(), server.as_descriptor(), INVALID_FD];
        let requested = [client_mask, server_mask];
        let mut events = [client_mask, server_mask, 0];

        let rc = unsafe { wait_for_event(10, fds.as_ptr(), events.as_mut_ptr()) };
        prop_assert_eq!(rc, 0);

        for (fired, asked) in events.iter().zip(requested.iter()) {
            prop_assert_eq!(fired & !asked, 0);
        }
    }
}
