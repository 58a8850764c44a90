//! Integration tests for flow control

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use h2_engine::{
    apply_settings_to_all, ErrorCode, H2Codec, H2Event, Http2Settings, IncomingFlowController,
    OutgoingFlowController,
};

#[test]
fn test_incoming_window_batches_updates() {
    let conn = IncomingFlowController::new(0, 65_535);

    // receive 40000 bytes, consume them in two halves
    assert!(conn.withdraw(40_000));
    assert_eq!(conn.increment_credit(20_000).unwrap(), 0);
    let commit = conn.increment_credit(20_000).unwrap();
    assert_eq!(commit, 40_000);
    assert_eq!(conn.credit(), 65_535);

    let frame = H2Codec::create_window_update(0, commit);
    let mut peer = H2Codec::new();
    match &peer.process(&frame).unwrap()[0] {
        H2Event::WindowUpdate { stream_id, increment } => {
            assert_eq!(*stream_id, 0);
            assert_eq!(*increment, 40_000);
        }
        _ => panic!("Expected WindowUpdate event"),
    }
}

#[test]
fn test_incoming_refuses_more_than_window() {
    let stream = IncomingFlowController::new(1, 100);
    assert!(!stream.withdraw(101));
    assert!(stream.withdraw(100));
    assert!(!stream.withdraw(1));
}

#[test]
fn test_outgoing_window_update_overflow() {
    let stream = OutgoingFlowController::new(3, 65_535);
    let err = stream.apply_window_update(0x7fff_ffff).unwrap_err();
    assert_eq!(err.code(), ErrorCode::FlowControlError);
    assert_eq!(err.stream_id(), 3);
    assert!(!err.is_connection_error());

    let conn = OutgoingFlowController::new(0, 65_535);
    assert!(conn.apply_window_update(0x7fff_ffff).unwrap_err().is_connection_error());
}

#[test]
fn test_writer_unblocked_by_window_update() {
    let stream = Arc::new(OutgoingFlowController::new(1, 10));
    assert!(stream.withdraw(10));

    let writer = {
        let stream = Arc::clone(&stream);
        thread::spawn(move || stream.wait_until_withdraw(500, Duration::from_secs(5)))
    };
    thread::sleep(Duration::from_millis(20));
    stream.apply_window_update(1000).unwrap();

    assert!(writer.join().unwrap().unwrap());
    assert_eq!(stream.credit(), 500);
}

#[test]
fn test_writer_times_out() {
    let stream = OutgoingFlowController::new(1, 0);
    assert!(!stream.wait_until_withdraw(1, Duration::from_millis(20)).unwrap());
}

#[test]
fn test_settings_change_applies_to_streams_only() {
    let old = Http2Settings::client_defaults();
    let new = Http2Settings {
        initial_window_size: 1000,
        ..old
    };

    let conn = OutgoingFlowController::new(0, 65_535);
    let streams = [
        OutgoingFlowController::new(1, 65_535),
        OutgoingFlowController::new(3, 65_535),
    ];
    assert!(streams[0].withdraw(65_000));

    apply_settings_to_all(std::iter::once(&conn).chain(streams.iter()), &old, &new).unwrap();

    assert_eq!(conn.credit(), 65_535);
    assert_eq!(streams[0].credit(), 535 - 64_535);
    assert!(streams[0].credit() < 0);
    assert_eq!(streams[1].credit(), 1000);
    assert!(!streams[0].withdraw(1));
}
