//! Tests for H2Codec error handling

use h2_engine::{ErrorCode, Frame, H2Codec, H2Event};

fn codec() -> H2Codec {
    let mut codec = H2Codec::new();
    codec.set_preface_received(true);
    codec
}

#[test]
fn test_window_update_too_short_returns_error() {
    let mut codec = codec();
    let frame = vec![0, 0, 2, 8, 0, 0, 0, 0, 1, 0, 0];

    let err = codec.process(&frame).unwrap_err();
    assert_eq!(err.code(), ErrorCode::FrameSizeError);
    assert!(err.is_connection_error());
}

#[test]
fn test_ping_too_short_returns_error() {
    let mut codec = codec();
    let frame = vec![0, 0, 4, 6, 0, 0, 0, 0, 0, 1, 2, 3, 4];

    let err = codec.process(&frame).unwrap_err();
    assert_eq!(err.code(), ErrorCode::FrameSizeError);
}

#[test]
fn test_goaway_too_short_returns_error() {
    let mut codec = codec();
    let frame = vec![0, 0, 4, 7, 0, 0, 0, 0, 0, 0, 0, 0, 5];

    let err = codec.process(&frame).unwrap_err();
    assert_eq!(err.code(), ErrorCode::FrameSizeError);
}

#[test]
fn test_rst_stream_wrong_length_returns_error() {
    let mut codec = codec();
    let frame = vec![0, 0, 2, 3, 0, 0, 0, 0, 1, 0, 0];

    let err = codec.process(&frame).unwrap_err();
    assert_eq!(err.code(), ErrorCode::FrameSizeError);
}

#[test]
fn test_headers_on_stream_zero_returns_error() {
    let mut codec = codec();
    let frame = vec![0, 0, 1, 1, 4, 0, 0, 0, 0, 0x82];

    let err = codec.process(&frame).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProtocolError);
}

#[test]
fn test_padded_data_frame_invalid_padding() {
    let mut codec = codec();

    // PADDED DATA frame with padding exceeding payload
    let mut frame = vec![0, 0, 6, 0, 0x8, 0, 0, 0, 1]; // length 6
    frame.push(10); // Pad length 10 > payload (only 5 bytes after pad length)
    frame.extend_from_slice(b"hello");

    let err = codec.process(&frame).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProtocolError);
    assert!(err.message().contains("padding"));
}

#[test]
fn test_hpack_garbage_is_compression_error() {
    let mut codec = codec();
    // index 0 is never valid
    let frame = vec![0, 0, 1, 1, 4, 0, 0, 0, 1, 0x80];

    let err = codec.process(&frame).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CompressionError);
}

#[test]
fn test_push_promise_returns_error() {
    let mut codec = codec();
    let frame = vec![0, 0, 4, 5, 4, 0, 0, 0, 1, 0, 0, 0, 2];

    let err = codec.process(&frame).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProtocolError);
}

#[test]
fn test_stream_error_does_not_stop_processing() {
    let mut codec = codec();

    // PRIORITY depending on itself, then a PING
    let mut data = vec![0, 0, 5, 2, 0, 0, 0, 0, 3, 0, 0, 0, 3, 0];
    data.extend_from_slice(&[0, 0, 8, 6, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1]);

    let events = codec.process(&data).unwrap();
    assert_eq!(events.len(), 2);
    match &events[0] {
        H2Event::StreamError(e) => {
            assert_eq!(e.stream_id(), 3);
            match e.to_frame(0) {
                Frame::RstStream(rst) => assert_eq!(rst.code(), ErrorCode::ProtocolError),
                other => panic!("Expected RST_STREAM, got {other:?}"),
            }
        }
        _ => panic!("Expected StreamError event"),
    }
    assert!(matches!(events[1], H2Event::Ping { .. }));
}

#[test]
fn test_connection_error_maps_to_goaway() {
    let mut codec = codec();
    codec.process(&[0, 0, 1, 1, 4, 0, 0, 0, 5, 0x82]).unwrap();

    let err = codec.process(&[0, 0, 2, 8, 0, 0, 0, 0, 0, 0, 0]).unwrap_err();
    match err.to_frame(codec.last_stream_id()) {
        Frame::GoAway(goaway) => {
            assert_eq!(goaway.last_stream_id, 5);
            assert_eq!(goaway.code(), ErrorCode::FrameSizeError);
        }
        other => panic!("Expected GOAWAY, got {other:?}"),
    }
}
