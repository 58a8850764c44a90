//! Tests for frame building functions

use h2_engine::frame::{DataFrame, GoAway};
use h2_engine::{
    CodecConfig, ErrorCode, FieldBlock, Frame, FrameType, H2Codec, H2Event, H2FrameHeader,
};

#[test]
fn test_create_rst_stream() {
    let frame = H2Codec::create_rst_stream(1, ErrorCode::Cancel);
    assert_eq!(frame.len(), 13); // 9 header + 4 payload
    assert_eq!(frame[3], 3); // RST_STREAM type
    assert_eq!(&frame[9..], &[0, 0, 0, 8]);
}

#[test]
fn test_create_goaway() {
    let frame = H2Codec::create_goaway(3, ErrorCode::NoError);
    assert_eq!(frame.len(), 17);
    assert_eq!(frame[3], 7); // GOAWAY type
    assert_eq!(&frame[9..13], &[0, 0, 0, 3]);
}

#[test]
fn test_create_settings_ack() {
    let frame = H2Codec::create_settings_ack();
    assert_eq!(frame, [0, 0, 0, 4, 1, 0, 0, 0, 0]);
}

#[test]
fn test_create_settings_from_config() {
    let config = CodecConfig {
        max_concurrent_streams: 100,
        initial_window_size: 1 << 20,
        ..CodecConfig::default()
    };
    let frame = H2Codec::create_settings(&config.server_settings());
    let header = H2FrameHeader::parse(&frame).unwrap();
    assert_eq!(header.frame_type, FrameType::Settings);
    assert_eq!(header.stream_id, 0);

    let params: Vec<(u16, u32)> = frame[9..]
        .chunks(6)
        .map(|p| (u16::from_be_bytes([p[0], p[1]]), u32::from_be_bytes([p[2], p[3], p[4], p[5]])))
        .collect();
    assert_eq!(
        params,
        vec![(1, 4096), (3, 100), (4, 1 << 20), (5, 16_384), (6, 8192)]
    );
}

#[test]
fn test_create_window_update() {
    let frame = H2Codec::create_window_update(0, 65_535);
    assert_eq!(frame, [0, 0, 4, 8, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff]);
}

#[test]
fn test_create_continuation_frame() {
    let frame = H2Codec::create_continuation_frame(5, &[0x82, 0x84], true);
    let header = H2FrameHeader::parse(&frame).unwrap();
    assert_eq!(header.frame_type, FrameType::Continuation);
    assert_eq!(header.stream_id, 5);
    assert!(header.is_end_headers());
    assert_eq!(&frame[9..], &[0x82, 0x84]);
}

#[test]
fn test_encoded_frames_parse_back() {
    let mut sender = H2Codec::new();
    let mut fields = FieldBlock::new();
    fields.add(":status", "200").add("content-length", "4");

    let mut wire = sender.encode_headers(1, &fields, false);
    wire.extend(sender.encode_frame(&Frame::Data(DataFrame::new(1, &b"pong"[..], true))));
    wire.extend(sender.encode_frame(&Frame::GoAway(
        GoAway::new(1, ErrorCode::NoError).with_debug_data("bye"),
    )));

    let mut receiver = H2Codec::new();
    let events = receiver.process(&wire).unwrap();
    assert_eq!(events.len(), 3);
    match &events[0] {
        H2Event::Headers { headers, .. } => assert_eq!(headers, &fields),
        _ => panic!("Expected Headers event"),
    }
    assert!(matches!(&events[1], H2Event::Data { data, end_stream: true, .. } if &data[..] == b"pong"));
    assert!(matches!(&events[2], H2Event::GoAway { debug_data, .. } if &debug_data[..] == b"bye"));
}
