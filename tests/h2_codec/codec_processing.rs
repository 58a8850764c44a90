//! Tests for H2Codec processing (bytes -> events)

use h2_engine::{flags, FieldBlock, H2Codec, H2Event, SettingsFrame, CONNECTION_PREFACE};

fn with_preface(codec: &mut H2Codec) {
    codec.set_preface_received(true);
}

#[test]
fn test_codec_fragmented_frames() {
    let mut codec = H2Codec::new();
    with_preface(&mut codec);

    // Build a complete frame
    let mut frame = vec![0, 0, 5, 0, 1, 0, 0, 0, 1]; // Header
    frame.extend_from_slice(b"hello");

    // Feed it in fragments
    let events1 = codec.process(&frame[..5]).unwrap();
    assert!(events1.is_empty()); // Not enough data

    let events2 = codec.process(&frame[5..10]).unwrap();
    assert!(events2.is_empty()); // Still not enough

    let events3 = codec.process(&frame[10..]).unwrap();
    assert_eq!(events3.len(), 1); // Now complete
}

#[test]
fn test_connection_preface_handling() {
    let mut codec = H2Codec::new();

    // Send connection preface followed by SETTINGS
    let mut data = CONNECTION_PREFACE.to_vec();
    data.extend_from_slice(&[0, 0, 0, 4, 0, 0, 0, 0, 0]); // Empty SETTINGS

    let events = codec.process(&data).unwrap();
    assert!(codec.preface_received());
    assert_eq!(events.len(), 1);

    match &events[0] {
        H2Event::Settings(settings) => assert!(!settings.is_ack()),
        _ => panic!("Expected Settings event"),
    }
}

#[test]
fn test_padded_data_frame() {
    let mut codec = H2Codec::new();
    with_preface(&mut codec);

    // DATA frame with PADDED flag: length 10, pad_length 4, data "hello"
    let mut frame = vec![0, 0, 10, 0, 0x9, 0, 0, 0, 1]; // 0x9 = END_STREAM | PADDED
    frame.push(4); // Pad length
    frame.extend_from_slice(b"hello");
    frame.extend_from_slice(&[0, 0, 0, 0]); // Padding

    let events = codec.process(&frame).unwrap();
    assert_eq!(events.len(), 1);
    match &events[0] {
        H2Event::Data { stream_id, data, end_stream } => {
            assert_eq!(*stream_id, 1);
            assert_eq!(&data[..], b"hello");
            assert!(*end_stream);
        }
        _ => panic!("Expected Data event"),
    }
}

#[test]
fn test_multiple_frames_in_one_read() {
    let mut codec = H2Codec::new();
    with_preface(&mut codec);

    let mut data = vec![0, 0, 3, 1, flags::END_HEADERS, 0, 0, 0, 1, 0x83, 0x86, 0x84];
    data.extend_from_slice(&[0, 0, 4, 0, 0, 0, 0, 0, 1]);
    data.extend_from_slice(b"body");
    data.extend_from_slice(&[0, 0, 0, 0, flags::END_STREAM, 0, 0, 0, 1]);

    let events = codec.process(&data).unwrap();
    assert_eq!(events.len(), 3);
    match &events[0] {
        H2Event::Headers { headers, end_stream, .. } => {
            assert_eq!(headers.get(":method").unwrap(), "POST");
            assert!(!*end_stream);
        }
        _ => panic!("Expected Headers event"),
    }
    assert!(matches!(&events[1], H2Event::Data { data, end_stream: false, .. } if &data[..] == b"body"));
    assert!(matches!(&events[2], H2Event::Data { end_stream: true, .. }));
}

#[test]
fn test_headers_with_priority_flag() {
    let mut codec = H2Codec::new();
    with_preface(&mut codec);

    // HEADERS with PRIORITY flag
    let mut frame = vec![0, 0, 7, 1, 0x24, 0, 0, 0, 1];
    frame.extend_from_slice(&[0x80, 0, 0, 0]); // Exclusive, dependency 0
    frame.push(255); // Weight
    frame.extend_from_slice(&[0x82, 0x86]); // Header block

    let events = codec.process(&frame).unwrap();
    assert_eq!(events.len(), 1);

    match &events[0] {
        H2Event::Headers { headers, priority, .. } => {
            assert_eq!(headers.len(), 2);
            let priority = priority.unwrap();
            assert!(priority.exclusive);
            assert_eq!(priority.dependency, 0);
            assert_eq!(priority.weight, 255);
        }
        _ => panic!("Expected Headers event"),
    }
}

#[test]
fn test_dynamic_table_shared_across_blocks() {
    let mut codec = H2Codec::new();
    with_preface(&mut codec);

    // literal with incremental indexing: x-id: 7, then indexed 62 on the next stream
    let first = [
        0, 0, 8, 1, flags::END_HEADERS, 0, 0, 0, 1,
        0x40, 4, b'x', b'-', b'i', b'd', 1, b'7',
    ];
    let second = [0, 0, 1, 1, flags::END_HEADERS, 0, 0, 0, 3, 0xbe];

    codec.process(&first).unwrap();
    let events = codec.process(&second).unwrap();
    match &events[0] {
        H2Event::Headers { stream_id, headers, .. } => {
            assert_eq!(*stream_id, 3);
            assert_eq!(headers.get("x-id").unwrap(), "7");
        }
        _ => panic!("Expected Headers event"),
    }
    assert_eq!(codec.decoder().table().dynamic_len(), 1);
    assert_eq!(codec.last_stream_id(), 3);
}

#[test]
fn test_settings_ack_event() {
    let mut codec = H2Codec::new();
    with_preface(&mut codec);

    let events = codec.process(&H2Codec::create_settings_ack()).unwrap();
    assert!(matches!(events[0], H2Event::Settings(SettingsFrame::Ack)));
}

#[test]
fn test_settings_header_table_size_announced_to_peer() {
    let mut codec = H2Codec::new();
    with_preface(&mut codec);

    // SETTINGS_HEADER_TABLE_SIZE = 0
    codec.process(&[0, 0, 6, 4, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0]).unwrap();
    assert_eq!(codec.peer_settings().header_table_size, 0);

    let mut fields = FieldBlock::new();
    fields.add(":status", "200");
    let encoded = codec.encode_headers(1, &fields, true);
    // dynamic table size update to 0, then indexed :status 200
    assert_eq!(&encoded[9..], &[0x20, 0x88]);
}

#[test]
fn test_ping_and_goaway_events() {
    let mut codec = H2Codec::new();
    with_preface(&mut codec);

    let mut data = vec![0, 0, 8, 6, 0, 0, 0, 0, 0];
    data.extend_from_slice(b"12345678");
    data.extend_from_slice(&[0, 0, 10, 7, 0, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 0xb, b'h', b'i']);

    let events = codec.process(&data).unwrap();
    match &events[0] {
        H2Event::Ping { ack, data } => {
            assert!(!*ack);
            assert_eq!(data, b"12345678");
        }
        _ => panic!("Expected Ping event"),
    }
    match &events[1] {
        H2Event::GoAway { last_stream_id, error_code, debug_data } => {
            assert_eq!(*last_stream_id, 3);
            assert_eq!(*error_code, 0xb);
            assert_eq!(&debug_data[..], b"hi");
        }
        _ => panic!("Expected GoAway event"),
    }
}

#[test]
fn test_priority_frame_event() {
    let mut codec = H2Codec::new();
    with_preface(&mut codec);

    let events = codec.process(&[0, 0, 5, 2, 0, 0, 0, 0, 5, 0, 0, 0, 3, 9]).unwrap();
    match &events[0] {
        H2Event::Priority { stream_id, priority } => {
            assert_eq!(*stream_id, 5);
            assert_eq!(priority.dependency, 3);
            assert_eq!(priority.weight, 9);
        }
        _ => panic!("Expected Priority event"),
    }
}
