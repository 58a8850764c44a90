//! Tests for HEADERS + CONTINUATION reassembly

use h2_engine::{flags, CodecConfig, ErrorCode, FieldBlock, H2Codec, H2Event, HeaderRejection};

fn codec() -> H2Codec {
    let mut codec = H2Codec::new();
    codec.set_preface_received(true);
    codec
}

#[test]
fn test_continuation_assembles_header_block() {
    let mut codec = codec();

    // HEADERS without END_HEADERS carrying half the block
    let mut data = vec![0, 0, 2, 1, flags::END_STREAM, 0, 0, 0, 1, 0x82, 0x86];
    assert!(codec.process(&data).unwrap().is_empty());

    data = H2Codec::create_continuation_frame(1, &[0x84, 0x41, 0x00], true);
    let events = codec.process(&data).unwrap();
    assert_eq!(events.len(), 1);
    match &events[0] {
        H2Event::Headers { stream_id, headers, end_stream, .. } => {
            assert_eq!(*stream_id, 1);
            assert_eq!(headers.len(), 4);
            assert_eq!(headers.get(":path").unwrap(), "/");
            assert_eq!(headers.get(":authority").unwrap(), "");
            assert!(*end_stream);
        }
        _ => panic!("Expected Headers event"),
    }
}

#[test]
fn test_literal_split_across_frames() {
    let mut codec = codec();

    // literal x-a: hello split in the middle of the value
    let block = [0x00, 3, b'x', b'-', b'a', 5, b'h', b'e', b'l', b'l', b'o'];
    let mut data = vec![0, 0, 7, 1, 0, 0, 0, 0, 1];
    data.extend_from_slice(&block[..7]);
    data.extend_from_slice(&H2Codec::create_continuation_frame(1, &block[7..], true));

    let events = codec.process(&data).unwrap();
    match &events[0] {
        H2Event::Headers { headers, .. } => assert_eq!(headers.get("x-a").unwrap(), "hello"),
        _ => panic!("Expected Headers event"),
    }
}

#[test]
fn test_continuation_for_other_stream_is_connection_error() {
    let mut codec = codec();
    let mut data = vec![0, 0, 1, 1, 0, 0, 0, 0, 1, 0x82];
    data.extend_from_slice(&H2Codec::create_continuation_frame(3, &[0x84], true));

    let err = codec.process(&data).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProtocolError);
    assert!(err.is_connection_error());
}

#[test]
fn test_data_during_header_block_is_connection_error() {
    let mut codec = codec();
    let mut data = vec![0, 0, 1, 1, 0, 0, 0, 0, 1, 0x82];
    data.extend_from_slice(&[0, 0, 1, 0, 0, 0, 0, 0, 1, b'x']);

    let err = codec.process(&data).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProtocolError);
}

#[test]
fn test_header_block_over_limit() {
    let config = CodecConfig {
        max_header_block_size: 1024,
        ..CodecConfig::default()
    };
    let mut codec = H2Codec::with_config(&config);
    codec.set_preface_received(true);

    let mut data = vec![0, 0x02, 0, 1, 0, 0, 0, 0, 1]; // 512 bytes, no END_HEADERS
    data.extend_from_slice(&[0x82; 512]);
    for _ in 0..3 {
        data.extend_from_slice(&H2Codec::create_continuation_frame(1, &[0x82; 256], false));
    }
    let err = codec.process(&data).unwrap_err();
    assert_eq!(err.code(), ErrorCode::EnhanceYourCalm);
}

#[test]
fn test_rejected_after_continuation() {
    let config = CodecConfig {
        max_header_list_size: 100,
        ..CodecConfig::default()
    };
    let mut codec = H2Codec::with_config(&config);
    codec.set_preface_received(true);

    let mut fields = FieldBlock::new();
    fields.add(":method", "GET").add("cookie", "a".repeat(200));
    let mut sender = H2Codec::new();
    let block = sender.encode_headers(7, &fields, false);

    // re-split the single HEADERS frame into HEADERS + CONTINUATION
    let payload = &block[9..];
    let mut data = vec![0, 0, 10, 1, 0, 0, 0, 0, 7];
    data.extend_from_slice(&payload[..10]);
    data.extend_from_slice(&H2Codec::create_continuation_frame(7, &payload[10..], true));

    let events = codec.process(&data).unwrap();
    match &events[0] {
        H2Event::HeadersRejected { stream_id, rejection, end_stream } => {
            assert_eq!(*stream_id, 7);
            assert_eq!(*rejection, HeaderRejection::HeadersTooLarge);
            assert_eq!(rejection.status(), 431);
            assert!(!*end_stream);
        }
        _ => panic!("Expected HeadersRejected event"),
    }
}
