//! Tests for the connection handshake feeding the codec

use std::io::Cursor;

use h2_engine::{
    handshake, CodecConfig, ErrorCode, H2Codec, H2Event, Handshaker, Http2Settings, SettingsDelta,
    SettingsFrame, CONNECTION_PREFACE,
};

fn client_preface(delta: SettingsDelta) -> Vec<u8> {
    let mut bytes = CONNECTION_PREFACE.to_vec();
    SettingsFrame::Update(delta).encode(&mut bytes);
    bytes
}

#[test]
fn test_blocking_handshake_end_to_end() {
    let config = CodecConfig::default();
    let input = client_preface(SettingsDelta {
        max_concurrent_streams: Some(100),
        header_table_size: Some(8192),
        ..Default::default()
    });

    let mut written = Vec::new();
    let client = handshake(
        &mut Cursor::new(input),
        &mut written,
        &config.server_settings(),
        &Http2Settings::client_defaults(),
        config.max_frame_size,
    )
    .unwrap();

    assert_eq!(client.max_concurrent_streams, 100);
    assert_eq!(client.header_table_size, 8192);

    // what we wrote is a SETTINGS frame followed by an ACK, as seen by a client
    let mut peer = H2Codec::new();
    let events = peer.process(&written).unwrap();
    assert_eq!(events.len(), 2);
    match &events[0] {
        H2Event::Settings(SettingsFrame::Update(delta)) => {
            assert_eq!(delta.max_concurrent_streams, Some(100));
            assert_eq!(delta.enable_push, None);
        }
        _ => panic!("Expected Settings event"),
    }
    assert!(matches!(events[1], H2Event::Settings(SettingsFrame::Ack)));
}

#[test]
fn test_single_setting_leaves_other_client_defaults() {
    let config = CodecConfig::default();
    let input = client_preface(SettingsDelta {
        max_concurrent_streams: Some(100),
        ..Default::default()
    });

    let client = handshake(
        &mut Cursor::new(input.clone()),
        &mut Vec::new(),
        &config.server_settings(),
        &Http2Settings::client_defaults(),
        config.max_frame_size,
    )
    .unwrap();
    let expected = Http2Settings {
        max_concurrent_streams: 100,
        ..Http2Settings::client_defaults()
    };
    assert_eq!(client, expected);

    // a base whose stream limit differs shows the delta is applied
    let unlimited = Http2Settings {
        max_concurrent_streams: u32::MAX,
        ..Http2Settings::client_defaults()
    };
    let mut handshaker =
        Handshaker::new(config.server_settings(), unlimited, config.max_frame_size);
    let outcome = handshaker.feed(&input).unwrap().unwrap();
    assert_eq!(outcome.client_settings, expected);
}

#[test]
fn test_handshaker_hands_off_to_codec() {
    let config = CodecConfig::default();
    let mut input = client_preface(SettingsDelta {
        max_concurrent_streams: Some(100),
        ..Default::default()
    });
    // first request right behind the SETTINGS frame
    input.extend_from_slice(&[0, 0, 1, 1, 5, 0, 0, 0, 1, 0x82]);

    let mut handshaker = Handshaker::new(
        config.server_settings(),
        Http2Settings::client_defaults(),
        config.max_frame_size,
    );
    assert!(handshaker.feed(&input[..20]).unwrap().is_none());
    let outcome = handshaker.feed(&input[20..]).unwrap().unwrap();
    assert_eq!(outcome.client_settings.max_concurrent_streams, 100);

    let mut codec = H2Codec::with_config(&config);
    codec.set_preface_received(true);
    codec.set_peer_settings(outcome.client_settings);
    let events = codec.process(&outcome.remaining).unwrap();
    assert!(matches!(&events[0], H2Event::Headers { stream_id: 1, end_stream: true, .. }));
    assert_eq!(codec.peer_settings().max_concurrent_streams, 100);
}

#[test]
fn test_handshake_rejects_oversized_settings() {
    let mut input = CONNECTION_PREFACE.to_vec();
    input.extend_from_slice(&[0, 0x40, 0x02, 4, 0, 0, 0, 0, 0]);

    let err = handshake(
        &mut Cursor::new(input),
        &mut Vec::new(),
        &CodecConfig::default().server_settings(),
        &Http2Settings::client_defaults(),
        16_384,
    )
    .unwrap_err();
    assert_eq!(err.as_h2().unwrap().code(), ErrorCode::FrameSizeError);
}
