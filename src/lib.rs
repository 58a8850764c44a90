//! h2-engine: the protocol core of an HTTP/2 server
//!
//! This crate implements the parts of HTTP/2 that sit between a socket and a
//! request handler, without doing any I/O of its own (apart from the optional
//! blocking [`handshake`]).
//!
//! # Features
//!
//! - **Frames**: every RFC 9113 frame type as a typed [`Frame`], with header
//!   validation against the negotiated limits
//! - **HPACK**: RFC 7541 field block decoder and encoder with the static and
//!   dynamic tables and the Huffman code
//! - **Header budgets**: over-long URIs and oversized header lists become
//!   414 / 431 rejections instead of connection errors
//! - **Flow Control**: incoming windows that batch WINDOW_UPDATEs, outgoing
//!   windows writers can block on
//! - **Handshake**: connection preface check and the initial SETTINGS exchange
//! - **CONTINUATION Assembly**: automatic header block reassembly in [`H2Codec`]
//!
//! # Quick Start
//!
//! ```rust
//! use h2_engine::{H2Codec, H2Event};
//!
//! let mut codec = H2Codec::new();
//!
//! // HEADERS on stream 1: GET http / (END_STREAM | END_HEADERS)
//! let frame_bytes = [0, 0, 3, 1, 5, 0, 0, 0, 1, 0x82, 0x86, 0x84];
//! let events = codec.process(&frame_bytes).unwrap();
//!
//! for event in events {
//!     match event {
//!         H2Event::Headers { stream_id, headers, .. } => {
//!             assert_eq!(stream_id, 1);
//!             assert_eq!(headers.get(":method").unwrap(), "GET");
//!         }
//!         H2Event::Data { stream_id, data, .. } => {
//!             println!("Data on stream {}: {} bytes", stream_id, data.len());
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`h2_codec`]: frame header codec, frame type registry, buffered processor
//! - [`frame`]: logical frames, decoded from and encoded to wire bytes
//! - [`hpack`]: header compression
//! - [`settings`]: SETTINGS parameters
//! - [`flow_control`]: per-stream and connection windows
//! - [`handshake`]: connection preface
//! - [`config`]: limits loaded from TOML
//!
//! It does NOT provide:
//! - TCP/TLS transport (you provide the bytes)
//! - HTTP semantics, routing or handler dispatch
//! - Stream lifecycle orchestration beyond flow-control bookkeeping
//!
//! The crate logs through `tracing` and installs no subscriber.

pub mod config;
pub mod error;
pub mod flow_control;
pub mod frame;
pub mod h2_codec;
pub mod handshake;
pub mod hpack;
pub mod settings;

pub use config::{CodecConfig, ConfigError};
pub use error::{Error, ErrorCode, ErrorLevel, H2Error, HeaderRejection};
pub use flow_control::{apply_settings_to_all, IncomingFlowController, OutgoingFlowController};
pub use frame::Frame;
pub use h2_codec::{
    flags, is_h2c_preface, settings_id, FrameType, H2Codec, H2Event, H2FrameHeader, StreamState,
    CONNECTION_PREFACE, FRAME_HEADER_LEN, MAX_HEADER_BLOCK_SIZE,
};
pub use handshake::{handshake, HandshakeOutcome, Handshaker};
pub use hpack::{FieldBlock, FieldBlockDecoder, FieldBlockEncoder, FieldLine, HeaderString};
pub use settings::{Http2Settings, SettingsDelta, SettingsFrame};
