//! Integration tests for the H2 frame codec

mod codec_processing;
mod continuation;
mod error_handling;
mod frame_building;
mod handshake;
