//! HTTP/2 SETTINGS parameters (RFC 9113 Section 6.5).

use crate::error::{ErrorCode, H2Error};
use crate::h2_codec::{flags, settings_id, FrameType, H2FrameHeader};

/// Largest legal SETTINGS_INITIAL_WINDOW_SIZE and flow-control window.
pub const MAX_WINDOW_SIZE: u32 = 0x7fff_ffff;

/// Smallest legal SETTINGS_MAX_FRAME_SIZE (also the default).
pub const MIN_MAX_FRAME_SIZE: u32 = 16_384;

/// Largest legal SETTINGS_MAX_FRAME_SIZE.
pub const MAX_MAX_FRAME_SIZE: u32 = 16_777_215;

/// A complete set of connection settings, as seen from one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Http2Settings {
    pub header_table_size: u32,
    pub enable_push: bool,
    pub max_concurrent_streams: u32,
    pub initial_window_size: u32,
    pub max_frame_size: u32,
    pub max_header_list_size: u32,
}

impl Http2Settings {
    /// What we assume of a client until its first SETTINGS frame arrives.
    pub const fn client_defaults() -> Self {
        Self {
            header_table_size: 4096,
            enable_push: true,
            max_concurrent_streams: 100,
            initial_window_size: 65_535,
            max_frame_size: MIN_MAX_FRAME_SIZE,
            max_header_list_size: 32 * 1024,
        }
    }

    /// Apply the parameters present in `delta`; absent ones keep their value.
    pub fn copy_if_changed(&self, delta: &SettingsDelta) -> Self {
        Self {
            header_table_size: delta.header_table_size.unwrap_or(self.header_table_size),
            enable_push: delta.enable_push.unwrap_or(self.enable_push),
            max_concurrent_streams: delta
                .max_concurrent_streams
                .unwrap_or(self.max_concurrent_streams),
            initial_window_size: delta.initial_window_size.unwrap_or(self.initial_window_size),
            max_frame_size: delta.max_frame_size.unwrap_or(self.max_frame_size),
            max_header_list_size: delta
                .max_header_list_size
                .unwrap_or(self.max_header_list_size),
        }
    }

    /// The SETTINGS frame a server sends to announce these values.
    ///
    /// ENABLE_PUSH is left out; servers must not advertise it.
    pub fn to_frame(&self) -> SettingsFrame {
        SettingsFrame::Update(SettingsDelta {
            header_table_size: Some(self.header_table_size),
            enable_push: None,
            max_concurrent_streams: Some(self.max_concurrent_streams),
            initial_window_size: Some(self.initial_window_size),
            max_frame_size: Some(self.max_frame_size),
            max_header_list_size: Some(self.max_header_list_size),
        })
    }
}

impl Default for Http2Settings {
    fn default() -> Self {
        Self::client_defaults()
    }
}

/// The parameters carried by one non-ACK SETTINGS frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsDelta {
    pub header_table_size: Option<u32>,
    pub enable_push: Option<bool>,
    pub max_concurrent_streams: Option<u32>,
    pub initial_window_size: Option<u32>,
    pub max_frame_size: Option<u32>,
    pub max_header_list_size: Option<u32>,
}

impl SettingsDelta {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `(identifier, value)` pairs in identifier order.
    pub fn pairs(&self) -> Vec<(u16, u32)> {
        [
            (settings_id::HEADER_TABLE_SIZE, self.header_table_size),
            (settings_id::ENABLE_PUSH, self.enable_push.map(u32::from)),
            (settings_id::MAX_CONCURRENT_STREAMS, self.max_concurrent_streams),
            (settings_id::INITIAL_WINDOW_SIZE, self.initial_window_size),
            (settings_id::MAX_FRAME_SIZE, self.max_frame_size),
            (settings_id::MAX_HEADER_LIST_SIZE, self.max_header_list_size),
        ]
        .into_iter()
        .filter_map(|(id, value)| value.map(|v| (id, v)))
        .collect()
    }
}

/// A SETTINGS frame: either an acknowledgement or a set of parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFrame {
    Ack,
    Update(SettingsDelta),
}

impl SettingsFrame {
    pub fn is_ack(&self) -> bool {
        matches!(self, Self::Ack)
    }

    pub fn decode(header: &H2FrameHeader, payload: &[u8]) -> Result<Self, H2Error> {
        if payload.len() % 6 != 0 {
            return Err(H2Error::connection(
                ErrorCode::FrameSizeError,
                "Settings size invalid",
            ));
        }
        if header.flags & flags::ACK != 0 {
            if !payload.is_empty() {
                return Err(H2Error::connection(
                    ErrorCode::FrameSizeError,
                    "Settings ACK with settings",
                ));
            }
            return Ok(Self::Ack);
        }

        let mut delta = SettingsDelta::default();
        for entry in payload.chunks_exact(6) {
            let id = u16::from_be_bytes([entry[0], entry[1]]);
            let value = u32::from_be_bytes([entry[2], entry[3], entry[4], entry[5]]);
            match id {
                settings_id::HEADER_TABLE_SIZE => delta.header_table_size = Some(value),
                settings_id::ENABLE_PUSH => {
                    if value > 1 {
                        return Err(H2Error::connection(
                            ErrorCode::ProtocolError,
                            "ENABLE_PUSH must be 0 or 1",
                        ));
                    }
                    delta.enable_push = Some(value == 1);
                }
                settings_id::MAX_CONCURRENT_STREAMS => delta.max_concurrent_streams = Some(value),
                settings_id::INITIAL_WINDOW_SIZE => {
                    if value > MAX_WINDOW_SIZE {
                        return Err(H2Error::connection(
                            ErrorCode::FlowControlError,
                            "initialWindowSize too large",
                        ));
                    }
                    delta.initial_window_size = Some(value);
                }
                settings_id::MAX_FRAME_SIZE => {
                    if !(MIN_MAX_FRAME_SIZE..=MAX_MAX_FRAME_SIZE).contains(&value) {
                        return Err(H2Error::connection(
                            ErrorCode::ProtocolError,
                            "Invalid maxFrameSize",
                        ));
                    }
                    delta.max_frame_size = Some(value);
                }
                settings_id::MAX_HEADER_LIST_SIZE => delta.max_header_list_size = Some(value),
                // Unknown settings MUST be ignored
                _ => {}
            }
        }
        Ok(Self::Update(delta))
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Self::Ack => {
                H2FrameHeader::new(0, FrameType::Settings, flags::ACK, 0).encode(out);
            }
            Self::Update(delta) => {
                let pairs = delta.pairs();
                H2FrameHeader::new((pairs.len() * 6) as u32, FrameType::Settings, 0, 0).encode(out);
                for (id, value) in pairs {
                    out.extend_from_slice(&id.to_be_bytes());
                    out.extend_from_slice(&value.to_be_bytes());
                }
            }
        }
    }
}
