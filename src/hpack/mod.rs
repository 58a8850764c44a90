//! HPACK: Header Compression for HTTP/2 (RFC 7541)
//!
//! Field blocks are decoded and encoded against a per-connection
//! [`HpackTable`]. Decoding enforces the URI and header list budgets;
//! encoding never grows the peer's dynamic table.

pub mod decoder;
pub mod encoder;
pub mod field;
pub mod huffman;
pub mod integer;
pub mod table;

pub use decoder::FieldBlockDecoder;
pub use encoder::FieldBlockEncoder;
pub use field::{FieldBlock, FieldLine, HeaderKind, HeaderString, KnownName};
pub use table::{HpackTable, MAX_NEVER_INDEX_SIZE, STATIC_TABLE_LEN};
