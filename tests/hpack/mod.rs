//! Integration tests for HPACK

mod interop;
