//! Cross-checks against the fluke-hpack implementation

use h2_engine::hpack::FieldLine;
use h2_engine::{FieldBlock, FieldBlockDecoder, FieldBlockEncoder};

fn request(path: &str) -> Vec<(Vec<u8>, Vec<u8>)> {
    vec![
        (b":method".to_vec(), b"GET".to_vec()),
        (b":scheme".to_vec(), b"https".to_vec()),
        (b":path".to_vec(), path.as_bytes().to_vec()),
        (b":authority".to_vec(), b"example.com".to_vec()),
        (b"user-agent".to_vec(), b"interop/1.0".to_vec()),
        (b"x-request-id".to_vec(), path.len().to_string().into_bytes()),
    ]
}

fn to_block(pairs: &[(Vec<u8>, Vec<u8>)]) -> FieldBlock {
    pairs.iter().map(|(n, v)| FieldLine::new(n, v)).collect()
}

#[test]
fn test_fluke_encoded_blocks_decode() {
    let mut theirs = fluke_hpack::Encoder::new();
    let mut ours = FieldBlockDecoder::new(4096, 8175, 8192);

    // several blocks so their dynamic table entries get referenced
    for path in ["/", "/a", "/a/b/c", "/"] {
        let pairs = request(path);
        let encoded = theirs.encode(pairs.iter().map(|(n, v)| (&n[..], &v[..])));
        let decoded = ours.decode(1, &encoded).unwrap();
        assert_eq!(decoded, to_block(&pairs));
    }
}

#[test]
fn test_our_blocks_decode_with_fluke() {
    let mut ours = FieldBlockEncoder::new(4096).with_huffman(true);
    let mut theirs = fluke_hpack::Decoder::new();

    for path in ["/", "/search?q=hpack", "/"] {
        let pairs = request(path);
        let mut encoded = Vec::new();
        ours.encode(&to_block(&pairs), &mut encoded);
        let decoded = theirs.decode(&encoded).unwrap();
        assert_eq!(decoded, pairs);
    }
}
