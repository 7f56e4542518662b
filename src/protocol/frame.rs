//! Frame encoding for the sign protocol.
//!
//! Every checksummed command is wrapped in an address frame:
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬──────┐
//! │ <ID{addr:02x}> │    body      │ checksum     │ <E>  │
//! │   6 bytes    │  n bytes     │ 2 hex digits │      │
//! └──────────────┴──────────────┴──────────────┴──────┘
//! ```
//!
//! The checksum covers the body only.

use bytes::{BufMut, Bytes, BytesMut};

/// Reply the sign sends after accepting a framed command.
pub const ACK: &str = "ACK";

/// Frame terminator.
pub const FRAME_END: &[u8] = b"<E>";

/// Length of the address prefix `<IDxx>`.
pub const ADDRESS_PREFIX_LEN: usize = 6;

/// Address that every sign on the bus listens to. Signs never reply to it.
pub const BROADCAST_ADDRESS: u8 = 0x00;

/// Computes the checksum of a command body.
///
/// All bytes are XOR-ed together and the result is rendered as two
/// upper-case hex digits.
#[must_use]
pub fn checksum(body: &[u8]) -> [u8; 2] {
    let sum = body.iter().fold(0u8, |acc, b| acc ^ b);
    let digits = hex::encode_upper([sum]);
    let digits = digits.as_bytes();
    [digits[0], digits[1]]
}

/// Wraps a command body in the address frame.
#[must_use]
pub fn encode(address: u8, body: &[u8]) -> Bytes {
    let mut buf =
        BytesMut::with_capacity(ADDRESS_PREFIX_LEN + body.len() + 2 + FRAME_END.len());
    buf.put_slice(format!("<ID{address:02x}>").as_bytes());
    buf.put_slice(body);
    buf.put_slice(&checksum(body));
    buf.put_slice(FRAME_END);
    buf.freeze()
}

/// Passes a body through unframed, for the few commands sent standalone.
#[must_use]
pub fn encode_raw(body: &[u8]) -> Bytes {
    Bytes::copy_from_slice(body)
}

/// Renders wire bytes as colon-separated hex for diagnostics.
#[must_use]
pub fn hex_dump(data: &[u8]) -> String {
    data.iter()
        .map(|b| hex::encode([*b]))
        .collect::<Vec<_>>()
        .join(":")
}
