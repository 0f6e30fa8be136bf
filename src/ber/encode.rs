//! BER encoding.
//!
//! Writes back to front so constructed types never need their content length
//! up front: content first, then length, then tag.

use super::length::encode_length;
use super::tag;
use crate::oid::Oid;
use bytes::Bytes;

/// Reverse-order BER output buffer.
pub struct EncodeBuf {
    buf: Vec<u8>,
}

impl EncodeBuf {
    /// Create a new encode buffer.
    ///
    /// SNMPv1 relay requests are well under 128 bytes.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(128),
        }
    }

    /// Prepend bytes that are given in forward order.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend(bytes.iter().rev());
    }

    /// Prepend a BER length.
    pub fn push_length(&mut self, len: usize) {
        let (bytes, count) = encode_length(len);
        self.buf.extend_from_slice(&bytes[..count]);
    }

    /// Prepend a tag byte.
    pub fn push_tag(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Encode a constructed type.
    ///
    /// The closure writes the contents; remember that fields must be pushed
    /// last-to-first.
    pub fn push_constructed<F>(&mut self, tag: u8, f: F)
    where
        F: FnOnce(&mut Self),
    {
        let start_len = self.len();
        f(self);
        let content_len = self.len() - start_len;
        self.push_length(content_len);
        self.push_tag(tag);
    }

    /// Encode a SEQUENCE.
    pub fn push_sequence<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push_constructed(tag::universal::SEQUENCE, f);
    }

    /// Encode an INTEGER.
    pub fn push_integer(&mut self, value: i32) {
        let bytes = value.to_be_bytes();
        let start = minimal_integer_start(&bytes);
        self.push_primitive(tag::universal::INTEGER, &bytes[start..]);
    }

    /// Encode an unsigned 32-bit value (Counter32, Gauge32, TimeTicks).
    pub fn push_unsigned32(&mut self, tag: u8, value: u32) {
        let mut bytes = [0u8; 5];
        bytes[1..].copy_from_slice(&value.to_be_bytes());
        let start = minimal_integer_start(&bytes);
        self.push_primitive(tag, &bytes[start..]);
    }

    /// Encode an OCTET STRING.
    pub fn push_octet_string(&mut self, data: &[u8]) {
        self.push_primitive(tag::universal::OCTET_STRING, data);
    }

    /// Encode a NULL.
    pub fn push_null(&mut self) {
        self.push_primitive(tag::universal::NULL, &[]);
    }

    /// Encode an OBJECT IDENTIFIER.
    pub fn push_oid(&mut self, oid: &Oid) {
        self.push_primitive(tag::universal::OBJECT_IDENTIFIER, &oid.to_ber_smallvec());
    }

    /// Encode an IpAddress.
    pub fn push_ip_address(&mut self, addr: [u8; 4]) {
        self.push_primitive(tag::application::IP_ADDRESS, &addr);
    }

    /// Encode a primitive TLV.
    pub fn push_primitive(&mut self, tag: u8, content: &[u8]) {
        self.push_bytes(content);
        self.push_length(content.len());
        self.push_tag(tag);
    }

    /// Finalize and return the encoded bytes in wire order.
    pub fn finish(mut self) -> Bytes {
        self.buf.reverse();
        Bytes::from(self.buf)
    }
}

impl Default for EncodeBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the first byte of the minimal two's-complement form.
///
/// Drops leading 0x00 (or 0xFF) bytes as long as the next byte keeps the sign.
fn minimal_integer_start(bytes: &[u8]) -> usize {
    let mut start = 0;
    while start + 1 < bytes.len() {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(f: impl FnOnce(&mut EncodeBuf)) -> Vec<u8> {
        let mut buf = EncodeBuf::new();
        f(&mut buf);
        buf.finish().to_vec()
    }

    #[test]
    fn test_encode_integer() {
        assert_eq!(encoded(|b| b.push_integer(0)), vec![0x02, 0x01, 0x00]);
        assert_eq!(encoded(|b| b.push_integer(127)), vec![0x02, 0x01, 0x7F]);
        assert_eq!(encoded(|b| b.push_integer(128)), vec![0x02, 0x02, 0x00, 0x80]);
        assert_eq!(encoded(|b| b.push_integer(255)), vec![0x02, 0x02, 0x00, 0xFF]);
        assert_eq!(encoded(|b| b.push_integer(-1)), vec![0x02, 0x01, 0xFF]);
        assert_eq!(encoded(|b| b.push_integer(-129)), vec![0x02, 0x02, 0xFF, 0x7F]);
    }

    #[test]
    fn test_encode_unsigned32() {
        let t = tag::application::GAUGE32;
        assert_eq!(encoded(|b| b.push_unsigned32(t, 0)), vec![t, 0x01, 0x00]);
        assert_eq!(encoded(|b| b.push_unsigned32(t, 128)), vec![t, 0x02, 0x00, 0x80]);
        assert_eq!(
            encoded(|b| b.push_unsigned32(t, u32::MAX)),
            vec![t, 0x05, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_encode_null() {
        assert_eq!(encoded(|b| b.push_null()), vec![0x05, 0x00]);
    }

    #[test]
    fn test_encode_sequence() {
        // Reverse buffer: push in reverse order for forward output
        let bytes = encoded(|b| {
            b.push_sequence(|b| {
                b.push_integer(2);
                b.push_integer(1);
            })
        });
        assert_eq!(bytes, vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]);
    }

    #[test]
    fn test_encode_octet_string() {
        assert_eq!(
            encoded(|b| b.push_octet_string(b"public")),
            vec![0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c']
        );
    }
}
