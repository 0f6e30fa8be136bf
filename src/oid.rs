//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>`; every DAEnetIP2 object fits
//! inline without a heap allocation.

use crate::error::{DecodeErrorKind, Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of arcs (subidentifiers) accepted when decoding.
///
/// RFC 1155 Section 3.2.3.2 caps OIDs at 128 sub-identifiers.
pub const MAX_OID_LEN: usize = 128;

/// Object Identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from a slice of arcs.
    ///
    /// ```
    /// use daenet::oid::Oid;
    ///
    /// let oid = Oid::from_slice(&[1, 3, 6, 1, 4, 1, 19865]);
    /// assert_eq!(oid.to_string(), "1.3.6.1.4.1.19865");
    /// ```
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted notation (e.g. "1.3.6.1.4.1.19865.1.2.2.33.0").
    ///
    /// A single leading dot is accepted, as net-snmp tools print one.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.strip_prefix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Err(Error::invalid_oid(OidErrorKind::Empty, s));
        }

        let arcs = trimmed
            .split('.')
            .map(|part| part.parse::<u32>())
            .collect::<std::result::Result<SmallVec<[u32; 16]>, _>>()
            .map_err(|_| Error::invalid_oid(OidErrorKind::InvalidArc, s))?;

        let oid = Self { arcs };
        oid.validate()?;
        Ok(oid)
    }

    /// Check that the first two arcs can be BER encoded.
    ///
    /// X.690 limits the first arc to 0..=2, and the second to 0..=39 below
    /// arc 2. Under arc 2 the combined subidentifier must fit in a `u32`.
    pub fn validate(&self) -> Result<()> {
        let valid = match self.arcs.as_slice() {
            [] => true,
            [first] => *first <= 2,
            [0 | 1, second, ..] => *second < 40,
            [2, second, ..] => *second <= u32::MAX - 80,
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            Err(Error::invalid_oid(OidErrorKind::InvalidArc, self.to_string()))
        }
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Get the number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check if this OID starts with `other`.
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.arcs.starts_with(&other.arcs)
    }

    /// Return a new OID with `arc` appended.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid { arcs }
    }

    /// Encode the OID body (without tag and length).
    ///
    /// The first two arcs share one subidentifier (`arc1 * 40 + arc2`).
    /// Arcs that fail [`validate`](Self::validate) saturate instead of
    /// overflowing.
    pub fn to_ber_smallvec(&self) -> SmallVec<[u8; 64]> {
        let mut bytes = SmallVec::new();

        match self.arcs.as_slice() {
            [] => {}
            [first] => encode_subidentifier(&mut bytes, first.saturating_mul(40)),
            [first, second, rest @ ..] => {
                let subid = first.saturating_mul(40).saturating_add(*second);
                encode_subidentifier(&mut bytes, subid);
                for &arc in rest {
                    encode_subidentifier(&mut bytes, arc);
                }
            }
        }

        bytes
    }

    /// Decode an OID body.
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::empty());
        }

        let mut arcs = SmallVec::new();

        let (first_subid, mut i) = decode_subidentifier(data, 0)?;
        match first_subid {
            0..40 => arcs.extend([0, first_subid]),
            40..80 => arcs.extend([1, first_subid - 40]),
            _ => arcs.extend([2, first_subid - 80]),
        }

        while i < data.len() {
            let (arc, next) = decode_subidentifier(data, i)?;
            arcs.push(arc);
            i = next;

            if arcs.len() > MAX_OID_LEN {
                return Err(Error::decode(
                    i,
                    DecodeErrorKind::OidTooLong {
                        count: arcs.len(),
                        max: MAX_OID_LEN,
                    },
                ));
            }
        }

        Ok(Self { arcs })
    }
}

/// Append a base-128 subidentifier.
fn encode_subidentifier(bytes: &mut SmallVec<[u8; 64]>, value: u32) {
    let groups = (32 - value.leading_zeros()).div_ceil(7).max(1);
    for i in (0..groups).rev() {
        let mut byte = ((value >> (i * 7)) & 0x7F) as u8;
        if i > 0 {
            byte |= 0x80;
        }
        bytes.push(byte);
    }
}

/// Decode a subidentifier starting at `start`, returning (value, next offset).
fn decode_subidentifier(data: &[u8], start: usize) -> Result<(u32, usize)> {
    let mut value: u32 = 0;
    let mut i = start;

    loop {
        let Some(&byte) = data.get(i) else {
            return Err(Error::decode(i, DecodeErrorKind::TruncatedData));
        };
        i += 1;

        if value > (u32::MAX >> 7) {
            return Err(Error::decode(i, DecodeErrorKind::IntegerOverflow));
        }
        value = (value << 7) | (byte & 0x7F) as u32;

        if byte & 0x80 == 0 {
            return Ok((value, i));
        }
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.arcs.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::from_slice(&arcs)
    }
}

/// Build an [`Oid`] from literal arcs.
///
/// ```
/// use daenet::oid;
///
/// let register = oid!(1, 3, 6, 1, 4, 1, 19865, 1, 2, 2, 33, 0);
/// assert_eq!(register.len(), 12);
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let oid = Oid::parse("1.3.6.1.4.1.19865.1.2.2.33.0").unwrap();
        assert_eq!(oid.arcs(), &[1, 3, 6, 1, 4, 1, 19865, 1, 2, 2, 33, 0]);

        let leading_dot = Oid::parse(".1.3.6.1").unwrap();
        assert_eq!(leading_dot, oid!(1, 3, 6, 1));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Oid::parse("").is_err());
        assert!(Oid::parse("1.3..6").is_err());
        assert!(Oid::parse("1.3.x").is_err());
        assert!(Oid::parse("1.3.99999999999").is_err());
    }

    #[test]
    fn test_parse_rejects_unencodable_first_arcs() {
        for input in ["4294967295.1", "3.1", "3", "1.40", "0.4294967295", "2.4294967295"] {
            let err = Oid::parse(input).unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::InvalidArgument(crate::error::InvalidArgument::Oid {
                        kind: OidErrorKind::InvalidArc,
                        ..
                    })
                ),
                "{input}: {err:?}"
            );
        }
        assert!(Oid::parse("2.999.3").is_ok());
        assert!(Oid::parse("0.39").is_ok());
    }

    #[test]
    fn test_unvalidated_arcs_encode_without_overflow() {
        let oid = Oid::from_slice(&[u32::MAX, 1]);
        assert!(oid.validate().is_err());
        assert!(!oid.to_ber_smallvec().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(oid!(1, 3, 6, 1, 4, 1, 19865).to_string(), "1.3.6.1.4.1.19865");
    }

    #[test]
    fn test_child_and_starts_with() {
        let p5 = oid!(1, 3, 6, 1, 4, 1, 19865, 1, 2, 2);
        let pin3 = p5.child(3).child(0);
        assert_eq!(pin3.to_string(), "1.3.6.1.4.1.19865.1.2.2.3.0");
        assert!(pin3.starts_with(&p5));
        assert!(!p5.starts_with(&pin3));
    }

    #[test]
    fn test_ber_encoding() {
        // 19865 = 0x4D99 -> 0x81 0x9B 0x19
        let oid = oid!(1, 3, 6, 1, 4, 1, 19865);
        assert_eq!(
            oid.to_ber_smallvec().as_slice(),
            &[0x2B, 0x06, 0x01, 0x04, 0x01, 0x81, 0x9B, 0x19]
        );
    }

    #[test]
    fn test_ber_decoding() {
        let oid = Oid::from_ber(&[0x2B, 0x06, 0x01, 0x04, 0x01, 0x81, 0x9B, 0x19]).unwrap();
        assert_eq!(oid, oid!(1, 3, 6, 1, 4, 1, 19865));
    }

    #[test]
    fn test_ber_truncated_subidentifier() {
        assert!(Oid::from_ber(&[0x2B, 0x81]).is_err());
    }

    #[test]
    fn test_from_ber_enforces_max_len() {
        let mut data = vec![0x2B];
        data.extend(std::iter::repeat_n(0x01, MAX_OID_LEN));
        assert!(Oid::from_ber(&data).is_err());
    }
}
