//! SNMPv1 community message.
//!
//! `SEQUENCE { version INTEGER (0), community OCTET STRING, pdu PDU }`

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{Result, TransportError};
use crate::pdu::Pdu;
use bytes::Bytes;

/// BER-encoded version number of SNMPv1.
pub const SNMP_V1: i32 = 0;

/// SNMPv1 message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityMessage {
    /// Community string for authentication
    pub community: Bytes,
    pub pdu: Pdu,
}

impl CommunityMessage {
    /// Create a new SNMPv1 message.
    pub fn new(community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self {
            community: community.into(),
            pdu,
        }
    }

    /// Encode to BER.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();

        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.community);
            buf.push_integer(SNMP_V1);
        });

        buf.finish()
    }

    /// Decode from BER.
    ///
    /// Messages of any other SNMP version are rejected with
    /// [`TransportError::VersionMismatch`].
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;

        let version = seq.read_integer()?;
        if version != SNMP_V1 {
            tracing::debug!(target: "daenet::ber", { version }, "not an SNMPv1 message");
            return Err(TransportError::VersionMismatch { actual: version }.into());
        }

        let community = seq.read_octet_string()?;
        let pdu = Pdu::decode(&mut seq)?;

        Ok(CommunityMessage { community, pdu })
    }

    /// Consume and return the PDU.
    pub fn into_pdu(self) -> Pdu {
        self.pdu
    }
}
