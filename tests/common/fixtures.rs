//! Common test fixtures and constants.

use daenet::{Oid, oid};

/// Community the fake device accepts for reads and writes.
pub const COMMUNITY: &[u8] = b"private";

/// `1.3.6.1.4.1.19865.1.2.2.33.0`
pub fn register_oid() -> Oid {
    oid!(1, 3, 6, 1, 4, 1, 19865, 1, 2, 2, 33, 0)
}

/// `1.3.6.1.4.1.19865.1.2.2.<pin>.0`
pub fn pin_oid(pin: u32) -> Oid {
    oid!(1, 3, 6, 1, 4, 1, 19865, 1, 2, 2, pin, 0)
}

/// An OID the device does not implement (P6 subtree).
pub fn unsupported_oid() -> Oid {
    oid!(1, 3, 6, 1, 4, 1, 19865, 1, 2, 3, 1, 0)
}
