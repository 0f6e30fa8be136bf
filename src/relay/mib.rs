//! DAEnetIP2 object identifiers for the P5 relay port.
//!
//! `1.3.6.1.4.1.19865` vendor root, `.1.2` DAEnetIP2 I/O, `.2` P5, then
//! `.<leaf>.0`.

use super::register::Pin;
use crate::oid;
use crate::oid::Oid;

/// Enterprise number assigned to Denkovi Assembly Electronics.
pub const ENTERPRISE: u32 = 19865;

/// Leaf holding the whole P5 register.
pub const REGISTER_LEAF: u32 = 33;

/// `1.3.6.1.4.1.19865`
pub fn vendor_root() -> Oid {
    oid!(1, 3, 6, 1, 4, 1, ENTERPRISE)
}

/// `1.3.6.1.4.1.19865.1.2.2`
pub fn p5_root() -> Oid {
    vendor_root().child(1).child(2).child(2)
}

/// `1.3.6.1.4.1.19865.1.2.2.33.0`
pub fn register_oid() -> Oid {
    p5_root().child(REGISTER_LEAF).child(0)
}

/// `1.3.6.1.4.1.19865.1.2.2.<pin>.0`
pub fn pin_oid(pin: Pin) -> Oid {
    p5_root().child(pin.number() as u32).child(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_oid() {
        assert_eq!(register_oid().to_string(), "1.3.6.1.4.1.19865.1.2.2.33.0");
    }

    #[test]
    fn test_pin_oids() {
        let oids: Vec<String> = Pin::all().map(|p| pin_oid(p).to_string()).collect();
        assert_eq!(oids[0], "1.3.6.1.4.1.19865.1.2.2.1.0");
        assert_eq!(oids[7], "1.3.6.1.4.1.19865.1.2.2.8.0");
        assert!(Pin::all().all(|p| pin_oid(p).starts_with(&p5_root())));
    }
}
