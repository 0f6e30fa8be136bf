#![no_main]

use libfuzzer_sys::fuzz_target;

use daenet::RelayBankState;
use daenet::oid::Oid;

fuzz_target!(|data: &[u8]| {
    let _ = Oid::from_ber(data);

    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(oid) = Oid::parse(s) {
            let _ = oid.to_ber_smallvec();
        }

        if let Ok(state) = s.parse::<RelayBankState>() {
            assert_eq!(state.to_string().parse::<RelayBankState>().ok(), Some(state));
        }
    }
});
