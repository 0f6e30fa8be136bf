#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use daenet::message::CommunityMessage;
use daenet::pdu::Pdu;
use daenet::relay::register;

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    if let Ok(msg) = CommunityMessage::decode(bytes.clone()) {
        // Anything that decodes must re-encode and decode to the same message
        let again = CommunityMessage::decode(msg.encode()).expect("re-encoded message decodes");
        assert_eq!(again, msg);

        for vb in &msg.pdu.varbinds {
            if let Some(r) = vb.value.as_i32() {
                let _ = register::decode(r);
            }
        }
    }

    let mut decoder = daenet::ber::Decoder::new(bytes);
    let _ = Pdu::decode(&mut decoder);
});
