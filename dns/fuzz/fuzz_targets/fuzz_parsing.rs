#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate dns;
use dns::Message;

fuzz_target!(|data: &[u8]| {
    let _ = Message::from_bytes(data);
});
