#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Whole response bodies
    let _ = spotsync::feed::decode_response(data);

    // Bare timestamps, round-tripped through the store key when they parse
    if let Ok(raw) = std::str::from_utf8(data)
        && let Ok(t) = spotsync::time_window::parse_feed_time(raw)
    {
        let key = spotsync::time_window::store_key(t);
        let _ = spotsync::time_window::parse_store_key(&key);
    }
});
