#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoded headers must re-encode to the exact input bytes
    let Ok((file, info)) = bmpgray::bmp::decode_headers(data) else {
        return;
    };
    let encoded = bmpgray::bmp::encode(&file, &info);
    assert_eq!(&encoded[..], &data[..54], "header roundtrip mismatch");

    if bmpgray::bmp::validate(&info).is_ok() {
        let _ = bmpgray::bmp::derive_output_headers(&file, &info);
    }
});
