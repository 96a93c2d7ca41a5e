#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Must never panic; anything that converts must be self-consistent
    let Ok(out) = bmpgray::convert_bytes(data, enough::Unstoppable) else {
        return;
    };

    let (file, info) = bmpgray::bmp::decode_headers(&out).expect("output headers must decode");
    assert_eq!(file.bitmap_offset, 54);
    assert_eq!(file.total_size as usize, out.len());
    assert_eq!(u64::from(info.bitmap_size), info.expected_bitmap_size());
    assert!(bmpgray::bmp::validate(&info).is_ok());

    for px in out[54..].chunks_exact(3) {
        assert!(px[0] == px[1] && px[1] == px[2], "output pixel is not gray");
    }
});
