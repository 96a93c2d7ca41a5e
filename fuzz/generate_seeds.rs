#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn bmp(width: u32, height: u32, depth: u16, compression: u32, pixels: &[u8]) -> Vec<u8> {
    let size = 3 * width * height;
    let mut bmp = vec![0u8; 54];
    bmp[0] = b'B'; bmp[1] = b'M';
    bmp[2..6].copy_from_slice(&(54 + size).to_le_bytes()); // file size
    bmp[10..14].copy_from_slice(&54u32.to_le_bytes()); // data offset
    bmp[14..18].copy_from_slice(&40u32.to_le_bytes()); // DIB header size
    bmp[18..22].copy_from_slice(&width.to_le_bytes());
    bmp[22..26].copy_from_slice(&height.to_le_bytes());
    bmp[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    bmp[28..30].copy_from_slice(&depth.to_le_bytes());
    bmp[30..34].copy_from_slice(&compression.to_le_bytes());
    bmp[34..38].copy_from_slice(&size.to_le_bytes()); // bitmap size
    bmp.extend_from_slice(pixels);
    bmp
}

fn main() {
    use std::fs;
    for target in ["fuzz_convert", "fuzz_headers"] {
        let dir = format!("fuzz/corpus/{target}");
        fs::create_dir_all(&dir).unwrap();

        fs::write(format!("{dir}/bmp_1x1.bmp"), bmp(1, 1, 24, 0, &[0xff, 0x00, 0x00])).unwrap();
        fs::write(
            format!("{dir}/bmp_2x2.bmp"),
            bmp(2, 2, 24, 0, &[0, 0, 255, 0, 255, 0, 255, 0, 0, 10, 20, 30]),
        )
        .unwrap();
        fs::write(format!("{dir}/bmp_8bit.bmp"), bmp(2, 2, 8, 0, &[0; 12])).unwrap();
        fs::write(format!("{dir}/bmp_rle8.bmp"), bmp(2, 2, 24, 1, &[0; 12])).unwrap();
        fs::write(format!("{dir}/bmp_truncated.bmp"), bmp(4, 4, 24, 0, &[0; 20])).unwrap();

        // Truncated/malformed seeds for edge coverage
        fs::write(format!("{dir}/empty.bin"), b"").unwrap();
        fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();
        fs::write(format!("{dir}/xx_magic.bin"), b"XX").unwrap();
    }

    println!("Generated seed corpus in fuzz/corpus/");
}
