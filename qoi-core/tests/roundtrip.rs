//! Cross-checks every public entry point (alloc `Vec` API, `std::io::Write`-based API, the
//! unchecked fast path, and the chunked streaming-without-header path) against the same set of
//! synthetic images, so that disagreement between any two entry points on the same input is
//! caught immediately. No image fixtures ship with this crate, so the images here are generated
//! in-memory rather than read from a `test_images/` directory.

use qoi_core::decode::streaming_no_header::StreamingDecodeContext;
use qoi_core::decode::DecodeContext;
use qoi_core::encode::EncodeContext;
use qoi_core::{Channels, DeltaBias, Pixel};

struct Image {
    name: &'static str,
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

fn gradient_rgba(width: u32, height: u32) -> Vec<Pixel> {
    (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                Pixel::rgba((x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255)
            })
        })
        .collect()
}

fn solid_with_stripe(width: u32, height: u32) -> Vec<Pixel> {
    (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                if x % 17 == 0 {
                    Pixel::rgba(10, 200, 30, 128)
                } else {
                    Pixel::rgba(10, 200, 30, 255)
                }
            })
        })
        .collect()
}

fn pseudo_random_rgba(width: u32, height: u32) -> Vec<Pixel> {
    let mut state = 0x1234_5678u32;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };
    (0..(width * height))
        .map(|_| {
            let v = next();
            Pixel::rgba(
                (v & 0xFF) as u8,
                ((v >> 8) & 0xFF) as u8,
                ((v >> 16) & 0xFF) as u8,
                ((v >> 24) & 0xFF) as u8,
            )
        })
        .collect()
}

fn test_images() -> Vec<Image> {
    vec![
        Image { name: "1x1", width: 1, height: 1, pixels: vec![Pixel::rgba(10, 20, 30, 255)] },
        Image { name: "gradient", width: 37, height: 29, pixels: gradient_rgba(37, 29) },
        Image {
            name: "solid_with_stripe",
            width: 64,
            height: 64,
            pixels: solid_with_stripe(64, 64),
        },
        Image { name: "noise", width: 33, height: 17, pixels: pseudo_random_rgba(33, 17) },
    ]
}

#[test]
fn roundtrip_all_entry_points() {
    for image in test_images() {
        let Image { name, width, height, pixels } = image;
        let channels = Channels::Rgba;
        let bias = DeltaBias::Standard;
        let pixel_count = pixels.len();

        let mut via_alloc_api = Vec::with_capacity(pixel_count * 5);
        assert!(
            qoi_core::alloc_api::encode_to_vec(width, height, &pixels, channels, bias, &mut via_alloc_api),
            "{name}: encode_to_vec rejected valid dimensions"
        );

        let mut via_writer = Vec::with_capacity(pixel_count * 5);
        EncodeContext::encode(width, height, &pixels, channels, bias, &mut via_writer)
            .unwrap_or_else(|e| panic!("{name}: writer-based encode failed: {e}"));

        assert_eq!(via_alloc_api, via_writer, "{name}: the two encoders disagree on output bytes");

        let encoded = via_alloc_api;

        let mut safe_decoded = Vec::with_capacity(pixel_count);
        let header = DecodeContext::decode_to_vec(&encoded, bias, &mut safe_decoded)
            .unwrap_or_else(|e| panic!("{name}: safe decode failed: {e:?}"));
        assert_eq!(header.width, width);
        assert_eq!(header.height, height);
        assert_eq!(pixels, safe_decoded, "{name}: safe decoding round-trip mismatch");

        let mut unsafe_decoded = vec![Pixel::default(); pixel_count];
        let body = &encoded[14..encoded.len() - 8];
        let mut bytes = body.iter().copied();
        unsafe {
            DecodeContext::new()
                .decode_to_slice_unchecked(
                    channels,
                    bias,
                    &mut || bytes.next(),
                    &mut unsafe_decoded,
                )
                .unwrap_or_else(|e| panic!("{name}: unsafe decode failed: {e:?}"));
        }
        assert_eq!(pixels, unsafe_decoded, "{name}: unsafe decoding round-trip mismatch");

        let mut streaming_decoded = vec![Pixel::default(); pixel_count];
        let mut state = StreamingDecodeContext::new(channels, bias);
        let mut remaining = &mut streaming_decoded[..];
        for chunk in body.chunks(7) {
            let written = unsafe { state.streaming_decode_to_slice_unchecked(chunk, remaining) };
            remaining = &mut remaining[written..];
        }
        assert_eq!(pixels, streaming_decoded, "{name}: streaming decoding round-trip mismatch");
    }
}

#[test]
fn roundtrip_rgb_only_forces_opaque_alpha() {
    let pixels = vec![
        Pixel::rgba(1, 2, 3, 0),
        Pixel::rgba(1, 2, 3, 0),
        Pixel::rgba(200, 0, 0, 128),
    ];
    let mut encoded = Vec::new();
    assert!(qoi_core::alloc_api::encode_to_vec(
        3,
        1,
        &pixels,
        Channels::Rgb,
        DeltaBias::Standard,
        &mut encoded
    ));

    let mut decoded = Vec::new();
    let header = DecodeContext::decode_to_vec(&encoded, DeltaBias::Standard, &mut decoded).unwrap();
    assert_eq!(header.channels, Channels::Rgb);
    assert!(decoded.iter().all(|p| p.a == 255));
    assert_eq!(decoded[0], Pixel::rgb(1, 2, 3));
    assert_eq!(decoded[2], Pixel::rgb(200, 0, 0));
}

#[test]
fn roundtrip_twos_complement_bias() {
    let pixels = gradient_rgba(19, 11);
    let mut standard = Vec::new();
    let mut twos_complement = Vec::new();
    assert!(qoi_core::alloc_api::encode_to_vec(
        19,
        11,
        &pixels,
        Channels::Rgba,
        DeltaBias::Standard,
        &mut standard
    ));
    assert!(qoi_core::alloc_api::encode_to_vec(
        19,
        11,
        &pixels,
        Channels::Rgba,
        DeltaBias::TwosComplement,
        &mut twos_complement
    ));

    // Same opcode selection either way; only the DIFF/LUMA payload bits differ.
    assert_eq!(standard.len(), twos_complement.len());

    let mut decoded_standard = Vec::new();
    DecodeContext::decode_to_vec(&standard, DeltaBias::Standard, &mut decoded_standard).unwrap();
    let mut decoded_twos_complement = Vec::new();
    DecodeContext::decode_to_vec(&twos_complement, DeltaBias::TwosComplement, &mut decoded_twos_complement)
        .unwrap();

    assert_eq!(pixels, decoded_standard);
    assert_eq!(pixels, decoded_twos_complement);
    // Decoding a two's-complement stream with the standard bias (or vice versa) must not be
    // assumed to match; the two encodings are wire-incompatible by design.
}
