#![no_std]

use core::mem::align_of;
use qoi_core::decode::streaming_no_header::StreamingDecodeContext;
use qoi_core::decode::DecodeContext;
use qoi_core::opcode::OpDecodeError;
use qoi_core::{Channels, DeltaBias, Pixel};

#[panic_handler]
fn panic_handler(_info: &core::panic::PanicInfo) -> ! {
    unsafe { core::hint::unreachable_unchecked() }
}

fn channels_from_byte(b: u8) -> Channels {
    if b == 3 {
        Channels::Rgb
    } else {
        Channels::Rgba
    }
}

fn bias_from_byte(standard: u8) -> DeltaBias {
    if standard == 0 {
        DeltaBias::TwosComplement
    } else {
        DeltaBias::Standard
    }
}

#[repr(C)]
pub struct QoiDecodeContext {
    pub internal: [u8; core::mem::size_of::<DecodeContext>()],
}

const _: () = {
    assert!(align_of::<QoiDecodeContext>() == align_of::<DecodeContext>());
};

/// Initializes a decode context for a fresh image. Must be called before the first
/// [`qoi_decode`] call for that image; zero-filling `context`'s bytes is not equivalent, since
/// the decoder's starting `prev` pixel is `(0, 0, 0, 255)`, not all-zero.
#[no_mangle]
pub unsafe extern "C" fn qoi_decode_init(context: *mut QoiDecodeContext) {
    let context = context.cast::<DecodeContext>();
    unsafe {
        context.write(DecodeContext::new());
    }
}

/// Decodes a QOI opcode stream (without its header) into `output`, an array of packed RGBA8
/// pixels (`output_len` entries, 4 bytes each; in RGB mode the alpha byte is always 255).
///
/// - `context`: pointer to space for the decode context, initialized via [`qoi_decode_init`]
///   before the first call for a fresh image.
/// - `channels`: `3` for RGB-only input, `4` for RGBA.
/// - `standard_bias`: nonzero for the published `+2`/`+32`/`+8` bias scheme, zero for the
///   non-standard raw two's-complement encoding.
/// - `input`/`input_len`: the opcode stream.
/// - `output`/`output_len`: the destination pixel buffer, `output_len` pixels long.
///
/// Returns `0` on success, `-1` on a truncated stream, `-2` on a reserved opcode byte.
///
/// # Safety
///
/// Behavior is undefined if `input` is not a valid QOI opcode stream producing exactly
/// `output_len` pixels, or if `output` has fewer than `output_len` writable 4-byte slots.
#[no_mangle]
pub unsafe extern "C" fn qoi_decode(
    context: *mut QoiDecodeContext,
    channels: u8,
    standard_bias: u8,
    input: *const u8,
    input_len: usize,
    output: *mut Pixel,
    output_len: usize,
) -> isize {
    let input = unsafe { core::slice::from_raw_parts(input, input_len) };
    let output = unsafe { core::slice::from_raw_parts_mut(output, output_len) };
    let context = unsafe { &mut *context.cast::<DecodeContext>() };

    let mut idx = 0usize;
    let mut next = || {
        let b = input.get(idx).copied();
        idx += 1;
        b
    };

    let result = unsafe {
        context.decode_to_slice_unchecked(
            channels_from_byte(channels),
            bias_from_byte(standard_bias),
            &mut next,
            output,
        )
    };

    match result {
        Ok(()) => 0,
        Err(OpDecodeError::UnexpectedEof) => -1,
        Err(OpDecodeError::ReservedOpcode(_)) => -2,
    }
}

#[repr(C)]
pub struct QoiStreamingDecodeContext {
    pub internal: [u8; core::mem::size_of::<StreamingDecodeContext>()],
}

const _: () = {
    assert!(align_of::<QoiStreamingDecodeContext>() == align_of::<StreamingDecodeContext>());
};

/// Decodes a QOI opcode stream (without its header) from `input` into `output`, in a streaming
/// fashion: a multi-byte opcode split across the end of `input` is buffered in `context` and
/// completed on a later call with the same context.
///
/// - `context`: pointer to space for the streaming decode context. Must be initialized once via
///   [`qoi_streaming_decode_init`] before the first call belonging to a given image stream, and
///   not shared between unrelated streams.
/// - `channels`/`standard_bias`: as in [`qoi_decode`].
/// - `input`/`input_len`: the next chunk of opcode stream bytes.
/// - `output`/`output_len`: the destination pixel buffer for this call; must be large enough for
///   every pixel this chunk could produce (up to 62 pixels for a single RUN byte).
///
/// Returns the number of pixels written to `output` by this call.
///
/// # Safety
///
/// Behavior is undefined if the concatenation of all `input` chunks passed across calls sharing
/// `context` is not a valid QOI opcode stream, or if `output` is too small for the pixels this
/// call produces.
#[no_mangle]
pub unsafe extern "C" fn qoi_streaming_decode(
    context: *mut QoiStreamingDecodeContext,
    input: *const u8,
    input_len: usize,
    output: *mut Pixel,
    output_len: usize,
) -> isize {
    let input = unsafe { core::slice::from_raw_parts(input, input_len) };
    let output = unsafe { core::slice::from_raw_parts_mut(output, output_len) };
    let context = unsafe { &mut *context.cast::<StreamingDecodeContext>() };

    unsafe { context.streaming_decode_to_slice_unchecked(input, output) as isize }
}

/// Initializes a streaming decode context for a fresh image stream.
#[no_mangle]
pub unsafe extern "C" fn qoi_streaming_decode_init(
    context: *mut QoiStreamingDecodeContext,
    channels: u8,
    standard_bias: u8,
) {
    let context = context.cast::<StreamingDecodeContext>();
    unsafe {
        context.write(StreamingDecodeContext::new(
            channels_from_byte(channels),
            bias_from_byte(standard_bias),
        ));
    }
}
