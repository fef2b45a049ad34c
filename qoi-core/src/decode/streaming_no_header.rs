//! Chunk-at-a-time decoding of the opcode body, without a header, for callers that supply their
//! own framing and want to feed the decoder input in bounded pieces (e.g. as a network read
//! completes) rather than handing it one contiguous buffer.
//!
//! A partial multi-byte opcode split across the end of a chunk is buffered in `State` and
//! completed on the next call: LUMA needs one continuation byte, RGB needs three, RGBA needs
//! four.

use crate::consts::{QOI_DATA_MASK, QOI_OPCODE_MASK, QOI_OP_DIFF, QOI_OP_INDEX, QOI_OP_LUMA, QOI_OP_RGB, QOI_OP_RGBA, QOI_OP_RUN};
use crate::utils::apply_diff;
use crate::{Channels, Context, DeltaBias};

#[derive(Debug, Clone, Copy)]
enum State {
    Default,
    Luma { dg_raw: u8 },
    Raw { is_rgba: bool, buf: [u8; 4], filled: u8 },
}

#[derive(Debug, Clone)]
pub struct StreamingDecodeContext {
    state: State,
    ctx: Context,
    channels: Channels,
    bias: DeltaBias,
}

impl StreamingDecodeContext {
    pub const fn new(channels: Channels, bias: DeltaBias) -> Self {
        Self { state: State::Default, ctx: Context::new(), channels, bias }
    }

    fn unbias_diff(&self, raw: u8) -> i8 {
        match self.bias {
            DeltaBias::Standard => raw as i8 - 2,
            DeltaBias::TwosComplement => ((raw << 6) as i8) >> 6,
        }
    }

    fn unbias_luma(&self, raw_dg: u8, raw_dr_dg: u8, raw_db_dg: u8) -> (i8, i8, i8) {
        match self.bias {
            DeltaBias::Standard => (raw_dg as i8 - 32, raw_dr_dg as i8 - 8, raw_db_dg as i8 - 8),
            DeltaBias::TwosComplement => (
                ((raw_dg << 2) as i8) >> 2,
                ((raw_dr_dg << 4) as i8) >> 4,
                ((raw_db_dg << 4) as i8) >> 4,
            ),
        }
    }

    /// Decodes as many whole pixels as `input` yields opcodes for, writing them to `output`
    /// starting at index 0. Returns the number of pixels written. A multi-byte opcode split
    /// across the end of `input` is buffered in `self` and completed on a later call.
    ///
    /// # Safety
    ///
    /// This function does not do *any* output bounds checks. The caller must pass an `output`
    /// slice large enough to hold every pixel this call could produce — up to 62 pixels for a
    /// single RUN input byte — and must ensure `input` is a prefix of a valid QOI opcode stream.
    /// Violating either is undefined behavior.
    pub unsafe fn streaming_decode_to_slice_unchecked(
        &mut self,
        input: &[u8],
        output: &mut [crate::Pixel],
    ) -> usize {
        let mut output_idx = 0;
        let mut input_idx = 0;

        macro_rules! next {
            () => {
                if let Some(&b) = input.get(input_idx) {
                    input_idx += 1;
                    b
                } else {
                    return output_idx;
                }
            };
        }

        unsafe fn emit(
            ctx: &mut Context,
            channels: Channels,
            pixel: crate::Pixel,
            output: &mut [crate::Pixel],
            output_idx: &mut usize,
        ) {
            let pixel = channels.normalize(pixel);
            ctx.observe(pixel);
            *output.get_unchecked_mut(*output_idx) = pixel;
            *output_idx += 1;
        }

        loop {
            let byte = next!();

            match self.state {
                State::Default => {
                    if byte == QOI_OP_RGBA {
                        self.state = State::Raw { is_rgba: true, buf: [0; 4], filled: 0 };
                        continue;
                    }
                    if byte == QOI_OP_RGB {
                        self.state = State::Raw { is_rgba: false, buf: [0; 4], filled: 0 };
                        continue;
                    }

                    match byte & QOI_OPCODE_MASK {
                        QOI_OP_INDEX => {
                            let pixel = *self.ctx.index.get_unchecked(usize::from(byte & QOI_DATA_MASK));
                            self.ctx.prev = pixel;
                            *output.get_unchecked_mut(output_idx) = pixel;
                            output_idx += 1;
                            continue;
                        }
                        QOI_OP_DIFF => {
                            let raw = byte & QOI_DATA_MASK;
                            let dr = self.unbias_diff((raw >> 4) & 0x03);
                            let dg = self.unbias_diff((raw >> 2) & 0x03);
                            let db = self.unbias_diff(raw & 0x03);
                            let pixel = crate::Pixel {
                                r: apply_diff(self.ctx.prev.r, dr),
                                g: apply_diff(self.ctx.prev.g, dg),
                                b: apply_diff(self.ctx.prev.b, db),
                                a: self.ctx.prev.a,
                            };
                            emit(&mut self.ctx, self.channels, pixel, output, &mut output_idx);
                            continue;
                        }
                        QOI_OP_LUMA => {
                            self.state = State::Luma { dg_raw: byte & QOI_DATA_MASK };
                            continue;
                        }
                        QOI_OP_RUN => {
                            let count = usize::from((byte & QOI_DATA_MASK) + 1);
                            let pixel = self.ctx.prev;
                            output
                                .get_unchecked_mut(output_idx..)
                                .get_unchecked_mut(..count)
                                .fill(pixel);
                            output_idx += count;
                            continue;
                        }
                        _ => core::hint::unreachable_unchecked(),
                    }
                }
                State::Luma { dg_raw } => {
                    let (dg, dr_dg, db_dg) =
                        self.unbias_luma(dg_raw, (byte >> 4) & 0x0F, byte & 0x0F);
                    let dr = dr_dg.wrapping_add(dg);
                    let db = db_dg.wrapping_add(dg);
                    let pixel = crate::Pixel {
                        r: apply_diff(self.ctx.prev.r, dr),
                        g: apply_diff(self.ctx.prev.g, dg),
                        b: apply_diff(self.ctx.prev.b, db),
                        a: self.ctx.prev.a,
                    };
                    self.state = State::Default;
                    emit(&mut self.ctx, self.channels, pixel, output, &mut output_idx);
                    continue;
                }
                State::Raw { is_rgba, mut buf, filled } => {
                    let needed = if is_rgba { 4 } else { 3 };
                    buf[usize::from(filled)] = byte;
                    let filled = filled + 1;
                    if filled < needed {
                        self.state = State::Raw { is_rgba, buf, filled };
                        continue;
                    }

                    let pixel = crate::Pixel {
                        r: buf[0],
                        g: buf[1],
                        b: buf[2],
                        a: if is_rgba { buf[3] } else { self.ctx.prev.a },
                    };
                    self.state = State::Default;
                    emit(&mut self.ctx, self.channels, pixel, output, &mut output_idx);
                    continue;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pixel;

    fn encode(pixels: &[Pixel]) -> Vec<u8> {
        let mut ctx = crate::encode::EncodeContext::new();
        let mut out = Vec::new();
        ctx.encode_pixels(pixels, Channels::Rgba, None, |op| {
            let (bytes, len) = op.to_bytes(DeltaBias::Standard);
            out.extend_from_slice(&bytes[..len]);
        });
        out
    }

    #[test]
    fn a_multi_byte_opcode_split_across_two_calls_still_decodes() {
        let pixels = vec![Pixel::rgba(100, 100, 100, 255), Pixel::rgba(105, 110, 115, 255)];
        let body = encode(&pixels); // LUMA for the second pixel; first is a standalone RGB/LUMA/etc.
        assert!(body.len() >= 2, "fixture should contain a 2-byte LUMA opcode");

        let mut state = StreamingDecodeContext::new(Channels::Rgba, DeltaBias::Standard);
        let mut output = vec![Pixel::default(); pixels.len()];

        let mut produced = 0;
        for &byte in &body {
            let written = unsafe {
                state.streaming_decode_to_slice_unchecked(
                    core::slice::from_ref(&byte),
                    &mut output[produced..],
                )
            };
            produced += written;
        }
        assert_eq!(produced, pixels.len());
        assert_eq!(output, pixels);
    }

    #[test]
    fn a_run_opcode_expands_to_every_repeated_pixel_in_one_call() {
        let mut pixels = vec![Pixel::rgba(7, 8, 9, 255)];
        pixels.extend(std::iter::repeat(Pixel::rgba(7, 8, 9, 255)).take(10));
        let body = encode(&pixels);

        let mut state = StreamingDecodeContext::new(Channels::Rgba, DeltaBias::Standard);
        let mut output = vec![Pixel::default(); pixels.len()];
        let written = unsafe { state.streaming_decode_to_slice_unchecked(&body, &mut output) };
        assert_eq!(written, pixels.len());
        assert_eq!(output, pixels);
    }

    #[test]
    fn feeding_one_byte_at_a_time_matches_feeding_the_whole_buffer() {
        let pixels: Vec<Pixel> =
            (0..40u8).map(|i| Pixel::rgba(i, i.wrapping_mul(3), i.wrapping_mul(7), 255)).collect();
        let body = encode(&pixels);

        let mut whole_state = StreamingDecodeContext::new(Channels::Rgba, DeltaBias::Standard);
        let mut whole_output = vec![Pixel::default(); pixels.len()];
        unsafe { whole_state.streaming_decode_to_slice_unchecked(&body, &mut whole_output) };

        let mut byte_state = StreamingDecodeContext::new(Channels::Rgba, DeltaBias::Standard);
        let mut byte_output = vec![Pixel::default(); pixels.len()];
        let mut produced = 0;
        for &byte in &body {
            produced += unsafe {
                byte_state.streaming_decode_to_slice_unchecked(
                    core::slice::from_ref(&byte),
                    &mut byte_output[produced..],
                )
            };
        }

        assert_eq!(whole_output, pixels);
        assert_eq!(byte_output, pixels);
    }
}
