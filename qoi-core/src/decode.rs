use crate::opcode::{Op, OpDecodeError};
use crate::utils::apply_diff;
use crate::{Channels, Context, DeltaBias, Pixel};

pub mod streaming_no_header;

#[cfg(feature = "alloc")]
mod alloc_api;
#[cfg(feature = "alloc")]
pub use alloc_api::*;

/// Decoder-side running state: the shared [`Context`] (last pixel, index table).
#[derive(Debug, Clone, Default)]
#[repr(C)]
pub struct DecodeContext {
    pub state: Context,
}

impl DecodeContext {
    pub const fn new() -> Self {
        Self { state: Context::new() }
    }

    fn reconstruct(&mut self, channels: Channels, op: Op) -> Result<Pixel, OpDecodeError> {
        let pixel = match op {
            Op::Diff(dr, dg, db) => channels.normalize(Pixel {
                r: apply_diff(self.state.prev.r, dr),
                g: apply_diff(self.state.prev.g, dg),
                b: apply_diff(self.state.prev.b, db),
                a: self.state.prev.a,
            }),
            Op::Luma(dg, dr_dg, db_dg) => {
                let dr = dr_dg.wrapping_add(dg);
                let db = db_dg.wrapping_add(dg);
                channels.normalize(Pixel {
                    r: apply_diff(self.state.prev.r, dr),
                    g: apply_diff(self.state.prev.g, dg),
                    b: apply_diff(self.state.prev.b, db),
                    a: self.state.prev.a,
                })
            }
            Op::Rgb(r, g, b) => channels.normalize(Pixel { r, g, b, a: self.state.prev.a }),
            Op::Rgba(r, g, b, a) => channels.normalize(Pixel { r, g, b, a }),
            Op::Index(_) | Op::Run(_) => unreachable!("handled by the caller before reconstruct"),
        };
        self.state.observe(pixel);
        Ok(pixel)
    }

    /// Decodes exactly `pixel_count` pixels from the opcode stream supplied by `next`, calling
    /// `emit` once per output pixel (a RUN opcode calls `emit` once per repeated pixel). `next`
    /// is polled for as many bytes as each opcode needs; running out mid-opcode is an error.
    ///
    /// A RUN or INDEX opcode that would overrun `pixel_count` is silently truncated rather than
    /// rejected, matching the reference decoder's behavior of stopping at the declared pixel
    /// count regardless of what the opcode stream asks for.
    pub fn decode_pixels(
        &mut self,
        pixel_count: usize,
        channels: Channels,
        bias: DeltaBias,
        next: &mut impl FnMut() -> Option<u8>,
        mut emit: impl FnMut(Pixel),
    ) -> Result<(), OpDecodeError> {
        let mut produced = 0usize;
        while produced < pixel_count {
            let first = next().ok_or(OpDecodeError::UnexpectedEof)?;
            let op = Op::from_bytes(first, bias, &mut *next)?;

            match op {
                Op::Index(index) => {
                    let pixel = self.state.index[index as usize];
                    self.state.prev = pixel;
                    emit(pixel);
                    produced += 1;
                }
                Op::Run(count) => {
                    let n = (count as usize + 1).min(pixel_count - produced);
                    let pixel = self.state.prev;
                    for _ in 0..n {
                        emit(pixel);
                    }
                    produced += n;
                }
                other => {
                    let pixel = self.reconstruct(channels, other)?;
                    emit(pixel);
                    produced += 1;
                }
            }
        }
        Ok(())
    }

    /// Decodes `out.len()` pixels without bounds-checking output writes or run-length overrun,
    /// mirroring the reference fast path's raw-pointer discipline.
    ///
    /// # Safety
    ///
    /// The caller must guarantee that the opcode stream produced by `next` is valid QOI data
    /// encoding exactly `out.len()` pixels. A RUN whose count would exceed `out.len()`, or a
    /// truncated multi-byte opcode, is undefined behavior here (unlike the checked
    /// [`Self::decode_pixels`], which truncates/errors instead).
    pub unsafe fn decode_to_slice_unchecked(
        &mut self,
        channels: Channels,
        bias: DeltaBias,
        next: &mut impl FnMut() -> Option<u8>,
        out: &mut [Pixel],
    ) -> Result<(), OpDecodeError> {
        let mut produced = 0usize;
        let len = out.len();
        while produced < len {
            let first = next().ok_or(OpDecodeError::UnexpectedEof)?;
            let op = Op::from_bytes(first, bias, &mut *next)?;

            match op {
                Op::Index(index) => {
                    let pixel = *self.state.index.get_unchecked(index as usize);
                    self.state.prev = pixel;
                    *out.get_unchecked_mut(produced) = pixel;
                    produced += 1;
                }
                Op::Run(count) => {
                    let n = count as usize + 1;
                    let pixel = self.state.prev;
                    out.get_unchecked_mut(produced..)
                        .get_unchecked_mut(..n)
                        .fill(pixel);
                    produced += n;
                }
                other => {
                    let pixel = self.reconstruct(channels, other)?;
                    *out.get_unchecked_mut(produced) = pixel;
                    produced += 1;
                }
            }
        }
        Ok(())
    }
}
