use crate::consts::QOI_MAX_RUN;
use crate::opcode::Op;
use crate::stats::Stats;
use crate::utils::{channel_diff, diff_in_range, hash, luma_in_range};
use crate::{Channels, Context, Pixel};

#[cfg(feature = "std")]
mod std_api;
#[cfg(feature = "std")]
pub use std_api::*;

/// Encoder-side running state: the shared [`Context`] (last pixel, index table) plus nothing
/// else — the run accumulator needs no persistent field because [`EncodeContext::encode_pixels`]
/// consumes an entire run of identical pixels in one step via lookahead, rather than carrying a
/// counter across calls.
#[derive(Debug, Clone, Default)]
pub struct EncodeContext {
    pub state: Context,
}

impl EncodeContext {
    pub const fn new() -> Self {
        Self { state: Context::new() }
    }

    /// Scans `pixels` in order, emitting one or more [`Op`]s per pixel (or per run) via `emit`.
    /// This is the core predictor/opcode-selector loop; callers choose how the bytes are stored
    /// (a `Vec<u8>`, a `Write` sink, a C caller's output buffer, ...).
    pub fn encode_pixels(
        &mut self,
        pixels: &[Pixel],
        channels: Channels,
        mut stats: Option<&mut Stats>,
        mut emit: impl FnMut(Op),
    ) {
        let mut pixels = pixels.iter();

        loop {
            let Some(&raw) = pixels.next() else {
                break;
            };
            let pixel = channels.normalize(raw);

            // 1 & 2: run detection and flush. A run is entirely consumed here via lookahead
            // instead of being carried pixel-by-pixel across loop iterations.
            if pixel == self.state.prev {
                let rest = pixels.as_slice();
                let repeats = rest
                    .iter()
                    .take_while(|&&p| channels.normalize(p) == self.state.prev)
                    .count();
                pixels = rest[repeats..].iter();

                let mut remaining = repeats + 1;
                while remaining > 0 {
                    let chunk = remaining.min(QOI_MAX_RUN as usize);
                    let op = Op::Run((chunk - 1) as u8);
                    if let Some(s) = stats.as_deref_mut() {
                        s.record(op.kind());
                    }
                    emit(op);
                    remaining -= chunk;
                }
                // prev is already `pixel`; the index table already holds whatever it held.
                continue;
            }

            // 3: INDEX.
            let h = hash(pixel);
            if self.state.index[h as usize] == pixel {
                let op = Op::Index(h);
                if let Some(s) = stats.as_deref_mut() {
                    s.record(op.kind());
                }
                emit(op);
                self.state.prev = pixel;
                continue;
            }

            let alpha_unchanged = pixel.a == self.state.prev.a;

            // 4 & 5: DIFF / LUMA, only valid when alpha hasn't changed.
            let op = if alpha_unchanged {
                let dr = channel_diff(pixel.r, self.state.prev.r);
                let dg = channel_diff(pixel.g, self.state.prev.g);
                let db = channel_diff(pixel.b, self.state.prev.b);

                if diff_in_range(dr, dg, db) {
                    Op::Diff(dr, dg, db)
                } else {
                    let dr_dg = dr.wrapping_sub(dg);
                    let db_dg = db.wrapping_sub(dg);
                    if luma_in_range(dg, dr_dg, db_dg) {
                        Op::Luma(dg, dr_dg, db_dg)
                    } else {
                        Op::Rgb(pixel.r, pixel.g, pixel.b)
                    }
                }
            } else {
                // 6: alpha changed, must carry the new alpha.
                Op::Rgba(pixel.r, pixel.g, pixel.b, pixel.a)
            };

            if let Some(s) = stats.as_deref_mut() {
                s.record(op.kind());
            }
            emit(op);
            self.state.observe(pixel);
        }
    }
}
