use crate::encode::EncodeContext;
use crate::header::Header;
use crate::{Channels, DeltaBias, Pixel, Stats};
use snafu::{ensure, OptionExt, ResultExt, Snafu};
use std::io::Write;

#[derive(Debug, Snafu)]
pub enum EncodeError {
    #[snafu(display(
        "image dimensions overflow: {width} * {height} does not fit a usize pixel count"
    ))]
    DimensionOverflow { width: u32, height: u32 },
    #[snafu(display(
        "specified image dimensions don't match the number of pixels: {width} * {height} == \
         {expected} pixels, but {actual} pixels were given"
    ))]
    InvalidDimensions { width: u32, height: u32, expected: usize, actual: usize },
    WriteIo { source: std::io::Error },
}

impl EncodeContext {
    /// Encodes a full QOI file (header, opcode stream, end marker) to `w`.
    pub fn encode<W: Write>(
        width: u32,
        height: u32,
        pixels: &[Pixel],
        channels: Channels,
        bias: DeltaBias,
        w: W,
    ) -> Result<(), EncodeError> {
        let mut ctx = EncodeContext::new();
        ctx.encode_with_state(width, height, pixels, channels, bias, None, w)
    }

    pub fn encode_with_state<W: Write>(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[Pixel],
        channels: Channels,
        bias: DeltaBias,
        stats: Option<&mut Stats>,
        mut w: W,
    ) -> Result<(), EncodeError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .context(DimensionOverflowSnafu { width, height })?;
        ensure!(
            expected == pixels.len(),
            InvalidDimensionsSnafu { width, height, expected, actual: pixels.len() }
        );

        let header = Header {
            width,
            height,
            channels,
            colorspace: crate::header::Colorspace::SrgbLinearAlpha,
        };
        w.write_all(&header.to_bytes()).context(WriteIoSnafu)?;
        self.encode_pixels_to(pixels, channels, bias, stats, &mut w)?;
        w.write_all(&crate::header::end_marker()).context(WriteIoSnafu)?;

        Ok(())
    }

    /// Writes only the opcode body (no header, no end marker) for `pixels`.
    pub fn encode_pixels_to<W: Write>(
        &mut self,
        pixels: &[Pixel],
        channels: Channels,
        bias: DeltaBias,
        mut stats: Option<&mut Stats>,
        mut w: W,
    ) -> Result<(), EncodeError> {
        let mut io_err = None;
        self.encode_pixels(pixels, channels, stats.as_deref_mut(), |op| {
            if io_err.is_some() {
                return;
            }
            let (bytes, len) = op.to_bytes(bias);
            if let Err(e) = w.write_all(&bytes[..len]) {
                io_err = Some(e);
            }
        });

        match io_err {
            Some(source) => Err(EncodeError::WriteIo { source }),
            None => Ok(()),
        }
    }
}
