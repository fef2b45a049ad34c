//! `Vec`-based decode entry point built directly on [`DecodeContext`], with a richer
//! [`Snafu`]-derived error type than the crate-root [`crate::alloc_api::decode_to_vec`] free
//! function.

use crate::decode::DecodeContext;
use crate::header::{Header, HeaderError};
use crate::opcode::OpDecodeError;
use crate::{DeltaBias, Pixel};
use alloc::vec::Vec;
use snafu::{OptionExt, Snafu};

#[derive(Debug, Snafu)]
pub enum DecodeToVecError {
    #[snafu(display("truncated QOI stream"))]
    UnexpectedEof,
    #[snafu(display("not a QOI file (bad magic)"))]
    InvalidMagic,
    #[snafu(display("image header specifies a zero width or height"))]
    ZeroDimension,
    #[snafu(display("invalid channel count byte: {byte}"))]
    InvalidChannels { byte: u8 },
    #[snafu(display("reserved opcode byte: {byte:#04x}"))]
    ReservedOpcode { byte: u8 },
    #[snafu(display("image dimensions overflow: {width} * {height} does not fit a usize pixel count"))]
    DimensionOverflow { width: u32, height: u32 },
}

impl From<HeaderError> for DecodeToVecError {
    fn from(e: HeaderError) -> Self {
        match e {
            HeaderError::UnexpectedEof => DecodeToVecError::UnexpectedEof,
            HeaderError::InvalidMagic => DecodeToVecError::InvalidMagic,
            HeaderError::ZeroDimension => DecodeToVecError::ZeroDimension,
            HeaderError::InvalidChannels(byte) => DecodeToVecError::InvalidChannels { byte },
        }
    }
}

impl From<OpDecodeError> for DecodeToVecError {
    fn from(e: OpDecodeError) -> Self {
        match e {
            OpDecodeError::UnexpectedEof => DecodeToVecError::UnexpectedEof,
            OpDecodeError::ReservedOpcode(byte) => DecodeToVecError::ReservedOpcode { byte },
        }
    }
}

impl DecodeContext {
    /// Decodes a complete QOI file from `data` into `w`, returning the parsed header.
    pub fn decode_to_vec(
        data: &[u8],
        bias: DeltaBias,
        w: &mut Vec<Pixel>,
    ) -> Result<Header, DecodeToVecError> {
        let mut state = DecodeContext::new();
        state.decode_to_vec_with_state(data, bias, w)
    }

    /// As [`Self::decode_to_vec`], but continuing from (and updating) `self` rather than
    /// starting from a freshly reset context. Useful for decoding a sequence of frames that
    /// share one running index table.
    pub fn decode_to_vec_with_state(
        &mut self,
        data: &[u8],
        bias: DeltaBias,
        w: &mut Vec<Pixel>,
    ) -> Result<Header, DecodeToVecError> {
        let (header, body) = Header::from_bytes(data)?;
        let pixel_count = (header.width as usize)
            .checked_mul(header.height as usize)
            .context(DimensionOverflowSnafu { width: header.width, height: header.height })?;
        w.reserve(pixel_count);

        let mut bytes = body.iter().copied();
        self.decode_pixels(pixel_count, header.channels, bias, &mut || bytes.next(), |pixel| {
            w.push(pixel)
        })?;

        Ok(header)
    }
}
