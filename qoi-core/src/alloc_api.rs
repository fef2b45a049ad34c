//! Low-ceremony `Vec`-based encode/decode entry points for `alloc`-only (no `std`) callers.
//! These trade the richer [`crate::encode::EncodeError`]/[`crate::decode::DecodeToVecError`]
//! (only available with the `std` feature, since they carry `std::io::Error` sources) for plain
//! enums with no payload beyond what's needed to tell failures apart.

use crate::decode::DecodeContext;
use crate::encode::EncodeContext;
use crate::header::{Colorspace, Header, HeaderError};
use crate::opcode::OpDecodeError;
use crate::{Channels, DeltaBias, Pixel};
use alloc::vec::Vec;

/// Encodes `pixels` as a complete QOI file (header, opcode stream, end marker) into `out`.
///
/// Returns `false` (without touching `out`) if `width * height` doesn't match `pixels.len()`.
pub fn encode_to_vec(
    width: u32,
    height: u32,
    pixels: &[Pixel],
    channels: Channels,
    bias: DeltaBias,
    out: &mut Vec<u8>,
) -> bool {
    let Some(expected) = (width as usize).checked_mul(height as usize) else {
        return false;
    };
    if expected != pixels.len() {
        return false;
    }

    let header =
        Header { width, height, channels, colorspace: Colorspace::SrgbLinearAlpha };
    out.extend_from_slice(&header.to_bytes());

    let mut ctx = EncodeContext::new();
    ctx.encode_pixels(pixels, channels, None, |op| {
        let (bytes, len) = op.to_bytes(bias);
        out.extend_from_slice(&bytes[..len]);
    });

    out.extend_from_slice(&crate::header::end_marker());
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeToVecError {
    UnexpectedEof,
    InvalidMagic,
    ZeroDimension,
    InvalidChannels(u8),
    ReservedOpcode(u8),
    DimensionOverflow,
}

impl From<HeaderError> for DecodeToVecError {
    fn from(e: HeaderError) -> Self {
        match e {
            HeaderError::UnexpectedEof => DecodeToVecError::UnexpectedEof,
            HeaderError::InvalidMagic => DecodeToVecError::InvalidMagic,
            HeaderError::ZeroDimension => DecodeToVecError::ZeroDimension,
            HeaderError::InvalidChannels(b) => DecodeToVecError::InvalidChannels(b),
        }
    }
}

impl From<OpDecodeError> for DecodeToVecError {
    fn from(e: OpDecodeError) -> Self {
        match e {
            OpDecodeError::UnexpectedEof => DecodeToVecError::UnexpectedEof,
            OpDecodeError::ReservedOpcode(b) => DecodeToVecError::ReservedOpcode(b),
        }
    }
}

/// Decodes a complete QOI file from `data` into `out`, returning the parsed header.
pub fn decode_to_vec(
    data: &[u8],
    bias: DeltaBias,
    out: &mut Vec<Pixel>,
) -> Result<Header, DecodeToVecError> {
    let (header, body) = Header::from_bytes(data)?;

    let mut ctx = DecodeContext::new();
    let pixel_count = (header.width as usize)
        .checked_mul(header.height as usize)
        .ok_or(DecodeToVecError::DimensionOverflow)?;
    out.reserve(pixel_count);

    let mut bytes = body.iter().copied();
    ctx.decode_pixels(pixel_count, header.channels, bias, &mut || bytes.next(), |pixel| {
        out.push(pixel)
    })?;

    Ok(header)
}
