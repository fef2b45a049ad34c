//! The tagged-variant model of the six QOI opcodes.
//!
//! This replaces the source format's flat byte-pattern matching with a sum type whose variants
//! are checked for coverage at compile time; [`Op::to_bytes`]/[`Op::from_bytes`] are the only
//! places byte layout is handled.

use crate::consts::*;
use crate::DeltaBias;

/// One QOI stream opcode, carrying its decoded (unbiased) payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// 6-bit index into the color table.
    Index(u8),
    /// Signed per-channel deltas `(dr, dg, db)`, each in `-2..=1`.
    Diff(i8, i8, i8),
    /// Signed `(dg, dr - dg, db - dg)`, with `dg` in `-32..=31` and the other two in `-8..=7`.
    Luma(i8, i8, i8),
    /// Stored run length minus one; `0..=61`, representing 1..=62 repeated pixels.
    Run(u8),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, u8),
}

/// Kind discriminant for [`Op`], used for opcode disambiguation bookkeeping and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Index,
    Diff,
    Luma,
    Run,
    Rgb,
    Rgba,
}

impl Op {
    pub const fn kind(&self) -> OpKind {
        match self {
            Op::Index(_) => OpKind::Index,
            Op::Diff(..) => OpKind::Diff,
            Op::Luma(..) => OpKind::Luma,
            Op::Run(_) => OpKind::Run,
            Op::Rgb(..) => OpKind::Rgb,
            Op::Rgba(..) => OpKind::Rgba,
        }
    }

    /// Encodes this opcode to its wire bytes. Returns a fixed buffer and the number of
    /// leading bytes that are valid (1 for INDEX/DIFF/RUN, 2 for LUMA, 4 for RGB, 5 for RGBA).
    pub fn to_bytes(self, bias: DeltaBias) -> ([u8; 5], usize) {
        let mut buf = [0u8; 5];
        let len = match self {
            Op::Index(index) => {
                debug_assert!(index < QOI_HASH_LUT_SIZE as u8);
                buf[0] = QOI_OP_INDEX | index;
                1
            }
            Op::Diff(dr, dg, db) => {
                let (dr, dg, db) = match bias {
                    DeltaBias::Standard => ((dr + 2) as u8, (dg + 2) as u8, (db + 2) as u8),
                    DeltaBias::TwosComplement => (dr as u8 & 0x03, dg as u8 & 0x03, db as u8 & 0x03),
                };
                buf[0] = QOI_OP_DIFF | (dr << 4) | (dg << 2) | db;
                1
            }
            Op::Luma(dg, dr_dg, db_dg) => {
                let (dg, dr_dg, db_dg) = match bias {
                    DeltaBias::Standard => (
                        (dg + 32) as u8,
                        (dr_dg + 8) as u8,
                        (db_dg + 8) as u8,
                    ),
                    DeltaBias::TwosComplement => {
                        (dg as u8 & 0x3F, dr_dg as u8 & 0x0F, db_dg as u8 & 0x0F)
                    }
                };
                buf[0] = QOI_OP_LUMA | dg;
                buf[1] = (dr_dg << 4) | db_dg;
                2
            }
            Op::Run(count) => {
                debug_assert!(count < QOI_MAX_RUN);
                buf[0] = QOI_OP_RUN | count;
                1
            }
            Op::Rgb(r, g, b) => {
                buf[0] = QOI_OP_RGB;
                buf[1] = r;
                buf[2] = g;
                buf[3] = b;
                4
            }
            Op::Rgba(r, g, b, a) => {
                buf[0] = QOI_OP_RGBA;
                buf[1] = r;
                buf[2] = g;
                buf[3] = b;
                buf[4] = a;
                5
            }
        };
        (buf, len)
    }

    /// Decodes one opcode given its already-consumed first byte and a source of continuation
    /// bytes for the multi-byte opcodes (LUMA, RGB, RGBA). `next` returns `None` on a truncated
    /// stream.
    pub fn from_bytes(first: u8, bias: DeltaBias, mut next: impl FnMut() -> Option<u8>) -> Result<Op, OpDecodeError> {
        if first == QOI_OP_RGBA {
            let r = next().ok_or(OpDecodeError::UnexpectedEof)?;
            let g = next().ok_or(OpDecodeError::UnexpectedEof)?;
            let b = next().ok_or(OpDecodeError::UnexpectedEof)?;
            let a = next().ok_or(OpDecodeError::UnexpectedEof)?;
            return Ok(Op::Rgba(r, g, b, a));
        }
        if first == QOI_OP_RGB {
            let r = next().ok_or(OpDecodeError::UnexpectedEof)?;
            let g = next().ok_or(OpDecodeError::UnexpectedEof)?;
            let b = next().ok_or(OpDecodeError::UnexpectedEof)?;
            return Ok(Op::Rgb(r, g, b));
        }

        match first & QOI_OPCODE_MASK {
            QOI_OP_INDEX => Ok(Op::Index(first & QOI_DATA_MASK)),
            QOI_OP_DIFF => {
                let raw = first & QOI_DATA_MASK;
                let (dr, dg, db) = ((raw >> 4) & 0x03, (raw >> 2) & 0x03, raw & 0x03);
                let unbias = |d: u8| match bias {
                    DeltaBias::Standard => d as i8 - 2,
                    DeltaBias::TwosComplement => ((d << 6) as i8) >> 6,
                };
                Ok(Op::Diff(unbias(dr), unbias(dg), unbias(db)))
            }
            QOI_OP_LUMA => {
                let second = next().ok_or(OpDecodeError::UnexpectedEof)?;
                let raw_dg = first & QOI_DATA_MASK;
                let raw_dr_dg = (second >> 4) & 0x0F;
                let raw_db_dg = second & 0x0F;
                let (dg, dr_dg, db_dg) = match bias {
                    DeltaBias::Standard => (
                        raw_dg as i8 - 32,
                        raw_dr_dg as i8 - 8,
                        raw_db_dg as i8 - 8,
                    ),
                    DeltaBias::TwosComplement => (
                        ((raw_dg << 2) as i8) >> 2,
                        ((raw_dr_dg << 4) as i8) >> 4,
                        ((raw_db_dg << 4) as i8) >> 4,
                    ),
                };
                Ok(Op::Luma(dg, dr_dg, db_dg))
            }
            QOI_OP_RUN => {
                let count = first & QOI_DATA_MASK;
                if count >= QOI_MAX_RUN {
                    // Structurally unreachable: 0xFE/0xFF are matched above before the mask
                    // check, so a QOI_OP_RUN byte never carries payload 62 or 63. Kept as a
                    // defensive check for malformed/foreign input.
                    return Err(OpDecodeError::ReservedOpcode(first));
                }
                Ok(Op::Run(count))
            }
            _ => unreachable!("top two bits exhaust {{00, 01, 10, 11}} and 11 is handled above"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpDecodeError {
    UnexpectedEof,
    ReservedOpcode(u8),
}
