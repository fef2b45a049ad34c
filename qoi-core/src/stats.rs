//! Per-opcode emission counters, kept as a pluggable sink rather than a global flag in the hot
//! loop: callers pass a `&mut Stats` (or nothing) and it is only ever touched at the one call
//! site where an opcode is actually emitted.

use crate::opcode::OpKind;
use core::fmt;

/// Count of each opcode kind emitted by an encode pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub index: u32,
    pub diff: u32,
    pub luma: u32,
    pub run: u32,
    pub rgb: u32,
    pub rgba: u32,
}

impl Stats {
    pub const fn new() -> Self {
        Self { index: 0, diff: 0, luma: 0, run: 0, rgb: 0, rgba: 0 }
    }

    #[inline]
    pub fn record(&mut self, kind: OpKind) {
        match kind {
            OpKind::Index => self.index += 1,
            OpKind::Diff => self.diff += 1,
            OpKind::Luma => self.luma += 1,
            OpKind::Run => self.run += 1,
            OpKind::Rgb => self.rgb += 1,
            OpKind::Rgba => self.rgba += 1,
        }
    }

    pub const fn total(&self) -> u32 {
        self.index + self.diff + self.luma + self.run + self.rgb + self.rgba
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RGB: {}, RGBA: {}, INDEX: {}, DIFF: {}, LUMA: {}, RUN: {}",
            self.rgb, self.rgba, self.index, self.diff, self.luma, self.run
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_increments_only_the_matching_counter() {
        let mut stats = Stats::new();
        stats.record(OpKind::Luma);
        stats.record(OpKind::Luma);
        stats.record(OpKind::Run);
        assert_eq!(stats, Stats { luma: 2, run: 1, ..Stats::new() });
        assert_eq!(stats.total(), 3);
    }
}
