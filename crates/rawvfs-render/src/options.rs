//! Render option flags.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bit flags controlling how frames are rendered.
///
/// Unknown bits are carried through untouched so hosts can round-trip
/// flags from newer builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RenderOptions(u32);

impl RenderOptions {
    /// No options set.
    pub const NONE: RenderOptions = RenderOptions(0);

    /// Downsample renders by the configured draft scale.
    pub const DRAFT: RenderOptions = RenderOptions(1 << 0);

    /// Construct from a raw bit pattern.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw bit pattern.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every flag in `other` is set.
    pub const fn contains(self, other: RenderOptions) -> bool {
        self.0 & other.0 == other.0
    }

    /// The downsampling factor a render should use: the draft scale when
    /// drafting is on, full resolution otherwise.
    pub fn effective_scale(self, draft_scale: u32) -> u32 {
        if self.contains(Self::DRAFT) {
            draft_scale.max(1)
        } else {
            1
        }
    }
}

impl BitOr for RenderOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RenderOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contains(Self::DRAFT) {
            write!(f, "draft")
        } else {
            write!(f, "none")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_scale_applies_only_when_flagged() {
        assert_eq!(RenderOptions::NONE.effective_scale(4), 1);
        assert_eq!(RenderOptions::DRAFT.effective_scale(4), 4);
    }

    #[test]
    fn test_zero_draft_scale_clamps_to_full_resolution() {
        assert_eq!(RenderOptions::DRAFT.effective_scale(0), 1);
    }

    #[test]
    fn test_flags_compose() {
        let mut options = RenderOptions::NONE;
        assert!(!options.contains(RenderOptions::DRAFT));
        options |= RenderOptions::DRAFT;
        assert!(options.contains(RenderOptions::DRAFT));
        assert_eq!(options.bits(), 1);
    }
}
