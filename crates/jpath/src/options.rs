//! Per-call result options.
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// A set of flags controlling how a [`PathExpression`](crate::PathExpression)
/// shapes its results.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResultOptions(u8);

impl ResultOptions {
    /// Track normalized paths while traversing.
    pub const PATH: Self = Self(0b001);
    /// Order results by normalized path.
    pub const SORT: Self = Self(0b010);
    /// Drop results whose normalized path was already emitted.
    pub const NO_DUPS: Self = Self(0b100);

    const NAMES: [(Self, &'static str); 3] = [
        (Self::PATH, "PATH"),
        (Self::SORT, "SORT"),
        (Self::NO_DUPS, "NO_DUPS"),
    ];

    /// The empty flag set.
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every flag in `other` is also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any flag in `other` is set in `self`.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True if the post-processing pass has to compare paths.
    pub const fn needs_ordering(self) -> bool {
        self.intersects(Self(Self::SORT.0 | Self::NO_DUPS.0))
    }
}

impl BitOr for ResultOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ResultOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ResultOptions {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for ResultOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(empty)");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, " | ")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ResultOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResultOptions({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_and_query() {
        let opts = ResultOptions::SORT | ResultOptions::NO_DUPS;
        assert!(opts.contains(ResultOptions::SORT));
        assert!(opts.contains(ResultOptions::NO_DUPS));
        assert!(!opts.contains(ResultOptions::PATH));
        assert!(opts.needs_ordering());
        assert!(!ResultOptions::PATH.needs_ordering());
        assert!(ResultOptions::default().is_empty());
    }

    #[test]
    fn test_display_lists_flags() {
        let mut opts = ResultOptions::PATH;
        opts |= ResultOptions::NO_DUPS;
        assert_eq!(opts.to_string(), "PATH | NO_DUPS");
        assert_eq!(ResultOptions::empty().to_string(), "(empty)");
        assert_eq!(format!("{:?}", ResultOptions::SORT), "ResultOptions(SORT)");
    }
}
