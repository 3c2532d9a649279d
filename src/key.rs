//! Composite keys with infinity sentinels.
//!
//! A [`Key`] is either one of the two infinities that bound every tree, or a
//! finite `(primary, secondary)` pair. The secondary component is optional: a
//! primary-only key is a search boundary and compares equal to every key that
//! shares its primary. That makes order-equality non-transitive, so `Key` does
//! not implement `Ord`: compare through the inherent methods. `==` is plain
//! structural equality, [`Key::matches`] is equality under the tree order.

use std::cmp::Ordering;
use std::fmt;

use crate::error::TreeError;

/// Sign of a key relative to the finite keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Infinity {
    /// A finite key.
    None,
    /// Smaller than every finite key.
    Minus,
    /// Larger than every finite key.
    Plus,
}

/// Ordered composite key.
///
/// `==` compares structure, not tree order: `primary_only(7) != new(7, 0)`
/// even though the tree treats them as equal. Use [`Key::matches`] for that.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Key<P, S> {
    MinusInfinity,
    Finite { primary: P, secondary: Option<S> },
    PlusInfinity,
}

impl<P, S> Key<P, S> {
    /// A full `(primary, secondary)` key.
    #[inline]
    pub fn new(primary: P, secondary: S) -> Self {
        Key::Finite {
            primary,
            secondary: Some(secondary),
        }
    }

    /// A primary-only key, used to position searches by the first component.
    #[inline]
    pub fn primary_only(primary: P) -> Self {
        Key::Finite {
            primary,
            secondary: None,
        }
    }

    /// Builds a finite key from optional parts.
    ///
    /// Fails with [`TreeError::InvalidKey`] when the primary is missing: a
    /// finite key without a primary has no position in the order.
    pub fn try_from_parts(primary: Option<P>, secondary: Option<S>) -> Result<Self, TreeError> {
        match primary {
            Some(primary) => Ok(Key::Finite { primary, secondary }),
            None => Err(TreeError::InvalidKey),
        }
    }

    #[inline]
    pub fn infinity(&self) -> Infinity {
        match self {
            Key::MinusInfinity => Infinity::Minus,
            Key::Finite { .. } => Infinity::None,
            Key::PlusInfinity => Infinity::Plus,
        }
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        !matches!(self, Key::Finite { .. })
    }

    #[inline]
    pub fn is_minus_infinity(&self) -> bool {
        matches!(self, Key::MinusInfinity)
    }

    #[inline]
    pub fn is_plus_infinity(&self) -> bool {
        matches!(self, Key::PlusInfinity)
    }

    pub fn primary(&self) -> Option<&P> {
        match self {
            Key::Finite { primary, .. } => Some(primary),
            _ => None,
        }
    }

    pub fn secondary(&self) -> Option<&S> {
        match self {
            Key::Finite { secondary, .. } => secondary.as_ref(),
            _ => None,
        }
    }

    /// Splits a finite key into its parts; `None` for the infinities.
    pub fn into_parts(self) -> Option<(P, Option<S>)> {
        match self {
            Key::Finite { primary, secondary } => Some((primary, secondary)),
            _ => None,
        }
    }

    /// Position of the key's sign class: minus, finite, plus.
    #[inline]
    fn sign_rank(&self) -> u8 {
        match self {
            Key::MinusInfinity => 0,
            Key::Finite { .. } => 1,
            Key::PlusInfinity => 2,
        }
    }
}

impl<P: Ord, S: Ord> Key<P, S> {
    /// Full order: infinities by sign, then primary, then secondary when both
    /// sides carry one.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (
                Key::Finite {
                    primary: p1,
                    secondary: s1,
                },
                Key::Finite {
                    primary: p2,
                    secondary: s2,
                },
            ) => p1.cmp(p2).then_with(|| match (s1, s2) {
                (Some(s1), Some(s2)) => s1.cmp(s2),
                _ => Ordering::Equal,
            }),
            _ => self.sign_rank().cmp(&other.sign_rank()),
        }
    }

    /// Like [`Key::compare`] but ignores the secondary component.
    pub fn compare_primary(&self, other: &Self) -> Ordering {
        match (self.primary(), other.primary()) {
            (Some(p1), Some(p2)) => p1.cmp(p2),
            _ => self.sign_rank().cmp(&other.sign_rank()),
        }
    }

    #[inline]
    pub fn eq_primary(&self, other: &Self) -> bool {
        self.compare_primary(other) == Ordering::Equal
    }

    /// Equality under [`Key::compare`].
    #[inline]
    pub fn matches(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }

    #[inline]
    pub fn less_or_equal(&self, other: &Self) -> bool {
        self.compare(other) != Ordering::Greater
    }

    #[inline]
    pub fn less_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Less
    }
}

impl<P: fmt::Debug, S: fmt::Debug> fmt::Debug for Key<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::MinusInfinity => f.write_str("-inf"),
            Key::PlusInfinity => f.write_str("+inf"),
            Key::Finite {
                primary,
                secondary: Some(secondary),
            } => write!(f, "({primary:?}, {secondary:?})"),
            Key::Finite {
                primary,
                secondary: None,
            } => write!(f, "({primary:?}, _)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type K = Key<u32, u32>;

    #[test]
    fn test_infinities_bound_finite_keys() {
        let finite = K::new(0, 0);
        assert_eq!(K::MinusInfinity.compare(&finite), Ordering::Less);
        assert_eq!(K::PlusInfinity.compare(&finite), Ordering::Greater);
        assert_eq!(finite.compare(&K::PlusInfinity), Ordering::Less);
        assert_eq!(finite.compare(&K::MinusInfinity), Ordering::Greater);
        assert_eq!(K::MinusInfinity.compare(&K::PlusInfinity), Ordering::Less);
        assert!(K::MinusInfinity.matches(&K::MinusInfinity));
        assert!(K::PlusInfinity.matches(&K::PlusInfinity));
        assert!(!K::PlusInfinity.matches(&K::MinusInfinity));
    }

    #[test]
    fn test_secondary_breaks_ties() {
        assert_eq!(K::new(1, 9).compare(&K::new(2, 0)), Ordering::Less);
        assert_eq!(K::new(2, 1).compare(&K::new(2, 0)), Ordering::Greater);
        assert!(K::new(2, 1).matches(&K::new(2, 1)));
        assert!(K::new(2, 0).less_than(&K::new(2, 1)));
        assert!(K::new(2, 1).less_or_equal(&K::new(2, 1)));
        assert!(!K::new(2, 2).less_or_equal(&K::new(2, 1)));
    }

    #[test]
    fn test_primary_only_matches_any_secondary() {
        let boundary = K::primary_only(7);
        assert!(boundary.matches(&K::new(7, 0)));
        assert!(boundary.matches(&K::new(7, 100)));
        assert!(!boundary.matches(&K::new(8, 0)));
        assert!(boundary.less_than(&K::new(8, 0)));
        assert!(K::new(6, 100).less_than(&boundary));
    }

    #[test]
    fn test_structural_eq_differs_from_matches() {
        let boundary = K::primary_only(7);
        let full = K::new(7, 0);
        assert!(boundary.matches(&full));
        assert_ne!(boundary, full);
        assert_eq!(full, K::new(7, 0));
    }

    #[test]
    fn test_primary_comparisons_ignore_secondary() {
        assert_eq!(K::new(3, 1).compare_primary(&K::new(3, 2)), Ordering::Equal);
        assert!(K::new(3, 1).eq_primary(&K::new(3, 2)));
        assert!(!K::new(3, 1).eq_primary(&K::new(4, 1)));
        assert!(!K::new(3, 1).eq_primary(&K::PlusInfinity));
        assert!(K::PlusInfinity.eq_primary(&K::PlusInfinity));
    }

    #[test]
    fn test_missing_primary_is_invalid() {
        assert_eq!(
            K::try_from_parts(None, Some(1)).unwrap_err(),
            TreeError::InvalidKey
        );
        let key = K::try_from_parts(Some(1), None).unwrap();
        assert!(key.matches(&K::primary_only(1)));
        assert_eq!(key.secondary(), None);
    }

    #[test]
    fn test_accessors() {
        let key = K::new(4, 5);
        assert_eq!(key.infinity(), Infinity::None);
        assert_eq!(key.primary(), Some(&4));
        assert_eq!(key.secondary(), Some(&5));
        assert_eq!(key.into_parts(), Some((4, Some(5))));
        assert_eq!(K::PlusInfinity.infinity(), Infinity::Plus);
        assert!(K::MinusInfinity.is_minus_infinity());
        assert!(K::MinusInfinity.is_infinite());
        assert_eq!(K::MinusInfinity.primary(), None);
        assert_eq!(format!("{:?}", K::primary_only(3)), "(3, _)");
    }
}
