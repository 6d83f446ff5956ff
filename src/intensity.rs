// MIT/Apache2 License

use ordered_float::NotNan;

/// A color component, stop or opacity: a range that goes from zero to one. This type is essentially a
/// wrapper around an `f32`, but with two invariants:
///
/// * The inner value will always be between `0.0` and `1.0`.
/// * The inner value will never be `NaN`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Intensity {
    inner: NotNan<f32>,
}

impl Intensity {
    /// Create a new `Intensity`. If the inner value does not meet the invariants mentioned above, this function
    /// returns `None`.
    #[inline]
    pub fn new(inner: f32) -> Option<Self> {
        if (0.0..=1.0).contains(&inner) {
            NotNan::new(inner).ok().map(|inner| Self { inner })
        } else {
            None
        }
    }

    /// Create a new `Intensity`, clamping the value into range. `NaN` becomes zero.
    ///
    /// Drawing operators are lenient about out-of-range components the same way PostScript is, so this is
    /// what backends use when they receive raw floats.
    #[inline]
    pub fn saturating(inner: f32) -> Self {
        let inner = NotNan::new(inner)
            .map(|n| num_traits::clamp(n.into_inner(), 0.0, 1.0))
            .unwrap_or(0.0);
        Self {
            inner: NotNan::new(inner).unwrap_or_default(),
        }
    }

    /// Get the inner value of the `Intensity`.
    #[inline]
    pub fn into_inner(self) -> f32 {
        self.inner.into_inner()
    }
}

impl From<Intensity> for f32 {
    #[inline]
    fn from(i: Intensity) -> f32 {
        i.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(Intensity::new(0.5).is_some());
        assert!(Intensity::new(1.5).is_none());
        assert!(Intensity::new(-0.1).is_none());
        assert!(Intensity::new(f32::NAN).is_none());
    }

    #[test]
    fn saturating_clamps() {
        assert_eq!(Intensity::saturating(2.0).into_inner(), 1.0);
        assert_eq!(Intensity::saturating(-3.0).into_inner(), 0.0);
        assert_eq!(Intensity::saturating(f32::NAN).into_inner(), 0.0);
        assert_eq!(Intensity::saturating(0.25).into_inner(), 0.25);
    }
}
