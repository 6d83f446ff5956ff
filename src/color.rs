// MIT/Apache2 License

use crate::intensity::Intensity;
use approx::abs_diff_eq;

/// A four-element device color.
///
/// Backends store their current color in whatever model they like; this type is the common currency used
/// to convert between the RGB, HSB, CMYK and gray models the drawing operations speak.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Color {
    r: Intensity,
    g: Intensity,
    b: Intensity,
    a: Intensity,
}

impl Color {
    /// Creates a new color. This function returns `None` if any of the elements are NaN or out of range.
    #[inline]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Option<Self> {
        Some(Self {
            r: Intensity::new(r)?,
            g: Intensity::new(g)?,
            b: Intensity::new(b)?,
            a: Intensity::new(a)?,
        })
    }

    /// Creates a new opaque color from RGB components, clamping them into range.
    #[inline]
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: Intensity::saturating(r),
            g: Intensity::saturating(g),
            b: Intensity::saturating(b),
            a: Intensity::saturating(1.0),
        }
    }

    /// Opaque black.
    #[inline]
    pub fn black() -> Self {
        Self::from_rgb(0.0, 0.0, 0.0)
    }

    /// Opaque white.
    #[inline]
    pub fn white() -> Self {
        Self::from_rgb(1.0, 1.0, 1.0)
    }

    /// Creates a new opaque gray color.
    #[inline]
    pub fn from_gray(gray: f32) -> Self {
        Self::from_rgb(gray, gray, gray)
    }

    /// Creates a new opaque color from CMYK components.
    #[inline]
    pub fn from_cmyk(c: f32, m: f32, y: f32, k: f32) -> Self {
        Self::from_rgb(
            1.0 - (c + k).min(1.0),
            1.0 - (m + k).min(1.0),
            1.0 - (y + k).min(1.0),
        )
    }

    /// Creates a new opaque color from hue, saturation and brightness.
    ///
    /// All three components are in `[0, 1]`; a hue of one wraps around to zero.
    pub fn from_hsb(h: f32, s: f32, v: f32) -> Self {
        let h = Intensity::saturating(h).into_inner();
        let s = Intensity::saturating(s).into_inner();
        let v = Intensity::saturating(v).into_inner();

        if abs_diff_eq!(s, 0.0) {
            return Self::from_rgb(v, v, v);
        }

        let sector = (h * 6.0) % 6.0;
        let i = sector.floor();
        let f = sector - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        match i as u8 {
            0 => Self::from_rgb(v, t, p),
            1 => Self::from_rgb(q, v, p),
            2 => Self::from_rgb(p, v, t),
            3 => Self::from_rgb(p, q, v),
            4 => Self::from_rgb(t, p, v),
            _ => Self::from_rgb(v, p, q),
        }
    }

    /// Returns a copy of this color with the given alpha.
    #[inline]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: Intensity::saturating(alpha),
            ..self
        }
    }

    /// Gets the red element.
    #[inline]
    pub fn red(self) -> f32 {
        self.r.into_inner()
    }

    /// Gets the green element.
    #[inline]
    pub fn green(self) -> f32 {
        self.g.into_inner()
    }

    /// Gets the blue element.
    #[inline]
    pub fn blue(self) -> f32 {
        self.b.into_inner()
    }

    /// Gets the alpha element.
    #[inline]
    pub fn alpha(self) -> f32 {
        self.a.into_inner()
    }

    /// The RGB components.
    #[inline]
    pub fn rgb(self) -> [f32; 3] {
        [self.red(), self.green(), self.blue()]
    }

    /// The gray level, using the NTSC luminance weights PostScript uses for `currentgray`.
    #[inline]
    pub fn gray(self) -> f32 {
        0.3 * self.red() + 0.59 * self.green() + 0.11 * self.blue()
    }

    /// The CMYK components, with full black generation and undercolor removal.
    #[inline]
    pub fn cmyk(self) -> [f32; 4] {
        let c = 1.0 - self.red();
        let m = 1.0 - self.green();
        let y = 1.0 - self.blue();
        let k = c.min(m).min(y);
        [c - k, m - k, y - k, k]
    }

    /// The hue, saturation and brightness components.
    pub fn hsb(self) -> [f32; 3] {
        let [r, g, b] = self.rgb();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        if abs_diff_eq!(max, 0.0) || abs_diff_eq!(delta, 0.0) {
            return [0.0, 0.0, max];
        }

        let s = delta / max;
        let sextant = if abs_diff_eq!(r, max) {
            (g - b) / delta
        } else if abs_diff_eq!(g, max) {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };
        let mut h = sextant / 6.0;
        if h < 0.0 {
            h += 1.0;
        }

        [h, s, max]
    }
}

/// The abstract colorspace that component arrays passed to `set_fill_color` and `set_stroke_color` are in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// One component: gray level.
    DeviceGray,
    /// Three components: red, green, blue.
    DeviceRgb,
    /// Four components: cyan, magenta, yellow, black.
    DeviceCmyk,
    /// One component: calibrated white level.
    CalibratedWhite,
    /// Three components: calibrated red, green, blue.
    CalibratedRgb,
    /// A colorspace only the backend understands, by name.
    Named(String),
}

impl Default for ColorSpace {
    #[inline]
    fn default() -> Self {
        ColorSpace::DeviceGray
    }
}

impl ColorSpace {
    /// The number of color components, not counting alpha, or `None` if the backend has to decide.
    #[inline]
    pub fn components(&self) -> Option<usize> {
        match self {
            ColorSpace::DeviceGray | ColorSpace::CalibratedWhite => Some(1),
            ColorSpace::DeviceRgb | ColorSpace::CalibratedRgb => Some(3),
            ColorSpace::DeviceCmyk => Some(4),
            ColorSpace::Named(_) => None,
        }
    }

    /// Convert a component array in this colorspace into a color. A trailing extra component is alpha.
    pub fn to_color(&self, components: &[f32]) -> Option<Color> {
        let n = self.components()?;
        if components.len() != n && components.len() != n + 1 {
            return None;
        }

        let color = match n {
            1 => Color::from_gray(components[0]),
            3 => Color::from_rgb(components[0], components[1], components[2]),
            _ => Color::from_cmyk(components[0], components[1], components[2], components[3]),
        };

        Some(match components.get(n) {
            Some(&alpha) => color.with_alpha(alpha),
            None => color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn hsb_round_trips_primaries() {
        let red = Color::from_hsb(0.0, 1.0, 1.0);
        assert_eq!(red.rgb(), [1.0, 0.0, 0.0]);

        let green = Color::from_hsb(1.0 / 3.0, 1.0, 1.0);
        assert_abs_diff_eq!(green.green(), 1.0);
        assert_abs_diff_eq!(green.red(), 0.0, epsilon = 1e-5);

        let [h, s, b] = Color::from_rgb(0.0, 0.0, 1.0).hsb();
        assert_abs_diff_eq!(h, 2.0 / 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(s, 1.0);
        assert_abs_diff_eq!(b, 1.0);
    }

    #[test]
    fn gray_has_no_saturation() {
        let gray = Color::from_hsb(0.7, 0.0, 0.5);
        assert_eq!(gray.rgb(), [0.5, 0.5, 0.5]);
        assert_eq!(gray.hsb(), [0.0, 0.0, 0.5]);
    }

    #[test]
    fn cmyk_conversion() {
        let color = Color::from_cmyk(0.0, 1.0, 1.0, 0.0);
        assert_eq!(color.rgb(), [1.0, 0.0, 0.0]);
        assert_eq!(color.cmyk(), [0.0, 1.0, 1.0, 0.0]);
        assert_eq!(Color::black().cmyk(), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn colorspace_components() {
        let c = ColorSpace::DeviceRgb.to_color(&[1.0, 0.0, 0.0, 0.5]).unwrap();
        assert_eq!(c.rgb(), [1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(c.alpha(), 0.5);

        assert!(ColorSpace::DeviceCmyk.to_color(&[1.0]).is_none());
        assert!(ColorSpace::Named("Pattern".into()).to_color(&[1.0]).is_none());
    }
}
