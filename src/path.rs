// MIT/Apache2 License

use lyon_path::Path;
use tinyvec::TinyVec;

/// How two connected line segments are joined when stroked.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

impl Default for LineJoin {
    #[inline]
    fn default() -> Self {
        LineJoin::Miter
    }
}

impl LineJoin {
    /// The operand PostScript's `setlinejoin` takes for this join.
    #[inline]
    pub fn ps_code(self) -> u8 {
        match self {
            LineJoin::Miter => 0,
            LineJoin::Round => 1,
            LineJoin::Bevel => 2,
        }
    }
}

/// How the open ends of a stroked line are drawn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

impl Default for LineCap {
    #[inline]
    fn default() -> Self {
        LineCap::Butt
    }
}

impl LineCap {
    /// The operand PostScript's `setlinecap` takes for this cap.
    #[inline]
    pub fn ps_code(self) -> u8 {
        match self {
            LineCap::Butt => 0,
            LineCap::Round => 1,
            LineCap::Square => 2,
        }
    }
}

/// Inline storage for dash patterns; nearly every pattern in practice has four entries or fewer.
pub type DashPattern = TinyVec<[f32; 4]>;

/// A path together with the line style it is stroked with.
///
/// The geometry itself is a [`lyon_path::Path`]; this type only adds the stroke attributes that
/// `send_path` re-asserts on the backend before replaying the elements.
#[derive(Debug, Clone)]
pub struct BezierPath {
    path: Path,
    line_width: f32,
    line_join: LineJoin,
    line_cap: LineCap,
    miter_limit: f32,
    flatness: f32,
    dash: DashPattern,
    dash_phase: f32,
}

impl Default for BezierPath {
    #[inline]
    fn default() -> Self {
        Self::new(Path::new())
    }
}

impl From<Path> for BezierPath {
    #[inline]
    fn from(path: Path) -> Self {
        Self::new(path)
    }
}

impl BezierPath {
    /// Wrap a path with the default line style: width 1, miter joins, butt caps, miter limit 10, flatness
    /// 0.6 and a solid line.
    #[inline]
    pub fn new(path: Path) -> Self {
        Self {
            path,
            line_width: 1.0,
            line_join: LineJoin::Miter,
            line_cap: LineCap::Butt,
            miter_limit: 10.0,
            flatness: 0.6,
            dash: DashPattern::default(),
            dash_phase: 0.0,
        }
    }

    #[inline]
    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    #[inline]
    pub fn with_line_join(mut self, join: LineJoin) -> Self {
        self.line_join = join;
        self
    }

    #[inline]
    pub fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = cap;
        self
    }

    #[inline]
    pub fn with_miter_limit(mut self, limit: f32) -> Self {
        self.miter_limit = limit;
        self
    }

    #[inline]
    pub fn with_flatness(mut self, flatness: f32) -> Self {
        self.flatness = flatness;
        self
    }

    /// Set the dash pattern. An empty pattern draws a solid line.
    #[inline]
    pub fn with_dash(mut self, pattern: &[f32], phase: f32) -> Self {
        self.dash = pattern.iter().copied().collect();
        self.dash_phase = phase;
        self
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    #[inline]
    pub fn line_join(&self) -> LineJoin {
        self.line_join
    }

    #[inline]
    pub fn line_cap(&self) -> LineCap {
        self.line_cap
    }

    #[inline]
    pub fn miter_limit(&self) -> f32 {
        self.miter_limit
    }

    #[inline]
    pub fn flatness(&self) -> f32 {
        self.flatness
    }

    /// The dash pattern and its phase.
    #[inline]
    pub fn dash(&self) -> (&[f32], f32) {
        (self.dash.as_slice(), self.dash_phase)
    }
}
