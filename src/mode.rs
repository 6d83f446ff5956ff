// MIT/Apache2 License

/// Porter-Duff style operators used when compositing one graphics state onto another.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CompositingOperation {
    Clear,
    Copy,
    SourceOver,
    SourceIn,
    SourceOut,
    SourceAtop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    Xor,
    PlusDarker,
    Highlight,
    PlusLighter,
}

impl Default for CompositingOperation {
    #[inline]
    fn default() -> Self {
        CompositingOperation::SourceOver
    }
}

/// How hard a backend should try when scaling images.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ImageInterpolation {
    /// Let the backend decide.
    Default,
    None,
    Low,
    Medium,
    High,
}

impl Default for ImageInterpolation {
    #[inline]
    fn default() -> Self {
        ImageInterpolation::Default
    }
}

/// What text drawing does with glyph outlines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextDrawingMode {
    Fill,
    Stroke,
    FillStroke,
    Invisible,
    FillClip,
    StrokeClip,
    FillStrokeClip,
    Clip,
}

impl Default for TextDrawingMode {
    #[inline]
    fn default() -> Self {
        TextDrawingMode::Fill
    }
}

impl TextDrawingMode {
    /// The PDF/PostScript text rendering mode number.
    #[inline]
    pub fn render_mode(self) -> u8 {
        match self {
            TextDrawingMode::Fill => 0,
            TextDrawingMode::Stroke => 1,
            TextDrawingMode::FillStroke => 2,
            TextDrawingMode::Invisible => 3,
            TextDrawingMode::FillClip => 4,
            TextDrawingMode::StrokeClip => 5,
            TextDrawingMode::FillStrokeClip => 6,
            TextDrawingMode::Clip => 7,
        }
    }
}

/// A font, as far as the drawing layer is concerned: a name and a point size.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    /// The PostScript name of the font.
    pub name: String,
    /// The point size.
    pub size: f32,
}

impl Font {
    #[inline]
    pub fn new(name: impl Into<String>, size: f32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}
