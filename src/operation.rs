// MIT/Apache2 License

use std::fmt;

macro_rules! operations {
    ($($(#[$meta:meta])* $variant:ident => $name:literal,)*) => {
        /// Every drawing operation a [`Backend`](crate::Backend) may implement.
        ///
        /// This is a fixed catalogue; each variant has exactly one slot in an
        /// [`OperationTable`](crate::OperationTable).
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Operation {
            $($(#[$meta])* $variant,)*
        }

        impl Operation {
            /// All operations, in catalogue order.
            pub const ALL: &'static [Operation] = &[$(Operation::$variant,)*];

            /// The name of this operation, as it appears in error messages.
            #[inline]
            pub fn name(self) -> &'static str {
                match self {
                    $(Operation::$variant => $name,)*
                }
            }
        }
    };
}

operations! {
    // color
    SetAlpha => "set_alpha",
    SetCmykColor => "set_cmyk_color",
    SetGray => "set_gray",
    SetHsbColor => "set_hsb_color",
    SetRgbColor => "set_rgb_color",
    CurrentAlpha => "current_alpha",
    CurrentCmykColor => "current_cmyk_color",
    CurrentGray => "current_gray",
    CurrentHsbColor => "current_hsb_color",
    CurrentRgbColor => "current_rgb_color",
    SetFillColorSpace => "set_fill_color_space",
    SetStrokeColorSpace => "set_stroke_color_space",
    SetFillColor => "set_fill_color",
    SetStrokeColor => "set_stroke_color",

    // path construction
    NewPath => "new_path",
    MoveTo => "move_to",
    LineTo => "line_to",
    CurveTo => "curve_to",
    RelMoveTo => "rel_move_to",
    RelLineTo => "rel_line_to",
    RelCurveTo => "rel_curve_to",
    Arc => "arc",
    Arcn => "arcn",
    Arct => "arct",
    ClosePath => "close_path",

    // path painting
    Fill => "fill",
    EoFill => "eo_fill",
    Stroke => "stroke",
    Clip => "clip",
    EoClip => "eo_clip",
    InitClip => "init_clip",
    RectClip => "rect_clip",
    RectFill => "rect_fill",
    RectStroke => "rect_stroke",
    FlattenPath => "flatten_path",
    ReversePath => "reverse_path",
    PathBBox => "path_bbox",
    CurrentPoint => "current_point",
    /// Decompose a whole [`BezierPath`](crate::BezierPath) into primitive operations.
    SendPath => "send_path",

    // line style
    SetDash => "set_dash",
    SetLineWidth => "set_line_width",
    SetLineJoin => "set_line_join",
    SetLineCap => "set_line_cap",
    SetMiterLimit => "set_miter_limit",
    SetFlatness => "set_flatness",
    SetStrokeAdjust => "set_stroke_adjust",
    CurrentLineWidth => "current_line_width",

    // transforms
    Concat => "concat",
    Rotate => "rotate",
    Scale => "scale",
    Translate => "translate",
    InitMatrix => "init_matrix",
    CurrentMatrix => "current_matrix",
    SetMatrix => "set_matrix",
    ConcatMatrix => "concat_matrix",

    // text
    SetTextMatrix => "set_text_matrix",
    TextMatrix => "text_matrix",
    SetTextPosition => "set_text_position",
    TextPosition => "text_position",
    Show => "show",
    ShowGlyphs => "show_glyphs",
    SetCharSpacing => "set_char_spacing",
    SetTextDrawingMode => "set_text_drawing_mode",
    SetFont => "set_font",

    // graphics states
    GSave => "gsave",
    GRestore => "grestore",
    InitGraphics => "init_graphics",
    DefineGState => "define_gstate",
    ReplaceGState => "replace_gstate",
    UndefineGState => "undefine_gstate",
    SetGState => "set_gstate",
    /// Class-level lookup of a context by graphics state. Never implemented.
    SetGraphicsState => "set_graphics_state",

    // devices
    SetDevice => "set_device",
    CurrentDevice => "current_device",

    // compositing and images
    CompositeGState => "composite_gstate",
    DrawBitmap => "draw_bitmap",

    // client output
    WriteFormatted => "write_formatted",
    WriteData => "write_data",

    // miscellaneous
    Flush => "flush",
    ShowPage => "show_page",
    Beep => "beep",
}

impl fmt::Display for Operation {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = Operation::ALL.iter().map(|op| op.name()).collect();
        assert_eq!(names.len(), Operation::ALL.len());
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(Operation::SetRgbColor.to_string(), "set_rgb_color");
        assert_eq!(Operation::GSave.to_string(), "gsave");
    }
}
