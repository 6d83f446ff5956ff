// MIT/Apache2 License

use crate::{
    Attributes, Bitmap, BezierPath, ColorSpace, CompositingOperation, DeviceBinding, DeviceHandle,
    DriverHandle, Error, Font, GStateTag, Glyph, LineCap, LineJoin, Operation, Rect, TextDrawingMode,
};
use lyon_geom::{Point, Size, Transform};
use std::{any::Any, fmt};

/// The default implementation of `send_path`.
mod defaults;

/// Something that actually draws; otherwise known as the thing a [`GraphicsContext`] exists to talk to.
///
/// `Backend`s are usually window-system drivers, bitmap rasterizers or serial print streams. The `Backend`
/// trait is the contract between the abstract drawing layer and those devices: it lists every drawing
/// operation the layer knows about, grouped by concern.
///
/// Every operation has a default implementation that fails with [`Error::Unimplemented`], naming the
/// operation and the backend type. A backend overrides the operations it supports and leaves the rest;
/// invoking a missing one is an integration bug and is reported as such, never silently ignored. The
/// exceptions are:
///
/// * [`send_path`], which decomposes a [`BezierPath`] into primitive path and line style operations.
/// * [`is_drawing_to_screen`], which defaults to `false`.
/// * [`handle_expose_rect`], a class-level notification that defaults to doing nothing.
///
/// Backends are never called through a trait object. Instead, the first time a context is created around
/// a backend type, an [`OperationTable`] is built for that type and cached; every context of that type
/// dispatches through the shared table.
///
/// [`GraphicsContext`]: crate::GraphicsContext
/// [`OperationTable`]: crate::OperationTable
/// [`send_path`]: Backend::send_path
/// [`is_drawing_to_screen`]: Backend::is_drawing_to_screen
/// [`handle_expose_rect`]: Backend::handle_expose_rect
pub trait Backend: Any {
    /// Whether this backend draws to a screen. Contexts only track font usage for backends that do not.
    #[inline]
    fn is_drawing_to_screen(&self) -> bool {
        false
    }

    /// Notification that a driver reported part of its surface as exposed.
    #[inline]
    fn handle_expose_rect(rect: Rect<f32>, driver: DriverHandle)
    where
        Self: Sized,
    {
        let _ = (rect, driver);
    }

    /* Color */

    fn set_alpha(&mut self, alpha: f32) -> crate::Result {
        let _ = alpha;
        Err(Error::unimplemented::<Self>(Operation::SetAlpha))
    }
    fn set_cmyk_color(&mut self, c: f32, m: f32, y: f32, k: f32) -> crate::Result {
        let _ = (c, m, y, k);
        Err(Error::unimplemented::<Self>(Operation::SetCmykColor))
    }
    fn set_gray(&mut self, gray: f32) -> crate::Result {
        let _ = gray;
        Err(Error::unimplemented::<Self>(Operation::SetGray))
    }
    /// Set the current color from hue, saturation and brightness, each in `[0, 1]`.
    fn set_hsb_color(&mut self, h: f32, s: f32, b: f32) -> crate::Result {
        let _ = (h, s, b);
        Err(Error::unimplemented::<Self>(Operation::SetHsbColor))
    }
    fn set_rgb_color(&mut self, r: f32, g: f32, b: f32) -> crate::Result {
        let _ = (r, g, b);
        Err(Error::unimplemented::<Self>(Operation::SetRgbColor))
    }
    fn current_alpha(&mut self) -> crate::Result<f32> {
        Err(Error::unimplemented::<Self>(Operation::CurrentAlpha))
    }
    fn current_cmyk_color(&mut self) -> crate::Result<[f32; 4]> {
        Err(Error::unimplemented::<Self>(Operation::CurrentCmykColor))
    }
    fn current_gray(&mut self) -> crate::Result<f32> {
        Err(Error::unimplemented::<Self>(Operation::CurrentGray))
    }
    fn current_hsb_color(&mut self) -> crate::Result<[f32; 3]> {
        Err(Error::unimplemented::<Self>(Operation::CurrentHsbColor))
    }
    fn current_rgb_color(&mut self) -> crate::Result<[f32; 3]> {
        Err(Error::unimplemented::<Self>(Operation::CurrentRgbColor))
    }
    /// Select the colorspace that later `set_fill_color` components are interpreted in.
    fn set_fill_color_space(&mut self, space: &ColorSpace) -> crate::Result {
        let _ = space;
        Err(Error::unimplemented::<Self>(Operation::SetFillColorSpace))
    }
    /// Select the colorspace that later `set_stroke_color` components are interpreted in.
    fn set_stroke_color_space(&mut self, space: &ColorSpace) -> crate::Result {
        let _ = space;
        Err(Error::unimplemented::<Self>(Operation::SetStrokeColorSpace))
    }
    /// Set the fill color from components in the current fill colorspace.
    ///
    /// A trailing extra component, if present, is alpha.
    fn set_fill_color(&mut self, components: &[f32]) -> crate::Result {
        let _ = components;
        Err(Error::unimplemented::<Self>(Operation::SetFillColor))
    }
    /// Set the stroke color from components in the current stroke colorspace.
    fn set_stroke_color(&mut self, components: &[f32]) -> crate::Result {
        let _ = components;
        Err(Error::unimplemented::<Self>(Operation::SetStrokeColor))
    }

    /* Path Construction */

    fn new_path(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::NewPath))
    }
    fn move_to(&mut self, x: f32, y: f32) -> crate::Result {
        let _ = (x, y);
        Err(Error::unimplemented::<Self>(Operation::MoveTo))
    }
    fn line_to(&mut self, x: f32, y: f32) -> crate::Result {
        let _ = (x, y);
        Err(Error::unimplemented::<Self>(Operation::LineTo))
    }
    /// Append a cubic bezier curve with control points `(x1, y1)` and `(x2, y2)` ending at `(x3, y3)`.
    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> crate::Result {
        let _ = (x1, y1, x2, y2, x3, y3);
        Err(Error::unimplemented::<Self>(Operation::CurveTo))
    }
    fn rel_move_to(&mut self, dx: f32, dy: f32) -> crate::Result {
        let _ = (dx, dy);
        Err(Error::unimplemented::<Self>(Operation::RelMoveTo))
    }
    fn rel_line_to(&mut self, dx: f32, dy: f32) -> crate::Result {
        let _ = (dx, dy);
        Err(Error::unimplemented::<Self>(Operation::RelLineTo))
    }
    fn rel_curve_to(
        &mut self,
        dx1: f32,
        dy1: f32,
        dx2: f32,
        dy2: f32,
        dx3: f32,
        dy3: f32,
    ) -> crate::Result {
        let _ = (dx1, dy1, dx2, dy2, dx3, dy3);
        Err(Error::unimplemented::<Self>(Operation::RelCurveTo))
    }
    /// Append a counterclockwise arc. Angles are in degrees.
    fn arc(&mut self, x: f32, y: f32, r: f32, angle1: f32, angle2: f32) -> crate::Result {
        let _ = (x, y, r, angle1, angle2);
        Err(Error::unimplemented::<Self>(Operation::Arc))
    }
    /// Append a clockwise arc. Angles are in degrees.
    fn arcn(&mut self, x: f32, y: f32, r: f32, angle1: f32, angle2: f32) -> crate::Result {
        let _ = (x, y, r, angle1, angle2);
        Err(Error::unimplemented::<Self>(Operation::Arcn))
    }
    /// Append an arc of radius `r` tangent to the lines from the current point to `(x1, y1)` and from
    /// `(x1, y1)` to `(x2, y2)`.
    fn arct(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, r: f32) -> crate::Result {
        let _ = (x1, y1, x2, y2, r);
        Err(Error::unimplemented::<Self>(Operation::Arct))
    }
    fn close_path(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::ClosePath))
    }

    /* Path Painting */

    /// Fill the current path using the nonzero winding rule.
    fn fill(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::Fill))
    }
    /// Fill the current path using the even-odd rule.
    fn eo_fill(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::EoFill))
    }
    fn stroke(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::Stroke))
    }
    /// Intersect the clip with the current path using the nonzero winding rule.
    fn clip(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::Clip))
    }
    /// Intersect the clip with the current path using the even-odd rule.
    fn eo_clip(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::EoClip))
    }
    fn init_clip(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::InitClip))
    }
    fn rect_clip(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result {
        let _ = (x, y, width, height);
        Err(Error::unimplemented::<Self>(Operation::RectClip))
    }
    fn rect_fill(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result {
        let _ = (x, y, width, height);
        Err(Error::unimplemented::<Self>(Operation::RectFill))
    }
    fn rect_stroke(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result {
        let _ = (x, y, width, height);
        Err(Error::unimplemented::<Self>(Operation::RectStroke))
    }
    fn flatten_path(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::FlattenPath))
    }
    fn reverse_path(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::ReversePath))
    }
    /// The bounding box of the current path, in user space.
    fn path_bbox(&mut self) -> crate::Result<Rect<f32>> {
        Err(Error::unimplemented::<Self>(Operation::PathBBox))
    }
    fn current_point(&mut self) -> crate::Result<Point<f32>> {
        Err(Error::unimplemented::<Self>(Operation::CurrentPoint))
    }

    /// Replace the current path with `path` and adopt its line style.
    ///
    /// The default implementation starts a new path, re-asserts line width, join, cap, miter limit,
    /// flatness and the dash pattern (always; an empty pattern resets to a solid line) and then replays the
    /// path's elements as `move_to`, `line_to`, `curve_to` and `close_path` calls. Quadratic segments are
    /// raised to cubics.
    #[inline]
    fn send_path(&mut self, path: &BezierPath) -> crate::Result {
        defaults::send_path(self, path)
    }

    /* Line Style */

    /// Set the dash pattern. An empty pattern means a solid line.
    fn set_dash(&mut self, pattern: &[f32], phase: f32) -> crate::Result {
        let _ = (pattern, phase);
        Err(Error::unimplemented::<Self>(Operation::SetDash))
    }
    fn set_line_width(&mut self, width: f32) -> crate::Result {
        let _ = width;
        Err(Error::unimplemented::<Self>(Operation::SetLineWidth))
    }
    fn set_line_join(&mut self, join: LineJoin) -> crate::Result {
        let _ = join;
        Err(Error::unimplemented::<Self>(Operation::SetLineJoin))
    }
    fn set_line_cap(&mut self, cap: LineCap) -> crate::Result {
        let _ = cap;
        Err(Error::unimplemented::<Self>(Operation::SetLineCap))
    }
    fn set_miter_limit(&mut self, limit: f32) -> crate::Result {
        let _ = limit;
        Err(Error::unimplemented::<Self>(Operation::SetMiterLimit))
    }
    fn set_flatness(&mut self, flatness: f32) -> crate::Result {
        let _ = flatness;
        Err(Error::unimplemented::<Self>(Operation::SetFlatness))
    }
    fn set_stroke_adjust(&mut self, adjust: bool) -> crate::Result {
        let _ = adjust;
        Err(Error::unimplemented::<Self>(Operation::SetStrokeAdjust))
    }
    fn current_line_width(&mut self) -> crate::Result<f32> {
        Err(Error::unimplemented::<Self>(Operation::CurrentLineWidth))
    }

    /* Transforms */

    /// Concatenate a raw `[a b c d tx ty]` matrix onto the current transform.
    fn concat(&mut self, matrix: [f32; 6]) -> crate::Result {
        let _ = matrix;
        Err(Error::unimplemented::<Self>(Operation::Concat))
    }
    /// Rotate user space. The angle is in degrees.
    fn rotate(&mut self, angle: f32) -> crate::Result {
        let _ = angle;
        Err(Error::unimplemented::<Self>(Operation::Rotate))
    }
    fn scale(&mut self, x: f32, y: f32) -> crate::Result {
        let _ = (x, y);
        Err(Error::unimplemented::<Self>(Operation::Scale))
    }
    fn translate(&mut self, x: f32, y: f32) -> crate::Result {
        let _ = (x, y);
        Err(Error::unimplemented::<Self>(Operation::Translate))
    }
    fn init_matrix(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::InitMatrix))
    }
    fn current_matrix(&mut self) -> crate::Result<Transform<f32>> {
        Err(Error::unimplemented::<Self>(Operation::CurrentMatrix))
    }
    fn set_matrix(&mut self, matrix: &Transform<f32>) -> crate::Result {
        let _ = matrix;
        Err(Error::unimplemented::<Self>(Operation::SetMatrix))
    }
    fn concat_matrix(&mut self, matrix: &Transform<f32>) -> crate::Result {
        let _ = matrix;
        Err(Error::unimplemented::<Self>(Operation::ConcatMatrix))
    }

    /* Text */

    /// Set the matrix that maps text space to user space.
    fn set_text_matrix(&mut self, matrix: &Transform<f32>) -> crate::Result {
        let _ = matrix;
        Err(Error::unimplemented::<Self>(Operation::SetTextMatrix))
    }
    fn text_matrix(&mut self) -> crate::Result<Transform<f32>> {
        Err(Error::unimplemented::<Self>(Operation::TextMatrix))
    }
    fn set_text_position(&mut self, position: Point<f32>) -> crate::Result {
        let _ = position;
        Err(Error::unimplemented::<Self>(Operation::SetTextPosition))
    }
    fn text_position(&mut self) -> crate::Result<Point<f32>> {
        Err(Error::unimplemented::<Self>(Operation::TextPosition))
    }
    /// Draw a string at the text position in the current font.
    fn show(&mut self, text: &str) -> crate::Result {
        let _ = text;
        Err(Error::unimplemented::<Self>(Operation::Show))
    }
    /// Draw a run of glyphs at the text position.
    ///
    /// If `advances` is given it holds one advance per glyph and overrides the font's metrics.
    fn show_glyphs(&mut self, glyphs: &[Glyph], advances: Option<&[Size<f32>]>) -> crate::Result {
        let _ = (glyphs, advances);
        Err(Error::unimplemented::<Self>(Operation::ShowGlyphs))
    }
    fn set_char_spacing(&mut self, spacing: f32) -> crate::Result {
        let _ = spacing;
        Err(Error::unimplemented::<Self>(Operation::SetCharSpacing))
    }
    fn set_text_drawing_mode(&mut self, mode: TextDrawingMode) -> crate::Result {
        let _ = mode;
        Err(Error::unimplemented::<Self>(Operation::SetTextDrawingMode))
    }
    fn set_font(&mut self, font: &Font) -> crate::Result {
        let _ = font;
        Err(Error::unimplemented::<Self>(Operation::SetFont))
    }

    /* Graphics States */

    /// Push a snapshot of the graphics state.
    fn gsave(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::GSave))
    }
    /// Pop the snapshot pushed by the matching `gsave`.
    fn grestore(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::GRestore))
    }
    fn init_graphics(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::InitGraphics))
    }
    /// Store a copy of the current graphics state and return a tag naming it.
    fn define_gstate(&mut self) -> crate::Result<GStateTag> {
        Err(Error::unimplemented::<Self>(Operation::DefineGState))
    }
    /// Overwrite the state named by `tag` with the current graphics state.
    fn replace_gstate(&mut self, tag: GStateTag) -> crate::Result {
        let _ = tag;
        Err(Error::unimplemented::<Self>(Operation::ReplaceGState))
    }
    fn undefine_gstate(&mut self, tag: GStateTag) -> crate::Result {
        let _ = tag;
        Err(Error::unimplemented::<Self>(Operation::UndefineGState))
    }
    /// Make the state named by `tag` current.
    fn set_gstate(&mut self, tag: GStateTag) -> crate::Result {
        let _ = tag;
        Err(Error::unimplemented::<Self>(Operation::SetGState))
    }

    /* Devices */

    /// Bind the backend to a device with the drawing origin at pixel offset `(x, y)`.
    fn set_device(&mut self, device: DeviceHandle, x: i32, y: i32) -> crate::Result {
        let _ = (device, x, y);
        Err(Error::unimplemented::<Self>(Operation::SetDevice))
    }
    fn current_device(&mut self) -> crate::Result<DeviceBinding> {
        Err(Error::unimplemented::<Self>(Operation::CurrentDevice))
    }

    /* Compositing and Images */

    /// Composite `rect` of the graphics state named `source` onto the current state at `point`.
    fn composite_gstate(
        &mut self,
        source: GStateTag,
        rect: Rect<f32>,
        point: Point<f32>,
        op: CompositingOperation,
        fraction: f32,
    ) -> crate::Result {
        let _ = (source, rect, point, op, fraction);
        Err(Error::unimplemented::<Self>(Operation::CompositeGState))
    }
    /// Draw raw bitmap samples scaled into `rect`.
    fn draw_bitmap(&mut self, rect: Rect<f32>, bitmap: &Bitmap<'_>) -> crate::Result {
        let _ = (rect, bitmap);
        Err(Error::unimplemented::<Self>(Operation::DrawBitmap))
    }

    /* Client Output */

    /// Write formatted text straight to the output stream. Only meaningful for streaming backends.
    fn write_formatted(&mut self, args: fmt::Arguments<'_>) -> crate::Result {
        let _ = args;
        Err(Error::unimplemented::<Self>(Operation::WriteFormatted))
    }
    /// Write raw bytes straight to the output stream. Only meaningful for streaming backends.
    fn write_data(&mut self, data: &[u8]) -> crate::Result {
        let _ = data;
        Err(Error::unimplemented::<Self>(Operation::WriteData))
    }

    /* Miscellaneous */

    /// Push all pending drawing down to the device.
    fn flush(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::Flush))
    }
    /// Emit the current page.
    fn show_page(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::ShowPage))
    }
    /// Ring the audible alert.
    fn beep(&mut self) -> crate::Result {
        Err(Error::unimplemented::<Self>(Operation::Beep))
    }
}

/// A backend that can be constructed from context attributes, and therefore registered as the default.
pub trait FromAttributes: Backend + Sized {
    fn from_attributes(attributes: &Attributes) -> crate::Result<Self>;
}
