// MIT/Apache2 License

//! A backend that writes PostScript.
//!
//! [`PostScriptBackend`] turns drawing operations into Level 2 operators on any [`Write`] stream, which
//! makes it the natural sink for print jobs. Since the output cannot be queried, it keeps its own copy of
//! the graphics state and answers the `current_*` operations from that.

use crate::{
    Attributes, Backend, Bitmap, Color, ColorSpace, DeviceBinding, DeviceHandle, Destination, Error,
    Font, FromAttributes, GStateTag, Glyph, LineCap, LineJoin, Operation, Rect, TextDrawingMode,
};
use lyon_geom::{Angle, Point, Size, Transform, Vector};
use std::{
    collections::HashMap,
    fmt::{self, Write as _},
    fs::File,
    io::{self, BufWriter, Write},
};

mod state;

use state::PsState;

/// A PostScript backend writing to a file.
pub type PostScriptFile = PostScriptBackend<BufWriter<File>>;

/// A backend that emits PostScript to a stream.
pub struct PostScriptBackend<W: Write + 'static> {
    out: W,
    state: PsState,
    saved: Vec<PsState>,
    gstates: HashMap<GStateTag, PsState>,
    next_gstate: GStateTag,
    device: DeviceBinding,
}

impl<W: Write + 'static> PostScriptBackend<W> {
    #[inline]
    pub fn new(out: W) -> Self {
        Self {
            out,
            state: PsState::default(),
            saved: Vec::new(),
            gstates: HashMap::new(),
            next_gstate: 1,
            device: DeviceBinding::default(),
        }
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    #[inline]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Make sure the interpreter's color is `color` before painting with it.
    fn use_color(&mut self, color: Color) -> crate::Result {
        if self.state.active != color {
            let [r, g, b] = color.rgb();
            writeln!(self.out, "{} {} {} setrgbcolor", r, g, b)?;
            self.state.active = color;
        }
        Ok(())
    }

    fn use_fill(&mut self) -> crate::Result {
        self.use_color(self.state.fill)
    }

    fn use_stroke(&mut self) -> crate::Result {
        self.use_color(self.state.stroke)
    }

    fn current(&self) -> crate::Result<Point<f32>> {
        self.state.path.current.ok_or(Error::InvalidState(
            "nocurrentpoint: the path is empty",
        ))
    }

    fn gstate(&self, tag: GStateTag) -> crate::Result<&PsState> {
        self.gstates.get(&tag).ok_or(Error::UnknownGState(tag))
    }

    /// Record an arc in the path state. Angles are in degrees; the end point becomes current.
    fn track_arc(&mut self, center: Point<f32>, r: f32, angle1: f32, angle2: f32) {
        let on_circle = |deg: f32| {
            let (sin, cos) = Angle::degrees(deg).radians.sin_cos();
            Point::new(center.x + r * cos, center.y + r * sin)
        };

        let start = self.state.to_device(on_circle(angle1));
        let end = self.state.to_device(on_circle(angle2));
        match self.state.path.current {
            Some(_) => self.state.path.advance(start),
            None => self.state.path.start(start),
        }

        // the whole circle; a loose box is fine, as for curve control points
        for corner in [
            Point::new(center.x - r, center.y - r),
            Point::new(center.x + r, center.y - r),
            Point::new(center.x + r, center.y + r),
            Point::new(center.x - r, center.y + r),
        ] {
            let corner = self.state.to_device(corner);
            self.state.path.include(corner);
        }
        self.state.path.advance(end);
    }

    fn write_matrix(&mut self, m: &Transform<f32>) -> io::Result<()> {
        write!(
            self.out,
            "[{} {} {} {} {} {}]",
            m.m11, m.m12, m.m21, m.m22, m.m31, m.m32
        )
    }

    /// Paint a run of character codes at the text position in the current text mode.
    ///
    /// Fill mode uses the show operator matching `placement`. The outline modes build the glyph outlines
    /// with `charpath` one glyph at a time when the run is not naturally spaced, since `charpath` takes
    /// no spacing of its own.
    fn paint_text(&mut self, codes: &[u8], hex: bool, placement: Placement<'_>) -> crate::Result {
        match self.state.text_mode {
            TextDrawingMode::Invisible => return Ok(()),
            TextDrawingMode::Stroke => self.use_stroke()?,
            _ => self.use_fill()?,
        }

        // text is painted inside its own gsave so the current path is left alone
        let text_matrix = self.state.text_matrix;
        let position = self.state.text_position;
        write!(self.out, "gsave ")?;
        if text_matrix != Transform::identity() {
            self.write_matrix(&text_matrix)?;
            write!(self.out, " concat ")?;
        }
        write!(self.out, "{} {} moveto ", position.x, position.y)?;

        let outline = matches!(
            self.state.text_mode,
            TextDrawingMode::Stroke | TextDrawingMode::FillStroke
        );

        if !outline {
            let literal = string_literal(codes, hex);
            match placement {
                Placement::Natural => write!(self.out, "{} show", literal)?,
                Placement::Spaced(spacing) => write!(self.out, "{} 0 {} ashow", spacing, literal)?,
                Placement::Advanced(advances) => {
                    write!(self.out, "{} [", literal)?;
                    for (i, advance) in advances.iter().enumerate() {
                        if i > 0 {
                            write!(self.out, " ")?;
                        }
                        write!(self.out, "{} {}", advance.width, advance.height)?;
                    }
                    write!(self.out, "] xyshow")?;
                }
            }
            writeln!(self.out, " grestore")?;
            return Ok(());
        }

        match placement {
            Placement::Natural => {
                write!(self.out, "{} false charpath", string_literal(codes, hex))?
            }
            Placement::Spaced(spacing) => {
                for (i, code) in codes.iter().enumerate() {
                    if i > 0 {
                        write!(self.out, " {} 0 rmoveto ", spacing)?;
                    }
                    write!(
                        self.out,
                        "{} false charpath",
                        string_literal(std::slice::from_ref(code), hex)
                    )?;
                }
            }
            Placement::Advanced(advances) => {
                let mut origin = position;
                for (i, code) in codes.iter().enumerate() {
                    if i > 0 {
                        write!(self.out, " {} {} moveto ", origin.x, origin.y)?;
                    }
                    write!(
                        self.out,
                        "{} false charpath",
                        string_literal(std::slice::from_ref(code), hex)
                    )?;
                    if let Some(advance) = advances.get(i) {
                        origin += Vector::new(advance.width, advance.height);
                    }
                }
            }
        }

        if let TextDrawingMode::FillStroke = self.state.text_mode {
            write!(self.out, " gsave fill grestore")?;
            if self.state.stroke != self.state.fill {
                let [r, g, b] = self.state.stroke.rgb();
                write!(self.out, " {} {} {} setrgbcolor", r, g, b)?;
            }
        }
        writeln!(self.out, " stroke grestore")?;
        Ok(())
    }
}

/// How the glyphs of a text run are spaced.
#[derive(Debug, Clone, Copy)]
enum Placement<'a> {
    /// By the font's own widths.
    Natural,
    /// By the font's widths plus a fixed horizontal amount.
    Spaced(f32),
    /// By one explicit advance per glyph.
    Advanced(&'a [Size<f32>]),
}

impl<W: Write + 'static> fmt::Debug for PostScriptBackend<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostScriptBackend")
            .field("state", &self.state)
            .field("depth", &self.saved.len())
            .field("gstates", &self.gstates.len())
            .finish()
    }
}

impl FromAttributes for PostScriptFile {
    fn from_attributes(attributes: &Attributes) -> crate::Result<Self> {
        match attributes.destination() {
            Some(Destination::Stream(path)) => {
                log::debug!("Opening PostScript output at {}", path.display());
                let file = File::create(path)?;
                Ok(PostScriptBackend::new(BufWriter::new(file)))
            }
            other => Err(Error::InvalidAttributes(format!(
                "PostScript output needs a stream destination, got {:?}",
                other
            ))),
        }
    }
}

/// Encode character codes as a PostScript string literal, either hex or escaped.
fn string_literal(codes: &[u8], hex: bool) -> String {
    let mut literal = String::with_capacity(codes.len() * 2 + 2);
    if hex {
        literal.push('<');
        for code in codes {
            let _ = write!(literal, "{:02X}", code);
        }
        literal.push('>');
        return literal;
    }

    literal.push('(');
    for &byte in codes {
        match byte {
            b'(' | b')' | b'\\' => {
                literal.push('\\');
                literal.push(byte as char);
            }
            0x20..=0x7e => literal.push(byte as char),
            _ => {
                let _ = write!(literal, "\\{:03o}", byte);
            }
        }
    }
    literal.push(')');
    literal
}

/// The device colorspace family `space` paints in, with its PostScript name.
///
/// Named spaces must be one of the device families, since those are the only ones `setcolorspace`
/// accepts as a bare name.
fn device_space(space: &ColorSpace) -> crate::Result<(ColorSpace, &'static str)> {
    let gray = (ColorSpace::DeviceGray, "DeviceGray");
    let rgb = (ColorSpace::DeviceRgb, "DeviceRGB");
    let cmyk = (ColorSpace::DeviceCmyk, "DeviceCMYK");

    match space {
        ColorSpace::DeviceGray | ColorSpace::CalibratedWhite => Ok(gray),
        ColorSpace::DeviceRgb | ColorSpace::CalibratedRgb => Ok(rgb),
        ColorSpace::DeviceCmyk => Ok(cmyk),
        ColorSpace::Named(name) => match name.as_str() {
            "DeviceGray" => Ok(gray),
            "DeviceRGB" => Ok(rgb),
            "DeviceCMYK" => Ok(cmyk),
            _ => Err(Error::Msg(format!(
                "{} is not a PostScript colorspace family",
                name
            ))),
        },
    }
}

fn to_color(space: &ColorSpace, components: &[f32]) -> crate::Result<Color> {
    space.to_color(components).ok_or_else(|| {
        Error::Msg(format!(
            "{} components do not describe a color in {:?}",
            components.len(),
            space
        ))
    })
}

/// Collect the color samples of an 8-bit bitmap in meshed order, dropping alpha.
fn meshed_samples(bitmap: &Bitmap<'_>) -> crate::Result<Vec<u8>> {
    const SHORT: Error = Error::StaticMsg("bitmap data is shorter than its geometry");

    let wide = bitmap.pixels_wide as usize;
    let high = bitmap.pixels_high as usize;
    let spp = bitmap.samples_per_pixel as usize;
    let colors = bitmap.color_samples() as usize;
    let row = bitmap.bytes_per_row as usize;

    let mut samples = Vec::with_capacity(wide * high * colors);
    for y in 0..high {
        for x in 0..wide {
            for s in 0..colors {
                let byte = if bitmap.is_planar {
                    bitmap
                        .data
                        .get(s)
                        .and_then(|plane| plane.get(y * row + x))
                } else {
                    bitmap
                        .data
                        .first()
                        .and_then(|plane| plane.get(y * row + x * spp + s))
                };
                samples.push(*byte.ok_or(SHORT)?);
            }
        }
    }
    Ok(samples)
}

/// Collect the rows of a meshed bitmap without alpha, dropping row padding.
fn packed_rows(bitmap: &Bitmap<'_>) -> crate::Result<Vec<u8>> {
    let bits = bitmap.pixels_wide as usize
        * bitmap.samples_per_pixel as usize
        * bitmap.bits_per_sample as usize;
    let used = (bits + 7) / 8;
    let row = bitmap.bytes_per_row as usize;
    let plane = bitmap.data.first().copied().unwrap_or(&[]);

    let mut samples = Vec::with_capacity(used * bitmap.pixels_high as usize);
    for y in 0..bitmap.pixels_high as usize {
        let start = y * row;
        let line = plane
            .get(start..start + used)
            .ok_or(Error::StaticMsg("bitmap data is shorter than its geometry"))?;
        samples.extend_from_slice(line);
    }
    Ok(samples)
}

impl<W: Write + 'static> Backend for PostScriptBackend<W> {
    /* Color */

    fn set_alpha(&mut self, alpha: f32) -> crate::Result {
        // Level 2 has no alpha; it is only mirrored for queries
        let fill = self.state.fill.with_alpha(alpha);
        let stroke = self.state.stroke.with_alpha(alpha);
        self.state.fill = fill;
        self.state.stroke = stroke;
        self.state.active = self.state.active.with_alpha(alpha);
        Ok(())
    }

    fn set_cmyk_color(&mut self, c: f32, m: f32, y: f32, k: f32) -> crate::Result {
        writeln!(self.out, "{} {} {} {} setcmykcolor", c, m, y, k)?;
        let alpha = self.state.fill.alpha();
        self.state
            .set_color(Color::from_cmyk(c, m, y, k).with_alpha(alpha));
        Ok(())
    }

    fn set_gray(&mut self, gray: f32) -> crate::Result {
        writeln!(self.out, "{} setgray", gray)?;
        let alpha = self.state.fill.alpha();
        self.state.set_color(Color::from_gray(gray).with_alpha(alpha));
        Ok(())
    }

    fn set_hsb_color(&mut self, h: f32, s: f32, b: f32) -> crate::Result {
        writeln!(self.out, "{} {} {} sethsbcolor", h, s, b)?;
        let alpha = self.state.fill.alpha();
        self.state.set_color(Color::from_hsb(h, s, b).with_alpha(alpha));
        Ok(())
    }

    fn set_rgb_color(&mut self, r: f32, g: f32, b: f32) -> crate::Result {
        writeln!(self.out, "{} {} {} setrgbcolor", r, g, b)?;
        let alpha = self.state.fill.alpha();
        self.state.set_color(Color::from_rgb(r, g, b).with_alpha(alpha));
        Ok(())
    }

    fn current_alpha(&mut self) -> crate::Result<f32> {
        Ok(self.state.fill.alpha())
    }

    fn current_cmyk_color(&mut self) -> crate::Result<[f32; 4]> {
        Ok(self.state.fill.cmyk())
    }

    fn current_gray(&mut self) -> crate::Result<f32> {
        Ok(self.state.fill.gray())
    }

    fn current_hsb_color(&mut self) -> crate::Result<[f32; 3]> {
        Ok(self.state.fill.hsb())
    }

    fn current_rgb_color(&mut self) -> crate::Result<[f32; 3]> {
        Ok(self.state.fill.rgb())
    }

    fn set_fill_color_space(&mut self, space: &ColorSpace) -> crate::Result {
        let (space, name) = device_space(space)?;
        writeln!(self.out, "/{} setcolorspace", name)?;
        self.state.fill_space = space;
        // setcolorspace leaves the interpreter painting in the space's initial color
        self.state.active = Color::black();
        Ok(())
    }

    fn set_stroke_color_space(&mut self, space: &ColorSpace) -> crate::Result {
        // one colorspace per state in PostScript; it is selected again when stroking
        let (space, _) = device_space(space)?;
        self.state.stroke_space = space;
        Ok(())
    }

    fn set_fill_color(&mut self, components: &[f32]) -> crate::Result {
        let color = to_color(&self.state.fill_space, components)?;
        self.state.fill = color;
        Ok(())
    }

    fn set_stroke_color(&mut self, components: &[f32]) -> crate::Result {
        let color = to_color(&self.state.stroke_space, components)?;
        self.state.stroke = color;
        Ok(())
    }

    /* Path Construction */

    fn new_path(&mut self) -> crate::Result {
        writeln!(self.out, "newpath")?;
        self.state.path.clear();
        Ok(())
    }

    fn move_to(&mut self, x: f32, y: f32) -> crate::Result {
        writeln!(self.out, "{} {} moveto", x, y)?;
        let p = self.state.to_device(Point::new(x, y));
        self.state.path.start(p);
        Ok(())
    }

    fn line_to(&mut self, x: f32, y: f32) -> crate::Result {
        self.current()?;
        writeln!(self.out, "{} {} lineto", x, y)?;
        let p = self.state.to_device(Point::new(x, y));
        self.state.path.advance(p);
        Ok(())
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> crate::Result {
        self.current()?;
        writeln!(
            self.out,
            "{} {} {} {} {} {} curveto",
            x1, y1, x2, y2, x3, y3
        )?;
        let c1 = self.state.to_device(Point::new(x1, y1));
        let c2 = self.state.to_device(Point::new(x2, y2));
        let end = self.state.to_device(Point::new(x3, y3));
        self.state.path.include(c1);
        self.state.path.include(c2);
        self.state.path.advance(end);
        Ok(())
    }

    fn rel_move_to(&mut self, dx: f32, dy: f32) -> crate::Result {
        let from = self.current()?;
        writeln!(self.out, "{} {} rmoveto", dx, dy)?;
        let p = from + self.state.vector_to_device(Vector::new(dx, dy));
        self.state.path.start(p);
        Ok(())
    }

    fn rel_line_to(&mut self, dx: f32, dy: f32) -> crate::Result {
        let from = self.current()?;
        writeln!(self.out, "{} {} rlineto", dx, dy)?;
        let p = from + self.state.vector_to_device(Vector::new(dx, dy));
        self.state.path.advance(p);
        Ok(())
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
        let from = self.current()?;
        writeln!(
            self.out,
            "{} {} {} {} {} {} rcurveto",
            dx1, dy1, dx2, dy2, dx3, dy3
        )?;
        for (dx, dy) in [(dx1, dy1), (dx2, dy2)] {
            let c = from + self.state.vector_to_device(Vector::new(dx, dy));
            self.state.path.include(c);
        }
        let end = from + self.state.vector_to_device(Vector::new(dx3, dy3));
        self.state.path.advance(end);
        Ok(())
    }

    fn arc(&mut self, x: f32, y: f32, r: f32, angle1: f32, angle2: f32) -> crate::Result {
        writeln!(self.out, "{} {} {} {} {} arc", x, y, r, angle1, angle2)?;
        self.track_arc(Point::new(x, y), r, angle1, angle2);
        Ok(())
    }

    fn arcn(&mut self, x: f32, y: f32, r: f32, angle1: f32, angle2: f32) -> crate::Result {
        writeln!(self.out, "{} {} {} {} {} arcn", x, y, r, angle1, angle2)?;
        self.track_arc(Point::new(x, y), r, angle1, angle2);
        Ok(())
    }

    fn arct(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, r: f32) -> crate::Result {
        let from = self.state.to_user(self.current()?)?;
        writeln!(self.out, "{} {} {} {} {} arct", x1, y1, x2, y2, r)?;

        let corner = Point::new(x1, y1);
        let to_start = (from - corner).normalize();
        let to_end = (Point::new(x2, y2) - corner).normalize();
        let cos = to_start.dot(to_end).clamp(-1.0, 1.0);
        let half = cos.acos() / 2.0;

        // collinear points degenerate to a line to the corner
        let end = if !half.is_finite() || half.tan().abs() < f32::EPSILON {
            corner
        } else {
            corner + to_end * (r / half.tan())
        };

        let corner = self.state.to_device(corner);
        let end = self.state.to_device(end);
        self.state.path.include(corner);
        self.state.path.advance(end);
        Ok(())
    }

    fn close_path(&mut self) -> crate::Result {
        writeln!(self.out, "closepath")?;
        self.state.path.close();
        Ok(())
    }

    /* Path Painting */

    fn fill(&mut self) -> crate::Result {
        self.use_fill()?;
        writeln!(self.out, "fill")?;
        self.state.path.clear();
        Ok(())
    }

    fn eo_fill(&mut self) -> crate::Result {
        self.use_fill()?;
        writeln!(self.out, "eofill")?;
        self.state.path.clear();
        Ok(())
    }

    fn stroke(&mut self) -> crate::Result {
        self.use_stroke()?;
        writeln!(self.out, "stroke")?;
        self.state.path.clear();
        Ok(())
    }

    fn clip(&mut self) -> crate::Result {
        writeln!(self.out, "clip")?;
        Ok(())
    }

    fn eo_clip(&mut self) -> crate::Result {
        writeln!(self.out, "eoclip")?;
        Ok(())
    }

    fn init_clip(&mut self) -> crate::Result {
        writeln!(self.out, "initclip")?;
        Ok(())
    }

    fn rect_clip(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result {
        writeln!(self.out, "{} {} {} {} rectclip", x, y, width, height)?;
        self.state.path.clear();
        Ok(())
    }

    fn rect_fill(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result {
        self.use_fill()?;
        writeln!(self.out, "{} {} {} {} rectfill", x, y, width, height)?;
        Ok(())
    }

    fn rect_stroke(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result {
        self.use_stroke()?;
        writeln!(self.out, "{} {} {} {} rectstroke", x, y, width, height)?;
        Ok(())
    }

    fn flatten_path(&mut self) -> crate::Result {
        writeln!(self.out, "flattenpath")?;
        Ok(())
    }

    fn reverse_path(&mut self) -> crate::Result {
        writeln!(self.out, "reversepath")?;
        let path = &mut self.state.path;
        std::mem::swap(&mut path.current, &mut path.subpath_start);
        Ok(())
    }

    fn path_bbox(&mut self) -> crate::Result<Rect<f32>> {
        self.state.path_bbox()
    }

    fn current_point(&mut self) -> crate::Result<Point<f32>> {
        self.state.current_point()
    }

    /* Line Style */

    fn set_dash(&mut self, pattern: &[f32], phase: f32) -> crate::Result {
        write!(self.out, "[")?;
        for (i, length) in pattern.iter().enumerate() {
            if i > 0 {
                write!(self.out, " ")?;
            }
            write!(self.out, "{}", length)?;
        }
        writeln!(self.out, "] {} setdash", phase)?;
        Ok(())
    }

    fn set_line_width(&mut self, width: f32) -> crate::Result {
        writeln!(self.out, "{} setlinewidth", width)?;
        self.state.line_width = width;
        Ok(())
    }

    fn set_line_join(&mut self, join: LineJoin) -> crate::Result {
        writeln!(self.out, "{} setlinejoin", join.ps_code())?;
        Ok(())
    }

    fn set_line_cap(&mut self, cap: LineCap) -> crate::Result {
        writeln!(self.out, "{} setlinecap", cap.ps_code())?;
        Ok(())
    }

    fn set_miter_limit(&mut self, limit: f32) -> crate::Result {
        writeln!(self.out, "{} setmiterlimit", limit)?;
        Ok(())
    }

    fn set_flatness(&mut self, flatness: f32) -> crate::Result {
        writeln!(self.out, "{} setflat", flatness)?;
        Ok(())
    }

    fn set_stroke_adjust(&mut self, adjust: bool) -> crate::Result {
        writeln!(self.out, "{} setstrokeadjust", adjust)?;
        Ok(())
    }

    fn current_line_width(&mut self) -> crate::Result<f32> {
        Ok(self.state.line_width)
    }

    /* Transforms */

    fn concat(&mut self, matrix: [f32; 6]) -> crate::Result {
        let [a, b, c, d, tx, ty] = matrix;
        self.concat_matrix(&Transform::new(a, b, c, d, tx, ty))
    }

    fn rotate(&mut self, angle: f32) -> crate::Result {
        writeln!(self.out, "{} rotate", angle)?;
        self.state.ctm = Transform::rotation(Angle::degrees(angle)).then(&self.state.ctm);
        Ok(())
    }

    fn scale(&mut self, x: f32, y: f32) -> crate::Result {
        writeln!(self.out, "{} {} scale", x, y)?;
        self.state.ctm = Transform::scale(x, y).then(&self.state.ctm);
        Ok(())
    }

    fn translate(&mut self, x: f32, y: f32) -> crate::Result {
        writeln!(self.out, "{} {} translate", x, y)?;
        self.state.ctm = Transform::translation(x, y).then(&self.state.ctm);
        Ok(())
    }

    fn init_matrix(&mut self) -> crate::Result {
        writeln!(self.out, "initmatrix")?;
        self.state.ctm = Transform::identity();
        Ok(())
    }

    fn current_matrix(&mut self) -> crate::Result<Transform<f32>> {
        Ok(self.state.ctm)
    }

    fn set_matrix(&mut self, matrix: &Transform<f32>) -> crate::Result {
        self.write_matrix(matrix)?;
        writeln!(self.out, " setmatrix")?;
        self.state.ctm = *matrix;
        Ok(())
    }

    fn concat_matrix(&mut self, matrix: &Transform<f32>) -> crate::Result {
        self.write_matrix(matrix)?;
        writeln!(self.out, " concat")?;
        self.state.ctm = matrix.then(&self.state.ctm);
        Ok(())
    }

    /* Text */

    fn set_text_matrix(&mut self, matrix: &Transform<f32>) -> crate::Result {
        self.state.text_matrix = *matrix;
        Ok(())
    }

    fn text_matrix(&mut self) -> crate::Result<Transform<f32>> {
        Ok(self.state.text_matrix)
    }

    fn set_text_position(&mut self, position: Point<f32>) -> crate::Result {
        self.state.text_position = position;
        Ok(())
    }

    fn text_position(&mut self) -> crate::Result<Point<f32>> {
        Ok(self.state.text_position)
    }

    fn show(&mut self, text: &str) -> crate::Result {
        let placement = if self.state.char_spacing == 0.0 {
            Placement::Natural
        } else {
            Placement::Spaced(self.state.char_spacing)
        };
        self.paint_text(text.as_bytes(), false, placement)
    }

    /// Glyphs are single-byte character codes in the encoding of the font selected with `set_font`,
    /// which is what `findfont` base fonts address. Larger glyph numbers are an error.
    fn show_glyphs(&mut self, glyphs: &[Glyph], advances: Option<&[Size<f32>]>) -> crate::Result {
        let codes = glyphs
            .iter()
            .map(|&glyph| {
                u8::try_from(glyph).map_err(|_| {
                    Error::Msg(format!("glyph {} is not a single-byte character code", glyph))
                })
            })
            .collect::<crate::Result<Vec<u8>>>()?;

        match advances {
            None => self.paint_text(&codes, true, Placement::Natural),
            Some(advances) if advances.len() == glyphs.len() => {
                self.paint_text(&codes, true, Placement::Advanced(advances))
            }
            Some(advances) => Err(Error::Msg(format!(
                "{} advances given for {} glyphs",
                advances.len(),
                glyphs.len()
            ))),
        }
    }

    fn set_char_spacing(&mut self, spacing: f32) -> crate::Result {
        self.state.char_spacing = spacing;
        Ok(())
    }

    fn set_text_drawing_mode(&mut self, mode: TextDrawingMode) -> crate::Result {
        match mode {
            TextDrawingMode::Fill
            | TextDrawingMode::Stroke
            | TextDrawingMode::FillStroke
            | TextDrawingMode::Invisible => {
                self.state.text_mode = mode;
                Ok(())
            }
            _ => {
                log::warn!("Text clipping mode {:?} cannot be expressed as PostScript", mode);
                Err(Error::unimplemented::<Self>(Operation::SetTextDrawingMode))
            }
        }
    }

    fn set_font(&mut self, font: &Font) -> crate::Result {
        writeln!(
            self.out,
            "/{} findfont {} scalefont setfont",
            font.name, font.size
        )?;
        self.state.font = Some(font.clone());
        Ok(())
    }

    /* Graphics States */

    fn gsave(&mut self) -> crate::Result {
        writeln!(self.out, "gsave")?;
        self.saved.push(self.state.clone());
        Ok(())
    }

    fn grestore(&mut self) -> crate::Result {
        let state = self
            .saved
            .pop()
            .ok_or(Error::InvalidState("grestore without a matching gsave"))?;
        writeln!(self.out, "grestore")?;
        self.state = state;
        Ok(())
    }

    fn init_graphics(&mut self) -> crate::Result {
        writeln!(self.out, "initgraphics")?;
        let font = self.state.font.take();
        self.state = PsState {
            font,
            ..PsState::default()
        };
        Ok(())
    }

    fn define_gstate(&mut self) -> crate::Result<GStateTag> {
        let tag = self.next_gstate;
        writeln!(self.out, "/gstate{} gstate def", tag)?;
        self.next_gstate += 1;
        self.gstates.insert(tag, self.state.clone());
        log::trace!("Defined graphics state {}", tag);
        Ok(tag)
    }

    fn replace_gstate(&mut self, tag: GStateTag) -> crate::Result {
        self.gstate(tag)?;
        writeln!(self.out, "gstate{} currentgstate pop", tag)?;
        self.gstates.insert(tag, self.state.clone());
        Ok(())
    }

    fn undefine_gstate(&mut self, tag: GStateTag) -> crate::Result {
        self.gstate(tag)?;
        writeln!(self.out, "userdict /gstate{} undef", tag)?;
        self.gstates.remove(&tag);
        Ok(())
    }

    fn set_gstate(&mut self, tag: GStateTag) -> crate::Result {
        let state = self.gstate(tag)?.clone();
        writeln!(self.out, "gstate{} setgstate", tag)?;
        self.state = state;
        Ok(())
    }

    /* Devices */

    fn set_device(&mut self, device: DeviceHandle, x: i32, y: i32) -> crate::Result {
        // a stream has no device of its own, the binding is only remembered
        log::debug!("Binding PostScript output to {:?} at ({}, {})", device, x, y);
        self.device = DeviceBinding {
            device: Some(device),
            x,
            y,
        };
        Ok(())
    }

    fn current_device(&mut self) -> crate::Result<DeviceBinding> {
        Ok(self.device)
    }

    /* Images */

    fn draw_bitmap(&mut self, rect: Rect<f32>, bitmap: &Bitmap<'_>) -> crate::Result {
        let colors = bitmap.color_samples();
        if !matches!(colors, 1 | 3 | 4) {
            return Err(Error::Msg(format!(
                "cannot draw a bitmap with {} color samples in {}",
                colors, bitmap.color_space_name
            )));
        }

        let samples = if bitmap.has_alpha || bitmap.is_planar {
            if bitmap.bits_per_sample != 8 {
                return Err(Error::StaticMsg(
                    "only 8-bit bitmaps can be planar or carry alpha",
                ));
            }
            meshed_samples(bitmap)?
        } else {
            packed_rows(bitmap)?
        };

        let (wide, high) = (bitmap.pixels_wide, bitmap.pixels_high);
        writeln!(self.out, "gsave")?;
        writeln!(
            self.out,
            "{} {} translate {} {} scale",
            rect.origin.x, rect.origin.y, rect.size.width, rect.size.height
        )?;
        // the samples follow inline, so no single string has to hold them all
        write!(
            self.out,
            "{} {} {} [{} 0 0 -{} 0 {}] currentfile /ASCIIHexDecode filter ",
            wide, high, bitmap.bits_per_sample, wide, high, high
        )?;
        if colors == 1 {
            writeln!(self.out, "image")?;
        } else {
            writeln!(self.out, "false {} colorimage", colors)?;
        }
        for line in samples.chunks(32) {
            for byte in line {
                write!(self.out, "{:02x}", byte)?;
            }
            writeln!(self.out)?;
        }
        writeln!(self.out, ">")?;
        writeln!(self.out, "grestore")?;
        Ok(())
    }

    /* Client Output */

    fn write_formatted(&mut self, args: fmt::Arguments<'_>) -> crate::Result {
        self.out.write_fmt(args)?;
        Ok(())
    }

    fn write_data(&mut self, data: &[u8]) -> crate::Result {
        self.out.write_all(data)?;
        Ok(())
    }

    /* Miscellaneous */

    fn flush(&mut self) -> crate::Result {
        self.out.flush()?;
        Ok(())
    }

    fn show_page(&mut self) -> crate::Result {
        writeln!(self.out, "showpage")?;
        self.state.path.clear();
        Ok(())
    }
}
