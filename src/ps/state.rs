// MIT/Apache2 License

use crate::{Color, ColorSpace, Font, Rect, TextDrawingMode};
use lyon_geom::{Box2D, Point, Transform, Vector};

/// The client-side copy of the interpreter's graphics state.
///
/// Points and path bounds are kept in device space, the way the interpreter keeps them, so that changing
/// the transform in the middle of a path does not move what has already been appended.
#[derive(Debug, Clone)]
pub(crate) struct PsState {
    pub(crate) fill: Color,
    pub(crate) stroke: Color,
    /// The color the interpreter currently has set.
    pub(crate) active: Color,
    pub(crate) fill_space: ColorSpace,
    pub(crate) stroke_space: ColorSpace,
    pub(crate) ctm: Transform<f32>,
    pub(crate) path: PathState,
    pub(crate) line_width: f32,
    pub(crate) text_matrix: Transform<f32>,
    pub(crate) text_position: Point<f32>,
    pub(crate) char_spacing: f32,
    pub(crate) font: Option<Font>,
    pub(crate) text_mode: TextDrawingMode,
}

impl Default for PsState {
    fn default() -> Self {
        Self {
            fill: Color::black(),
            stroke: Color::black(),
            active: Color::black(),
            fill_space: ColorSpace::DeviceGray,
            stroke_space: ColorSpace::DeviceGray,
            ctm: Transform::identity(),
            path: PathState::default(),
            line_width: 1.0,
            text_matrix: Transform::identity(),
            text_position: Point::new(0.0, 0.0),
            char_spacing: 0.0,
            font: None,
            text_mode: TextDrawingMode::Fill,
        }
    }
}

impl PsState {
    /// Set both the fill and stroke color, as the plain color operators do.
    #[inline]
    pub(crate) fn set_color(&mut self, color: Color) {
        self.fill = color;
        self.stroke = color;
        self.active = color;
    }

    #[inline]
    pub(crate) fn to_device(&self, p: Point<f32>) -> Point<f32> {
        self.ctm.transform_point(p)
    }

    #[inline]
    pub(crate) fn vector_to_device(&self, v: Vector<f32>) -> Vector<f32> {
        self.ctm.transform_vector(v)
    }

    /// Map a device point back to user space.
    pub(crate) fn to_user(&self, p: Point<f32>) -> crate::Result<Point<f32>> {
        match self.ctm.inverse() {
            Some(inverse) => Ok(inverse.transform_point(p)),
            None => Err(crate::Error::InvalidState("undefinedresult: the transform is singular")),
        }
    }

    /// The current point, in user space.
    pub(crate) fn current_point(&self) -> crate::Result<Point<f32>> {
        let point = self.path.current.ok_or(crate::Error::InvalidState(
            "nocurrentpoint: the path is empty",
        ))?;
        self.to_user(point)
    }

    /// The bounds of the path, in user space.
    pub(crate) fn path_bbox(&self) -> crate::Result<Rect<f32>> {
        let bounds = self.path.bounds.ok_or(crate::Error::InvalidState(
            "nocurrentpoint: the path is empty",
        ))?;

        let corners = [
            bounds.min,
            Point::new(bounds.max.x, bounds.min.y),
            bounds.max,
            Point::new(bounds.min.x, bounds.max.y),
        ];
        let mut user = None::<Box2D<f32>>;
        for corner in corners.iter() {
            let p = self.to_user(*corner)?;
            user = Some(extend(user, p));
        }

        Ok(user.map_or_else(Rect::zero, |b| b.to_rect()))
    }
}

/// The shape of the current path, as far as queries need it.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PathState {
    pub(crate) current: Option<Point<f32>>,
    pub(crate) subpath_start: Option<Point<f32>>,
    pub(crate) bounds: Option<Box2D<f32>>,
}

impl PathState {
    #[inline]
    pub(crate) fn clear(&mut self) {
        *self = PathState::default();
    }

    /// Start a new subpath at the device point `p`.
    #[inline]
    pub(crate) fn start(&mut self, p: Point<f32>) {
        self.current = Some(p);
        self.subpath_start = Some(p);
        self.include(p);
    }

    /// Move the current point to `p`, which is part of the path.
    #[inline]
    pub(crate) fn advance(&mut self, p: Point<f32>) {
        self.current = Some(p);
        self.include(p);
    }

    #[inline]
    pub(crate) fn include(&mut self, p: Point<f32>) {
        self.bounds = Some(extend(self.bounds, p));
    }

    #[inline]
    pub(crate) fn close(&mut self) {
        self.current = self.subpath_start;
    }
}

#[inline]
fn extend(bounds: Option<Box2D<f32>>, p: Point<f32>) -> Box2D<f32> {
    match bounds {
        Some(b) => Box2D::new(b.min.min(p), b.max.max(p)),
        None => Box2D::new(p, p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn bbox_is_mapped_back_to_user_space() {
        let mut state = PsState::default();
        state.ctm = Transform::scale(2.0, 2.0);
        state.path.start(state.to_device(Point::new(1.0, 1.0)));
        state.path.advance(state.to_device(Point::new(3.0, 2.0)));

        let bbox = state.path_bbox().unwrap();
        assert_abs_diff_eq!(bbox.min_x(), 1.0);
        assert_abs_diff_eq!(bbox.min_y(), 1.0);
        assert_abs_diff_eq!(bbox.max_x(), 3.0);
        assert_abs_diff_eq!(bbox.max_y(), 2.0);
    }

    #[test]
    fn empty_path_has_no_current_point() {
        let state = PsState::default();
        assert!(state.current_point().unwrap_err().is_invalid_state());
        assert!(state.path_bbox().unwrap_err().is_invalid_state());
    }

    #[test]
    fn close_returns_to_subpath_start() {
        let mut path = PathState::default();
        path.start(Point::new(1.0, 2.0));
        path.advance(Point::new(5.0, 5.0));
        path.close();
        assert_eq!(path.current, Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn singular_transform_is_an_error() {
        let mut state = PsState::default();
        state.path.start(Point::new(0.0, 0.0));
        state.ctm = Transform::scale(0.0, 1.0);
        assert!(state.current_point().is_err());
    }
}
