// MIT/Apache2 License

use super::Backend;
use crate::BezierPath;
use lyon_geom::QuadraticBezierSegment;
use lyon_path::PathEvent;

pub(crate) fn send_path<B: Backend + ?Sized>(b: &mut B, path: &BezierPath) -> crate::Result {
    b.new_path()?;

    b.set_line_width(path.line_width())?;
    b.set_line_join(path.line_join())?;
    b.set_line_cap(path.line_cap())?;
    b.set_miter_limit(path.miter_limit())?;
    b.set_flatness(path.flatness())?;

    // always sent, an empty pattern is how a previous dash gets reset to solid
    let (pattern, phase) = path.dash();
    b.set_dash(pattern, phase)?;

    path.path().iter().try_for_each(|event| match event {
        PathEvent::Begin { at } => b.move_to(at.x, at.y),
        PathEvent::Line { to, .. } => b.line_to(to.x, to.y),
        PathEvent::Quadratic { from, ctrl, to } => {
            let cubic = QuadraticBezierSegment { from, ctrl, to }.to_cubic();
            b.curve_to(
                cubic.ctrl1.x,
                cubic.ctrl1.y,
                cubic.ctrl2.x,
                cubic.ctrl2.y,
                cubic.to.x,
                cubic.to.y,
            )
        }
        PathEvent::Cubic {
            ctrl1, ctrl2, to, ..
        } => b.curve_to(ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y),
        PathEvent::End { close: true, .. } => b.close_path(),
        PathEvent::End { close: false, .. } => Ok(()),
    })
}
