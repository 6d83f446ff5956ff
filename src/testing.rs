// MIT/Apache2 License

//! A backend that records what it is asked to do.

use crate::{Attributes, Backend, Font, FromAttributes, LineCap, LineJoin};
use std::{cell::RefCell, fmt, rc::Rc};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    RgbColor(f32, f32, f32),
    NewPath,
    MoveTo(f32, f32),
    LineTo(f32, f32),
    CurveTo(f32, f32, f32, f32, f32, f32),
    ClosePath,
    LineWidth(f32),
    LineJoin(LineJoin),
    LineCap(LineCap),
    MiterLimit(f32),
    Flatness(f32),
    Dash(Vec<f32>, f32),
    SetFont(String),
    GSave,
    GRestore,
    Write(String),
    ShowPage,
    Flush,
}

pub(crate) type CallLog = Rc<RefCell<Vec<Call>>>;

#[derive(Default)]
pub(crate) struct Recorder {
    log: CallLog,
    screen: bool,
    depth: usize,
}

impl Recorder {
    pub(crate) fn new() -> (Self, CallLog) {
        let recorder = Self::default();
        let log = recorder.log.clone();
        (recorder, log)
    }

    pub(crate) fn on_screen() -> (Self, CallLog) {
        let (mut recorder, log) = Self::new();
        recorder.screen = true;
        (recorder, log)
    }

    /// Unmatched `gsave` calls.
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    fn push(&mut self, call: Call) -> crate::Result {
        self.log.borrow_mut().push(call);
        Ok(())
    }
}

/// Everything written to a recorder's output, concatenated.
pub(crate) fn written(log: &CallLog) -> String {
    log.borrow()
        .iter()
        .filter_map(|call| match call {
            Call::Write(s) => Some(s.as_str()),
            Call::ShowPage => Some("<showpage>"),
            _ => None,
        })
        .collect()
}

impl FromAttributes for Recorder {
    fn from_attributes(_attributes: &Attributes) -> crate::Result<Self> {
        Ok(Self::default())
    }
}

impl Backend for Recorder {
    fn is_drawing_to_screen(&self) -> bool {
        self.screen
    }

    fn set_rgb_color(&mut self, r: f32, g: f32, b: f32) -> crate::Result {
        self.push(Call::RgbColor(r, g, b))
    }

    fn new_path(&mut self) -> crate::Result {
        self.push(Call::NewPath)
    }

    fn move_to(&mut self, x: f32, y: f32) -> crate::Result {
        self.push(Call::MoveTo(x, y))
    }

    fn line_to(&mut self, x: f32, y: f32) -> crate::Result {
        self.push(Call::LineTo(x, y))
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> crate::Result {
        self.push(Call::CurveTo(x1, y1, x2, y2, x3, y3))
    }

    fn close_path(&mut self) -> crate::Result {
        self.push(Call::ClosePath)
    }

    fn set_dash(&mut self, pattern: &[f32], phase: f32) -> crate::Result {
        self.push(Call::Dash(pattern.to_vec(), phase))
    }

    fn set_line_width(&mut self, width: f32) -> crate::Result {
        self.push(Call::LineWidth(width))
    }

    fn set_line_join(&mut self, join: LineJoin) -> crate::Result {
        self.push(Call::LineJoin(join))
    }

    fn set_line_cap(&mut self, cap: LineCap) -> crate::Result {
        self.push(Call::LineCap(cap))
    }

    fn set_miter_limit(&mut self, limit: f32) -> crate::Result {
        self.push(Call::MiterLimit(limit))
    }

    fn set_flatness(&mut self, flatness: f32) -> crate::Result {
        self.push(Call::Flatness(flatness))
    }

    fn set_font(&mut self, font: &Font) -> crate::Result {
        self.push(Call::SetFont(font.name.clone()))
    }

    fn gsave(&mut self) -> crate::Result {
        self.depth += 1;
        self.push(Call::GSave)
    }

    fn grestore(&mut self) -> crate::Result {
        self.depth = self.depth.saturating_sub(1);
        self.push(Call::GRestore)
    }

    fn write_formatted(&mut self, args: fmt::Arguments<'_>) -> crate::Result {
        self.push(Call::Write(args.to_string()))
    }

    fn write_data(&mut self, data: &[u8]) -> crate::Result {
        self.push(Call::Write(String::from_utf8_lossy(data).into_owned()))
    }

    fn show_page(&mut self) -> crate::Result {
        self.push(Call::ShowPage)
    }

    fn flush(&mut self) -> crate::Result {
        self.push(Call::Flush)
    }
}
