// MIT/Apache2 License

use crate::{
    registry, Attributes, Backend, CompositingOperation, DriverHandle, Error, Font, FromAttributes,
    ImageInterpolation, Operation, OperationTable, PortHandle, Rect,
};
use lyon_geom::Point;
use std::{
    any::Any,
    cell::{Cell, RefCell},
    collections::BTreeSet,
    fmt,
    rc::Rc,
    sync::Arc,
};

mod focus;

pub use focus::FocusView;
use focus::FocusStack;

/// A shared handle to a [`GraphicsContext`].
///
/// Contexts are reference counted but not thread safe: a context belongs to the thread that created it,
/// and can only ever be current on that thread.
pub type ContextRef = Rc<GraphicsContext>;

/// The drawing context: the object every drawing operation is issued on.
///
/// A `GraphicsContext` pairs a [`Backend`] with the bookkeeping the abstract layer keeps for it:
///
/// * The [`Attributes`] it was created with, which are fixed for its lifetime.
/// * Drawing-state flags: antialiasing, image interpolation, compositing operator, pattern phase and the
///   flip flag implied by the destination.
/// * The focus stack of nested destination scopes, which decides the flip convention.
/// * The set of fonts used so far, when the context is not drawing to a screen.
///
/// Every drawing operation in the [`Backend`] contract has a method of the same name here. Calls go
/// straight through the backend type's shared [`OperationTable`], so a context costs one indirect call
/// per operation regardless of which backend it wraps.
pub struct GraphicsContext {
    attributes: Attributes,
    pub(crate) table: Arc<OperationTable>,
    pub(crate) backend: RefCell<Box<dyn Any>>,
    state: Cell<DrawingState>,
    focus: RefCell<FocusStack>,
    used_fonts: RefCell<BTreeSet<String>>,
}

#[derive(Debug, Copy, Clone)]
struct DrawingState {
    antialias: bool,
    interpolation: ImageInterpolation,
    compositing: CompositingOperation,
    pattern_phase: Point<f32>,
    flipped: bool,
}

impl GraphicsContext {
    /// Create a context through the registered default backend.
    ///
    /// Fails with [`Error::Configuration`] if no default backend has been registered with
    /// [`set_default_backend`](crate::set_default_backend).
    pub fn new(attributes: Attributes) -> crate::Result<ContextRef> {
        registry::default_backend()?.instantiate(attributes)
    }

    /// Create a context of backend type `B`, letting `B` build itself from the attributes.
    pub fn from_attributes<B: FromAttributes>(attributes: Attributes) -> crate::Result<ContextRef> {
        attributes.validate()?;
        let backend = B::from_attributes(&attributes)?;
        Ok(Self::build(backend, attributes))
    }

    /// Create a context around an existing backend.
    pub fn from_backend<B: Backend>(backend: B, attributes: Attributes) -> crate::Result<ContextRef> {
        attributes.validate()?;
        Ok(Self::build(backend, attributes))
    }

    // callers have validated the attributes
    fn build<B: Backend>(backend: B, attributes: Attributes) -> ContextRef {
        let table = OperationTable::resolve::<B>();
        log::debug!(
            "Creating graphics context for {} with destination {:?}",
            table.backend_name(),
            attributes.destination()
        );

        let state = DrawingState {
            antialias: true,
            interpolation: ImageInterpolation::Default,
            compositing: CompositingOperation::SourceOver,
            pattern_phase: Point::new(0.0, 0.0),
            flipped: attributes.flipped(),
        };

        Rc::new(GraphicsContext {
            attributes,
            table,
            backend: RefCell::new(Box::new(backend)),
            state: Cell::new(state),
            focus: RefCell::new(FocusStack::default()),
            used_fonts: RefCell::new(BTreeSet::new()),
        })
    }

    /// Look up a context by the graphics state it owns.
    ///
    /// There is no mapping from graphics states back to contexts, so this always fails with
    /// [`Error::Unimplemented`] on the class.
    pub fn set_graphics_state(tag: crate::GStateTag) -> crate::Result {
        let _ = tag;
        Err(Error::unimplemented_class::<GraphicsContext>(
            Operation::SetGraphicsState,
        ))
    }

    /// Forward an expose notification from a driver to the default backend type.
    pub fn handle_expose_rect(rect: Rect<f32>, driver: DriverHandle) -> crate::Result {
        registry::default_backend()?.handle_expose_rect(rect, driver);
        Ok(())
    }

    /* Attributes */

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The raw port this context draws into, if it was created with one.
    #[inline]
    pub fn graphics_port(&self) -> Option<PortHandle> {
        self.attributes.port()
    }

    /// The operation table this context dispatches through.
    #[inline]
    pub fn table(&self) -> &Arc<OperationTable> {
        &self.table
    }

    #[inline]
    pub fn backend_name(&self) -> &'static str {
        self.table.backend_name()
    }

    /// Run `f` on the backend if it is of type `B`.
    pub fn downcast_backend<B: Backend, R>(&self, f: impl FnOnce(&mut B) -> R) -> Option<R> {
        let mut backend = self.backend.borrow_mut();
        backend.downcast_mut::<B>().map(f)
    }

    /// Whether the backend draws to a screen.
    #[inline]
    pub fn is_drawing_to_screen(&self) -> bool {
        self.table.is_drawing_to_screen(&**self.backend.borrow())
    }

    /// Whether drawing is flipped.
    ///
    /// The view this context is focused on decides, if there is one. Otherwise it is the flip flag of the
    /// destination the context was created with.
    pub fn is_flipped(&self) -> bool {
        match self.focus.borrow().top() {
            Some(entry) => entry.view.is_flipped(),
            None => self.state.get().flipped,
        }
    }

    /* Drawing State */

    #[inline]
    pub fn should_antialias(&self) -> bool {
        self.state.get().antialias
    }

    #[inline]
    pub fn set_should_antialias(&self, antialias: bool) {
        self.update_state(|state| state.antialias = antialias);
    }

    #[inline]
    pub fn image_interpolation(&self) -> ImageInterpolation {
        self.state.get().interpolation
    }

    #[inline]
    pub fn set_image_interpolation(&self, interpolation: ImageInterpolation) {
        self.update_state(|state| state.interpolation = interpolation);
    }

    #[inline]
    pub fn compositing_operation(&self) -> CompositingOperation {
        self.state.get().compositing
    }

    #[inline]
    pub fn set_compositing_operation(&self, op: CompositingOperation) {
        self.update_state(|state| state.compositing = op);
    }

    /// The phase applied to patterns, in base coordinates.
    #[inline]
    pub fn pattern_phase(&self) -> Point<f32> {
        self.state.get().pattern_phase
    }

    #[inline]
    pub fn set_pattern_phase(&self, phase: Point<f32>) {
        self.update_state(|state| state.pattern_phase = phase);
    }

    #[inline]
    fn update_state(&self, f: impl FnOnce(&mut DrawingState)) {
        let mut state = self.state.get();
        f(&mut state);
        self.state.set(state);
    }

    /* Focus */

    /// Focus drawing on `view`, clipped to `rect`.
    pub fn lock_focus(&self, view: Rc<dyn FocusView>, rect: Rect<f32>) {
        log::trace!("Locking focus on view in {:?}", rect);
        self.focus.borrow_mut().push(view, rect);
    }

    /// Leave the scope entered by the matching [`lock_focus`](GraphicsContext::lock_focus).
    ///
    /// Scopes must be strictly nested: the top of the stack is popped no matter which view is passed. If
    /// `needs_flush` is set the backend is flushed afterwards.
    pub fn unlock_focus(&self, view: &Rc<dyn FocusView>, needs_flush: bool) -> crate::Result {
        let popped = self.focus.borrow_mut().pop();
        match popped {
            Some(entry) if !Rc::ptr_eq(&entry.view, view) => {
                log::warn!("unlock_focus called for a view that is not the focused one");
            }
            None => log::warn!("unlock_focus called with an empty focus stack"),
            Some(_) => {}
        }

        if needs_flush {
            self.flush()
        } else {
            Ok(())
        }
    }

    /// The view drawing is currently focused on.
    #[inline]
    pub fn focus_view(&self) -> Option<Rc<dyn FocusView>> {
        self.focus.borrow().top().map(|entry| entry.view.clone())
    }

    /// The rectangle the current focus was locked with.
    #[inline]
    pub fn focus_rect(&self) -> Option<Rect<f32>> {
        self.focus.borrow().top().map(|entry| entry.rect)
    }

    /// Number of nested focus scopes.
    #[inline]
    pub fn focus_depth(&self) -> usize {
        self.focus.borrow().len()
    }

    /* Fonts */

    /// Make `font` current on the backend and record that it was used.
    pub fn set_font(&self, font: &Font) -> crate::Result {
        {
            let mut backend = self.backend.borrow_mut();
            self.table.dispatch_set_font(&mut **backend, font)?;
        }
        self.record_font_use(&font.name);
        Ok(())
    }

    /// Note that a font was used. Only tracked when not drawing to a screen, where it is needed to list
    /// the document's fonts.
    pub fn record_font_use(&self, name: &str) {
        if self.is_drawing_to_screen() {
            return;
        }

        let mut fonts = self.used_fonts.borrow_mut();
        if !fonts.contains(name) {
            log::trace!("Recording use of font {}", name);
            fonts.insert(name.to_string());
        }
    }

    /// The fonts used so far, in name order.
    #[inline]
    pub fn used_fonts(&self) -> Vec<String> {
        self.used_fonts.borrow().iter().cloned().collect()
    }

    #[inline]
    pub fn reset_used_fonts(&self) {
        self.used_fonts.borrow_mut().clear();
    }
}

impl fmt::Debug for GraphicsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicsContext")
            .field("backend", &self.table.backend_name())
            .field("attributes", &self.attributes)
            .field("state", &self.state.get())
            .field("focus", &*self.focus.borrow())
            .field("used_fonts", &*self.used_fonts.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        testing::{Call, Recorder},
        BezierPath, Destination, Operation, Receiver,
    };
    use lyon_path::{math::point, Path};
    use std::num::NonZeroUsize;

    struct View(bool);

    impl FocusView for View {
        fn is_flipped(&self) -> bool {
            self.0
        }
    }

    struct Bare;

    impl Backend for Bare {}

    fn rect() -> Rect<f32> {
        Rect::new(Point::new(0.0, 0.0), lyon_geom::Size::new(10.0, 10.0))
    }

    #[test]
    fn focused_view_decides_flip() {
        let (recorder, _) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();
        assert!(!ctx.is_flipped());

        let view: Rc<dyn FocusView> = Rc::new(View(true));
        ctx.lock_focus(view.clone(), rect());
        assert!(ctx.is_flipped());
        assert_eq!(ctx.focus_rect(), Some(rect()));

        ctx.unlock_focus(&view, false).unwrap();
        assert!(!ctx.is_flipped());
        assert!(ctx.focus_view().is_none());
    }

    #[test]
    fn view_flip_wins_over_port_flip() {
        let port = PortHandle::from_raw(NonZeroUsize::new(1).unwrap());
        let attrs = Attributes::with_destination(Destination::Port {
            port,
            flipped: true,
        });
        let (recorder, _) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, attrs).unwrap();
        assert!(ctx.is_flipped());
        assert_eq!(ctx.graphics_port(), Some(port));

        let view: Rc<dyn FocusView> = Rc::new(View(false));
        ctx.lock_focus(view.clone(), rect());
        assert!(!ctx.is_flipped());

        let inner: Rc<dyn FocusView> = Rc::new(View(true));
        ctx.lock_focus(inner.clone(), rect());
        assert!(ctx.is_flipped());
        assert_eq!(ctx.focus_depth(), 2);

        ctx.unlock_focus(&inner, false).unwrap();
        ctx.unlock_focus(&view, false).unwrap();
        assert!(ctx.is_flipped());
    }

    #[test]
    fn unlock_with_flush_flushes_backend() {
        let (recorder, log) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();
        let view: Rc<dyn FocusView> = Rc::new(View(false));
        ctx.lock_focus(view.clone(), rect());
        ctx.unlock_focus(&view, true).unwrap();
        assert_eq!(*log.borrow(), vec![Call::Flush]);
    }

    #[test]
    fn bare_backend_reports_unimplemented() {
        let ctx = GraphicsContext::from_backend(Bare, Attributes::new()).unwrap();

        match ctx.set_rgb_color(1.0, 0.0, 0.0) {
            Err(Error::Unimplemented {
                op: Operation::SetRgbColor,
                receiver: Receiver::Instance(name),
            }) => assert!(name.ends_with("Bare")),
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(ctx.stroke().unwrap_err().is_unimplemented());
        assert!(ctx.gsave().unwrap_err().is_unimplemented());
        assert!(ctx.current_matrix().unwrap_err().is_unimplemented());
        assert!(ctx.write_data(b"%!").unwrap_err().is_unimplemented());
        assert!(ctx.beep().unwrap_err().is_unimplemented());

        // send_path has a real default, it fails on the first primitive it needs
        match ctx.send_path(&BezierPath::default()) {
            Err(Error::Unimplemented { op, .. }) => assert_eq!(op, Operation::NewPath),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn overriding_backend_has_no_base_side_effects() {
        let (recorder, log) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();
        ctx.set_rgb_color(1.0, 0.5, 0.0).unwrap();
        assert_eq!(*log.borrow(), vec![Call::RgbColor(1.0, 0.5, 0.0)]);
        assert!(ctx.used_fonts().is_empty());
    }

    #[test]
    fn set_graphics_state_is_class_unimplemented() {
        match GraphicsContext::set_graphics_state(3) {
            Err(Error::Unimplemented {
                op: Operation::SetGraphicsState,
                receiver: Receiver::Class(name),
            }) => assert!(name.ends_with("GraphicsContext")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn send_path_decomposes_in_order() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut builder = Path::builder();
        builder.begin(point(0.0, 0.0));
        builder.line_to(point(10.0, 0.0));
        builder.cubic_bezier_to(point(10.0, 10.0), point(0.0, 10.0), point(0.0, 0.0));
        builder.close();
        let path = BezierPath::new(builder.build())
            .with_line_width(2.0)
            .with_dash(&[4.0, 2.0], 0.0);

        let (recorder, log) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();
        ctx.send_path(&path).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                Call::NewPath,
                Call::LineWidth(2.0),
                Call::LineJoin(crate::LineJoin::Miter),
                Call::LineCap(crate::LineCap::Butt),
                Call::MiterLimit(10.0),
                Call::Flatness(0.6),
                Call::Dash(vec![4.0, 2.0], 0.0),
                Call::MoveTo(0.0, 0.0),
                Call::LineTo(10.0, 0.0),
                Call::CurveTo(10.0, 10.0, 0.0, 10.0, 0.0, 0.0),
                Call::ClosePath,
            ]
        );
    }

    #[test]
    fn send_path_always_resets_dash() {
        let mut builder = Path::builder();
        builder.begin(point(1.0, 1.0));
        builder.quadratic_bezier_to(point(2.0, 4.0), point(3.0, 1.0));
        builder.end(false);

        let (recorder, log) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();
        ctx.send_path(&BezierPath::new(builder.build())).unwrap();

        let log = log.borrow();
        assert!(log.contains(&Call::Dash(vec![], 0.0)));
        assert!(matches!(log.last(), Some(Call::CurveTo(..))));
        assert!(!log.contains(&Call::ClosePath));
    }

    #[test]
    fn font_use_is_not_tracked_on_screen() {
        let (recorder, _) = Recorder::on_screen();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();
        assert!(ctx.is_drawing_to_screen());

        ctx.record_font_use("Helvetica");
        ctx.set_font(&Font::new("Times-Roman", 12.0)).unwrap();
        assert!(ctx.used_fonts().is_empty());
    }

    #[test]
    fn font_use_is_tracked_off_screen() {
        let (recorder, log) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();
        assert!(!ctx.is_drawing_to_screen());

        ctx.record_font_use("Helvetica");
        ctx.record_font_use("Helvetica");
        assert_eq!(ctx.used_fonts(), vec!["Helvetica".to_string()]);

        ctx.set_font(&Font::new("Courier", 10.0)).unwrap();
        assert_eq!(
            ctx.used_fonts(),
            vec!["Courier".to_string(), "Helvetica".to_string()]
        );
        assert_eq!(*log.borrow(), vec![Call::SetFont("Courier".into())]);

        ctx.reset_used_fonts();
        assert!(ctx.used_fonts().is_empty());
    }

    #[test]
    fn failed_set_font_records_nothing() {
        let ctx = GraphicsContext::from_backend(Bare, Attributes::new()).unwrap();
        assert!(ctx.set_font(&Font::new("Courier", 10.0)).is_err());
        assert!(ctx.used_fonts().is_empty());
    }

    #[test]
    fn drawing_state_defaults_and_updates() {
        let (recorder, _) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();
        assert!(ctx.should_antialias());
        assert_eq!(ctx.image_interpolation(), ImageInterpolation::Default);
        assert_eq!(ctx.compositing_operation(), CompositingOperation::SourceOver);

        ctx.set_should_antialias(false);
        ctx.set_image_interpolation(ImageInterpolation::High);
        ctx.set_compositing_operation(CompositingOperation::Copy);
        ctx.set_pattern_phase(Point::new(3.0, 4.0));

        assert!(!ctx.should_antialias());
        assert_eq!(ctx.image_interpolation(), ImageInterpolation::High);
        assert_eq!(ctx.compositing_operation(), CompositingOperation::Copy);
        assert_eq!(ctx.pattern_phase(), Point::new(3.0, 4.0));
    }

    #[test]
    fn contexts_of_one_type_share_a_table() {
        let (a, _) = Recorder::new();
        let (b, _) = Recorder::new();
        let a = GraphicsContext::from_backend(a, Attributes::new()).unwrap();
        let b = GraphicsContext::from_backend(b, Attributes::new()).unwrap();
        assert!(Arc::ptr_eq(a.table(), b.table()));
    }

    #[test]
    fn downcast_reaches_backend() {
        let (recorder, _) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();
        assert_eq!(ctx.downcast_backend(|r: &mut Recorder| r.depth()), Some(0));
        assert!(ctx.downcast_backend(|_: &mut Bare| ()).is_none());
    }

    thread_local! {
        static BUILT: Cell<usize> = Cell::new(0);
    }

    struct Counted;

    impl Backend for Counted {}

    impl FromAttributes for Counted {
        fn from_attributes(_attributes: &Attributes) -> crate::Result<Self> {
            BUILT.with(|built| built.set(built.get() + 1));
            Ok(Counted)
        }
    }

    fn port_as_postscript() -> Attributes {
        Attributes::with_destination(Destination::Port {
            port: PortHandle::from_raw(NonZeroUsize::new(3).unwrap()),
            flipped: false,
        })
        .format(crate::RepresentationFormat::PostScript)
    }

    fn is_invalid(res: crate::Result<ContextRef>) -> bool {
        matches!(res, Err(Error::InvalidAttributes(_)))
    }

    #[test]
    fn every_constructor_rejects_bad_attributes() {
        assert!(is_invalid(GraphicsContext::from_backend(Bare, port_as_postscript())));
        assert!(is_invalid(GraphicsContext::from_backend(
            Bare,
            Attributes::new().option("", "x")
        )));

        assert!(is_invalid(GraphicsContext::from_attributes::<Counted>(port_as_postscript())));
        assert_eq!(BUILT.with(Cell::get), 0);

        crate::set_default_backend::<Recorder>();
        assert!(is_invalid(GraphicsContext::new(port_as_postscript())));
        assert!(is_invalid(GraphicsContext::new(Attributes::new().option("", "x"))));
    }

    #[test]
    fn from_attributes_builds_the_backend_once() {
        let ctx = GraphicsContext::from_attributes::<Counted>(Attributes::new()).unwrap();
        assert_eq!(BUILT.with(Cell::get), 1);
        assert!(ctx.backend_name().ends_with("Counted"));
    }
}
