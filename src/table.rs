// MIT/Apache2 License

//! Per-type dispatch tables.
//!
//! Drawing is called in very tight loops (per glyph, per path segment), so a context never resolves an
//! operation at call time. The first time a context is built around a backend type `B`, every operation
//! is resolved against `B`'s own implementation and the resulting function pointers are stored in an
//! [`OperationTable`]. The table is immutable from then on, shared by every context of that type, and
//! outlives all of them.
//!
//! Resolution is memoized in two layers: a thread-local front cache that is consulted without any lock,
//! and a process-wide map behind a mutex that is only touched on a thread's first request for a type.
//! The process-wide map is re-checked under the lock, so threads racing to create the first context of a
//! type build its table exactly once.

use crate::{
    Backend, BezierPath, Bitmap, ColorSpace, CompositingOperation, DeviceBinding, DeviceHandle,
    Error, Font, GStateTag, Glyph, GraphicsContext, LineCap, LineJoin, Rect, TextDrawingMode,
};
use lyon_geom::{Point, Size, Transform};
use std::{
    any::{type_name, Any, TypeId},
    cell::RefCell,
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, OnceLock, PoisonError,
    },
};

macro_rules! operation_table {
    ($(
        $(#[$meta:meta])*
        fn $name:ident($($arg:ident: $ty:ty),*) -> $ret:ty;
    )*) => {
        /// The resolved operations of one backend type.
        ///
        /// Each slot is a plain function pointer that downcasts the type-erased backend and calls the
        /// type's implementation of that operation directly. Slots for operations the type does not
        /// override resolve to the trait's default, which reports [`Error::Unimplemented`].
        pub struct OperationTable {
            type_id: TypeId,
            type_name: &'static str,
            serial: usize,
            drawing_to_screen: fn(&dyn Any) -> bool,
            set_font: fn(&mut dyn Any, &Font) -> crate::Result,
            $($name: fn(&mut dyn Any $(, $ty)*) -> crate::Result<$ret>,)*
        }

        impl OperationTable {
            fn build<B: Backend>(serial: usize) -> Self {
                Self {
                    type_id: TypeId::of::<B>(),
                    type_name: type_name::<B>(),
                    serial,
                    drawing_to_screen: |this| {
                        this.downcast_ref::<B>().map_or(false, <B as Backend>::is_drawing_to_screen)
                    },
                    set_font: |this, font| <B as Backend>::set_font(receiver::<B>(this)?, font),
                    $($name: |this $(, $arg)*| <B as Backend>::$name(receiver::<B>(this)? $(, $arg)*),)*
                }
            }
        }

        impl GraphicsContext {
            $(
                $(#[$meta])*
                #[inline]
                pub fn $name(&self $(, $arg: $ty)*) -> crate::Result<$ret> {
                    let mut backend = self.backend.borrow_mut();
                    (self.table.$name)(&mut **backend $(, $arg)*)
                }
            )*
        }
    };
}

operation_table! {
    /// Set the alpha the next painting operations use.
    fn set_alpha(alpha: f32) -> ();
    fn set_cmyk_color(c: f32, m: f32, y: f32, k: f32) -> ();
    fn set_gray(gray: f32) -> ();
    /// Set the current color from hue, saturation and brightness.
    fn set_hsb_color(h: f32, s: f32, b: f32) -> ();
    fn set_rgb_color(r: f32, g: f32, b: f32) -> ();
    fn current_alpha() -> f32;
    fn current_cmyk_color() -> [f32; 4];
    fn current_gray() -> f32;
    fn current_hsb_color() -> [f32; 3];
    fn current_rgb_color() -> [f32; 3];
    fn set_fill_color_space(space: &ColorSpace) -> ();
    fn set_stroke_color_space(space: &ColorSpace) -> ();
    /// Set the fill color from components in the current fill colorspace.
    fn set_fill_color(components: &[f32]) -> ();
    /// Set the stroke color from components in the current stroke colorspace.
    fn set_stroke_color(components: &[f32]) -> ();

    fn new_path() -> ();
    fn move_to(x: f32, y: f32) -> ();
    fn line_to(x: f32, y: f32) -> ();
    fn curve_to(x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> ();
    fn rel_move_to(dx: f32, dy: f32) -> ();
    fn rel_line_to(dx: f32, dy: f32) -> ();
    fn rel_curve_to(dx1: f32, dy1: f32, dx2: f32, dy2: f32, dx3: f32, dy3: f32) -> ();
    /// Append a counterclockwise arc; angles in degrees.
    fn arc(x: f32, y: f32, r: f32, angle1: f32, angle2: f32) -> ();
    /// Append a clockwise arc; angles in degrees.
    fn arcn(x: f32, y: f32, r: f32, angle1: f32, angle2: f32) -> ();
    fn arct(x1: f32, y1: f32, x2: f32, y2: f32, r: f32) -> ();
    fn close_path() -> ();

    fn fill() -> ();
    fn eo_fill() -> ();
    fn stroke() -> ();
    fn clip() -> ();
    fn eo_clip() -> ();
    fn init_clip() -> ();
    fn rect_clip(x: f32, y: f32, width: f32, height: f32) -> ();
    fn rect_fill(x: f32, y: f32, width: f32, height: f32) -> ();
    fn rect_stroke(x: f32, y: f32, width: f32, height: f32) -> ();
    fn flatten_path() -> ();
    fn reverse_path() -> ();
    /// The bounding box of the current path.
    fn path_bbox() -> Rect<f32>;
    fn current_point() -> Point<f32>;
    /// Replace the current path with `path`, adopting its line style.
    fn send_path(path: &BezierPath) -> ();

    fn set_dash(pattern: &[f32], phase: f32) -> ();
    fn set_line_width(width: f32) -> ();
    fn set_line_join(join: LineJoin) -> ();
    fn set_line_cap(cap: LineCap) -> ();
    fn set_miter_limit(limit: f32) -> ();
    fn set_flatness(flatness: f32) -> ();
    fn set_stroke_adjust(adjust: bool) -> ();
    fn current_line_width() -> f32;

    /// Concatenate a raw `[a b c d tx ty]` matrix onto the current transform.
    fn concat(matrix: [f32; 6]) -> ();
    /// Rotate user space by `angle` degrees.
    fn rotate(angle: f32) -> ();
    fn scale(x: f32, y: f32) -> ();
    fn translate(x: f32, y: f32) -> ();
    fn init_matrix() -> ();
    fn current_matrix() -> Transform<f32>;
    fn set_matrix(matrix: &Transform<f32>) -> ();
    fn concat_matrix(matrix: &Transform<f32>) -> ();

    fn set_text_matrix(matrix: &Transform<f32>) -> ();
    fn text_matrix() -> Transform<f32>;
    fn set_text_position(position: Point<f32>) -> ();
    fn text_position() -> Point<f32>;
    /// Draw a string at the text position.
    fn show(text: &str) -> ();
    /// Draw a glyph run, optionally overriding each glyph's advance.
    fn show_glyphs(glyphs: &[Glyph], advances: Option<&[Size<f32>]>) -> ();
    fn set_char_spacing(spacing: f32) -> ();
    fn set_text_drawing_mode(mode: TextDrawingMode) -> ();

    /// Push a snapshot of the backend's graphics state.
    ///
    /// This does not touch the thread's context stack; see
    /// [`save_graphics_state`](crate::save_graphics_state) for that.
    fn gsave() -> ();
    /// Pop the snapshot pushed by the matching [`gsave`](GraphicsContext::gsave).
    fn grestore() -> ();
    fn init_graphics() -> ();
    /// Store a copy of the current graphics state and return its tag.
    fn define_gstate() -> GStateTag;
    fn replace_gstate(tag: GStateTag) -> ();
    fn undefine_gstate(tag: GStateTag) -> ();
    fn set_gstate(tag: GStateTag) -> ();

    fn set_device(device: DeviceHandle, x: i32, y: i32) -> ();
    fn current_device() -> DeviceBinding;

    /// Composite `rect` of the named graphics state onto this one at `point`.
    fn composite_gstate(
        source: GStateTag,
        rect: Rect<f32>,
        point: Point<f32>,
        op: CompositingOperation,
        fraction: f32
    ) -> ();
    fn draw_bitmap(rect: Rect<f32>, bitmap: &Bitmap<'_>) -> ();

    /// Write formatted text straight to the output stream.
    fn write_formatted(args: fmt::Arguments<'_>) -> ();
    /// Write raw bytes straight to the output stream.
    fn write_data(data: &[u8]) -> ();

    fn flush() -> ();
    fn show_page() -> ();
    /// Ring the audible alert.
    fn beep() -> ();
}

impl OperationTable {
    /// Get the table for backend type `B`, building and caching it on first request.
    pub fn resolve<B: Backend>() -> Arc<OperationTable> {
        let id = TypeId::of::<B>();

        if let Some(table) = LOCAL_TABLES.with(|local| local.borrow().get(&id).cloned()) {
            return table;
        }

        let table = {
            let mut cache = cache().lock().unwrap_or_else(PoisonError::into_inner);
            match cache.tables.get(&id) {
                Some(table) => table.clone(),
                None => {
                    let serial = SERIAL.fetch_add(1, Ordering::Relaxed);
                    log::debug!(
                        "Building operation table #{} for {}",
                        serial,
                        type_name::<B>()
                    );

                    let table = Arc::new(OperationTable::build::<B>(serial));
                    cache.tables.insert(id, table.clone());
                    #[cfg(test)]
                    {
                        *cache.builds.entry(id).or_insert(0) += 1;
                    }
                    table
                }
            }
        };

        LOCAL_TABLES.with(|local| local.borrow_mut().insert(id, table.clone()));
        table
    }

    /// The backend type this table was built for.
    #[inline]
    pub fn backend_type(&self) -> TypeId {
        self.type_id
    }

    /// The name of the backend type this table was built for.
    #[inline]
    pub fn backend_name(&self) -> &'static str {
        self.type_name
    }

    /// Process-wide build order of this table.
    #[inline]
    pub fn serial(&self) -> usize {
        self.serial
    }

    #[inline]
    pub(crate) fn is_drawing_to_screen(&self, backend: &dyn Any) -> bool {
        (self.drawing_to_screen)(backend)
    }

    /// The context wraps `set_font` itself so it can record the font.
    #[inline]
    pub(crate) fn dispatch_set_font(&self, backend: &mut dyn Any, font: &Font) -> crate::Result {
        (self.set_font)(backend, font)
    }
}

impl fmt::Debug for OperationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationTable")
            .field("backend", &self.type_name)
            .field("serial", &self.serial)
            .finish()
    }
}

#[inline]
fn receiver<B: Backend>(backend: &mut dyn Any) -> crate::Result<&mut B> {
    backend.downcast_mut::<B>().ok_or(Error::BackendMismatch {
        expected: type_name::<B>(),
    })
}

#[derive(Default)]
struct TableCache {
    tables: HashMap<TypeId, Arc<OperationTable>>,
    #[cfg(test)]
    builds: HashMap<TypeId, usize>,
}

static CACHE: OnceLock<Mutex<TableCache>> = OnceLock::new();
static SERIAL: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static LOCAL_TABLES: RefCell<HashMap<TypeId, Arc<OperationTable>>> = RefCell::new(HashMap::new());
}

#[inline]
fn cache() -> &'static Mutex<TableCache> {
    CACHE.get_or_init(Default::default)
}

/// How many times a table has been built for the given type.
#[cfg(test)]
pub(crate) fn build_count(id: TypeId) -> usize {
    let cache = cache().lock().unwrap_or_else(PoisonError::into_inner);
    cache.builds.get(&id).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{testing::Recorder, Operation};
    use std::{sync::Barrier, thread};

    struct Racer;

    impl Backend for Racer {}

    // resolved by nothing but the race below
    struct FreshRacer;

    impl Backend for FreshRacer {}

    struct Unused;

    impl Backend for Unused {}

    #[test]
    fn concurrent_first_resolution_builds_once() {
        let _ = env_logger::builder().is_test(true).try_init();

        assert_eq!(build_count(TypeId::of::<FreshRacer>()), 0);

        const THREADS: usize = 16;
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    OperationTable::resolve::<FreshRacer>()
                })
            })
            .collect();

        let tables: Vec<Arc<OperationTable>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(build_count(TypeId::of::<FreshRacer>()), 1);
        assert!(tables.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(tables[0].backend_type(), TypeId::of::<FreshRacer>());
    }

    #[test]
    fn distinct_types_get_distinct_tables() {
        let a = OperationTable::resolve::<Recorder>();
        let b = OperationTable::resolve::<Racer>();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_ne!(a.serial(), b.serial());
        assert!(a.backend_name().ends_with("Recorder"));
    }

    #[test]
    fn second_resolution_is_cached() {
        let a = OperationTable::resolve::<Recorder>();
        let b = OperationTable::resolve::<Recorder>();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(build_count(TypeId::of::<Recorder>()), 1);
    }

    #[test]
    fn unresolved_type_has_no_builds() {
        assert_eq!(build_count(TypeId::of::<Unused>()), 0);
    }

    #[test]
    fn foreign_backend_is_rejected() {
        let table = OperationTable::resolve::<Racer>();
        let mut wrong = Recorder::default();
        let err = (table.new_path)(&mut wrong).unwrap_err();
        assert!(matches!(err, Error::BackendMismatch { .. }));

        let mut right = Racer;
        let err = (table.new_path)(&mut right).unwrap_err();
        match err {
            Error::Unimplemented { op, .. } => assert_eq!(op, Operation::NewPath),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
