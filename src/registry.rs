// MIT/Apache2 License

//! The per-thread current context and its save/restore stack, plus the process-wide default backend.

use crate::{
    Attributes, ContextRef, DriverHandle, Error, FromAttributes, GraphicsContext, Rect,
};
use std::{
    any::type_name,
    cell::RefCell,
    fmt,
    sync::{PoisonError, RwLock},
};

#[derive(Default)]
struct ThreadState {
    current: Option<ContextRef>,
    // `None` entries record that no context was current when the save happened.
    saved: Vec<Option<ContextRef>>,
}

thread_local! {
    static THREAD_STATE: RefCell<ThreadState> = RefCell::new(ThreadState::default());
}

/// The context drawing operations on this thread go to, if any.
#[inline]
pub fn current_context() -> Option<ContextRef> {
    THREAD_STATE.with(|state| state.borrow().current.clone())
}

/// Make `context` current on this thread, or clear the current context with `None`.
///
/// This does not touch the save stack.
pub fn set_current_context(context: Option<ContextRef>) {
    let old = THREAD_STATE.with(|state| std::mem::replace(&mut state.borrow_mut().current, context));
    // dropped outside of the borrow; a context's drop may run arbitrary backend code
    drop(old);
}

/// Whether the current context draws to a screen. `false` if there is no current context.
#[inline]
pub fn current_context_drawing_to_screen() -> bool {
    current_context().map_or(false, |ctx| ctx.is_drawing_to_screen())
}

/// Save the current context and its graphics state.
///
/// The current context's backend is asked to `gsave` first; only once that succeeds is the context pushed
/// onto this thread's save stack. If no context is current, a placeholder is pushed so that the matching
/// [`restore_graphics_state`] stays balanced.
pub fn save_graphics_state() -> crate::Result {
    let current = current_context();
    if let Some(ref ctx) = current {
        ctx.gsave()?;
    }

    THREAD_STATE.with(|state| {
        let mut state = state.borrow_mut();
        state.saved.push(current);
        log::trace!("Saved graphics state, depth is now {}", state.saved.len());
    });
    Ok(())
}

/// Restore the context saved by the matching [`save_graphics_state`] and make it current.
///
/// Fails with [`Error::InvalidState`] if nothing has been saved on this thread. If the saved context's
/// `grestore` fails, the save stack and the current context are left as they were.
pub fn restore_graphics_state() -> crate::Result {
    let top = THREAD_STATE.with(|state| state.borrow().saved.last().cloned());
    let saved = match top {
        None => {
            log::error!("restore_graphics_state called without a matching save");
            return Err(Error::InvalidState(
                "restore_graphics_state called with an empty save stack",
            ));
        }
        Some(saved) => saved,
    };

    if let Some(ref ctx) = saved {
        ctx.grestore()?;
    }

    let old = THREAD_STATE.with(|state| {
        let mut state = state.borrow_mut();
        state.saved.pop();
        std::mem::replace(&mut state.current, saved)
    });
    drop(old);
    Ok(())
}

/// Number of saves on this thread not yet matched by a restore.
#[inline]
pub fn saved_graphics_state_depth() -> usize {
    THREAD_STATE.with(|state| state.borrow().saved.len())
}

/// Run `f` between a save and its restore.
///
/// The state is restored even if `f` fails; an error from `f` takes precedence over an error from the
/// restore.
pub fn with_graphics_state<T>(f: impl FnOnce() -> crate::Result<T>) -> crate::Result<T> {
    save_graphics_state()?;
    let res = f();
    let restored = restore_graphics_state();
    let value = res?;
    restored?;
    Ok(value)
}

/// A backend type registered as the default, erased to the operations the registry needs from it.
#[derive(Copy, Clone)]
pub struct BackendClass {
    name: &'static str,
    construct: fn(Attributes) -> crate::Result<ContextRef>,
    expose: fn(Rect<f32>, DriverHandle),
}

impl BackendClass {
    /// The class of backend type `B`.
    #[inline]
    pub fn of<B: FromAttributes>() -> Self {
        Self {
            name: type_name::<B>(),
            construct: GraphicsContext::from_attributes::<B>,
            expose: <B as crate::Backend>::handle_expose_rect,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Create a context of this class.
    #[inline]
    pub fn instantiate(&self, attributes: Attributes) -> crate::Result<ContextRef> {
        (self.construct)(attributes)
    }

    #[inline]
    pub fn handle_expose_rect(&self, rect: Rect<f32>, driver: DriverHandle) {
        (self.expose)(rect, driver)
    }
}

impl fmt::Debug for BackendClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BackendClass").field(&self.name).finish()
    }
}

static DEFAULT_BACKEND: RwLock<Option<BackendClass>> = RwLock::new(None);

/// Register `B` as the backend [`GraphicsContext::new`] creates contexts with.
///
/// This is process wide; the last registration wins.
pub fn set_default_backend<B: FromAttributes>() {
    let class = BackendClass::of::<B>();
    log::info!("Setting default backend to {}", class.name());
    *DEFAULT_BACKEND.write().unwrap_or_else(PoisonError::into_inner) = Some(class);
}

/// The registered default backend.
///
/// Fails with [`Error::Configuration`] if none has been registered.
pub fn default_backend() -> crate::Result<BackendClass> {
    let class = *DEFAULT_BACKEND.read().unwrap_or_else(PoisonError::into_inner);
    class.ok_or(Error::Configuration(
        "no default backend has been registered",
    ))
}
