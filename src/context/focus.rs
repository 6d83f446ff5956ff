// MIT/Apache2 License

use crate::Rect;
use std::{fmt, rc::Rc};

/// A destination scope a context can be focused on, usually a view in a view hierarchy.
///
/// The only thing the drawing layer needs from a view is its coordinate convention.
pub trait FocusView {
    /// Whether the view's coordinate system has its origin at the top left.
    fn is_flipped(&self) -> bool;
}

impl<F: FocusView + ?Sized> FocusView for Rc<F> {
    #[inline]
    fn is_flipped(&self) -> bool {
        (**self).is_flipped()
    }
}

#[derive(Clone)]
pub(crate) struct FocusEntry {
    pub(crate) view: Rc<dyn FocusView>,
    pub(crate) rect: Rect<f32>,
}

/// Nested drawing scopes, innermost last.
///
/// Locking and unlocking must be strictly nested; the stack does not check that the view being unlocked
/// is the one on top, it only reports the mismatch.
#[derive(Default, Clone)]
pub(crate) struct FocusStack {
    entries: Vec<FocusEntry>,
}

impl FocusStack {
    #[inline]
    pub(crate) fn push(&mut self, view: Rc<dyn FocusView>, rect: Rect<f32>) {
        self.entries.push(FocusEntry { view, rect });
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<FocusEntry> {
        self.entries.pop()
    }

    #[inline]
    pub(crate) fn top(&self) -> Option<&FocusEntry> {
        self.entries.last()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for FocusStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| entry.rect))
            .finish()
    }
}
