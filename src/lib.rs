// MIT/Apache2 License

//! An abstract drawing-context layer.
//!
//! Application code draws through a [`GraphicsContext`]; the context forwards each operation to a
//! [`Backend`] (a window-system driver, a bitmap, a print stream) through a per-type [`OperationTable`]
//! that is resolved once and shared. Each thread has a current context and a stack of saved ones, see
//! [`save_graphics_state`] and [`restore_graphics_state`].

#![forbid(unsafe_code)]

mod error;

pub mod attributes;
pub mod backend;
pub mod color;
pub mod intensity;
pub mod printing;
pub mod ps;

mod context;
mod handle;
mod mode;
mod operation;
mod path;
mod registry;
mod table;

#[cfg(test)]
pub(crate) mod testing;

pub use attributes::*;
pub use backend::*;
pub use color::*;
pub use context::*;
pub use error::*;
pub use handle::*;
pub use intensity::*;
pub use mode::*;
pub use operation::*;
pub use path::*;
pub use printing::*;
pub use ps::*;
pub use registry::*;
pub use table::*;

pub use lyon_geom::{point, size, Point, Size, Transform};

/// Axis-aligned rectangles, as origin and size.
pub type Rect<T> = lyon_geom::euclid::default::Rect<T>;
