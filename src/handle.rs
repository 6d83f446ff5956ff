// MIT/Apache2 License

//! Opaque references to things that live on the other side of a backend.
//!
//! The window system, the bitmap store and the device driver all identify their objects by some kind of
//! pointer or ID. The types here are thin wrappers around a [`NonZeroUsize`] so that contexts can carry
//! them around without knowing what they point to. There is no automatic management or cleanup of the
//! resources behind them.
//!
//! [`NonZeroUsize`]: https://doc.rust-lang.org/std/num/struct.NonZeroUsize.html

use std::num::NonZeroUsize;

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name {
            inner: NonZeroUsize,
        }

        impl $name {
            /// Wrap a raw backend identifier.
            #[inline]
            pub fn from_raw(raw: NonZeroUsize) -> Self {
                Self { inner: raw }
            }

            /// Get the raw backend identifier.
            #[inline]
            pub fn into_raw(self) -> NonZeroUsize {
                self.inner
            }
        }
    };
}

opaque_handle! {
    /// A window a context can draw into.
    WindowRef
}

opaque_handle! {
    /// An in-memory bitmap image a context can draw into.
    BitmapRef
}

opaque_handle! {
    /// A raw graphics port, such as a native drawing context handed over by the window system.
    PortHandle
}

opaque_handle! {
    /// A device-level drawable a backend is bound to via `set_device`.
    DeviceHandle
}

opaque_handle! {
    /// A window-system driver that reports exposed regions.
    DriverHandle
}

/// Tag of a named graphics state defined with `define_gstate`.
pub type GStateTag = i32;

/// A glyph index in the current font.
pub type Glyph = u32;

/// The device a backend is currently bound to, with the pixel offset of the drawing origin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct DeviceBinding {
    /// The device, or `None` if the backend has not been bound.
    pub device: Option<DeviceHandle>,
    /// Horizontal offset, in device pixels.
    pub x: i32,
    /// Vertical offset, in device pixels.
    pub y: i32,
}

/// Raw bitmap samples handed to `draw_bitmap`.
///
/// `data` holds one plane per color component when `is_planar` is set, otherwise a single meshed plane. The
/// sample layout is described entirely by the fields below; backends are free to refuse layouts they do
/// not understand.
#[derive(Debug, Clone, Copy)]
pub struct Bitmap<'a> {
    /// Width in pixels.
    pub pixels_wide: u32,
    /// Height in pixels.
    pub pixels_high: u32,
    /// Bits per color sample.
    pub bits_per_sample: u32,
    /// Samples per pixel, including alpha.
    pub samples_per_pixel: u32,
    /// Bits per pixel; may exceed `bits_per_sample * samples_per_pixel` because of padding.
    pub bits_per_pixel: u32,
    /// Bytes per row of one plane.
    pub bytes_per_row: u32,
    /// Whether each sample lives in its own plane.
    pub is_planar: bool,
    /// Whether the last sample of each pixel is alpha.
    pub has_alpha: bool,
    /// Name of the colorspace the samples are in, e.g. `"DeviceRGB"`.
    pub color_space_name: &'a str,
    /// The sample planes.
    pub data: &'a [&'a [u8]],
}

impl<'a> Bitmap<'a> {
    /// Number of color samples per pixel, not counting alpha.
    #[inline]
    pub fn color_samples(&self) -> u32 {
        if self.has_alpha {
            self.samples_per_pixel.saturating_sub(1)
        } else {
            self.samples_per_pixel
        }
    }

    /// Number of bytes one plane should hold.
    #[inline]
    pub fn plane_len(&self) -> usize {
        self.bytes_per_row as usize * self.pixels_high as usize
    }
}
