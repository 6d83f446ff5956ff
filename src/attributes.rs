// MIT/Apache2 License

use crate::{BitmapRef, PortHandle, WindowRef};
use std::{collections::BTreeMap, path::PathBuf};

/// The physical sink a context draws into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    /// A window on screen.
    Window(WindowRef),
    /// An in-memory bitmap image.
    Bitmap(BitmapRef),
    /// A raw graphics port with an explicit flip convention.
    Port {
        /// The port handle.
        port: PortHandle,
        /// Whether the port's coordinate system is flipped.
        flipped: bool,
    },
    /// A serial output stream, such as a print job or EPS file, identified by path.
    Stream(PathBuf),
}

/// The document format a streaming context produces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RepresentationFormat {
    /// A full PostScript document.
    PostScript,
    /// A single encapsulated PostScript page.
    EncapsulatedPostScript,
}

/// The attributes a [`GraphicsContext`](crate::GraphicsContext) is created with.
///
/// Attributes are supplied once at construction and are immutable for the context's lifetime. A context
/// without a destination is valid; it exists but is not bound to any device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    destination: Option<Destination>,
    format: Option<RepresentationFormat>,
    options: BTreeMap<String, String>,
}

impl Attributes {
    /// Attributes with no destination.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes targeting the given destination.
    #[inline]
    pub fn with_destination(destination: Destination) -> Self {
        Self {
            destination: Some(destination),
            ..Self::default()
        }
    }

    /// Set the representation format.
    #[inline]
    pub fn format(mut self, format: RepresentationFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set a backend-specific option.
    #[inline]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// The destination, if any.
    #[inline]
    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    /// The representation format, if any.
    #[inline]
    pub fn representation_format(&self) -> Option<RepresentationFormat> {
        self.format
    }

    /// Look up a backend-specific option.
    #[inline]
    pub fn get_option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// The port handle, if the destination is a raw port.
    #[inline]
    pub fn port(&self) -> Option<PortHandle> {
        match self.destination {
            Some(Destination::Port { port, .. }) => Some(port),
            _ => None,
        }
    }

    /// The flip flag implied by the destination. Only raw ports carry one.
    #[inline]
    pub fn flipped(&self) -> bool {
        matches!(
            self.destination,
            Some(Destination::Port { flipped: true, .. })
        )
    }

    /// Check that these attributes describe something a context can be built around.
    pub fn validate(&self) -> crate::Result {
        if let Some(format) = self.format {
            match self.destination {
                None | Some(Destination::Stream(_)) => {}
                Some(ref other) => {
                    return Err(crate::Error::InvalidAttributes(format!(
                        "{:?} output requires a stream destination, got {:?}",
                        format, other
                    )))
                }
            }
        }

        if self.options.keys().any(|key| key.is_empty()) {
            return Err(crate::Error::InvalidAttributes(
                "option keys must not be empty".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn port(flipped: bool) -> Destination {
        Destination::Port {
            port: PortHandle::from_raw(NonZeroUsize::new(7).unwrap()),
            flipped,
        }
    }

    #[test]
    fn port_carries_flip() {
        assert!(Attributes::with_destination(port(true)).flipped());
        assert!(!Attributes::with_destination(port(false)).flipped());
        assert!(!Attributes::new().flipped());
        assert_eq!(
            Attributes::with_destination(port(false)).port().map(|p| p.into_raw().get()),
            Some(7)
        );
    }

    #[test]
    fn format_needs_stream() {
        let ok = Attributes::with_destination(Destination::Stream("out.ps".into()))
            .format(RepresentationFormat::PostScript);
        assert!(ok.validate().is_ok());
        assert!(Attributes::new()
            .format(RepresentationFormat::EncapsulatedPostScript)
            .validate()
            .is_ok());

        let bad = Attributes::with_destination(port(false)).format(RepresentationFormat::PostScript);
        assert!(matches!(
            bad.validate(),
            Err(crate::Error::InvalidAttributes(_))
        ));
    }

    #[test]
    fn empty_option_key_rejected() {
        assert!(Attributes::new().option("", "x").validate().is_err());
        let attrs = Attributes::new().option("resolution", "300");
        assert_eq!(attrs.get_option("resolution"), Some("300"));
        assert!(attrs.validate().is_ok());
    }
}
