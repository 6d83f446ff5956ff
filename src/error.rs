// MIT/Apache2 License

use crate::Operation;
use std::{fmt, io};

/// Sum error type for easel operations.
#[derive(Debug)]
pub enum Error {
    /// A static string message.
    StaticMsg(&'static str),
    /// A string message.
    Msg(String),
    /// The backend behind a context does not implement the given operation.
    Unimplemented {
        /// The operation that was attempted.
        op: Operation,
        /// Who received the operation.
        receiver: Receiver,
    },
    /// The calling thread's context state does not allow this operation, e.g. a restore without a
    /// matching save.
    InvalidState(&'static str),
    /// The process-wide configuration is incomplete, e.g. no default backend is registered.
    Configuration(&'static str),
    /// The attributes passed to a context constructor are not usable.
    InvalidAttributes(String),
    /// An operation table was handed a backend of a different type than it was built for.
    BackendMismatch {
        /// The type the table was built for.
        expected: &'static str,
    },
    /// The named graphics state tag is not defined on this backend.
    UnknownGState(i32),
    /// An I/O error occurred while writing to the backend's stream.
    Io(io::Error),
}

/// The receiver of an operation that failed with [`Error::Unimplemented`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Receiver {
    /// An instance of the named backend type.
    Instance(&'static str),
    /// The named type itself, for class-level operations.
    Class(&'static str),
}

impl Error {
    /// Create an `Unimplemented` error for an instance of `B`.
    #[inline]
    pub fn unimplemented<B: ?Sized>(op: Operation) -> Self {
        Self::Unimplemented {
            op,
            receiver: Receiver::Instance(std::any::type_name::<B>()),
        }
    }

    /// Create an `Unimplemented` error for a class-level operation on `B`.
    #[inline]
    pub fn unimplemented_class<B: ?Sized>(op: Operation) -> Self {
        Self::Unimplemented {
            op,
            receiver: Receiver::Class(std::any::type_name::<B>()),
        }
    }

    /// Is this an `Unimplemented` error?
    #[inline]
    pub fn is_unimplemented(&self) -> bool {
        matches!(self, Self::Unimplemented { .. })
    }

    /// Is this an `InvalidState` error?
    #[inline]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(io) => Some(io),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticMsg(s) => f.write_str(s),
            Self::Msg(s) => f.write_str(s),
            Self::Unimplemented { op, receiver } => match receiver {
                Receiver::Instance(ty) => {
                    write!(f, "Operation \"{}\" is not implemented by instance of {}", op, ty)
                }
                Receiver::Class(ty) => {
                    write!(f, "Operation \"{}\" is not implemented by class {}", op, ty)
                }
            },
            Self::InvalidState(s) => write!(f, "Invalid graphics state: {}", s),
            Self::Configuration(s) => write!(f, "Configuration error: {}", s),
            Self::InvalidAttributes(s) => write!(f, "Invalid context attributes: {}", s),
            Self::BackendMismatch { expected } => {
                write!(f, "Operation table for {} received a foreign backend", expected)
            }
            Self::UnknownGState(tag) => write!(f, "Graphics state #{} is not defined", tag),
            Self::Io(io) => fmt::Display::fmt(io, f),
        }
    }
}

impl From<io::Error> for Error {
    #[inline]
    fn from(io: io::Error) -> Self {
        Self::Io(io)
    }
}

/// Convenience result type.
pub type Result<T = ()> = std::result::Result<T, Error>;
