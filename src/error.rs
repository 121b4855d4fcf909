use core::fmt::{Display, Formatter};

/// Errors surfaced at the public boundaries of the sieve.
///
/// Precondition violations fail the offending call immediately and leave no
/// partially initialized state behind; allocation failures tear down whatever
/// was already built and surface here instead of aborting.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// A construction or call precondition was violated.
    Precondition(&'static str),
    /// Memory for the named resource could not be allocated.
    Allocation(&'static str),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Precondition(what) => write!(f, "precondition violated: {}", what),
            Error::Allocation(what) => write!(f, "allocation failed: {}", what),
        }
    }
}

impl core::error::Error for Error {}
