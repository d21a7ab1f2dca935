use core::fmt;

/// Error conditions surfaced across controller bring-up, the page-table engine and the DMA
/// mapping façade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A null pointer, an unrecognized DMA operation code, or some other caller-supplied value
    /// that cannot be acted on.
    InvalidParameter,
    /// A page, queue or table allocation failed. Bubbled up; any allocations already made by the
    /// failing operation are freed before returning, except where documented otherwise (see
    /// [`crate::dma`]'s `Map` caveat).
    OutOfResources,
    /// A register poll did not observe the expected value within its 1 ms ceiling.
    Timeout,
    /// A required external resource (e.g. the handoff configuration blob) was not present.
    NotFound,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::InvalidParameter => "invalid parameter",
            Error::OutOfResources => "out of resources",
            Error::Timeout => "timed out waiting for hardware",
            Error::NotFound => "required resource not found",
        };
        f.write_str(msg)
    }
}

pub type Result<T> = core::result::Result<T, Error>;
