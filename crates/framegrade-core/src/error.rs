use thiserror::Error;

#[derive(Error, Debug)]
pub enum FramegradeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Unsupported input: {0}")]
    Unsupported(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Failed to allocate {bytes} bytes")]
    Alloc { bytes: usize },

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),
}

/// Coarse failure class of a [`FramegradeError`].
///
/// Container, image and I/O failures all happen on the decode side of the
/// boundary and classify as [`ErrorKind::Decode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Alloc,
    Decode,
    Unsupported,
}

impl ErrorKind {
    /// Stable numeric code for host bindings.
    pub fn code(self) -> i32 {
        match self {
            Self::InvalidArgument => 1,
            Self::Alloc => 2,
            Self::Decode => 4,
            Self::Unsupported => 5,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::Alloc => write!(f, "allocation failure"),
            Self::Decode => write!(f, "decode error"),
            Self::Unsupported => write!(f, "unsupported input"),
        }
    }
}

impl FramegradeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::InvalidDimensions { .. } => ErrorKind::InvalidArgument,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Alloc { .. } => ErrorKind::Alloc,
            Self::Decode(_) | Self::InvalidSer(_) | Self::Io(_) | Self::ImageError(_) => {
                ErrorKind::Decode
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FramegradeError>;
