use std::fmt;
use std::path::PathBuf;

/// Convenience result type used across the crate.
pub type IconsetResult<T> = Result<T, IconsetError>;

/// Filesystem step that failed while materializing an output set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOp {
    /// Removing a previous output directory.
    RemoveDir,
    /// Creating the output (or staging) directory.
    CreateDir,
    /// Writing the manifest document.
    WriteManifest,
    /// Writing one encoded image file.
    WriteImage,
    /// Moving a previous output aside or renaming the staged output into place.
    SwapDir,
    /// Moving a previous output back after a failed swap.
    RestoreDir,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RemoveDir => "remove directory",
            Self::CreateDir => "create directory",
            Self::WriteManifest => "write manifest",
            Self::WriteImage => "write image",
            Self::SwapDir => "swap directory",
            Self::RestoreDir => "restore previous output",
        };
        f.write_str(s)
    }
}

/// Closed error taxonomy for a generation run.
///
/// Every variant aborts the run; callers only need to tell the categories apart.
#[derive(thiserror::Error, Debug)]
pub enum IconsetError {
    /// No master image path was supplied.
    #[error("missing input path: expected a path to a 1024x1024 master image")]
    MissingInputPath,

    /// The master image file could not be opened or read.
    #[error("cannot read source '{}': {source}", path.display())]
    UnreadableSource {
        /// Offending path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The byte stream is not a decodable raster image.
    #[error("decode error: {0}")]
    Decode(String),

    /// The decoded master is not the required square size.
    #[error("dimension mismatch: expected {expected}x{expected}, got {width}x{height}")]
    DimensionMismatch {
        /// Required edge length in pixels.
        expected: u32,
        /// Decoded width.
        width: u32,
        /// Decoded height.
        height: u32,
    },

    /// The manifest document or one of its entries is malformed.
    #[error("manifest parse error: {0}")]
    ManifestParse(String),

    /// Invalid target size or raster allocation failure.
    #[error("resample error: {0}")]
    Resample(String),

    /// A rendered raster could not be encoded.
    #[error("encode error for '{filename}': {reason}")]
    Encode {
        /// Manifest filename being encoded.
        filename: String,
        /// Encoder message.
        reason: String,
    },

    /// Filesystem failure while replacing the directory or writing a file.
    #[error("failed to {op} '{}': {source}", path.display())]
    Write {
        /// Step that failed.
        op: WriteOp,
        /// Offending path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl IconsetError {
    /// Build a [`IconsetError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`IconsetError::ManifestParse`] value.
    pub fn manifest(msg: impl Into<String>) -> Self {
        Self::ManifestParse(msg.into())
    }

    /// Build a [`IconsetError::Resample`] value.
    pub fn resample(msg: impl Into<String>) -> Self {
        Self::Resample(msg.into())
    }

    /// Build a [`IconsetError::Encode`] value.
    pub fn encode(filename: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Encode {
            filename: filename.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`IconsetError::Write`] value.
    pub fn write(op: WriteOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            op,
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error category. Always nonzero and distinct per variant.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MissingInputPath => 2,
            Self::UnreadableSource { .. } => 3,
            Self::Decode(_) => 4,
            Self::DimensionMismatch { .. } => 5,
            Self::ManifestParse(_) => 6,
            Self::Resample(_) => 7,
            Self::Encode { .. } => 8,
            Self::Write { .. } => 9,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
