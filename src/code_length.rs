//! Compressed code length as a complexity proxy.
//!
//! A [`CodeLengthOracle`] turns a byte sequence into the length of its lossless
//! encoding. Lengths include the container overhead of the backend (gzip header and
//! trailer, xz stream header and index). Gaps are only meaningful when the real and
//! surrogate windows of a trial go through the same oracle, so that this constant
//! overhead cancels.

use crate::errors::{CompressibilityError, CompressibilityResult};
use flate2::{write::GzEncoder, Compression};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// Default compression level for both backends.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Lossless code-length measurement.
///
/// Implementations must be deterministic for a fixed input, backend and level.
pub trait CodeLengthOracle: Send + Sync {
    /// Short backend name used in reports.
    fn name(&self) -> &'static str;

    /// Compressed length of `bytes`, in bytes.
    fn code_length(&self, bytes: &[u8]) -> CompressibilityResult<usize>;
}

/// Backend selector carried by an experiment configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CompressionBackend {
    /// gzip (deflate)
    Fast,
    /// xz (LZMA2)
    Strong,
}

impl CompressionBackend {
    /// Every backend, in report order.
    pub const ALL: [CompressionBackend; 2] = [CompressionBackend::Fast, CompressionBackend::Strong];

    /// Name of the concrete codec.
    pub fn codec_name(self) -> &'static str {
        match self {
            CompressionBackend::Fast => "gzip",
            CompressionBackend::Strong => "lzma",
        }
    }

    /// Whether this backend is compiled into the current build.
    pub fn is_available(self) -> bool {
        match self {
            CompressionBackend::Fast => true,
            CompressionBackend::Strong => cfg!(feature = "lzma"),
        }
    }

    /// Build an oracle for this backend at `level` (0-9).
    pub fn oracle(self, level: u32) -> CompressibilityResult<Box<dyn CodeLengthOracle>> {
        if level > 9 {
            return Err(CompressibilityError::InvalidParameter {
                parameter: "compression_level".to_string(),
                value: level as f64,
                constraint: "[0, 9]".to_string(),
            });
        }
        match self {
            CompressionBackend::Fast => Ok(Box::new(GzipOracle::new(level))),
            CompressionBackend::Strong => strong_oracle(level),
        }
    }
}

impl fmt::Display for CompressionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codec_name())
    }
}

#[cfg(feature = "lzma")]
fn strong_oracle(level: u32) -> CompressibilityResult<Box<dyn CodeLengthOracle>> {
    Ok(Box::new(XzOracle::new(level)))
}

#[cfg(not(feature = "lzma"))]
fn strong_oracle(_level: u32) -> CompressibilityResult<Box<dyn CodeLengthOracle>> {
    Err(CompressibilityError::BackendUnavailable {
        backend: CompressionBackend::Strong.codec_name().to_string(),
    })
}

fn io_failure(backend: &str, err: std::io::Error) -> CompressibilityError {
    CompressibilityError::CompressionError {
        backend: backend.to_string(),
        reason: err.to_string(),
    }
}

/// gzip container around a deflate stream.
#[derive(Debug, Clone, Copy)]
pub struct GzipOracle {
    level: u32,
}

impl GzipOracle {
    /// Oracle at the given deflate level.
    pub fn new(level: u32) -> Self {
        Self { level: level.min(9) }
    }

    /// Deflate level in use.
    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for GzipOracle {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

impl CodeLengthOracle for GzipOracle {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn code_length(&self, bytes: &[u8]) -> CompressibilityResult<usize> {
        let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() + 32), Compression::new(self.level));
        encoder.write_all(bytes).map_err(|e| io_failure("gzip", e))?;
        let compressed = encoder.finish().map_err(|e| io_failure("gzip", e))?;
        Ok(compressed.len())
    }
}

/// xz container (CRC64 check) around an LZMA2 stream.
#[cfg(feature = "lzma")]
#[derive(Debug, Clone, Copy)]
pub struct XzOracle {
    preset: u32,
}

#[cfg(feature = "lzma")]
impl XzOracle {
    /// Oracle at the given xz preset.
    pub fn new(preset: u32) -> Self {
        Self { preset: preset.min(9) }
    }

    /// Preset in use.
    pub fn preset(&self) -> u32 {
        self.preset
    }
}

#[cfg(feature = "lzma")]
impl Default for XzOracle {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

#[cfg(feature = "lzma")]
impl CodeLengthOracle for XzOracle {
    fn name(&self) -> &'static str {
        "lzma"
    }

    fn code_length(&self, bytes: &[u8]) -> CompressibilityResult<usize> {
        let mut encoder = xz2::write::XzEncoder::new(Vec::with_capacity(bytes.len() + 64), self.preset);
        encoder.write_all(bytes).map_err(|e| io_failure("lzma", e))?;
        let compressed = encoder.finish().map_err(|e| io_failure("lzma", e))?;
        Ok(compressed.len())
    }
}
