//! Catalog loading errors.

use std::path::PathBuf;

use thiserror::Error;

/// Malformed or inconsistent body data. Always fatal at startup.
#[derive(Debug, Error)]
pub enum DataError {
    /// The catalog document could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// Path of the document.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON, misses a required field, or has an unknown one.
    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// The body used to normalize size ratios is absent.
    #[error("reference body '{0}' not found in catalog")]
    MissingReferenceBody(String),

    /// A record names a texture key the document's texture table does not define.
    #[error("{owner} references undefined texture key '{key}'")]
    UnknownTexture {
        /// Name of the star, body, ring owner, or belt.
        owner: String,
        /// The undefined key.
        key: String,
    },

    /// Two records share a name.
    #[error("duplicate body name '{0}'")]
    DuplicateName(String),

    /// A rotation period of zero cannot be inverted into a spin rate.
    #[error("{0} has a zero rotation period")]
    ZeroRotationPeriod(String),

    /// A diameter that is zero, negative, or not finite.
    #[error("{name} has invalid diameter {value}")]
    InvalidDiameter {
        /// Record name.
        name: String,
        /// Offending value.
        value: f64,
    },

    /// A ring whose inner radius is not strictly inside its outer radius.
    #[error("{name} ring is inverted or empty (inner {inner}, outer {outer})")]
    InvalidRing {
        /// Ring owner.
        name: String,
        /// Declared inner radius.
        inner: f64,
        /// Declared outer radius.
        outer: f64,
    },

    /// A numeric field holding NaN or infinity.
    #[error("{name}.{field} is not finite")]
    NonFinite {
        /// Record name.
        name: String,
        /// Field name as it appears in the document.
        field: &'static str,
    },
}
