//! Error types for glTF import.

use crate::error::GraphicsError;

/// Errors that can occur during glTF import.
#[derive(Debug)]
pub enum GltfError {
    /// The parser rejected the document.
    Parse(gltf_dep::Error),
    /// Failed to read the document or a side file.
    Io {
        /// Path that failed to read.
        path: std::path::PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// An index into a document sequence was out of range.
    Lookup {
        /// Which sequence the lookup was against.
        what: &'static str,
        /// The out-of-range index.
        index: usize,
    },
    /// Error reading accessor data.
    Accessor(String),
    /// Error resolving buffer data.
    Buffer(String),
    /// Failed to decode an image.
    ImageDecode(String),
    /// A device operation failed.
    Graphics(GraphicsError),
}

impl std::fmt::Display for GltfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "glTF parse error: {e}"),
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Lookup { what, index } => write!(f, "{what} index {index} out of range"),
            Self::Accessor(msg) => write!(f, "accessor error: {msg}"),
            Self::Buffer(msg) => write!(f, "buffer error: {msg}"),
            Self::ImageDecode(msg) => write!(f, "image decode error: {msg}"),
            Self::Graphics(e) => write!(f, "graphics error: {e}"),
        }
    }
}

impl std::error::Error for GltfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::Graphics(e) => Some(e),
            _ => None,
        }
    }
}

impl From<gltf_dep::Error> for GltfError {
    fn from(e: gltf_dep::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<GraphicsError> for GltfError {
    fn from(e: GraphicsError) -> Self {
        Self::Graphics(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lookup() {
        let err = GltfError::Lookup {
            what: "material",
            index: 7,
        };
        assert_eq!(err.to_string(), "material index 7 out of range");
    }

    #[test]
    fn display_graphics() {
        let err = GltfError::from(GraphicsError::OutOfMemory);
        assert_eq!(err.to_string(), "graphics error: out of GPU memory");
    }
}
