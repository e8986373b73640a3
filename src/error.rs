use quick_xml::events::attributes::AttrError;
use std::fmt;

/// Error types for reading, densifying and writing track files
#[derive(Debug)]
pub enum DensifyError {
    /// I/O errors
    Io(std::io::Error),
    /// UTF-8 decoding errors
    Utf8(std::str::Utf8Error),
    /// XML reader/writer errors, including documents that are not well-formed
    Xml(String),
    /// Replacement plan refers to an original point that does not exist
    InvalidPlan(String),
    /// No segment at the requested (track, segment) position
    UnknownSegment { track: usize, segment: usize },
}

impl fmt::Display for DensifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DensifyError::Io(err) => write!(f, "I/O error: {}", err),
            DensifyError::Utf8(err) => write!(f, "UTF-8 error: {}", err),
            DensifyError::Xml(msg) => write!(f, "XML error: {}", msg),
            DensifyError::InvalidPlan(msg) => write!(f, "Invalid segment plan: {}", msg),
            DensifyError::UnknownSegment { track, segment } => {
                write!(f, "No segment {} in track {}", segment, track)
            }
        }
    }
}

impl std::error::Error for DensifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DensifyError::Io(err) => Some(err),
            DensifyError::Utf8(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DensifyError {
    fn from(err: std::io::Error) -> Self {
        DensifyError::Io(err)
    }
}

impl From<std::str::Utf8Error> for DensifyError {
    fn from(err: std::str::Utf8Error) -> Self {
        DensifyError::Utf8(err)
    }
}

impl From<quick_xml::Error> for DensifyError {
    fn from(err: quick_xml::Error) -> Self {
        DensifyError::Xml(err.to_string())
    }
}

impl From<AttrError> for DensifyError {
    fn from(err: AttrError) -> Self {
        DensifyError::Xml(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DensifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = DensifyError::InvalidPlan("index 7 out of range".to_string());
        assert_eq!(err.to_string(), "Invalid segment plan: index 7 out of range");

        let err = DensifyError::UnknownSegment {
            track: 1,
            segment: 3,
        };
        assert_eq!(err.to_string(), "No segment 3 in track 1");
    }

    #[test]
    fn test_io_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = DensifyError::from(io);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("I/O error"));
    }
}
