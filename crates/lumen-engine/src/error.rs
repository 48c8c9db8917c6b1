use std::fmt;

/// Errors raised while creating, uploading, or addressing GPU resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// A view was requested before the texture was given a size or an image.
    UninitializedResource { label: &'static str },

    /// A uniform slot outside the current arena size was addressed.
    IndexOutOfRange {
        label: &'static str,
        index: usize,
        len: usize,
    },

    /// Pixel data or texture format has no matching upload path.
    UnsupportedFormat { reason: String },

    /// The texture's usage flags or kind do not permit the requested operation.
    InvalidUsage { label: &'static str, reason: String },

    /// Cubemap faces are not square, do not share dimensions, or are empty.
    MismatchedCubemapFaces {
        face: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },

    /// The device refused to allocate a resource.
    ///
    /// Fatal for the resource, not for the process: callers may skip the draw
    /// that needed it and continue the frame.
    DeviceAllocation { label: String, reason: String },
}

impl ResourceError {
    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat { reason: reason.into() }
    }

    pub(crate) fn allocation(label: Option<&str>, reason: impl Into<String>) -> Self {
        Self::DeviceAllocation {
            label: label.unwrap_or("<unlabeled>").to_owned(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors that only affect a single resource.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::DeviceAllocation { .. })
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UninitializedResource { label } => {
                write!(f, "texture '{label}' has no device resource yet (set a size or image first)")
            }
            Self::IndexOutOfRange { label, index, len } => {
                write!(f, "uniform arena '{label}': index {index} out of range (len {len})")
            }
            Self::UnsupportedFormat { reason } => write!(f, "unsupported format: {reason}"),
            Self::InvalidUsage { label, reason } => {
                write!(f, "texture '{label}': invalid usage: {reason}")
            }
            Self::MismatchedCubemapFaces { face, expected, found } => write!(
                f,
                "cubemap face {face} is {}x{}, expected {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
            Self::DeviceAllocation { label, reason } => {
                write!(f, "device allocation failed for '{label}': {reason}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_index_out_of_range() {
        let err = ResourceError::IndexOutOfRange { label: "model", index: 4, len: 3 };
        assert_eq!(err.to_string(), "uniform arena 'model': index 4 out of range (len 3)");
    }

    #[test]
    fn display_cubemap_mismatch() {
        let err = ResourceError::MismatchedCubemapFaces {
            face: 3,
            expected: (64, 64),
            found: (32, 64),
        };
        assert_eq!(err.to_string(), "cubemap face 3 is 32x64, expected 64x64");
    }

    #[test]
    fn allocation_helper_defaults_label() {
        let err = ResourceError::allocation(None, "too large");
        assert!(err.is_allocation_failure());
        assert_eq!(err.to_string(), "device allocation failed for '<unlabeled>': too large");
    }

    #[test]
    fn converts_into_anyhow() {
        let err: anyhow::Error = ResourceError::unsupported("depth texture").into();
        assert!(err.to_string().contains("depth texture"));
    }
}
