use serde::{Deserialize, Serialize};

/// Coarse classification of a failed SAR request, used by callers to pick
/// a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    GeometryDegenerate,
    ArithmeticDegenerate,
    Internal,
}

/// Common error type for every SAR computation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SarError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid search object id {0}, expected 0..=19")]
    InvalidSearchObject(i32),
    #[error("degenerate geometry: {context}")]
    GeometryDegenerate { context: String, dsp: Option<usize> },
    #[error("arithmetic degenerate: {0}")]
    ArithmeticDegenerate(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

impl SarError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SarError::InvalidInput(message.into())
    }

    pub fn geometry(context: impl Into<String>) -> Self {
        SarError::GeometryDegenerate {
            context: context.into(),
            dsp: None,
        }
    }

    /// Tags a geometry failure with the 1-based drift start point it came from.
    pub fn for_dsp(self, index: usize) -> Self {
        match self {
            SarError::GeometryDegenerate { context, .. } => SarError::GeometryDegenerate {
                context: format!("DSP{}: {}", index, context),
                dsp: Some(index),
            },
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SarError::InvalidInput(_) | SarError::InvalidSearchObject(_) => ErrorKind::InvalidInput,
            SarError::GeometryDegenerate { .. } => ErrorKind::GeometryDegenerate,
            SarError::ArithmeticDegenerate(_) => ErrorKind::ArithmeticDegenerate,
            SarError::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type SarResult<T> = Result<T, SarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_object_error_is_an_input_error() {
        assert_eq!(SarError::InvalidSearchObject(42).kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn dsp_tag_only_applies_to_geometry_failures() {
        let tagged = SarError::geometry("box edge A-B").for_dsp(2);
        assert_eq!(
            tagged,
            SarError::GeometryDegenerate {
                context: "DSP2: box edge A-B".into(),
                dsp: Some(2),
            }
        );

        let untouched = SarError::invalid("bad").for_dsp(2);
        assert_eq!(untouched.kind(), ErrorKind::InvalidInput);
    }
}
