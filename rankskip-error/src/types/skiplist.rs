use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки операций пропускного списка.
///
/// Обе ошибки означают нарушение предусловия вызывающей стороной; структура
/// при этом не изменяется.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipListError {
    /// Значение для поиска или удаления отсутствует
    #[error("value is not in SkipList")]
    NotFound,
    /// Ранг вне диапазона `[-len, len)`
    #[error("SkipList index {index} out of range for length {len}")]
    OutOfRange { index: isize, len: usize },
}

impl ErrorExt for SkipListError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NotFound,
            Self::OutOfRange { .. } => StatusCode::IndexOutOfBounds,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(SkipListError::NotFound.status_code(), StatusCode::NotFound);
        assert_eq!(
            SkipListError::OutOfRange { index: 3, len: 1 }.status_code(),
            StatusCode::IndexOutOfBounds
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(SkipListError::NotFound.to_string(), "value is not in SkipList");
        assert_eq!(
            SkipListError::OutOfRange { index: -4, len: 3 }.to_string(),
            "SkipList index -4 out of range for length 3"
        );
    }

    #[test]
    fn test_client_message_is_display() {
        let err = SkipListError::OutOfRange { index: 0, len: 0 };
        assert_eq!(err.client_message(), err.to_string());
        assert_eq!(err.type_name(), "SkipListError");
    }
}
