use std::fmt;

use num_enum::TryFromPrimitive;

/// Коды статуса для категоризации ошибок.
///
/// # Диапазоны:
/// - 1xxx: Общие ошибки
/// - 2xxx: Ошибки данных
///
/// `num_enum::TryFromPrimitive` даёт нативную реализацию `TryFrom<u32>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 1xxx: Общие ошибки ===
    Internal = 1003,

    // === 2xxx: Ошибки данных ===
    NotFound = 2000,
    IndexOutOfBounds = 2006,
    InvalidData = 2009,
}

/// Уровень, на котором ошибка попадает в лог.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Является ли код ошибкой вызывающей стороны (отсутствующее значение,
    /// индекс вне диапазона).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound | Self::IndexOutOfBounds)
    }

    /// Требуется ли логировать как критическую ошибку.
    ///
    /// `InvalidData` означает нарушение внутренних инвариантов структуры.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Internal | Self::InvalidData)
    }

    /// Рекомендуемый уровень логирования для данного кода.
    pub fn log_level(&self) -> LogLevel {
        if self.is_critical() {
            LogLevel::Error
        } else {
            LogLevel::Debug
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
