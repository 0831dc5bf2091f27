use crate::config::Settings;

/// Настройки логирования.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Уровень или директива `EnvFilter` (например `"rankskip=debug"`).
    pub level: String,
    /// Вывод в формате JSON.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            level: settings.log_level.clone(),
            json: settings.log_json,
        }
    }

    /// Директива фильтра для `EnvFilter`.
    pub fn build_filter_directive(&self) -> String {
        self.level.trim().to_string()
    }
}
