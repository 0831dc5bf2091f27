use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

/// Префикс переменных окружения (`RANKSKIP_SEED`, `RANKSKIP_LOG_LEVEL`, ...).
pub const ENV_PREFIX: &str = "RANKSKIP";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Seed генератора высот; `None` — случайная инициализация.
    pub seed: Option<u64>,
    /// Уровень логирования по умолчанию (перекрывается `RUST_LOG`).
    pub log_level: String,
    /// Вывод логов в JSON.
    pub log_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            // Добавляем значения по умолчанию
            .set_default("log_level", "info")?
            .set_default("log_json", false)?
            // Добавляем переменные окружения с префиксом RANKSKIP_
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        // Десериализуем конфигурацию в нашу структуру
        cfg.try_deserialize()
    }
}
