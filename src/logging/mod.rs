pub mod config;
mod filters;

pub use config::LoggingConfig;
use rankskip_error::{ErrorExt, LogLevel};

/// Инициализация логирования с конфигурацией.
///
/// Повторный вызов возвращает ошибку: глобальный subscriber уже установлен.
pub fn init_logging(
    config: &LoggingConfig
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = filters::build_filter_from_config(config);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    if config.json {
        builder.json().try_init()?;
    } else {
        builder.try_init()?;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        json = config.json,
        "Logging system initialized"
    );

    Ok(())
}

/// Пишет ошибку в лог на уровне, который задаёт её статус-код.
pub fn log_error(err: &dyn ErrorExt) {
    let status = err.status_code();
    let critical = status.is_critical();
    let client_error = status.is_client_error();

    match status.log_level() {
        LogLevel::Debug => tracing::debug!(
            %status,
            critical,
            client_error,
            error = %err.type_name(),
            "{}",
            err.client_message()
        ),
        LogLevel::Error => tracing::error!(
            %status,
            critical,
            client_error,
            error = %err.type_name(),
            "{}",
            err.log_message()
        ),
    }
}
