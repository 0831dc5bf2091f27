use tracing_subscriber::EnvFilter;

use crate::logging::config::LoggingConfig;

pub fn build_filter_from_config(config: &LoggingConfig) -> EnvFilter {
    let directive = config.build_filter_directive();

    // Если RUST_LOG задан — используем его.
    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => match EnvFilter::try_new(&directive) {
            Ok(filter) => filter,
            Err(e) => {
                eprintln!(
                    "Invalid log filter directive from config ('{directive}'): {e}; falling back to 'info'"
                );
                EnvFilter::new("info")
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        sync::{Arc, Mutex},
    };

    use serial_test::serial;
    use tracing_subscriber::{fmt, prelude::*, registry::Registry};

    use super::*;
    use crate::{logging::log_error, SkipList, SkipListError, ValidationError};

    // Мини-буферный writer для тестов
    struct VecMakeWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for VecMakeWriter {
        type Writer = VecWriterGuard;

        fn make_writer(&'a self) -> Self::Writer {
            VecWriterGuard(self.0.clone())
        }
    }

    struct VecWriterGuard(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for VecWriterGuard {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> std::io::Result<usize> {
            let mut locked = self.0.lock().unwrap();
            locked.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture<F: FnOnce()>(
        directive: &str,
        f: F,
    ) -> String {
        let filter = EnvFilter::try_new(directive).expect("failed to build env filter");
        capture_with(filter, f)
    }

    fn capture_with<F: FnOnce()>(
        filter: EnvFilter,
        f: F,
    ) -> String {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let layer = fmt::layer()
            .with_ansi(false)
            .with_writer(VecMakeWriter(buffer.clone()))
            .with_filter(filter);
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, f);

        let out = buffer.lock().unwrap();
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Тест проверяет, что некорректная директива заменяется фильтром `info`.
    #[test]
    #[serial]
    fn test_build_filter_from_config_invalid_directive() {
        env::remove_var("RUST_LOG");
        let cfg = LoggingConfig {
            level: "rankskip=notalevel".to_string(),
            json: false,
        };
        assert!(EnvFilter::try_new(cfg.build_filter_directive()).is_err());

        let out = capture_with(build_filter_from_config(&cfg), || {
            tracing::info!("visible at info");
            tracing::debug!("hidden at info");
        });

        assert!(out.contains("visible at info"));
        assert!(!out.contains("hidden at info"));
    }

    /// Тест проверяет, что без `RUST_LOG` применяется уровень из конфигурации.
    #[test]
    #[serial]
    fn test_build_filter_from_config_uses_configured_level() {
        env::remove_var("RUST_LOG");
        let cfg = LoggingConfig {
            level: "debug".to_string(),
            json: false,
        };

        let out = capture_with(build_filter_from_config(&cfg), || {
            tracing::debug!("visible at debug");
            tracing::trace!("hidden at debug");
        });

        assert!(out.contains("visible at debug"));
        assert!(!out.contains("hidden at debug"));
    }

    /// Тест проверяет, что уровень записи об ошибке задаётся её статус-кодом.
    #[test]
    fn test_log_error_level_follows_status_code() {
        let emit = || {
            log_error(&SkipListError::OutOfRange { index: 7, len: 2 });
            log_error(&ValidationError::LengthMismatch {
                expected: 3,
                actual: 2,
            });
        };

        let info_out = capture("info", emit);
        assert!(!info_out.contains("out of range"));
        assert!(info_out.contains("LengthMismatch"));
        assert!(info_out.contains("critical=true"));

        let debug_out = capture("debug", emit);
        assert!(debug_out.contains("SkipList index 7 out of range for length 2"));
        assert!(debug_out.contains("status=IndexOutOfBounds"));
        assert!(debug_out.contains("client_error=true"));
    }

    /// Тест проверяет, что изменение высоты списка попадает в лог на уровне
    /// debug и отфильтровывается на уровне info.
    #[test]
    fn test_height_changes_are_logged_at_debug() {
        let grow = || {
            let mut sl = SkipList::with_seed(1);
            for i in 0..5 {
                sl.add(i);
            }
            sl.preen();
        };

        let debug_out = capture("debug", grow);
        assert!(debug_out.contains("SkipList grew a level"));
        assert!(debug_out.contains("SkipList preened"));

        let info_out = capture("info", grow);
        assert!(!info_out.contains("SkipList grew a level"));
    }
}
