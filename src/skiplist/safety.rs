use std::{any::Any, fmt::Debug};

use rankskip_error::{ErrorExt, StatusCode};
use rustc_hash::FxHashMap;

use super::{
    node::{HEAD, SENTINEL},
    SkipList,
};

/// Макрос для debug-time проверки инвариантов.
///
/// В release-сборках компилируется в no-op.
#[macro_export]
macro_rules! debug_assert_invariant {
    ($cond:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            if !$cond {
                panic!("Invariant violation: {}", format!($($arg)*));
            }
        }
    };
}

/// Макрос для валидации условий с возвратом ошибки.
#[macro_export]
macro_rules! validate {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Высота узла вне диапазона `1..=height`
    InvalidLevel { node_level: usize, max_level: usize },
    /// Длины массивов ссылок и пролётов различаются
    LevelArrayMismatch { next: usize, span: usize },
    /// Нарушен порядок сортировки
    SortOrderViolation { message: String },
    /// Длина списка не соответствует реальному кол-ву узлов
    LengthMismatch { expected: usize, actual: usize },
    /// Пролёт ссылки не совпадает с расстоянием между узлами
    SpanMismatch {
        level: usize,
        expected: usize,
        actual: usize,
    },
    /// Уровень не является подпоследовательностью нижнего
    BrokenLevel { level: usize, message: String },
    /// В список вплетён слот без значения
    VacantSlot { index: usize },
    /// Обнаружена циклическая ссылка
    CyclicReference { message: String },
}

/// Статистика структуры SkipList.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipListStatistics {
    /// Количество узлов
    pub node_count: usize,
    /// Распределение по высотам: `level_distribution[h - 1]` — число узлов
    /// высоты `h`
    pub level_distribution: Vec<usize>,
    /// Текущая высота списка
    pub height: usize,
    /// Средняя высота узла
    pub average_level: f64,
}

impl SkipListStatistics {
    /// Создает пустую статистику.
    pub fn empty(height: usize) -> Self {
        Self {
            node_count: 0,
            level_distribution: vec![0; height],
            height,
            average_level: 0.0,
        }
    }

    /// Вычисляет среднюю высоту.
    pub fn compute_average_level(&mut self) {
        if self.node_count == 0 {
            self.average_level = 0.0;
            return;
        }

        let total_levels: usize = self
            .level_distribution
            .iter()
            .enumerate()
            .map(|(level, &count)| (level + 1) * count)
            .sum();

        self.average_level = total_levels as f64 / self.node_count as f64;
    }

    /// Форматирует статистику для вывода.
    pub fn format_report(&self) -> String {
        let mut report = String::new();
        report.push_str("SkipList Statistics:\n");
        report.push_str(&format!("  Total nodes: {}\n", self.node_count));
        report.push_str(&format!("  Height: {}\n", self.height));
        report.push_str(&format!("  Average level: {:.2}\n", self.average_level));
        report.push_str("  Level distribution:\n");

        for (level, &count) in self.level_distribution.iter().enumerate() {
            if count > 0 {
                let percentage = (count as f64 / self.node_count as f64) * 100.0;
                report.push_str(&format!(
                    "    Level {}: {} nodes ({:.1}%)\n",
                    level + 1,
                    count,
                    percentage
                ));
            }
        }

        report
    }
}

impl<T> SkipList<T> {
    /// Собирает статистику распределения высот узлов.
    pub fn statistics(&self) -> SkipListStatistics {
        let mut stats = SkipListStatistics::empty(self.height);

        for height in self.layers() {
            if let Some(slot) = stats.level_distribution.get_mut(height - 1) {
                *slot += 1;
            }
            stats.node_count += 1;
        }

        stats.compute_average_level();
        stats
    }
}

impl<T: Ord + Debug> SkipList<T> {
    /// Проверяет все структурные инварианты списка.
    ///
    /// Обходит каждый уровень целиком, поэтому стоит O(n · height).
    pub fn validate_invariants(&self) -> Result<(), ValidationError> {
        let store = &self.store;
        let height = self.height;
        let head = &store[HEAD];

        validate!(
            head.height() == height,
            ValidationError::InvalidLevel {
                node_level: head.height(),
                max_level: height
            }
        );
        validate!(
            head.next.len() == head.span.len(),
            ValidationError::LevelArrayMismatch {
                next: head.next.len(),
                span: head.span.len()
            }
        );

        // Позиции узлов на уровне 0 (голова — 0) и число узлов каждой высоты.
        let mut positions: FxHashMap<usize, usize> = FxHashMap::default();
        let mut per_height = vec![0usize; height + 1];
        let mut prev_value: Option<&T> = None;
        let mut current = head.next[0];
        let mut count = 0;

        positions.insert(HEAD, 0);

        while current != SENTINEL {
            validate!(
                !positions.contains_key(&current),
                ValidationError::CyclicReference {
                    message: format!("node {current} is reached twice on level 0")
                }
            );

            let node = &store[current];
            let value = match node.value.as_ref() {
                Some(value) => value,
                None => return Err(ValidationError::VacantSlot { index: current }),
            };

            validate!(
                node.next.len() == node.span.len(),
                ValidationError::LevelArrayMismatch {
                    next: node.next.len(),
                    span: node.span.len()
                }
            );
            validate!(
                (1..=height).contains(&node.height()),
                ValidationError::InvalidLevel {
                    node_level: node.height(),
                    max_level: height
                }
            );

            if let Some(prev) = prev_value {
                validate!(
                    prev <= value,
                    ValidationError::SortOrderViolation {
                        message: format!("{prev:?} > {value:?}")
                    }
                );
            }

            count += 1;
            per_height[node.height()] += 1;
            positions.insert(current, count);
            prev_value = Some(value);
            current = node.next[0];
        }

        validate!(
            count == self.size,
            ValidationError::LengthMismatch {
                expected: self.size,
                actual: count
            }
        );

        let end = self.size + 1;

        for level in 0..height {
            let expected_members: usize = per_height[level + 1..].iter().sum();
            let mut members = 0;
            let mut current = HEAD;
            let mut at = 0;

            loop {
                let node = &store[current];
                let next = node.next[level];
                let span = node.span[level];

                let next_pos = if next == SENTINEL {
                    end
                } else {
                    match positions.get(&next) {
                        Some(&pos) => pos,
                        None => {
                            return Err(ValidationError::BrokenLevel {
                                level,
                                message: format!("node {next} is not linked on level 0"),
                            })
                        }
                    }
                };

                validate!(
                    next_pos > at && next_pos - at == span,
                    ValidationError::SpanMismatch {
                        level,
                        expected: next_pos.saturating_sub(at),
                        actual: span
                    }
                );

                if next == SENTINEL {
                    break;
                }

                validate!(
                    store[next].height() > level,
                    ValidationError::BrokenLevel {
                        level,
                        message: format!(
                            "node {next} of height {} is linked above its top",
                            store[next].height()
                        ),
                    }
                );

                members += 1;
                at = next_pos;
                current = next;
            }

            validate!(
                members == expected_members,
                ValidationError::BrokenLevel {
                    level,
                    message: format!(
                        "{members} nodes linked, {expected_members} nodes reach this level"
                    ),
                }
            );
        }

        Ok(())
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ValidationError::InvalidLevel {
                node_level,
                max_level,
            } => {
                write!(
                    f,
                    "Node level {node_level} is outside 1..={max_level}"
                )
            }
            ValidationError::LevelArrayMismatch { next, span } => {
                write!(
                    f,
                    "Level arrays mismatch: {next} links, {span} spans"
                )
            }
            ValidationError::SortOrderViolation { message } => {
                write!(f, "Sort order violation: {message}")
            }
            ValidationError::LengthMismatch { expected, actual } => {
                write!(f, "Length mismatch: expected {expected}, got {actual}")
            }
            ValidationError::SpanMismatch {
                level,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Span mismatch on level {level}: expected {expected}, got {actual}"
                )
            }
            ValidationError::BrokenLevel { level, message } => {
                write!(f, "Broken level {level}: {message}")
            }
            ValidationError::VacantSlot { index } => {
                write!(f, "Vacant slot {index} is linked into the list")
            }
            ValidationError::CyclicReference { message } => {
                write!(f, "Cyclic reference detected: {message}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ErrorExt for ValidationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::InvalidData
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
