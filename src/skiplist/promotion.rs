//! Автомат продвижения узлов на следующий уровень.
//!
//! Используется при добавлении уровня и в `preen`. Узлы уровня
//! рассматриваются по порядку; после первого (всегда продвигаемого) узла
//! они разбиваются на пары, и в каждой паре продвигается ровно один узел,
//! выбранный броском монеты.

/// Состояние автомата продвижения.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Promotion {
    /// Решение принимается броском монеты.
    May,
    /// Узел продвигается обязательно.
    #[default]
    Must,
    /// Узел не продвигается.
    MustNot,
}

impl Promotion {
    /// Принимает решение для очередного узла и переходит в следующее
    /// состояние.
    ///
    /// `coin` вызывается только в состоянии [`Promotion::May`].
    pub fn step<F>(
        &mut self,
        coin: F,
    ) -> bool
    where
        F: FnOnce() -> bool,
    {
        let (promote, next) = match *self {
            Promotion::Must => (true, Promotion::May),
            Promotion::MustNot => (false, Promotion::May),
            Promotion::May => {
                if coin() {
                    (true, Promotion::MustNot)
                } else {
                    (false, Promotion::Must)
                }
            }
        };

        *self = next;
        promote
    }
}
