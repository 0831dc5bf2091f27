//! Пропускной список с доступом по рангу.
//!
//! Каждая ссылка хранит пролёт (span): число позиций уровня 0, которые она
//! перескакивает. Спуск от верхнего уровня к нулевому одновременно находит
//! позицию и накапливает её ранг, поэтому поиск по значению и по индексу
//! выполняются за ожидаемое O(log n).
//!
//! ```text
//! Level 2: HEAD -------------(3)------------> 5 --------(2)-------> END
//! Level 1: HEAD ----(2)----> 3 -----(1)-----> 5 ---(1)--> 5 -(1)--> END
//! Level 0: HEAD -(1)-> 1 -(1)-> 3 -(1)-----> 5 ---(1)--> 5 -(1)--> END
//! ```
//!
//! Равные значения сохраняют порядок вставки: `add` ставит элемент после
//! всех равных, `remove` и `index_of` находят первый из равных.

use std::{
    fmt::{self, Debug},
    iter::FusedIterator,
    ops::Index,
};

use rankskip_error::{SkipListError, SkipListResult};
use tracing::debug;

use super::{
    node::{NodeStore, HEAD, SENTINEL},
    promotion::Promotion,
};
use crate::{config::Settings, debug_assert_invariant};

/// Упорядоченный мультимножественный список с доступом по рангу.
///
/// Структура однопоточная: для совместного доступа из нескольких потоков
/// нужна внешняя блокировка.
#[derive(Clone)]
pub struct SkipList<T> {
    pub(crate) store: NodeStore<T>,
    /// Число активных уровней (>= 1).
    pub(crate) height: usize,
    /// Число элементов (без головы).
    pub(crate) size: usize,
    rng: fastrand::Rng,
}

/// Предшественники на каждом уровне и их позиции (голова — позиция 0).
struct Chain {
    prev: Vec<usize>,
    pos: Vec<usize>,
}

/// Итератор по значениям в порядке возрастания.
pub struct Iter<'a, T> {
    store: &'a NodeStore<T>,
    current: usize,
    remaining: usize,
}

/// Итератор, забирающий значения списка.
pub struct IntoIter<T> {
    store: NodeStore<T>,
    current: usize,
    remaining: usize,
}

/// Итератор по высотам узлов в порядке уровня 0.
pub struct Layers<'a, T> {
    store: &'a NodeStore<T>,
    current: usize,
}

#[inline]
fn pow2(exp: usize) -> usize {
    u32::try_from(exp)
        .ok()
        .and_then(|exp| 1usize.checked_shl(exp))
        .unwrap_or(usize::MAX)
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<T> SkipList<T> {
    /// Создаёт пустой список высоты 1.
    pub fn new() -> Self {
        Self::with_rng(fastrand::Rng::new())
    }

    /// Создаёт пустой список с детерминированным генератором высот.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(fastrand::Rng::with_seed(seed))
    }

    /// Создаёт пустой список согласно настройкам.
    pub fn from_settings(settings: &Settings) -> Self {
        match settings.seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }

    fn with_rng(rng: fastrand::Rng) -> Self {
        Self {
            store: NodeStore::new(),
            height: 1,
            size: 0,
            rng,
        }
    }

    /// Возвращает текущее число элементов в списке.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Проверяет на пустоту.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Число активных уровней.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Возвращает итератор по значениям в порядке возрастания.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            store: &self.store,
            current: self.store[HEAD].next[0],
            remaining: self.size,
        }
    }

    /// Возвращает высоты узлов в порядке следования элементов.
    pub fn layers(&self) -> Layers<'_, T> {
        Layers {
            store: &self.store,
            current: self.store[HEAD].next[0],
        }
    }

    /// Возвращает минимальный элемент.
    pub fn first(&self) -> Option<&T> {
        self.store.value(self.store[HEAD].next[0])
    }

    /// Возвращает максимальный элемент (последний из равных).
    pub fn last(&self) -> Option<&T> {
        let (node, _) = self.seek(|_, _| true);
        self.store.value(node)
    }

    /// Возвращает элемент с рангом `rank`; отрицательный ранг отсчитывается
    /// с конца.
    pub fn get(
        &self,
        rank: isize,
    ) -> SkipListResult<&T> {
        let resolved = self.resolve_rank(rank)?;
        self.at(resolved).ok_or(SkipListError::OutOfRange {
            index: rank,
            len: self.size,
        })
    }

    /// Удаляет элемент с рангом `rank` и возвращает его.
    pub fn delete_at(
        &mut self,
        rank: isize,
    ) -> SkipListResult<T> {
        let resolved = self.resolve_rank(rank)?;
        let out_of_range = SkipListError::OutOfRange {
            index: rank,
            len: self.size,
        };

        let chain = self.descend(|_, reach| reach <= resolved);
        let target = self.store[chain.prev[0]].next[0];

        if target == SENTINEL {
            return Err(out_of_range);
        }

        self.unlink(&chain, target).ok_or(out_of_range)
    }

    /// Удаляет и возвращает минимальный элемент.
    pub fn pop_first(&mut self) -> Option<T> {
        self.delete_at(0).ok()
    }

    /// Удаляет и возвращает максимальный элемент.
    pub fn pop_last(&mut self) -> Option<T> {
        self.delete_at(-1).ok()
    }

    /// Удаляет все элементы из списка.
    pub fn clear(&mut self) {
        self.store.clear();
        self.height = 1;
        self.size = 0;
    }

    /// Ничего не делает: список всегда отсортирован.
    pub fn sort(&mut self) {}

    /// Перестраивает все уровни выше нулевого заново.
    ///
    /// Порядок элементов и их число не меняются. Полезно, если после
    /// множества вставок и удалений распределение высот узлов стало
    /// неудачным.
    pub fn preen(&mut self) {
        let height = self.height;

        if height == 1 {
            return;
        }

        let mut promote = vec![Promotion::Must; height];
        let mut steps = vec![0usize; height];
        let mut chain = vec![HEAD; height];
        let mut current = self.store[HEAD].next[0];

        while current != SENTINEL {
            let following = self.store[current].next[0];

            for step in steps.iter_mut().skip(1) {
                *step += 1;
            }

            let mut node_height = 1;
            for level in 1..height {
                if !promote[level].step(|| self.rng.bool()) {
                    break;
                }

                let prev = &mut self.store[chain[level]];
                prev.next[level] = current;
                prev.span[level] = steps[level];

                chain[level] = current;
                steps[level] = 0;
                node_height = level + 1;
            }

            self.store.set_height(current, node_height);
            current = following;
        }

        for level in 1..height {
            let prev = &mut self.store[chain[level]];
            prev.next[level] = SENTINEL;
            prev.span[level] = steps[level] + 1;
        }

        debug!(height, size = self.size, "SkipList preened");
    }

    /// Элемент с нормализованным рангом.
    fn at(
        &self,
        rank: usize,
    ) -> Option<&T> {
        let (node, _) = self.seek(|_, reach| reach <= rank);
        self.store.value(self.store[node].next[0])
    }

    fn resolve_rank(
        &self,
        rank: isize,
    ) -> SkipListResult<usize> {
        let len = self.size;
        let resolved = if rank < 0 {
            len.checked_sub(rank.unsigned_abs())
        } else {
            Some(rank.unsigned_abs())
        };

        match resolved {
            Some(resolved) if resolved < len => Ok(resolved),
            _ => Err(SkipListError::OutOfRange { index: rank, len }),
        }
    }

    /// Спуск от верхнего уровня к нулевому.
    ///
    /// `advance(value, reach)` получает значение следующего узла и его
    /// позицию; пока он возвращает `true`, поиск продвигается вперёд.
    /// `record` вызывается при спуске с каждого уровня с последним
    /// посещённым узлом и его позицией. Возвращает предшественника на уровне
    /// 0 и его позицию, которая совпадает с рангом следующего узла.
    fn walk<F, R>(
        &self,
        mut advance: F,
        mut record: R,
    ) -> (usize, usize)
    where
        F: FnMut(&T, usize) -> bool,
        R: FnMut(usize, usize, usize),
    {
        let mut current = HEAD;
        let mut position = 0;

        for level in (0..self.height).rev() {
            loop {
                let node = &self.store[current];
                let next = node.next[level];
                let reach = position + node.span[level];

                match self.store.value(next) {
                    Some(value) if advance(value, reach) => {
                        current = next;
                        position = reach;
                    }
                    _ => break,
                }
            }

            record(level, current, position);
        }

        (current, position)
    }

    fn seek<F>(
        &self,
        advance: F,
    ) -> (usize, usize)
    where
        F: FnMut(&T, usize) -> bool,
    {
        self.walk(advance, |_, _, _| {})
    }

    fn descend<F>(
        &self,
        advance: F,
    ) -> Chain
    where
        F: FnMut(&T, usize) -> bool,
    {
        let mut chain = Chain {
            prev: vec![HEAD; self.height],
            pos: vec![0; self.height],
        };

        self.walk(advance, |level, node, position| {
            chain.prev[level] = node;
            chain.pos[level] = position;
        });

        chain
    }

    /// Генерирует высоту нового узла: геометрическое распределение с p = 1/2,
    /// ограниченное текущей высотой списка.
    fn random_height(&mut self) -> usize {
        let mut height = 1;

        while height < self.height && self.rng.bool() {
            height += 1;
        }

        height
    }

    /// Вырезает `target` из всех уровней и освобождает его слот.
    fn unlink(
        &mut self,
        chain: &Chain,
        target: usize,
    ) -> Option<T> {
        for level in 0..self.store[target].height() {
            let next = self.store[target].next[level];
            let span = self.store[target].span[level];

            let prev = &mut self.store[chain.prev[level]];
            prev.next[level] = next;
            prev.span[level] += span;
        }

        for level in 0..self.height {
            self.store[chain.prev[level]].span[level] -= 1;
        }

        let value = self.store.release(target);
        self.size -= 1;
        self.shrink();

        value
    }

    /// Добавляет один уровень, продвигая примерно половину узлов верхнего
    /// уровня.
    fn grow(&mut self) {
        let top = self.height - 1;
        let new = self.height;
        let mut promote = Promotion::default();

        let head = &mut self.store[HEAD];
        let head_span = head.span[top];
        head.next.push(SENTINEL);
        head.span.push(head_span);

        let mut prev = HEAD;
        let mut current = self.store[HEAD].next[top];

        while current != SENTINEL {
            let span = self.store[current].span[top];
            let following = self.store[current].next[top];

            if promote.step(|| self.rng.bool()) {
                let node = &mut self.store[current];
                node.next.push(SENTINEL);
                node.span.push(span);

                self.store[prev].next[new] = current;
                prev = current;
            } else {
                self.store[prev].span[new] += span;
            }

            current = following;
        }

        self.height += 1;

        debug_assert_invariant!(
            self.store[HEAD].height() == self.height,
            "head height {} != list height {}",
            self.store[HEAD].height(),
            self.height
        );
        debug!(height = self.height, size = self.size, "SkipList grew a level");
    }

    /// Убирает верхний уровень, если элементов стало мало.
    fn shrink(&mut self) {
        if self.height <= 1 || self.size >= pow2(self.height) {
            return;
        }

        let top = self.height - 1;
        let mut current = HEAD;

        while current != SENTINEL {
            let node = &mut self.store[current];
            let next = node.next.get(top).copied().unwrap_or(SENTINEL);
            node.next.truncate(top);
            node.span.truncate(top);
            current = next;
        }

        self.height = top;

        debug_assert_invariant!(
            self.store[HEAD].height() == self.height,
            "head height {} != list height {}",
            self.store[HEAD].height(),
            self.height
        );
        debug!(
            height = self.height,
            size = self.size,
            "SkipList dropped a level"
        );
    }
}

impl<T: Ord> SkipList<T> {
    /// Вставляет значение после всех равных ему элементов.
    ///
    /// Поэтому итерация по списку, построенному из последовательности,
    /// является её устойчивой сортировкой.
    pub fn add(
        &mut self,
        value: T,
    ) {
        let chain = self.descend(|v, _| v <= &value);
        let node_height = self.random_height();
        let idx = self.store.alloc(value, node_height);
        let position = chain.pos[0];

        for level in 0..node_height {
            let prev = chain.prev[level];
            let offset = position - chain.pos[level];
            let next = self.store[prev].next[level];
            let span = self.store[prev].span[level];

            let node = &mut self.store[idx];
            node.next[level] = next;
            node.span[level] = span - offset;

            let prev = &mut self.store[prev];
            prev.next[level] = idx;
            prev.span[level] = offset + 1;
        }

        for level in node_height..self.height {
            self.store[chain.prev[level]].span[level] += 1;
        }

        self.size += 1;

        if self.size > pow2(self.height + 1) {
            self.grow();
        }
    }

    /// Синоним [`SkipList::add`].
    pub fn append(
        &mut self,
        value: T,
    ) {
        self.add(value);
    }

    /// Удаляет первый элемент, равный `value`, и возвращает его.
    pub fn remove(
        &mut self,
        value: &T,
    ) -> SkipListResult<T> {
        let chain = self.descend(|v, _| v < value);
        let target = self.store[chain.prev[0]].next[0];

        if self.store.value(target) != Some(value) {
            return Err(SkipListError::NotFound);
        }

        self.unlink(&chain, target).ok_or(SkipListError::NotFound)
    }

    /// Ранг первого элемента, равного `value`.
    pub fn index_of(
        &self,
        value: &T,
    ) -> SkipListResult<usize> {
        let (node, position) = self.seek(|v, _| v < value);

        match self.store.value(self.store[node].next[0]) {
            Some(found) if found == value => Ok(position),
            _ => Err(SkipListError::NotFound),
        }
    }

    /// Синоним [`SkipList::index_of`].
    pub fn find(
        &self,
        value: &T,
    ) -> SkipListResult<usize> {
        self.index_of(value)
    }

    /// Проверяет, содержится ли значение в списке.
    pub fn contains(
        &self,
        value: &T,
    ) -> bool {
        self.index_of(value).is_ok()
    }

    /// Число элементов, равных `value`.
    pub fn count(
        &self,
        value: &T,
    ) -> usize {
        let (node, _) = self.seek(|v, _| v < value);
        let mut current = self.store[node].next[0];
        let mut count = 0;

        while let Some(found) = self.store.value(current) {
            if found != value {
                break;
            }
            count += 1;
            current = self.store[current].next[0];
        }

        count
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для SkipList
////////////////////////////////////////////////////////////////////////////////

impl<T> Default for SkipList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for SkipList<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for SkipList<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for SkipList<T> {}

impl<T> Index<usize> for SkipList<T> {
    type Output = T;

    /// # Panics
    ///
    /// Паникует, если `rank >= len()`.
    fn index(
        &self,
        rank: usize,
    ) -> &T {
        match self.at(rank) {
            Some(value) => value,
            None => panic!(
                "SkipList index {rank} out of range for length {}",
                self.size
            ),
        }
    }
}

impl<T: Ord> FromIterator<T> for SkipList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = SkipList::new();
        list.extend(iter);
        list
    }
}

impl<T: Ord> Extend<T> for SkipList<T> {
    fn extend<I: IntoIterator<Item = T>>(
        &mut self,
        iter: I,
    ) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a SkipList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for SkipList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            current: self.store[HEAD].next[0],
            remaining: self.size,
            store: self.store,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.store.value(self.current)?;
        self.current = self.store[self.current].next[0];
        self.remaining = self.remaining.saturating_sub(1);

        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.store.take_value(self.current)?;
        self.current = self.store[self.current].next[0];
        self.remaining = self.remaining.saturating_sub(1);

        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Iterator for Layers<'_, T> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == SENTINEL {
            return None;
        }

        let node = &self.store[self.current];
        self.current = node.next[0];

        Some(node.height())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
