//! Хранилище узлов пропускного списка.
//!
//! Узлы лежат в арене (`Vec`) и адресуются стабильными индексами. Слот `0`
//! всегда занят головой списка, индекс [`SENTINEL`] означает конец уровня.
//! Освобождённые слоты переиспользуются через free-list.

use std::ops::{Index, IndexMut};

/// Индекс головы списка в арене.
pub(crate) const HEAD: usize = 0;

/// Маркер конца списка на любом уровне.
pub(crate) const SENTINEL: usize = usize::MAX;

/// Узел пропускного списка.
///
/// `next[level]` и `span[level]` существуют для каждого уровня, в котором
/// участвует узел. `span[level]` равен числу позиций уровня 0, которые
/// перескакивает ссылка `next[level]`.
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub(crate) value: Option<T>,
    pub(crate) next: Vec<usize>,
    pub(crate) span: Vec<usize>,
}

impl<T> Node<T> {
    fn head() -> Self {
        Self {
            value: None,
            next: vec![SENTINEL],
            span: vec![1],
        }
    }

    fn with_value(
        value: T,
        height: usize,
    ) -> Self {
        Self {
            value: Some(value),
            next: vec![SENTINEL; height],
            span: vec![0; height],
        }
    }

    /// Число уровней, в которых участвует узел.
    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.next.len()
    }
}

/// Арена узлов.
#[derive(Debug, Clone)]
pub(crate) struct NodeStore<T> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
}

impl<T> NodeStore<T> {
    /// Создаёт арену, содержащую только голову высоты 1.
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::head()],
            free: Vec::new(),
        }
    }

    /// Размещает новый узел заданной высоты и возвращает его индекс.
    ///
    /// Ссылки узла указывают на [`SENTINEL`], пролёты равны нулю; их
    /// заполняет вызывающий код.
    pub(crate) fn alloc(
        &mut self,
        value: T,
        height: usize,
    ) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Node::with_value(value, height);
                idx
            }
            None => {
                self.nodes.push(Node::with_value(value, height));
                self.nodes.len() - 1
            }
        }
    }

    /// Освобождает слот и забирает значение.
    ///
    /// Ссылки на узел должны быть перенаправлены до вызова.
    pub(crate) fn release(
        &mut self,
        idx: usize,
    ) -> Option<T> {
        let node = &mut self.nodes[idx];
        let value = node.value.take();
        node.next = Vec::new();
        node.span = Vec::new();
        self.free.push(idx);
        value
    }

    /// Меняет высоту узла: лишние уровни отбрасываются, новые указывают на
    /// [`SENTINEL`].
    pub(crate) fn set_height(
        &mut self,
        idx: usize,
        height: usize,
    ) {
        let node = &mut self.nodes[idx];
        node.next.resize(height, SENTINEL);
        node.span.resize(height, 0);
    }

    /// Значение узла; у головы, свободных слотов и [`SENTINEL`] значения
    /// нет.
    #[inline]
    pub(crate) fn value(
        &self,
        idx: usize,
    ) -> Option<&T> {
        self.nodes.get(idx).and_then(|node| node.value.as_ref())
    }

    /// Забирает значение узла, не освобождая слот.
    pub(crate) fn take_value(
        &mut self,
        idx: usize,
    ) -> Option<T> {
        self.nodes.get_mut(idx).and_then(|node| node.value.take())
    }

    /// Сбрасывает арену к состоянию пустого списка.
    pub(crate) fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[HEAD] = Node::head();
        self.free.clear();
    }

    /// Число занятых слотов, включая голову.
    #[cfg(test)]
    pub(crate) fn occupied(&self) -> usize {
        self.nodes.len() - self.free.len()
    }
}

impl<T> Index<usize> for NodeStore<T> {
    type Output = Node<T>;

    #[inline]
    fn index(
        &self,
        idx: usize,
    ) -> &Node<T> {
        &self.nodes[idx]
    }
}

impl<T> IndexMut<usize> for NodeStore<T> {
    #[inline]
    fn index_mut(
        &mut self,
        idx: usize,
    ) -> &mut Node<T> {
        &mut self.nodes[idx]
    }
}
