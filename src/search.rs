//! Фронт поиска по клеткам
//!
//! [`CellPriorityQueue`] — очередь с корзинами по целочисленному приоритету:
//! приоритеты маленькие (расстояние в клетках + 0/1), поэтому корзины дешевле кучи.
//! [`SearchFrontier`] добавляет к ней эпохи поиска: клетка считается непосещённой,
//! если её `search_phase` меньше текущей эпохи, так что между поисками ничего
//! не нужно обнулять.

use crate::grid::HexGrid;

/// Очередь клеток с минимальным приоритетом первым
///
/// Внутри корзины порядок LIFO. Векторы корзин переживают `clear()`,
/// поэтому повторные поиски не выделяют память заново.
#[derive(Debug, Clone)]
pub struct CellPriorityQueue {
    buckets: Vec<Vec<usize>>,
    count: usize,
    minimum: usize,
}

impl Default for CellPriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CellPriorityQueue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            count: 0,
            minimum: usize::MAX,
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn enqueue(&mut self, cell: usize, priority: usize) {
        self.count += 1;
        if priority < self.minimum {
            self.minimum = priority;
        }
        if priority >= self.buckets.len() {
            self.buckets.resize_with(priority + 1, Vec::new);
        }
        self.buckets[priority].push(cell);
    }

    pub fn dequeue(&mut self) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        while self.minimum < self.buckets.len() {
            if let Some(cell) = self.buckets[self.minimum].pop() {
                self.count -= 1;
                return Some(cell);
            }
            self.minimum += 1;
        }
        None
    }

    /// Опустошает корзины, сохраняя их память: O(число корзин)
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.count = 0;
        self.minimum = usize::MAX;
    }
}

/// Поиск "в ширину" с приоритетами и эпохами посещения
#[derive(Debug, Clone, Default)]
pub struct SearchFrontier {
    queue: CellPriorityQueue,
    phase: u32,
    active: bool,
}

impl SearchFrontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    /// Начинает новую эпоху со стартовой клетки
    pub fn begin(&mut self, grid: &mut HexGrid, start: usize) {
        self.queue.clear();
        self.phase += 1;
        self.active = true;

        let cell = grid.cell_mut(start);
        cell.search_phase = self.phase;
        cell.distance = 0;
        cell.search_heuristic = 0;
        self.queue.enqueue(start, 0);
    }

    #[must_use]
    pub fn is_unvisited(&self, grid: &HexGrid, cell: usize) -> bool {
        grid.cell(cell).search_phase < self.phase
    }

    /// Добавляет клетку во фронт, если в этой эпохе её ещё не видели
    ///
    /// # Panics
    /// Если поиск не начат через [`SearchFrontier::begin`].
    pub fn visit(
        &mut self,
        grid: &mut HexGrid,
        cell: usize,
        distance: u32,
        heuristic: u32,
    ) -> bool {
        assert!(self.active, "visit() called outside of an active search");
        if !self.is_unvisited(grid, cell) {
            return false;
        }
        let target = grid.cell_mut(cell);
        target.search_phase = self.phase;
        target.distance = distance;
        target.search_heuristic = heuristic;
        self.queue.enqueue(cell, target.search_priority());
        true
    }

    pub fn next(&mut self) -> Option<usize> {
        self.queue.dequeue()
    }

    /// Завершает эпоху и очищает очередь
    pub fn finish(&mut self) {
        self.queue.clear();
        self.active = false;
    }

    /// Сбрасывает счётчик эпох; вызывается вместе с обнулением клеток
    pub fn reset(&mut self) {
        self.finish();
        self.phase = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dequeues_lowest_priority_first() {
        let mut queue = CellPriorityQueue::new();
        queue.enqueue(10, 3);
        queue.enqueue(11, 1);
        queue.enqueue(12, 2);
        queue.enqueue(13, 1);

        assert_eq!(queue.count(), 4);
        let order: Vec<_> = std::iter::from_fn(|| queue.dequeue()).collect();
        assert_eq!(order, vec![13, 11, 12, 10]);
        assert!(queue.is_empty());
    }

    #[test]
    fn enqueue_below_minimum_after_dequeue() {
        let mut queue = CellPriorityQueue::new();
        queue.enqueue(1, 5);
        assert_eq!(queue.dequeue(), Some(1));
        queue.enqueue(2, 4);
        queue.enqueue(3, 0);
        assert_eq!(queue.dequeue(), Some(3));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn clear_keeps_queue_reusable() {
        let mut queue = CellPriorityQueue::new();
        for i in 0..20 {
            queue.enqueue(i, i % 7);
        }
        queue.clear();
        assert_eq!(queue.count(), 0);
        assert_eq!(queue.dequeue(), None);
        queue.enqueue(5, 3);
        assert_eq!(queue.dequeue(), Some(5));
    }

    #[test]
    fn new_phase_forgets_previous_visits() {
        let mut grid = HexGrid::new(5, 5);
        let mut frontier = SearchFrontier::new();
        let start = grid.cell_at_offset(2, 2);

        frontier.begin(&mut grid, start);
        let neighbor = grid.neighbors(start).next().unwrap().1;
        assert!(frontier.visit(&mut grid, neighbor, 1, 0));
        assert!(!frontier.visit(&mut grid, neighbor, 1, 0));
        frontier.finish();

        frontier.begin(&mut grid, start);
        assert!(frontier.is_unvisited(&grid, neighbor));
        assert!(!frontier.is_unvisited(&grid, start));
        assert_eq!(frontier.next(), Some(start));
        assert_eq!(frontier.next(), None);
        frontier.finish();
    }

    #[test]
    #[should_panic(expected = "outside of an active search")]
    fn visit_without_phase_panics() {
        let mut grid = HexGrid::new(3, 3);
        let mut frontier = SearchFrontier::new();
        frontier.visit(&mut grid, 0, 0, 0);
    }
}
