//! Эрозия: перенос высоты с крутых склонов вниз
//!
//! Клетка "размываемая", если хотя бы один сосед ниже неё на 2 и более.
//! За шаг случайная размываемая клетка отдаёт единицу высоты случайному
//! достаточно низкому соседу. Множество размываемых клеток после шага
//! чинится локально (затронуты только две клетки и их соседи), без полного
//! пересчёта.

use rand::Rng;

use crate::grid::HexGrid;
use crate::hex::HexDirection;

/// Множество клеток с удалением за O(1)
///
/// Порядок элементов не имеет значения: удаление меняет элемент с последним.
#[derive(Debug, Clone, Default)]
pub struct ErodibleSet {
    cells: Vec<usize>,
    slots: Vec<Option<usize>>,
}

impl ErodibleSet {
    fn reset(&mut self, cell_count: usize) {
        self.cells.clear();
        self.slots.clear();
        self.slots.resize(cell_count, None);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn contains(&self, cell: usize) -> bool {
        self.slots[cell].is_some()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> usize {
        self.cells[position]
    }

    pub fn insert(&mut self, cell: usize) {
        if self.slots[cell].is_none() {
            self.slots[cell] = Some(self.cells.len());
            self.cells.push(cell);
        }
    }

    pub fn remove(&mut self, cell: usize) {
        if let Some(position) = self.slots[cell].take() {
            self.cells.swap_remove(position);
            if let Some(&moved) = self.cells.get(position) {
                self.slots[moved] = Some(position);
            }
        }
    }
}

/// Рабочие буферы эрозии, переиспользуемые между запусками
///
/// Только для последовательного повторного использования одним генератором.
#[derive(Debug, Clone, Default)]
pub struct ErosionScratch {
    erodible: ErodibleSet,
    candidates: Vec<usize>,
}

impl ErosionScratch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Итог эрозии
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErosionOutcome {
    pub initial: usize,
    pub target: usize,
    pub remaining: usize,
}

#[must_use]
pub fn is_erodible(grid: &HexGrid, cell: usize) -> bool {
    let erodible_elevation = grid.cell(cell).elevation - 2;
    grid.neighbors(cell)
        .any(|(_, n)| grid.cell(n).elevation <= erodible_elevation)
}

fn erosion_target(
    grid: &HexGrid,
    cell: usize,
    candidates: &mut Vec<usize>,
    rng: &mut impl Rng,
) -> usize {
    candidates.clear();
    let erodible_elevation = grid.cell(cell).elevation - 2;
    for direction in HexDirection::ALL {
        if let Some(neighbor) = grid.neighbor(cell, direction) {
            if grid.cell(neighbor).elevation <= erodible_elevation {
                candidates.push(neighbor);
            }
        }
    }
    candidates[rng.gen_range(0..candidates.len())]
}

/// Сглаживает рельеф, пока размываемых клеток не останется
/// `round(initial * (100 - erosion_percentage) / 100)`
///
/// Каждый перенос уменьшает сумму квадратов высот, поэтому цикл конечен.
pub fn erode_land(
    grid: &mut HexGrid,
    scratch: &mut ErosionScratch,
    erosion_percentage: u32,
    rng: &mut impl Rng,
) -> ErosionOutcome {
    let ErosionScratch {
        erodible,
        candidates,
    } = scratch;
    erodible.reset(grid.cell_count());

    for cell in 0..grid.cell_count() {
        if is_erodible(grid, cell) {
            erodible.insert(cell);
        }
    }

    let initial = erodible.len();
    let target = (initial as f32 * (100 - erosion_percentage.min(100)) as f32 * 0.01).round()
        as usize;

    while erodible.len() > target {
        let cell = erodible.get(rng.gen_range(0..erodible.len()));
        let target_cell = erosion_target(grid, cell, candidates, rng);

        grid.cell_mut(cell).elevation -= 1;
        grid.cell_mut(target_cell).elevation += 1;

        if !is_erodible(grid, cell) {
            erodible.remove(cell);
        }

        // источник опустился: соседи выше него на 2 стали размываемыми
        let cell_elevation = grid.cell(cell).elevation;
        for direction in HexDirection::ALL {
            if let Some(neighbor) = grid.neighbor(cell, direction) {
                if grid.cell(neighbor).elevation == cell_elevation + 2 {
                    erodible.insert(neighbor);
                }
            }
        }

        if is_erodible(grid, target_cell) {
            erodible.insert(target_cell);
        }

        // цель поднялась: соседи, для которых она была единственной низиной, перестают быть размываемыми
        let target_elevation = grid.cell(target_cell).elevation;
        for direction in HexDirection::ALL {
            if let Some(neighbor) = grid.neighbor(target_cell, direction) {
                if neighbor != cell
                    && grid.cell(neighbor).elevation == target_elevation + 1
                    && !is_erodible(grid, neighbor)
                {
                    erodible.remove(neighbor);
                }
            }
        }
    }

    ErosionOutcome {
        initial,
        target,
        remaining: erodible.len(),
    }
}

/// Число размываемых клеток полным пересчётом
#[must_use]
pub fn count_erodible(grid: &HexGrid) -> usize {
    (0..grid.cell_count())
        .filter(|&cell| is_erodible(grid, cell))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rugged_grid(seed: u64) -> HexGrid {
        let mut grid = HexGrid::new(24, 18);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for cell in grid.cells_mut() {
            cell.elevation = rng.gen_range(-2..=8);
        }
        grid
    }

    #[test]
    fn set_swap_remove_keeps_slots_consistent() {
        let mut set = ErodibleSet::default();
        set.reset(10);
        for cell in [3, 7, 1, 9] {
            set.insert(cell);
        }
        set.insert(7);
        assert_eq!(set.len(), 4);

        set.remove(3);
        assert!(!set.contains(3));
        assert_eq!(set.len(), 3);
        for position in 0..set.len() {
            assert!(set.contains(set.get(position)));
        }
        set.remove(9);
        set.remove(9);
        assert_eq!(set.len(), 2);
        assert!(set.contains(7) && set.contains(1));
    }

    #[test]
    fn reaches_target_and_matches_full_rescan() {
        for seed in 0..4 {
            let mut grid = rugged_grid(seed);
            let total: i32 = grid.cells().map(|c| c.elevation).sum();
            let mut scratch = ErosionScratch::new();
            let mut rng = ChaCha8Rng::seed_from_u64(seed + 100);

            let outcome = erode_land(&mut grid, &mut scratch, 50, &mut rng);

            assert!(outcome.remaining <= outcome.target);
            assert_eq!(count_erodible(&grid), outcome.remaining);
            // эрозия только переносит высоту
            assert_eq!(grid.cells().map(|c| c.elevation).sum::<i32>(), total);
        }
    }

    #[test]
    fn full_erosion_flattens_steep_slopes() {
        let mut grid = rugged_grid(42);
        let mut scratch = ErosionScratch::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let outcome = erode_land(&mut grid, &mut scratch, 100, &mut rng);

        assert_eq!(outcome.target, 0);
        assert_eq!(count_erodible(&grid), 0);
    }

    #[test]
    fn zero_percentage_changes_nothing() {
        let mut grid = rugged_grid(8);
        let before: Vec<i32> = grid.cells().map(|c| c.elevation).collect();
        let mut scratch = ErosionScratch::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let outcome = erode_land(&mut grid, &mut scratch, 0, &mut rng);

        assert_eq!(outcome.initial, outcome.remaining);
        let after: Vec<i32> = grid.cells().map(|c| c.elevation).collect();
        assert_eq!(before, after);
    }
}
