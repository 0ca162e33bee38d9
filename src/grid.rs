//! Сетка шестиугольных клеток
//!
//! Клетки хранятся в плоском векторе построчно (`index = x + z * cell_count_x`).
//! Соседи — индексы в том же векторе, а не ссылки: у каждой клетки шесть слотов,
//! пустой слот означает край карты.

use serde::{Deserialize, Serialize};

use crate::hex::{HexCoordinates, HexDirection};

/// Одна клетка карты
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HexCell {
    pub index: usize,
    pub coordinates: HexCoordinates,
    pub elevation: i32,
    pub water_level: i32,
    pub incoming_river: Option<HexDirection>,
    pub outgoing_river: Option<HexDirection>,
    /// Индекс типа местности (см. [`crate::biome::TerrainType`])
    pub terrain_type_index: u8,
    pub neighbors: [Option<usize>; 6],

    /// Эпоха поиска, в которой клетка последний раз попала во фронт
    #[serde(skip)]
    pub search_phase: u32,
    #[serde(skip)]
    pub distance: u32,
    #[serde(skip)]
    pub search_heuristic: u32,
}

impl HexCell {
    fn new(index: usize, coordinates: HexCoordinates) -> Self {
        Self {
            index,
            coordinates,
            elevation: 0,
            water_level: 0,
            incoming_river: None,
            outgoing_river: None,
            terrain_type_index: 0,
            neighbors: [None; 6],
            search_phase: 0,
            distance: 0,
            search_heuristic: 0,
        }
    }

    #[must_use]
    pub fn is_underwater(&self) -> bool {
        self.water_level > self.elevation
    }

    /// Высота поверхности: под водой поверхность плоская на уровне воды
    #[must_use]
    pub fn view_elevation(&self) -> i32 {
        self.elevation.max(self.water_level)
    }

    #[must_use]
    pub fn neighbor(&self, direction: HexDirection) -> Option<usize> {
        self.neighbors[direction.index()]
    }

    #[must_use]
    pub fn has_incoming_river(&self) -> bool {
        self.incoming_river.is_some()
    }

    #[must_use]
    pub fn has_outgoing_river(&self) -> bool {
        self.outgoing_river.is_some()
    }

    #[must_use]
    pub fn has_river(&self) -> bool {
        self.has_incoming_river() || self.has_outgoing_river()
    }

    /// Исток или устье: река есть, но только с одной стороны
    #[must_use]
    pub fn has_river_begin_or_end(&self) -> bool {
        self.has_incoming_river() != self.has_outgoing_river()
    }

    #[must_use]
    pub fn has_river_through_edge(&self, direction: HexDirection) -> bool {
        self.incoming_river == Some(direction) || self.outgoing_river == Some(direction)
    }

    /// Приоритет клетки во фронте поиска
    #[must_use]
    pub fn search_priority(&self) -> usize {
        (self.distance + self.search_heuristic) as usize
    }
}

/// Прямоугольная карта `cell_count_x × cell_count_z` клеток
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HexGrid {
    pub cell_count_x: usize,
    pub cell_count_z: usize,
    cells: Vec<HexCell>,
}

impl HexGrid {
    #[must_use]
    pub fn new(cell_count_x: usize, cell_count_z: usize) -> Self {
        let mut grid = Self::default();
        grid.create_map(cell_count_x, cell_count_z);
        grid
    }

    /// Пересоздаёт все клетки и связывает соседей
    ///
    /// Каждая связь записывается в обе стороны: если B — сосед A в направлении `d`,
    /// то A — сосед B в направлении `d.opposite()`.
    pub fn create_map(&mut self, cell_count_x: usize, cell_count_z: usize) {
        self.cell_count_x = cell_count_x;
        self.cell_count_z = cell_count_z;
        self.cells.clear();
        self.cells.reserve(cell_count_x * cell_count_z);

        for z in 0..cell_count_z {
            for x in 0..cell_count_x {
                let i = self.cells.len();
                self.cells.push(HexCell::new(
                    i,
                    HexCoordinates::from_offset_coordinates(x as i32, z as i32),
                ));

                if x > 0 {
                    self.link(i, HexDirection::W, i - 1);
                }
                if z > 0 {
                    if z & 1 == 0 {
                        self.link(i, HexDirection::SE, i - cell_count_x);
                        if x > 0 {
                            self.link(i, HexDirection::SW, i - cell_count_x - 1);
                        }
                    } else {
                        self.link(i, HexDirection::SW, i - cell_count_x);
                        if x < cell_count_x - 1 {
                            self.link(i, HexDirection::SE, i - cell_count_x + 1);
                        }
                    }
                }
            }
        }
    }

    fn link(&mut self, cell: usize, direction: HexDirection, neighbor: usize) {
        self.cells[cell].neighbors[direction.index()] = Some(neighbor);
        self.cells[neighbor].neighbors[direction.opposite().index()] = Some(cell);
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> &HexCell {
        &self.cells[index]
    }

    pub fn cell_mut(&mut self, index: usize) -> &mut HexCell {
        &mut self.cells[index]
    }

    pub fn cells(&self) -> impl Iterator<Item = &HexCell> {
        self.cells.iter()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut HexCell> {
        self.cells.iter_mut()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[HexCell] {
        &self.cells
    }

    /// Индекс клетки по offset-координатам
    ///
    /// # Panics
    /// Если координаты вне карты — это ошибка вызывающего кода.
    #[must_use]
    pub fn cell_at_offset(&self, x: usize, z: usize) -> usize {
        assert!(
            x < self.cell_count_x && z < self.cell_count_z,
            "offset ({x}, {z}) outside {}x{} grid",
            self.cell_count_x,
            self.cell_count_z
        );
        x + z * self.cell_count_x
    }

    #[must_use]
    pub fn neighbor(&self, index: usize, direction: HexDirection) -> Option<usize> {
        self.cells[index].neighbor(direction)
    }

    /// Соседи клетки вместе с направлениями к ним
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = (HexDirection, usize)> + '_ {
        HexDirection::ALL
            .into_iter()
            .filter_map(move |d| self.neighbor(index, d).map(|n| (d, n)))
    }

    #[must_use]
    pub fn distance(&self, a: usize, b: usize) -> u32 {
        self.cells[a]
            .coordinates
            .distance_to(self.cells[b].coordinates)
    }

    /// Река может течь вниз или на ровное место, если сосед на уровне воды текущей клетки
    #[must_use]
    pub fn is_valid_river_destination(&self, index: usize, neighbor: usize) -> bool {
        let cell = &self.cells[index];
        let target = &self.cells[neighbor];
        cell.elevation >= target.elevation || cell.water_level == target.elevation
    }

    /// Проводит реку из клетки в соседа по направлению `direction`
    ///
    /// Возвращает индекс соседа или `None`, если соседа нет или туда нельзя течь.
    /// Направления рек назначаются один раз: повторная запись в занятый слот — ошибка.
    pub fn set_outgoing_river(&mut self, index: usize, direction: HexDirection) -> Option<usize> {
        let neighbor = self.neighbor(index, direction)?;
        if !self.is_valid_river_destination(index, neighbor) {
            return None;
        }
        assert!(
            self.cells[index].outgoing_river.is_none(),
            "cell {index} already has an outgoing river"
        );
        assert!(
            self.cells[neighbor].incoming_river.is_none(),
            "cell {neighbor} already has an incoming river"
        );

        self.cells[index].outgoing_river = Some(direction);
        self.cells[neighbor].incoming_river = Some(direction.opposite());
        Some(neighbor)
    }

    /// Сбрасывает служебные поля поиска во всех клетках
    pub fn reset_search_state(&mut self) {
        for cell in &mut self.cells {
            cell.search_phase = 0;
            cell.distance = 0;
            cell.search_heuristic = 0;
        }
    }

    #[must_use]
    pub fn land_cell_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_underwater()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_are_symmetric() {
        let grid = HexGrid::new(7, 5);
        for cell in grid.cells() {
            for (d, n) in grid.neighbors(cell.index) {
                assert_eq!(grid.neighbor(n, d.opposite()), Some(cell.index));
                assert_eq!(grid.distance(cell.index, n), 1);
            }
        }
    }

    #[test]
    fn interior_cell_has_six_neighbors() {
        let grid = HexGrid::new(6, 6);
        let inner = grid.cell_at_offset(2, 2);
        assert_eq!(grid.neighbors(inner).count(), 6);
        let corner = grid.cell_at_offset(0, 0);
        assert_eq!(grid.neighbors(corner).count(), 2);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_range_offset_panics() {
        let grid = HexGrid::new(4, 4);
        let _ = grid.cell_at_offset(4, 0);
    }

    #[test]
    fn river_links_both_cells() {
        let mut grid = HexGrid::new(4, 4);
        let a = grid.cell_at_offset(1, 1);
        let b = grid.neighbor(a, HexDirection::E).unwrap();
        grid.cell_mut(a).elevation = 2;
        grid.cell_mut(b).elevation = 1;

        assert_eq!(grid.set_outgoing_river(a, HexDirection::E), Some(b));
        assert_eq!(grid.cell(b).incoming_river, Some(HexDirection::W));
        assert!(grid.cell(a).has_river_begin_or_end());
        assert!(grid.cell(b).has_river_through_edge(HexDirection::W));
    }

    #[test]
    fn river_cannot_flow_uphill() {
        let mut grid = HexGrid::new(4, 4);
        let a = grid.cell_at_offset(1, 1);
        let b = grid.neighbor(a, HexDirection::E).unwrap();
        grid.cell_mut(b).elevation = 3;
        assert_eq!(grid.set_outgoing_river(a, HexDirection::E), None);
        assert!(!grid.cell(a).has_river());
    }
}
