//! Типы местности по итоговой влажности

use serde::{Deserialize, Serialize};

use crate::grid::HexGrid;

/// Тип местности; значение перечисления совпадает с `terrain_type_index` клетки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TerrainType {
    Sand = 0,
    Grass = 1,
    Mud = 2,
    Stone = 3,
    Snow = 4,
}

impl TerrainType {
    pub const ALL: [TerrainType; 5] = [
        TerrainType::Sand,
        TerrainType::Grass,
        TerrainType::Mud,
        TerrainType::Stone,
        TerrainType::Snow,
    ];

    #[must_use]
    pub fn index(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn to_rgb(&self) -> [u8; 3] {
        match self {
            TerrainType::Sand => [220, 200, 140],
            TerrainType::Grass => [110, 170, 70],
            TerrainType::Mud => [120, 95, 65],
            TerrainType::Stone => [140, 140, 140],
            TerrainType::Snow => [240, 240, 250],
        }
    }
}

/// Классифицирует клетку по влажности
///
/// Лестница от самой сухой к самой влажной: снег, песок, камень, трава, грязь.
/// Клетки под водой всегда получают дно ([`TerrainType::Mud`]).
#[must_use]
pub fn classify_terrain(is_underwater: bool, moisture: f32) -> TerrainType {
    if is_underwater {
        return TerrainType::Mud;
    }
    if moisture < 0.05 {
        TerrainType::Snow
    } else if moisture < 0.12 {
        TerrainType::Sand
    } else if moisture < 0.28 {
        TerrainType::Stone
    } else if moisture < 0.85 {
        TerrainType::Grass
    } else {
        TerrainType::Mud
    }
}

/// Записывает тип местности в каждую клетку
pub fn assign_terrain_types(grid: &mut HexGrid, moisture: &[f32]) {
    for cell in grid.cells_mut() {
        let terrain = classify_terrain(cell.is_underwater(), moisture[cell.index]);
        cell.terrain_type_index = terrain.index();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_breakpoints() {
        assert_eq!(classify_terrain(false, 0.0), TerrainType::Snow);
        assert_eq!(classify_terrain(false, 0.05), TerrainType::Sand);
        assert_eq!(classify_terrain(false, 0.12), TerrainType::Stone);
        assert_eq!(classify_terrain(false, 0.28), TerrainType::Grass);
        assert_eq!(classify_terrain(false, 0.849), TerrainType::Grass);
        assert_eq!(classify_terrain(false, 0.85), TerrainType::Mud);
        assert_eq!(classify_terrain(false, 1.0), TerrainType::Mud);
    }

    #[test]
    fn underwater_ignores_moisture() {
        for moisture in [0.0, 0.1, 0.5, 1.0] {
            assert_eq!(classify_terrain(true, moisture), TerrainType::Mud);
        }
    }

    #[test]
    fn index_round_trips() {
        for terrain in TerrainType::ALL {
            assert_eq!(TerrainType::from_index(terrain.index()), Some(terrain));
        }
        assert_eq!(TerrainType::from_index(5), None);
    }

    #[test]
    fn assigns_every_cell() {
        let mut grid = HexGrid::new(3, 2);
        for cell in grid.cells_mut() {
            cell.water_level = 1;
            cell.elevation = if cell.index == 0 { 0 } else { 2 };
        }
        let moisture = [0.9, 0.0, 0.1, 0.2, 0.5, 0.9];

        assign_terrain_types(&mut grid, &moisture);

        let indices: Vec<u8> = grid.cells().map(|c| c.terrain_type_index).collect();
        assert_eq!(indices, vec![2, 4, 0, 3, 1, 2]);
    }
}
