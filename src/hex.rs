//! Шестиугольная геометрия: направления и координаты
//!
//! Карта хранится в "offset"-координатах (x, z) — строки со сдвигом на полклетки
//! через одну. Для расстояний используются кубические координаты (x, y, z),
//! где `x + y + z = 0`.

use serde::{Deserialize, Serialize};

/// Одно из шести направлений на шестиугольной сетке
///
/// Порядок совпадает с индексами слотов соседей в [`crate::grid::HexCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HexDirection {
    #[default]
    NE,
    E,
    SE,
    SW,
    W,
    NW,
}

impl HexDirection {
    /// Все направления по часовой стрелке, начиная с `NE`
    pub const ALL: [HexDirection; 6] = [
        HexDirection::NE,
        HexDirection::E,
        HexDirection::SE,
        HexDirection::SW,
        HexDirection::W,
        HexDirection::NW,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    /// Противоположное направление (поворот на 180°)
    #[must_use]
    pub fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Следующее направление по часовой стрелке (поворот на 60°)
    #[must_use]
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    #[must_use]
    pub fn previous(self) -> Self {
        Self::from_index(self.index() + 5)
    }

    /// Поворот на 120° по часовой стрелке
    #[must_use]
    pub fn next2(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    #[must_use]
    pub fn previous2(self) -> Self {
        Self::from_index(self.index() + 4)
    }
}

/// Кубические координаты клетки (хранятся x и z, y вычисляется)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoordinates {
    pub x: i32,
    pub z: i32,
}

impl HexCoordinates {
    #[must_use]
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Переводит offset-координаты строки в кубические
    ///
    /// Нечётные строки сдвинуты вправо на полклетки, поэтому x корректируется на `z / 2`.
    #[must_use]
    pub fn from_offset_coordinates(x: i32, z: i32) -> Self {
        Self { x: x - z / 2, z }
    }

    #[must_use]
    pub fn y(self) -> i32 {
        -self.x - self.z
    }

    /// Число шагов между двумя клетками
    #[must_use]
    pub fn distance_to(self, other: HexCoordinates) -> u32 {
        ((self.x - other.x).unsigned_abs()
            + (self.y() - other.y()).unsigned_abs()
            + (self.z - other.z).unsigned_abs())
            / 2
    }
}

impl std::fmt::Display for HexCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y(), self.z)
    }
}
