//! Разбиение карты на регионы роста суши

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::RegionSettings;

/// Прямоугольник offset-координат: `x_min..x_max`, `z_min..z_max` (верхние границы не включаются)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRegion {
    pub x_min: usize,
    pub x_max: usize,
    pub z_min: usize,
    pub z_max: usize,
}

impl MapRegion {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x_min >= self.x_max || self.z_min >= self.z_max
    }

    #[must_use]
    pub fn contains(&self, x: usize, z: usize) -> bool {
        (self.x_min..self.x_max).contains(&x) && (self.z_min..self.z_max).contains(&z)
    }

    #[must_use]
    pub fn overlaps(&self, other: &MapRegion) -> bool {
        self.x_min < other.x_max
            && other.x_min < self.x_max
            && self.z_min < other.z_max
            && other.z_min < self.z_max
    }

    /// Случайная клетка региона в offset-координатах
    pub fn random_offset(&self, rng: &mut impl Rng) -> (usize, usize) {
        let x = rng.gen_range(self.x_min..self.x_max);
        let z = rng.gen_range(self.z_min..self.z_max);
        (x, z)
    }
}

/// Делит внутреннюю часть карты на 1–4 непересекающихся региона
///
/// - 1 — вся карта без рамки;
/// - 2 — пополам по X или по Z (одно случайное число выбирает ось);
/// - 3 — три полосы по X;
/// - 4 — четыре квадранта.
///
/// Каждый разрез дополнительно отступает на `region_border` в обе стороны.
/// Вычитание насыщающее: на слишком маленькой карте регион получается пустым,
/// и вызывающий код должен это проверить через [`MapRegion::is_empty`].
pub fn create_regions(
    cell_count_x: usize,
    cell_count_z: usize,
    settings: &RegionSettings,
    rng: &mut impl Rng,
) -> Vec<MapRegion> {
    let border_x = settings.map_border_x;
    let border_z = settings.map_border_z;
    let gap = settings.region_border;
    let far_x = cell_count_x.saturating_sub(border_x);
    let far_z = cell_count_z.saturating_sub(border_z);

    let whole = MapRegion {
        x_min: border_x,
        x_max: far_x,
        z_min: border_z,
        z_max: far_z,
    };

    match settings.region_count {
        2 => {
            if rng.gen_range(0.0f32..1.0) < 0.5 {
                let mid = cell_count_x / 2;
                vec![
                    MapRegion {
                        x_max: mid.saturating_sub(gap),
                        ..whole
                    },
                    MapRegion {
                        x_min: mid + gap,
                        ..whole
                    },
                ]
            } else {
                let mid = cell_count_z / 2;
                vec![
                    MapRegion {
                        z_max: mid.saturating_sub(gap),
                        ..whole
                    },
                    MapRegion {
                        z_min: mid + gap,
                        ..whole
                    },
                ]
            }
        }
        3 => {
            let first = cell_count_x / 3;
            let second = cell_count_x * 2 / 3;
            vec![
                MapRegion {
                    x_max: first.saturating_sub(gap),
                    ..whole
                },
                MapRegion {
                    x_min: first + gap,
                    x_max: second.saturating_sub(gap),
                    ..whole
                },
                MapRegion {
                    x_min: second + gap,
                    ..whole
                },
            ]
        }
        4 => {
            let mid_x = cell_count_x / 2;
            let mid_z = cell_count_z / 2;
            let south = MapRegion {
                z_max: mid_z.saturating_sub(gap),
                ..whole
            };
            let north = MapRegion {
                z_min: mid_z + gap,
                ..whole
            };
            vec![
                MapRegion {
                    x_max: mid_x.saturating_sub(gap),
                    ..south
                },
                MapRegion {
                    x_min: mid_x + gap,
                    ..south
                },
                MapRegion {
                    x_min: mid_x + gap,
                    ..north
                },
                MapRegion {
                    x_max: mid_x.saturating_sub(gap),
                    ..north
                },
            ]
        }
        _ => vec![whole],
    }
}
