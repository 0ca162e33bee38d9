//! Реки и озёра
//!
//! Истоки выбираются из пула кандидатов, где влажные и высокие клетки
//! повторяются чаще. Река растёт клетка за клеткой вниз или вбок; выбранное
//! направление записывается в сетку сразу и больше не меняется. Река
//! заканчивается в воде, вливается в исток другой реки или упирается в
//! низину, где образуется озеро.

use rand::Rng;

use crate::config::RiverSettings;
use crate::grid::HexGrid;
use crate::hex::HexDirection;

/// Итог прокладки рек
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RiverOutcome {
    pub river_count: usize,
    /// Суммарная длина всех рек в клетках
    pub river_cells: usize,
    pub lake_count: usize,
    /// Остаток бюджета, если кандидаты кончились раньше
    pub unused_budget: usize,
}

/// Как закончилась одна река
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiverEnd {
    /// Дошла до клетки под водой
    Water,
    /// Влилась в исток другой реки
    Merge,
    /// Упёрлась в низину и образовала озеро
    Lake,
    /// Упёрлась в клетку, из которой некуда течь, но которая выше соседей
    Stuck,
    /// Исток без продолжения: река не создана
    Discarded,
}

/// Результат роста одной реки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct River {
    pub origin: usize,
    /// Длина в клетках; 0 для отброшенной реки
    pub length: usize,
    pub end: RiverEnd,
    /// Сколько озёр вырыто по пути (включая конечное)
    pub lakes: usize,
}

/// Прокладчик рек со своим буфером направлений
#[derive(Debug, Clone, Default)]
pub struct RiverBuilder {
    flow_directions: Vec<HexDirection>,
    origins: Vec<usize>,
}

impl RiverBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Заполняет пул истоков: клетка входит до 4 раз в зависимости от
    /// `weight = moisture * (elevation - water_level) / (elevation_maximum - water_level)`
    fn collect_origins(
        &mut self,
        grid: &HexGrid,
        moisture: &[f32],
        water_level: i32,
        elevation_maximum: i32,
    ) {
        self.origins.clear();
        let span = (elevation_maximum - water_level) as f32;
        for cell in grid.cells() {
            if cell.is_underwater() {
                continue;
            }
            let weight = moisture[cell.index] * (cell.elevation - water_level) as f32 / span;
            if weight > 0.75 {
                self.origins.push(cell.index);
                self.origins.push(cell.index);
            }
            if weight > 0.5 {
                self.origins.push(cell.index);
            }
            if weight > 0.25 {
                self.origins.push(cell.index);
            }
        }
    }

    /// Прокладывает реки, пока не израсходован бюджет `land_cells * river_percentage / 100`
    #[allow(clippy::too_many_arguments)]
    pub fn create_rivers(
        &mut self,
        grid: &mut HexGrid,
        moisture: &[f32],
        land_cells: usize,
        water_level: i32,
        elevation_maximum: i32,
        settings: &RiverSettings,
        rng: &mut impl Rng,
    ) -> RiverOutcome {
        self.collect_origins(grid, moisture, water_level, elevation_maximum);

        let mut budget =
            (land_cells as f32 * settings.river_percentage as f32 * 0.01).round() as usize;
        let mut outcome = RiverOutcome::default();

        while budget > 0 && !self.origins.is_empty() {
            let index = rng.gen_range(0..self.origins.len());
            let origin = self.origins.swap_remove(index);

            if grid.cell(origin).has_river() || !is_valid_origin(grid, origin) {
                continue;
            }

            let river = self.create_river(grid, origin, settings, rng);
            if river.end == RiverEnd::Discarded {
                continue;
            }
            outcome.river_count += 1;
            outcome.river_cells += river.length;
            outcome.lake_count += river.lakes;
            budget = budget.saturating_sub(river.length);
        }

        outcome.unused_budget = budget;
        outcome
    }

    /// Растит одну реку из `origin`
    pub fn create_river(
        &mut self,
        grid: &mut HexGrid,
        origin: usize,
        settings: &RiverSettings,
        rng: &mut impl Rng,
    ) -> River {
        let mut length = 1;
        let mut lakes = 0;
        let mut cell = origin;
        let mut direction = HexDirection::NE;

        while !grid.cell(cell).is_underwater() {
            let elevation = grid.cell(cell).elevation;
            let mut min_neighbor_elevation = i32::MAX;
            self.flow_directions.clear();

            for d in HexDirection::ALL {
                let Some(neighbor) = grid.neighbor(cell, d) else {
                    continue;
                };
                let target = grid.cell(neighbor);
                min_neighbor_elevation = min_neighbor_elevation.min(target.elevation);

                if neighbor == origin || target.has_incoming_river() {
                    continue;
                }
                let delta = target.elevation - elevation;
                if delta > 0 {
                    continue;
                }

                // у соседа есть только исходящая река — это чужой исток, сливаемся
                if target.has_outgoing_river() {
                    let merged = grid.set_outgoing_river(cell, d);
                    debug_assert!(merged.is_some());
                    return River {
                        origin,
                        length,
                        end: RiverEnd::Merge,
                        lakes,
                    };
                }

                if delta < 0 {
                    self.flow_directions.extend([d, d, d]);
                }
                // второй резкий поворот подряд менее вероятен
                if length == 1 || (d != direction.next2() && d != direction.previous2()) {
                    self.flow_directions.push(d);
                }
                self.flow_directions.push(d);
            }

            if self.flow_directions.is_empty() {
                if length == 1 {
                    return River {
                        origin,
                        length: 0,
                        end: RiverEnd::Discarded,
                        lakes,
                    };
                }
                if min_neighbor_elevation >= elevation {
                    let lake = grid.cell_mut(cell);
                    lake.water_level = min_neighbor_elevation;
                    if min_neighbor_elevation == elevation {
                        lake.elevation = min_neighbor_elevation - 1;
                    }
                    return River {
                        origin,
                        length,
                        end: RiverEnd::Lake,
                        lakes: lakes + 1,
                    };
                }
                return River {
                    origin,
                    length,
                    end: RiverEnd::Stuck,
                    lakes,
                };
            }

            direction = self.flow_directions[rng.gen_range(0..self.flow_directions.len())];
            let Some(next) = grid.set_outgoing_river(cell, direction) else {
                unreachable!("flow candidates are never uphill");
            };
            length += 1;

            if min_neighbor_elevation >= elevation
                && rng.gen_range(0.0f32..1.0) < settings.extra_lake_probability
            {
                let lake = grid.cell_mut(cell);
                lake.water_level = elevation;
                lake.elevation = elevation - 1;
                lakes += 1;
            }

            cell = next;
        }

        River {
            origin,
            length,
            end: RiverEnd::Water,
            lakes,
        }
    }
}

/// Исток не может соседствовать с водой или другой рекой
#[must_use]
pub fn is_valid_origin(grid: &HexGrid, origin: usize) -> bool {
    grid.neighbors(origin).all(|(_, n)| {
        let neighbor = grid.cell(n);
        !neighbor.has_river() && !neighbor.is_underwater()
    })
}
