//! Рост суши случайными пятнами
//!
//! Каждое пятно растёт от случайной клетки региона через [`SearchFrontier`]:
//! клетки ближе к центру пятна обрабатываются раньше, случайная добавка 0/1 к
//! приоритету делает края неровными. Пятно поднимает или опускает рельеф, пока
//! не наберёт нужное число клеток или не кончится бюджет суши.

use rand::Rng;

use crate::config::LandSettings;
use crate::grid::HexGrid;
use crate::hex::HexDirection;
use crate::region::MapRegion;
use crate::search::SearchFrontier;

/// Предел внешних итераций: защищает от бесконечного цикла на невыполнимых параметрах
pub const LAND_GUARD_ITERATIONS: usize = 10_000;

/// Итог роста суши
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandOutcome {
    /// Сколько клеток суши считается созданными (для бюджета рек)
    pub land_cells: usize,
    /// Остаток бюджета, который не удалось израсходовать
    pub unused_budget: usize,
}

/// Параметры одного прохода поднятия/опускания
struct Sculptor<'a> {
    settings: &'a LandSettings,
    water_level: i32,
}

impl Sculptor<'_> {
    fn start_chunk(
        &self,
        grid: &mut HexGrid,
        frontier: &mut SearchFrontier,
        region: &MapRegion,
        rng: &mut impl Rng,
    ) -> usize {
        let (x, z) = region.random_offset(rng);
        let first = grid.cell_at_offset(x, z);
        frontier.begin(grid, first);
        first
    }

    fn expand(
        &self,
        grid: &mut HexGrid,
        frontier: &mut SearchFrontier,
        current: usize,
        center: usize,
        rng: &mut impl Rng,
    ) {
        for direction in HexDirection::ALL {
            let Some(neighbor) = grid.neighbor(current, direction) else {
                continue;
            };
            if frontier.is_unvisited(grid, neighbor) {
                let distance = grid.distance(neighbor, center);
                let heuristic = u32::from(
                    rng.gen_range(0.0f32..1.0) < self.settings.jitter_probability,
                );
                frontier.visit(grid, neighbor, distance, heuristic);
            }
        }
    }

    fn raise(
        &self,
        grid: &mut HexGrid,
        frontier: &mut SearchFrontier,
        chunk_size: u32,
        mut budget: usize,
        region: &MapRegion,
        rng: &mut impl Rng,
    ) -> usize {
        let center = self.start_chunk(grid, frontier, region, rng);
        let rise = if rng.gen_range(0.0f32..1.0) < self.settings.high_rise_probability {
            2
        } else {
            1
        };

        let mut size = 0;
        while size < chunk_size {
            let Some(current) = frontier.next() else {
                break;
            };
            let original = grid.cell(current).elevation;
            let raised = original + rise;
            if raised > self.settings.elevation_maximum {
                continue;
            }
            grid.cell_mut(current).elevation = raised;

            if original < self.water_level && raised >= self.water_level {
                budget -= 1;
                if budget == 0 {
                    break;
                }
            }
            size += 1;

            self.expand(grid, frontier, current, center, rng);
        }
        frontier.finish();
        budget
    }

    fn sink(
        &self,
        grid: &mut HexGrid,
        frontier: &mut SearchFrontier,
        chunk_size: u32,
        mut budget: usize,
        region: &MapRegion,
        rng: &mut impl Rng,
    ) -> usize {
        let center = self.start_chunk(grid, frontier, region, rng);
        let sink = if rng.gen_range(0.0f32..1.0) < self.settings.high_rise_probability {
            2
        } else {
            1
        };

        let mut size = 0;
        while size < chunk_size {
            let Some(current) = frontier.next() else {
                break;
            };
            let original = grid.cell(current).elevation;
            let lowered = original - sink;
            if lowered < self.settings.elevation_minimum {
                continue;
            }
            grid.cell_mut(current).elevation = lowered;

            // ушедшая под воду клетка возвращает единицу бюджета
            if original >= self.water_level && lowered < self.water_level {
                budget += 1;
            }
            size += 1;

            self.expand(grid, frontier, current, center, rng);
        }
        frontier.finish();
        budget
    }
}

/// Поднимает сушу, пока не будет израсходован бюджет `cells * land_percentage / 100`
///
/// Если за [`LAND_GUARD_ITERATIONS`] итераций бюджет не исчерпан, генерация не
/// прерывается: остаток возвращается в [`LandOutcome::unused_budget`] и вычитается
/// из числа клеток суши.
pub fn create_land(
    grid: &mut HexGrid,
    regions: &[MapRegion],
    frontier: &mut SearchFrontier,
    settings: &LandSettings,
    water_level: i32,
    rng: &mut impl Rng,
) -> LandOutcome {
    let initial = (grid.cell_count() as f32 * settings.land_percentage as f32 * 0.01).round()
        as usize;
    let sculptor = Sculptor {
        settings,
        water_level,
    };

    let mut budget = initial;
    if budget == 0 {
        return LandOutcome {
            land_cells: 0,
            unused_budget: 0,
        };
    }

    for _ in 0..LAND_GUARD_ITERATIONS {
        let sink = rng.gen_range(0.0f32..1.0) < settings.sink_probability;
        for region in regions {
            let chunk_size = rng.gen_range(settings.chunk_size_min..=settings.chunk_size_max);
            if sink {
                budget = sculptor.sink(grid, frontier, chunk_size, budget, region, rng);
            } else {
                budget = sculptor.raise(grid, frontier, chunk_size, budget, region, rng);
                if budget == 0 {
                    return LandOutcome {
                        land_cells: initial,
                        unused_budget: 0,
                    };
                }
            }
        }
    }

    LandOutcome {
        land_cells: initial - budget.min(initial),
        unused_budget: budget,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn whole_map(grid: &HexGrid) -> Vec<MapRegion> {
        vec![MapRegion {
            x_min: 0,
            x_max: grid.cell_count_x,
            z_min: 0,
            z_max: grid.cell_count_z,
        }]
    }

    fn flooded(width: usize, height: usize, water_level: i32) -> HexGrid {
        let mut grid = HexGrid::new(width, height);
        for cell in grid.cells_mut() {
            cell.water_level = water_level;
        }
        grid
    }

    #[test]
    fn consumes_land_budget_exactly() {
        let mut grid = flooded(30, 20, 3);
        let regions = whole_map(&grid);
        let mut frontier = SearchFrontier::new();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let settings = LandSettings {
            sink_probability: 0.0,
            ..LandSettings::default()
        };

        let outcome = create_land(&mut grid, &regions, &mut frontier, &settings, 3, &mut rng);

        assert_eq!(outcome.unused_budget, 0);
        assert_eq!(outcome.land_cells, 300);
        // без опусканий каждая клетка, вышедшая из воды, тратит ровно единицу бюджета
        assert_eq!(grid.land_cell_count(), 300);
        assert!(!frontier.is_active());
    }

    #[test]
    fn respects_elevation_bounds() {
        let mut grid = flooded(20, 15, 1);
        let regions = whole_map(&grid);
        let mut frontier = SearchFrontier::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let settings = LandSettings {
            land_percentage: 100,
            high_rise_probability: 1.0,
            sink_probability: 0.4,
            ..LandSettings::default()
        };

        create_land(&mut grid, &regions, &mut frontier, &settings, 1, &mut rng);

        for cell in grid.cells() {
            assert!(cell.elevation >= settings.elevation_minimum);
            assert!(cell.elevation <= settings.elevation_maximum);
        }
    }

    #[test]
    fn zero_percentage_leaves_map_submerged() {
        let mut grid = flooded(20, 15, 3);
        let regions = whole_map(&grid);
        let mut frontier = SearchFrontier::new();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let settings = LandSettings {
            land_percentage: 0,
            ..LandSettings::default()
        };

        let outcome = create_land(&mut grid, &regions, &mut frontier, &settings, 3, &mut rng);

        assert_eq!(outcome.land_cells, 0);
        assert_eq!(grid.land_cell_count(), 0);
    }

    #[test]
    fn unreachable_budget_is_reported() {
        // вода выше максимальной высоты: ни одна клетка не станет сушей
        let mut grid = flooded(6, 6, 7);
        let regions = whole_map(&grid);
        let mut frontier = SearchFrontier::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let settings = LandSettings {
            land_percentage: 100,
            elevation_maximum: 6,
            sink_probability: 0.0,
            ..LandSettings::default()
        };

        let outcome = create_land(&mut grid, &regions, &mut frontier, &settings, 7, &mut rng);

        assert_eq!(outcome.unused_budget, 36);
        assert_eq!(outcome.land_cells, 0);
        assert!(grid.cells().all(|c| c.elevation <= 6));
    }
}
