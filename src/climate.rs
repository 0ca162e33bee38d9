//! Круговорот воды: испарение, облака, осадки, сток
//!
//! Клеточная симуляция с двойной буферизацией: за цикл каждая клетка читает
//! своё состояние из `climate` и пишет вклад в `next` (свою оставшуюся влагу и
//! переносы к соседям). Внутри цикла `next` никогда не читается, поэтому порядок
//! обхода клеток не влияет на результат. После цикла буферы меняются местами,
//! прочитанный буфер обнуляется и становится следующим `next`.

use crate::config::ClimateSettings;
use crate::grid::HexGrid;
use crate::hex::HexDirection;

/// Число циклов симуляции
pub const CLIMATE_CYCLES: usize = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimateData {
    pub clouds: f32,
    pub moisture: f32,
}

#[derive(Debug, Clone)]
pub struct ClimateSimulation<'a> {
    settings: &'a ClimateSettings,
    elevation_maximum: i32,
    climate: Vec<ClimateData>,
    next: Vec<ClimateData>,
    cycles: usize,
}

impl<'a> ClimateSimulation<'a> {
    #[must_use]
    pub fn new(cell_count: usize, settings: &'a ClimateSettings, elevation_maximum: i32) -> Self {
        let initial = ClimateData {
            clouds: 0.0,
            moisture: settings.starting_moisture,
        };
        Self {
            settings,
            elevation_maximum,
            climate: vec![initial; cell_count],
            next: vec![ClimateData::default(); cell_count],
            cycles: 0,
        }
    }

    /// Прогоняет [`CLIMATE_CYCLES`] циклов
    pub fn run(&mut self, grid: &HexGrid) {
        for _ in 0..CLIMATE_CYCLES {
            self.step(grid);
        }
    }

    /// Один полный цикл по всем клеткам с обменом буферов
    pub fn step(&mut self, grid: &HexGrid) {
        for cell in 0..grid.cell_count() {
            self.evolve(grid, cell);
        }
        // сток от соседей мог добавиться уже после ограничения клетки
        for data in &mut self.next {
            data.moisture = data.moisture.clamp(0.0, 1.0);
        }
        std::mem::swap(&mut self.climate, &mut self.next);
        self.cycles += 1;
    }

    fn evolve(&mut self, grid: &HexGrid, index: usize) {
        let settings = self.settings;
        let cell = grid.cell(index);
        let mut data = self.climate[index];

        if cell.is_underwater() {
            data.moisture = 1.0;
            data.clouds += settings.evaporation_factor;
        } else {
            let evaporation = data.moisture * settings.evaporation_factor;
            data.moisture -= evaporation;
            data.clouds += evaporation;
        }

        let precipitation = data.clouds * settings.precipitation_factor;
        data.clouds -= precipitation;
        data.moisture += precipitation;

        // высокие клетки удерживают меньше облаков; излишек выпадает осадками
        let cloud_maximum = 1.0 - cell.view_elevation() as f32 / (self.elevation_maximum as f32 + 1.0);
        if data.clouds > cloud_maximum {
            data.moisture += data.clouds - cloud_maximum;
            data.clouds = cloud_maximum;
        }

        let main_dispersal_direction = settings.wind_direction.opposite();
        let cloud_dispersal = data.clouds * (1.0 / (5.0 + settings.wind_strength));
        let runoff = data.moisture * settings.runoff_factor * (1.0 / 6.0);
        let seepage = data.moisture * settings.seepage_factor * (1.0 / 6.0);

        for direction in HexDirection::ALL {
            let Some(neighbor) = cell.neighbor(direction) else {
                continue;
            };
            let neighbor_cell = grid.cell(neighbor);
            let target = &mut self.next[neighbor];

            if direction == main_dispersal_direction {
                target.clouds += cloud_dispersal * settings.wind_strength;
            } else {
                target.clouds += cloud_dispersal;
            }

            let elevation_delta = neighbor_cell.view_elevation() - cell.view_elevation();
            if elevation_delta < 0 {
                data.moisture -= runoff;
                target.moisture += runoff;
            } else if elevation_delta == 0 {
                data.moisture -= seepage;
                target.moisture += seepage;
            }
        }

        let own = &mut self.next[index];
        own.moisture = (own.moisture + data.moisture).clamp(0.0, 1.0);
        self.climate[index] = ClimateData::default();
    }

    #[must_use]
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Текущее состояние (буфер, который будет прочитан следующим циклом)
    #[must_use]
    pub fn data(&self) -> &[ClimateData] {
        &self.climate
    }

    /// Забирает итоговую влажность каждой клетки
    #[must_use]
    pub fn into_moisture(self) -> Vec<f32> {
        self.climate.into_iter().map(|d| d.moisture).collect()
    }
}

/// Прогоняет полную симуляцию и возвращает итоговую влажность
#[must_use]
pub fn create_climate(
    grid: &HexGrid,
    settings: &ClimateSettings,
    elevation_maximum: i32,
) -> Vec<f32> {
    let mut simulation = ClimateSimulation::new(grid.cell_count(), settings, elevation_maximum);
    simulation.run(grid);
    simulation.into_moisture()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn island_grid() -> HexGrid {
        let mut grid = HexGrid::new(16, 12);
        for cell in grid.cells_mut() {
            cell.water_level = 3;
            cell.elevation = 1;
        }
        for z in 3..9 {
            for x in 4..12 {
                let i = grid.cell_at_offset(x, z);
                grid.cell_mut(i).elevation = 3 + (x as i32 % 3);
            }
        }
        grid
    }

    #[test]
    fn moisture_stays_in_unit_range_every_cycle() {
        let grid = island_grid();
        let settings = ClimateSettings {
            runoff_factor: 1.0,
            seepage_factor: 1.0,
            ..ClimateSettings::default()
        };
        let mut simulation = ClimateSimulation::new(grid.cell_count(), &settings, 8);
        for _ in 0..CLIMATE_CYCLES {
            simulation.step(&grid);
            for data in simulation.data() {
                assert!((0.0..=1.0).contains(&data.moisture), "{}", data.moisture);
                assert!(data.clouds >= 0.0);
            }
        }
        assert_eq!(simulation.cycles(), CLIMATE_CYCLES);
    }

    #[test]
    fn water_cells_end_saturated() {
        let grid = island_grid();
        let settings = ClimateSettings::default();
        let moisture = create_climate(&grid, &settings, 8);
        let corner = grid.cell_at_offset(0, 0);
        assert!(grid.cell(corner).is_underwater());
        // открытая вода сама держит влагу 1.0 и получает приток от соседей
        assert!(moisture[corner] > 0.99);
    }

    #[test]
    fn dry_world_without_water_stays_dry() {
        let mut grid = HexGrid::new(8, 8);
        for cell in grid.cells_mut() {
            cell.elevation = 4;
            cell.water_level = 1;
        }
        let settings = ClimateSettings {
            starting_moisture: 0.0,
            ..ClimateSettings::default()
        };
        let moisture = create_climate(&grid, &settings, 8);
        assert!(moisture.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn wind_carries_clouds_downwind() {
        // вода только в одном столбце, ветер дует с запада на восток
        let mut grid = HexGrid::new(21, 5);
        for cell in grid.cells_mut() {
            cell.elevation = 2;
            cell.water_level = 1;
        }
        for z in 0..5 {
            let i = grid.cell_at_offset(10, z);
            grid.cell_mut(i).elevation = 0;
        }
        let settings = ClimateSettings {
            wind_direction: HexDirection::W,
            wind_strength: 10.0,
            starting_moisture: 0.0,
            ..ClimateSettings::default()
        };
        let moisture = create_climate(&grid, &settings, 8);
        let east = moisture[grid.cell_at_offset(13, 2)];
        let west = moisture[grid.cell_at_offset(7, 2)];
        assert!(east > west, "east {east} west {west}");
    }
}
