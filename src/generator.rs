//! Конвейер генерации карты
//!
//! Регионы → суша → эрозия → климат → реки → типы местности. Все стадии берут
//! случайные числа из одного `ChaCha8Rng`, созданного из сида в начале запуска,
//! поэтому при одинаковых сиде и параметрах карта получается одна и та же.

use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::biome::assign_terrain_types;
use crate::climate::{CLIMATE_CYCLES, create_climate};
use crate::config::MapGenerationParams;
use crate::erosion::{ErosionScratch, erode_land};
use crate::error::{ConfigError, GenerationError, GenerationWarning};
use crate::grid::HexGrid;
use crate::region::create_regions;
use crate::rivers::RiverBuilder;
use crate::search::SearchFrontier;
use crate::terrain::create_land;

/// Сводка одного запуска генерации
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GenerationReport {
    /// Сид, с которым на самом деле шла генерация
    pub seed: u64,
    /// Клетки суши, учтённые для бюджета рек
    pub land_cells: usize,
    pub unused_land_budget: usize,
    pub erodible_before: usize,
    pub erodible_target: usize,
    pub erodible_after: usize,
    pub river_count: usize,
    pub river_cells: usize,
    pub lake_count: usize,
    pub warnings: Vec<GenerationWarning>,
}

/// Генератор с переиспользуемыми буферами
///
/// Фронт поиска, буферы эрозии и пул истоков рек живут между вызовами
/// [`MapGenerator::generate_map`], чтобы не выделять память на каждый запуск.
/// Один генератор рассчитан только на последовательные вызовы.
#[derive(Debug, Clone)]
pub struct MapGenerator {
    params: MapGenerationParams,
    frontier: SearchFrontier,
    erosion: ErosionScratch,
    rivers: RiverBuilder,
}

impl MapGenerator {
    /// Создаёт генератор, предварительно проверив параметры
    pub fn new(params: MapGenerationParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            params,
            frontier: SearchFrontier::new(),
            erosion: ErosionScratch::new(),
            rivers: RiverBuilder::new(),
        })
    }

    #[must_use]
    pub fn params(&self) -> &MapGenerationParams {
        &self.params
    }

    /// Сид для запуска: фиксированный из параметров или случайный
    #[must_use]
    pub fn resolve_seed(&self) -> u64 {
        if self.params.use_fixed_seed {
            return self.params.seed;
        }
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::from(d.subsec_nanos()) ^ d.as_secs())
            .unwrap_or_default();
        (rand::thread_rng().next_u64() ^ nanos) & 0x7FFF_FFFF
    }

    /// Пересоздаёт `grid` размером `width × height` и строит на нём карту
    ///
    /// При ошибке состояние сетки не определено.
    pub fn generate_map(
        &mut self,
        grid: &mut HexGrid,
        width: usize,
        height: usize,
    ) -> Result<GenerationReport, GenerationError> {
        if width == 0 || height == 0 {
            return Err(GenerationError::EmptyMap { width, height });
        }

        let seed = self.resolve_seed();
        info!("Генерация карты {width}×{height}, сид {seed}");
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let params = &self.params;

        grid.create_map(width, height);
        for cell in grid.cells_mut() {
            cell.water_level = params.water_level;
        }

        let regions = create_regions(width, height, &params.regions, &mut rng);
        if let Some((index, region)) = regions.iter().enumerate().find(|(_, r)| r.is_empty()) {
            return Err(GenerationError::EmptyRegion {
                index,
                region: *region,
            });
        }
        debug!("Регионы: {regions:?}");

        let mut report = GenerationReport {
            seed,
            ..GenerationReport::default()
        };

        let land = create_land(
            grid,
            &regions,
            &mut self.frontier,
            &params.land,
            params.water_level,
            &mut rng,
        );
        report.land_cells = land.land_cells;
        report.unused_land_budget = land.unused_budget;
        if land.unused_budget > 0 {
            report.warnings.push(GenerationWarning::LandBudgetUnused {
                remaining: land.unused_budget,
            });
        }
        debug!(
            "Суша: {} клеток, неиспользованный бюджет {}",
            land.land_cells, land.unused_budget
        );

        let erosion = erode_land(
            grid,
            &mut self.erosion,
            params.land.erosion_percentage,
            &mut rng,
        );
        report.erodible_before = erosion.initial;
        report.erodible_target = erosion.target;
        report.erodible_after = erosion.remaining;
        debug!(
            "Эрозия: {} → {} размываемых клеток (цель {})",
            erosion.initial, erosion.remaining, erosion.target
        );

        let moisture = create_climate(grid, &params.climate, params.land.elevation_maximum);
        debug!("Климат: {CLIMATE_CYCLES} циклов");

        let rivers = self.rivers.create_rivers(
            grid,
            &moisture,
            land.land_cells,
            params.water_level,
            params.land.elevation_maximum,
            &params.rivers,
            &mut rng,
        );
        report.river_count = rivers.river_count;
        report.river_cells = rivers.river_cells;
        report.lake_count = rivers.lake_count;
        if rivers.unused_budget > 0 {
            report.warnings.push(GenerationWarning::RiverBudgetUnused {
                remaining: rivers.unused_budget,
            });
        }
        debug!(
            "Реки: {} шт., {} клеток, {} озёр",
            rivers.river_count, rivers.river_cells, rivers.lake_count
        );

        assign_terrain_types(grid, &moisture);

        grid.reset_search_state();
        self.frontier.reset();

        for warning in &report.warnings {
            warn!("{warning}");
        }
        Ok(report)
    }
}

/// Разовая генерация без переиспользования буферов
pub fn generate_map(
    grid: &mut HexGrid,
    width: usize,
    height: usize,
    params: &MapGenerationParams,
) -> Result<GenerationReport, GenerationError> {
    MapGenerator::new(params.clone())?.generate_map(grid, width, height)
}
