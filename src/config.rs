// src/config.rs
//! Конфигурация генерации карты
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией:
//! - Рост суши (размер и вероятности "пятен" рельефа, доля суши, эрозия)
//! - Разбиение карты на регионы
//! - Климат (испарение, осадки, сток, ветер)
//! - Реки и озёра
//!
//! Все структуры поддерживают сериализацию в TOML/JSON. Допустимые диапазоны
//! проверяются в [`MapGenerationParams::validate`] — значения вне диапазона
//! отвергаются целиком, а не обрезаются во время генерации.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::hex::HexDirection;

/// Параметры роста суши и эрозии
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandSettings {
    /// Вероятность добавить к приоритету клетки +1 (рваные края пятен), `[0, 0.5]`
    #[serde(default = "default_jitter_probability")]
    pub jitter_probability: f32,

    /// Минимальный размер пятна в клетках, `[20, 200]`
    #[serde(default = "default_chunk_size_min")]
    pub chunk_size_min: u32,

    /// Максимальный размер пятна в клетках, `[20, 200]`
    #[serde(default = "default_chunk_size_max")]
    pub chunk_size_max: u32,

    /// Доля суши в процентах, `[0, 100]`
    #[serde(default = "default_land_percentage")]
    pub land_percentage: u32,

    /// Вероятность поднять (или опустить) пятно сразу на 2 уровня, `[0, 1]`
    #[serde(default = "default_high_rise_probability")]
    pub high_rise_probability: f32,

    /// Вероятность, что итерация опускает сушу, а не поднимает, `[0, 0.4]`
    #[serde(default = "default_sink_probability")]
    pub sink_probability: f32,

    /// Нижняя граница высоты, `[-4, 0]`
    #[serde(default = "default_elevation_minimum")]
    pub elevation_minimum: i32,

    /// Верхняя граница высоты, `[6, 10]`
    #[serde(default = "default_elevation_maximum")]
    pub elevation_maximum: i32,

    /// Какую долю "размываемых" клеток сгладить, в процентах, `[0, 100]`
    #[serde(default = "default_erosion_percentage")]
    pub erosion_percentage: u32,
}

fn default_jitter_probability() -> f32 {
    0.25
}
fn default_chunk_size_min() -> u32 {
    30
}
fn default_chunk_size_max() -> u32 {
    100
}
fn default_land_percentage() -> u32 {
    50
}
fn default_high_rise_probability() -> f32 {
    0.25
}
fn default_sink_probability() -> f32 {
    0.2
}
fn default_elevation_minimum() -> i32 {
    -2
}
fn default_elevation_maximum() -> i32 {
    8
}
fn default_erosion_percentage() -> u32 {
    50
}

impl Default for LandSettings {
    fn default() -> Self {
        Self {
            jitter_probability: 0.25,
            chunk_size_min: 30,
            chunk_size_max: 100,
            land_percentage: 50,
            high_rise_probability: 0.25,
            sink_probability: 0.2,
            elevation_minimum: -2,
            elevation_maximum: 8,
            erosion_percentage: 50,
        }
    }
}

/// Разбиение карты на регионы, в которых растёт суша
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionSettings {
    /// Отступ от краёв карты по X, `[0, 10]`
    #[serde(default = "default_map_border")]
    pub map_border_x: usize,

    /// Отступ от краёв карты по Z, `[0, 10]`
    #[serde(default = "default_map_border")]
    pub map_border_z: usize,

    /// Зазор между соседними регионами (с каждой стороны разреза), `[0, 10]`
    #[serde(default = "default_region_border")]
    pub region_border: usize,

    /// Количество регионов, `1..=4`
    ///
    /// Каждый регион должен остаться непустым после отступов, иначе генерация
    /// вернёт `GenerationError::EmptyRegion`. Минимальные размеры карты:
    /// - 1: `width > 2 * map_border_x`, `height > 2 * map_border_z`;
    /// - 2: то же, и по оси разреза `size / 2 > map_border + region_border`
    ///   (ось выбирается случайно, поэтому условие нужно для обеих);
    /// - 3: полосы шириной около `width / 3`: крайние шире `map_border_x + region_border`,
    ///   средняя шире `2 * region_border`;
    /// - 4: `width / 2 > map_border_x + region_border` и
    ///   `height / 2 > map_border_z + region_border`.
    #[serde(default = "default_region_count")]
    pub region_count: usize,
}

fn default_map_border() -> usize {
    5
}
fn default_region_border() -> usize {
    5
}
fn default_region_count() -> usize {
    1
}

impl Default for RegionSettings {
    fn default() -> Self {
        Self {
            map_border_x: 5,
            map_border_z: 5,
            region_border: 5,
            region_count: 1,
        }
    }
}

/// Параметры климатической симуляции
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateSettings {
    /// Начальная влажность каждой клетки, `[0, 1]`
    #[serde(default = "default_starting_moisture")]
    pub starting_moisture: f32,

    /// Доля влаги суши, уходящая в облака за цикл (над водой — прибавка к облакам), `[0, 1]`
    #[serde(default = "default_evaporation_factor")]
    pub evaporation_factor: f32,

    /// Доля облаков, выпадающая осадками за цикл, `[0, 1]`
    #[serde(default = "default_precipitation_factor")]
    pub precipitation_factor: f32,

    /// Сток влаги к более низким соседям, `[0, 1]`
    #[serde(default = "default_runoff_factor")]
    pub runoff_factor: f32,

    /// Просачивание влаги к соседям той же высоты, `[0, 1]`
    #[serde(default = "default_seepage_factor")]
    pub seepage_factor: f32,

    /// Откуда дует ветер; облака сносит в противоположную сторону
    #[serde(default = "default_wind_direction")]
    pub wind_direction: HexDirection,

    /// Во сколько раз сильнее облака уходят по ветру, `[1, 10]`
    #[serde(default = "default_wind_strength")]
    pub wind_strength: f32,
}

fn default_starting_moisture() -> f32 {
    0.1
}
fn default_evaporation_factor() -> f32 {
    0.5
}
fn default_precipitation_factor() -> f32 {
    0.25
}
fn default_runoff_factor() -> f32 {
    0.25
}
fn default_seepage_factor() -> f32 {
    0.125
}
fn default_wind_direction() -> HexDirection {
    HexDirection::NW
}
fn default_wind_strength() -> f32 {
    4.0
}

impl Default for ClimateSettings {
    fn default() -> Self {
        Self {
            starting_moisture: 0.1,
            evaporation_factor: 0.5,
            precipitation_factor: 0.25,
            runoff_factor: 0.25,
            seepage_factor: 0.125,
            wind_direction: HexDirection::NW,
            wind_strength: 4.0,
        }
    }
}

/// Параметры рек и озёр
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiverSettings {
    /// Сколько процентов суши занять реками, `[0, 20]`
    #[serde(default = "default_river_percentage")]
    pub river_percentage: u32,

    /// Вероятность вырыть озеро в низине посреди реки, `[0, 1]`
    #[serde(default = "default_extra_lake_probability")]
    pub extra_lake_probability: f32,
}

fn default_river_percentage() -> u32 {
    10
}
fn default_extra_lake_probability() -> f32 {
    0.25
}

impl Default for RiverSettings {
    fn default() -> Self {
        Self {
            river_percentage: 10,
            extra_lake_probability: 0.25,
        }
    }
}

/// Основные параметры генерации карты
///
/// Полная конфигурация одного запуска. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapGenerationParams {
    /// Сид генератора случайных чисел (используется, если `use_fixed_seed = true`)
    #[serde(default)]
    pub seed: u64,

    /// `false` — сид выводится из системного времени и случайного числа
    #[serde(default = "default_use_fixed_seed")]
    pub use_fixed_seed: bool,

    /// Ширина карты в клетках (по умолчанию 20)
    #[serde(default = "default_width")]
    pub width: usize,

    /// Высота карты в клетках (по умолчанию 15)
    #[serde(default = "default_height")]
    pub height: usize,

    /// Уровень воды, одинаковый для всех клеток в начале генерации, `[1, 5]`
    #[serde(default = "default_water_level")]
    pub water_level: i32,

    #[serde(default)]
    pub land: LandSettings,

    #[serde(default)]
    pub regions: RegionSettings,

    #[serde(default)]
    pub climate: ClimateSettings,

    #[serde(default)]
    pub rivers: RiverSettings,
}

fn default_use_fixed_seed() -> bool {
    true
}
fn default_width() -> usize {
    20
}
fn default_height() -> usize {
    15
}
fn default_water_level() -> i32 {
    3
}

impl Default for MapGenerationParams {
    fn default() -> Self {
        Self {
            seed: 0,
            use_fixed_seed: true,
            width: 20,
            height: 15,
            water_level: 3,
            land: LandSettings::default(),
            regions: RegionSettings::default(),
            climate: ClimateSettings::default(),
            rivers: RiverSettings::default(),
        }
    }
}

fn check<T: Into<f64> + Copy + PartialOrd>(
    field: &'static str,
    value: T,
    min: T,
    max: T,
) -> Result<(), ConfigError> {
    // NaN не проходит ни одно сравнение, поэтому проверка записана через `!(..)`
    if !(value >= min && value <= max) {
        return Err(ConfigError::OutOfRange {
            field,
            value: value.into(),
            min: min.into(),
            max: max.into(),
        });
    }
    Ok(())
}

/// Проверка для полей `usize`: значения, не влезающие в `u32`, тоже вне диапазона
fn check_count(field: &'static str, value: usize, min: u32, max: u32) -> Result<(), ConfigError> {
    match u32::try_from(value) {
        Ok(value) => check(field, value, min, max),
        Err(_) => Err(ConfigError::OutOfRange {
            field,
            value: value as f64,
            min: min.into(),
            max: max.into(),
        }),
    }
}

impl MapGenerationParams {
    /// Загружает и проверяет параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # map.toml
    /// seed = 42
    /// width = 40
    /// height = 30
    ///
    /// [land]
    /// land_percentage = 60
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let params: Self = toml::from_str(contents)?;
        params.validate()?;
        Ok(params)
    }

    /// Проверяет, что все параметры лежат в допустимых диапазонах
    pub fn validate(&self) -> Result<(), ConfigError> {
        let land = &self.land;
        check("land.jitter_probability", land.jitter_probability, 0.0, 0.5)?;
        check("land.chunk_size_min", land.chunk_size_min, 20, 200)?;
        check("land.chunk_size_max", land.chunk_size_max, 20, 200)?;
        if land.chunk_size_min > land.chunk_size_max {
            return Err(ConfigError::ChunkSizeOrder {
                min: land.chunk_size_min,
                max: land.chunk_size_max,
            });
        }
        check("land.land_percentage", land.land_percentage, 0, 100)?;
        check("water_level", self.water_level, 1, 5)?;
        check(
            "land.high_rise_probability",
            land.high_rise_probability,
            0.0,
            1.0,
        )?;
        check("land.sink_probability", land.sink_probability, 0.0, 0.4)?;
        check("land.elevation_minimum", land.elevation_minimum, -4, 0)?;
        check("land.elevation_maximum", land.elevation_maximum, 6, 10)?;
        check("land.erosion_percentage", land.erosion_percentage, 0, 100)?;

        let regions = &self.regions;
        check_count("regions.map_border_x", regions.map_border_x, 0, 10)?;
        check_count("regions.map_border_z", regions.map_border_z, 0, 10)?;
        check_count("regions.region_border", regions.region_border, 0, 10)?;
        check_count("regions.region_count", regions.region_count, 1, 4)?;

        let climate = &self.climate;
        check(
            "climate.starting_moisture",
            climate.starting_moisture,
            0.0,
            1.0,
        )?;
        check(
            "climate.evaporation_factor",
            climate.evaporation_factor,
            0.0,
            1.0,
        )?;
        check(
            "climate.precipitation_factor",
            climate.precipitation_factor,
            0.0,
            1.0,
        )?;
        check("climate.runoff_factor", climate.runoff_factor, 0.0, 1.0)?;
        check("climate.seepage_factor", climate.seepage_factor, 0.0, 1.0)?;
        check("climate.wind_strength", climate.wind_strength, 1.0, 10.0)?;

        check("rivers.river_percentage", self.rivers.river_percentage, 0, 20)?;
        check(
            "rivers.extra_lake_probability",
            self.rivers.extra_lake_probability,
            0.0,
            1.0,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        MapGenerationParams::default().validate().unwrap();
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let params = MapGenerationParams::from_toml_str(
            r#"
            seed = 7
            width = 40

            [climate]
            wind_direction = "SE"
            "#,
        )
        .unwrap();
        assert_eq!(params.seed, 7);
        assert_eq!(params.width, 40);
        assert_eq!(params.height, 15);
        assert_eq!(params.climate.wind_direction, HexDirection::SE);
        assert_eq!(params.land, LandSettings::default());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut params = MapGenerationParams::default();
        params.land.sink_probability = 0.5;
        let err = params.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "land.sink_probability",
                ..
            }
        ));

        let mut params = MapGenerationParams::default();
        params.climate.runoff_factor = f32::NAN;
        assert!(params.validate().is_err());

        let mut params = MapGenerationParams::default();
        params.regions.region_count = 5;
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_inverted_chunk_sizes() {
        let err = MapGenerationParams::from_toml_str(
            r"
            [land]
            chunk_size_min = 150
            chunk_size_max = 40
            ",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ChunkSizeOrder { min: 150, max: 40 }
        ));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn rejects_region_values_beyond_u32() {
        let err = MapGenerationParams::from_toml_str(
            r"
            [regions]
            region_count = 4294967298
            ",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "regions.region_count",
                ..
            }
        ));

        let mut params = MapGenerationParams::default();
        params.regions.map_border_x = 1 << 32;
        assert!(matches!(
            params.validate().unwrap_err(),
            ConfigError::OutOfRange {
                field: "regions.map_border_x",
                ..
            }
        ));
    }
}
