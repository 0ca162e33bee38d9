//! Ошибки и предупреждения генератора

use serde::Serialize;
use thiserror::Error;

use crate::region::MapRegion;

/// Недопустимая конфигурация
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("chunk_size_min ({min}) is greater than chunk_size_max ({max})")]
    ChunkSizeOrder { min: u32, max: u32 },

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Фатальная ошибка генерации: состояние сетки после неё не определено
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("map of {width}x{height} cells is empty")]
    EmptyMap { width: usize, height: usize },

    #[error("region {index} {region:?} has no cells; map is too small for the configured borders")]
    EmptyRegion { index: usize, region: MapRegion },
}

/// Некритичные отклонения: карта всё равно полностью построена
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum GenerationWarning {
    #[error("failed to use up {remaining} land budget")]
    LandBudgetUnused { remaining: usize },

    #[error("failed to use up {remaining} river budget")]
    RiverBudgetUnused { remaining: usize },
}

/// Ошибка экспорта превью
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to create {width}x{height} image buffer")]
    Buffer { width: u32, height: u32 },

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}
