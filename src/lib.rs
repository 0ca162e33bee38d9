//! Процедурный генератор гексагональных карт: рельеф, эрозия, климат, реки

pub mod biome;
pub mod climate;
pub mod config;
pub mod erosion;
pub mod error;
pub mod generator;
pub mod grid;
pub mod hex;
pub mod preview;
pub mod region;
pub mod rivers;
pub mod search;
pub mod terrain;

pub use biome::{TerrainType, assign_terrain_types, classify_terrain};
pub use config::{
    ClimateSettings, LandSettings, MapGenerationParams, RegionSettings, RiverSettings,
};
pub use error::{ConfigError, GenerationError, GenerationWarning, PreviewError};
pub use generator::{GenerationReport, MapGenerator, generate_map};
pub use grid::{HexCell, HexGrid};
pub use hex::{HexCoordinates, HexDirection};
pub use preview::{ElevationPreview, MapPreview, render_elevation, render_preview};
