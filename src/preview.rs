//! Отладочные изображения сгенерированной карты
//!
//! Клетки рисуются прямоугольниками со сдвигом нечётных строк на полклетки,
//! этого достаточно, чтобы увидеть сушу, воду и русла.

use std::path::Path;

use image::{GrayImage, ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::biome::TerrainType;
use crate::error::PreviewError;
use crate::grid::{HexCell, HexGrid};

const RIVER_COLOR: Rgba<u8> = Rgba([40, 110, 220, 255]);

/// RGBA-превью карты
#[derive(Debug, Clone)]
pub struct MapPreview {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Карта высот: один пиксель на клетку
#[derive(Debug, Clone)]
pub struct ElevationPreview {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl MapPreview {
    pub fn save_as_png(&self, path: impl AsRef<Path>) -> Result<(), PreviewError> {
        let img: RgbaImage = ImageBuffer::from_raw(self.width, self.height, self.data.clone())
            .ok_or(PreviewError::Buffer {
                width: self.width,
                height: self.height,
            })?;
        img.save(path)?;
        Ok(())
    }
}

impl ElevationPreview {
    pub fn save_as_png(&self, path: impl AsRef<Path>) -> Result<(), PreviewError> {
        let img: GrayImage = ImageBuffer::from_raw(self.width, self.height, self.data.clone())
            .ok_or(PreviewError::Buffer {
                width: self.width,
                height: self.height,
            })?;
        img.save(path)?;
        Ok(())
    }
}

/// Наименьшая и наибольшая видимая высота на карте
fn elevation_range(grid: &HexGrid) -> (i32, i32) {
    grid.cells()
        .map(HexCell::view_elevation)
        .fold(None, |range, e| match range {
            None => Some((e, e)),
            Some((lo, hi)) => Some((e.min(lo), e.max(hi))),
        })
        .unwrap_or((0, 0))
}

fn shade(rgb: [u8; 3], factor: f32) -> Rgba<u8> {
    let channel = |c: u8| (f32::from(c) * factor).clamp(0.0, 255.0) as u8;
    Rgba([channel(rgb[0]), channel(rgb[1]), channel(rgb[2]), 255])
}

fn cell_color(cell: &HexCell, lowest: i32, span: f32) -> Rgba<u8> {
    if cell.is_underwater() {
        let depth = (cell.water_level - cell.elevation) as f32;
        return shade([40, 90, 170], 1.0 / (1.0 + 0.2 * (depth - 1.0)));
    }
    let terrain = TerrainType::from_index(cell.terrain_type_index).unwrap_or(TerrainType::Mud);
    let height = (cell.elevation - lowest) as f32 / span;
    shade(terrain.to_rgb(), 0.55 + 0.45 * height)
}

/// Левый верхний угол клетки на превью
fn cell_origin(cell_size: u32, x: usize, z: usize) -> (i32, i32) {
    let size = cell_size as i32;
    let shift = if z & 1 == 1 { size / 2 } else { 0 };
    (x as i32 * size + shift, z as i32 * size)
}

fn cell_center(grid: &HexGrid, cell_size: u32, index: usize) -> (f32, f32) {
    let x = index % grid.cell_count_x;
    let z = index / grid.cell_count_x;
    let (left, top) = cell_origin(cell_size, x, z);
    let half = cell_size as f32 / 2.0;
    (left as f32 + half, top as f32 + half)
}

/// Рисует карту: тип местности с затенением по высоте, вода по глубине, реки линиями
#[must_use]
pub fn render_preview(grid: &HexGrid, cell_size: u32) -> MapPreview {
    let cell_size = cell_size.max(2);
    let width = grid.cell_count_x as u32 * cell_size + cell_size / 2;
    let height = grid.cell_count_z as u32 * cell_size;
    let mut img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));

    let (lowest, highest) = elevation_range(grid);
    let span = (highest - lowest).max(1) as f32;

    for cell in grid.cells() {
        let x = cell.index % grid.cell_count_x;
        let z = cell.index / grid.cell_count_x;
        let (left, top) = cell_origin(cell_size, x, z);
        draw_filled_rect_mut(
            &mut img,
            Rect::at(left, top).of_size(cell_size, cell_size),
            cell_color(cell, lowest, span),
        );
    }

    let radius = (cell_size / 6).max(1) as i32;
    for cell in grid.cells() {
        let Some(direction) = cell.outgoing_river else {
            continue;
        };
        let Some(neighbor) = cell.neighbor(direction) else {
            continue;
        };
        let from = cell_center(grid, cell_size, cell.index);
        let to = cell_center(grid, cell_size, neighbor);
        draw_line_segment_mut(&mut img, from, to, RIVER_COLOR);
        if !cell.has_incoming_river() {
            draw_filled_circle_mut(&mut img, (from.0 as i32, from.1 as i32), radius, RIVER_COLOR);
        }
    }

    MapPreview {
        width,
        height,
        data: img.into_raw(),
    }
}

fn elevation_level(cell: &HexCell, lowest: i32, span: f32) -> u8 {
    ((cell.view_elevation() - lowest) as f32 / span * 255.0).round() as u8
}

/// Карта видимых высот в оттенках серого
#[must_use]
pub fn render_elevation(grid: &HexGrid) -> ElevationPreview {
    let width = grid.cell_count_x as u32;
    let height = grid.cell_count_z as u32;
    let (lowest, highest) = elevation_range(grid);
    let span = (highest - lowest).max(1) as f32;

    #[cfg(feature = "parallel")]
    let data = grid
        .as_slice()
        .par_iter()
        .map(|cell| elevation_level(cell, lowest, span))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let data = grid
        .as_slice()
        .iter()
        .map(|cell| elevation_level(cell, lowest, span))
        .collect();

    ElevationPreview {
        width,
        height,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexDirection;
    use image::Luma;

    fn gray_at(preview: &ElevationPreview, x: u32, y: u32) -> Luma<u8> {
        Luma([preview.data[(y * preview.width + x) as usize]])
    }

    fn island() -> HexGrid {
        let mut grid = HexGrid::new(6, 4);
        for cell in grid.cells_mut() {
            cell.water_level = 2;
            cell.elevation = 0;
        }
        let peak = grid.cell_at_offset(3, 2);
        let shore = grid.neighbor(peak, HexDirection::W).unwrap();
        grid.cell_mut(peak).elevation = 5;
        grid.cell_mut(shore).elevation = 3;
        grid.set_outgoing_river(peak, HexDirection::W).unwrap();
        grid
    }

    #[test]
    fn preview_covers_shifted_rows() {
        let preview = render_preview(&island(), 8);
        assert_eq!(preview.width, 6 * 8 + 4);
        assert_eq!(preview.height, 4 * 8);
        assert_eq!(preview.data.len(), (preview.width * preview.height * 4) as usize);
    }

    #[test]
    fn river_is_drawn_between_centers() {
        let grid = island();
        let preview = render_preview(&grid, 10);
        let peak = grid.cell_at_offset(3, 2);
        let (x, y) = cell_center(&grid, 10, peak);
        let offset = ((y as u32 * preview.width + x as u32 - 3) * 4) as usize;
        assert_eq!(&preview.data[offset..offset + 4], &RIVER_COLOR.0);
    }

    #[test]
    fn elevation_uses_full_gray_range() {
        let grid = island();
        let preview = render_elevation(&grid);
        assert_eq!(preview.data.len(), grid.cell_count());
        assert_eq!(gray_at(&preview, 3, 2), Luma([255]));
        // вода на уровне 2 — самая низкая видимая высота
        assert_eq!(gray_at(&preview, 0, 0), Luma([0]));
    }

    #[test]
    fn saves_png() {
        let path = std::env::temp_dir().join("hexmapgen_preview_test.png");
        render_preview(&island(), 4).save_as_png(&path).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_file(path);
    }
}
