use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use hexmapgen::{
    GenerationReport, HexCell, HexGrid, MapGenerationParams, MapGenerator, render_elevation,
    render_preview,
};
use serde::Serialize;

/// Генератор гексагональных карт
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: PathBuf,

    /// Путь для сохранения превью (по умолчанию: ./map.png)
    #[arg(short, long, default_value = "map.png")]
    output: PathBuf,

    /// Сохранить клетки и сводку в JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Сохранить карту высот в оттенках серого
    #[arg(long)]
    elevation: Option<PathBuf>,

    /// Фиксированный сид (перекрывает значение из конфига)
    #[arg(long)]
    seed: Option<u64>,

    /// Ширина карты в клетках
    #[arg(long)]
    width: Option<usize>,

    /// Высота карты в клетках
    #[arg(long)]
    height: Option<usize>,

    /// Размер клетки на превью в пикселях
    #[arg(long, default_value_t = 12)]
    cell_size: u32,
}

#[derive(Serialize)]
struct MapExport<'a> {
    width: usize,
    height: usize,
    report: &'a GenerationReport,
    cells: &'a [HexCell],
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    println!("🔍 Загрузка конфигурации...");
    let mut params = MapGenerationParams::from_toml_file(&cli.config)?;
    if let Some(seed) = cli.seed {
        params.seed = seed;
        params.use_fixed_seed = true;
    }
    if let Some(width) = cli.width {
        params.width = width;
    }
    if let Some(height) = cli.height {
        params.height = height;
    }

    println!(
        "Генерация карты (размер: {}×{})...",
        params.width, params.height
    );
    let (width, height) = (params.width, params.height);
    let mut generator = MapGenerator::new(params)?;
    let mut grid = HexGrid::default();
    let report = generator.generate_map(&mut grid, width, height)?;

    println!("  сид: {}", report.seed);
    println!(
        "  суша: {} клеток, эрозия: {} → {} (цель {})",
        report.land_cells, report.erodible_before, report.erodible_after, report.erodible_target
    );
    println!(
        "  реки: {} ({} клеток), озёра: {}",
        report.river_count, report.river_cells, report.lake_count
    );
    for warning in &report.warnings {
        println!("  ⚠ {warning}");
    }

    println!("Сохранение превью в {:?}", cli.output);
    render_preview(&grid, cli.cell_size).save_as_png(&cli.output)?;

    if let Some(path) = &cli.elevation {
        println!("Сохранение карты высот в {path:?}");
        render_elevation(&grid).save_as_png(path)?;
    }

    if let Some(path) = &cli.json {
        println!("Сохранение клеток в {path:?}");
        let export = MapExport {
            width,
            height,
            report: &report,
            cells: grid.as_slice(),
        };
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), &export)?;
    }

    println!("\nГотово!");
    Ok(())
}
