use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use gridmap::data_loader::load_grid;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(file_path) = args.next().map(PathBuf::from) else {
        bail!("usage: inspect_grid <file> [separator]");
    };
    let separator = match args.next() {
        Some(s) if s.chars().count() == 1 => s.chars().next().unwrap_or(';'),
        Some(s) => bail!("separator must be a single character, got {:?}", s),
        None => ';',
    };

    println!("Inspecting grid file: {}", file_path.display());

    let grid = load_grid(&file_path, separator)
        .with_context(|| format!("failed to load {}", file_path.display()))?;

    println!("\n=== GRID INFORMATION ===");
    let (num_lon, num_lat) = grid.shape();
    println!("\nShape: {} lon x {} lat ({} points)", num_lon, num_lat, num_lon * num_lat);

    println!("\nLongitudes ({}):", num_lon);
    println!("  {:?}", grid.lon_values());
    println!("\nLatitudes ({}):", num_lat);
    println!("  {:?}", grid.lat_values());

    println!("\nValues:");
    match grid.value_range() {
        Some((min, max)) => println!("  range = {} .. {}", min, max),
        None => println!("  no finite values"),
    }
    println!("  missing = {}", grid.missing_count());

    println!("\nFirst rows (lon, lat, de):");
    let rows = (0..num_lon).flat_map(|i| (0..num_lat).map(move |j| (i, j)));
    for (i, j) in rows.take(10) {
        println!(
            "  {:>10.4} {:>10.4} {:>12.6}",
            grid.lon[[i, j]],
            grid.lat[[i, j]],
            grid.data[[i, j]]
        );
    }

    Ok(())
}
