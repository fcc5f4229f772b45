use std::env;
use std::fs;

use voxscribe_common::{Result, VoxscribeError};
use voxscribe_logger::{log, LogSeverity};
use voxscribe_store::{Palette, VoxelStore};
use voxscribe_vox::write_vox;

/// Usage: voxscribe [OUTPUT] [PALETTE_JSON]
///
/// Builds a demo voxel model and writes it as a ".vox" file. A palette file
/// is a JSON array of exactly 256 `[r, g, b]` triplets; without one the
/// grayscale ramp is used.
fn main() {
    voxscribe_logger::init(LogSeverity::Info);
    log("Voxscribe init".to_string(), LogSeverity::Info);

    if let Err(err) = run() {
        log(format!("{}", err), LogSeverity::Fatal);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "model.vox".to_string());
    let palette = match args.next() {
        Some(path) => load_palette(&path)?,
        None => Palette::grayscale(),
    };

    let mut store = VoxelStore::new(palette);
    build_demo_model(&mut store);
    log(
        format!("demo model spans {} sections", store.section_count()),
        LogSeverity::Info,
    );

    let bytes = write_vox(&mut store, true)?;
    fs::write(&output, &bytes)?;
    log(
        format!("wrote {} bytes to {}", bytes.len(), output),
        LogSeverity::Info,
    );
    Ok(())
}

fn load_palette(path: &str) -> Result<Palette> {
    let text = fs::read_to_string(path)?;
    let triplets: Vec<[u8; 3]> = serde_json::from_str(&text).map_err(|err| {
        VoxscribeError::InvalidConfiguration(format!("palette file {}: {}", path, err))
    })?;
    Palette::from_triplets(triplets)
}

/// A dome on a square ground slab. The slab straddles the section grid on
/// all sides of the origin, so the output exercises negative coordinates and
/// several sections.
fn build_demo_model(store: &mut VoxelStore) {
    let half_extent = 96i64;
    for x in -half_extent..half_extent {
        for y in -half_extent..half_extent {
            store.set_voxel(x, y, 0, 16);
        }
    }

    let radius = 48i64;
    for x in -radius..=radius {
        for y in -radius..=radius {
            let flat = x * x + y * y;
            if flat > radius * radius {
                continue;
            }
            let height = ((radius * radius - flat) as f64).sqrt() as i64;
            for z in 1..=height {
                // Shade by altitude, keeping clear of the empty index 0.
                let color = (64 + z * 3).min(255) as u8;
                store.set_voxel(x, y, z, color);
            }
        }
    }
}
