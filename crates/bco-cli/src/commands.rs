// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Subcommand implementations.

use std::fs::{self, File};
use std::path::Path;

use anyhow::{bail, Context, Result};
use bco_core::bco::{HEADER_SIZE, MATERIAL_RECORD_SIZE};
use bco_core::{
    export_mesh, read_bco, write_bco, BcoFile, ExportSettings, GroundHit, IndexBase, Mesh,
    QueryEngine, RemapTable, RuntimeCollision, TriangleSource,
};
use bco_geom::{Ray, Vec3};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use tracing::{info, warn};

use crate::obj::read_obj;
use crate::ExportArgs;

pub fn export(args: &ExportArgs) -> Result<()> {
    let mut settings = match &args.settings {
        Some(path) => ExportSettings::load(path)
            .with_context(|| format!("failed to load settings {}", path.display()))?,
        None => ExportSettings::default(),
    };
    if let Some(cell_size) = args.cell_size {
        settings.cell_size = cell_size;
    }
    if let Some(max_depth) = args.max_depth {
        settings.max_depth = max_depth;
    }
    if let Some(max_tri_count) = args.max_tri_count {
        settings.max_tri_count = max_tri_count;
    }
    settings.flip_yz |= args.flip_yz;
    // OBJ indices are one-based whatever the settings file says.
    settings.index_base = IndexBase::One;

    let remap = match &args.remap {
        Some(path) => RemapTable::load(path)
            .with_context(|| format!("failed to load remap table {}", path.display()))?,
        None => RemapTable::default(),
    };
    let input = read_obj(open(&args.mesh)?)
        .with_context(|| format!("failed to parse {}", args.mesh.display()))?;

    let export = export_mesh(&input, &remap, &settings)
        .with_context(|| format!("failed to export {}", args.mesh.display()))?;
    for material in &export.unresolved_materials {
        warn!(material = %material, "material has no floor type; its faces are visual-only");
    }
    fs::write(&args.out, &export.bytes)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    info!(path = %args.out.display(), "wrote collision file");

    println!(
        "{}: {} triangles, {} excluded faces, {} materials, {} nodes, {} bytes",
        args.out.display(),
        export.index.triangles().len(),
        export.excluded_faces,
        export.index.materials().len(),
        export.index.grid().nodes().len(),
        export.bytes.len()
    );
    Ok(())
}

pub fn info(path: &Path, json: bool) -> Result<()> {
    let file = BcoFile::open(path).with_context(|| format!("failed to read {}", path.display()))?;
    let header = file.header();
    let index = file.index();
    let grid = index.grid();

    let sections = [
        ("grid", HEADER_SIZE as u32, header.triangle_indices_offset, grid.nodes().len()),
        (
            "triangle indices",
            header.triangle_indices_offset,
            header.triangles_offset,
            grid.slots().len(),
        ),
        ("triangles", header.triangles_offset, header.vertices_offset, index.triangles().len()),
        ("vertices", header.vertices_offset, header.materials_offset, index.vertices().len()),
        (
            "materials",
            header.materials_offset,
            header.materials_offset + u32::from(header.material_count) * MATERIAL_RECORD_SIZE as u32,
            index.materials().len(),
        ),
    ];

    if json {
        let doc = serde_json::json!({
            "size": file.size(),
            "grid": {
                "cells_x": header.grid_x,
                "cells_z": header.grid_z,
                "origin_x": header.origin_x,
                "origin_z": header.origin_z,
                "cell_size_x": header.cell_size_x,
                "cell_size_z": header.cell_size_z,
                "leaves": grid.leaves().len(),
                "max_depth": grid.max_leaf_depth(),
            },
            "sections": sections
                .iter()
                .map(|(name, start, end, records)| serde_json::json!({
                    "name": name,
                    "offset": start,
                    "bytes": end - start,
                    "records": records,
                }))
                .collect::<Vec<_>>(),
            "materials": index
                .materials()
                .iter()
                .map(|m| serde_json::json!({
                    "floor_type": m.floor_type.0,
                    "sound_id": m.sound_id,
                    "setting_a": m.setting_a,
                    "setting_b": m.setting_b,
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{} ({} bytes)", path.display(), file.size());
    println!(
        "grid {}x{} cells of {}x{} at ({}, {}), {} leaves, deepest level {}",
        header.grid_x,
        header.grid_z,
        header.cell_size_x,
        header.cell_size_z,
        header.origin_x,
        header.origin_z,
        grid.leaves().len(),
        grid.max_leaf_depth()
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Section", "Offset", "Bytes", "Records"]);
    for (name, start, end, records) in sections {
        table.add_row(vec![
            name.to_owned(),
            start.to_string(),
            (end - start).to_string(),
            records.to_string(),
        ]);
    }
    println!("{table}");

    let mut materials = Table::new();
    materials
        .load_preset(UTF8_FULL)
        .set_header(vec!["Floor type", "Sound", "Setting A", "Setting B"]);
    for m in index.materials() {
        materials.add_row(vec![
            m.floor_type.to_string(),
            m.sound_id.to_string(),
            m.setting_a.to_string(),
            m.setting_b.to_string(),
        ]);
    }
    println!("{materials}");
    Ok(())
}

pub fn height(path: &Path, x: f32, z: f32, y: Option<f32>, closest: bool) -> Result<()> {
    let hit = match load_target(path)? {
        Target::File(file) => ground(file.index().query(), x, z, y, closest),
        Target::Mesh(runtime) => ground(runtime.query(), x, z, y, closest),
    };
    match hit {
        Some(hit) => println!("height {} triangle {}", hit.height, hit.triangle),
        None => println!("no ground at ({x}, {z})"),
    }
    Ok(())
}

pub fn pick(path: &Path, origin: Vec3, direction: Vec3) -> Result<()> {
    if direction.is_zero() {
        bail!("direction must not be zero");
    }
    let ray = Ray::new(origin, direction);
    let hit = match load_target(path)? {
        Target::File(file) => file.index().query().first_hit(&ray),
        Target::Mesh(runtime) => runtime.query().first_hit(&ray),
    };
    match hit {
        Some(hit) => println!(
            "hit ({}, {}, {}) distance {} triangle {}",
            hit.point.x(),
            hit.point.y(),
            hit.point.z(),
            hit.distance,
            hit.triangle
        ),
        None => println!("no hit"),
    }
    Ok(())
}

pub fn verify(path: &Path) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let index = read_bco(&bytes).with_context(|| format!("{} is not a valid BCO file", path.display()))?;
    let again = write_bco(&index).context("failed to re-encode")?;
    if again != bytes {
        let at = again
            .iter()
            .zip(&bytes)
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| again.len().min(bytes.len()));
        bail!(
            "re-encoded file differs from {} at byte {at} ({} vs {} bytes)",
            path.display(),
            again.len(),
            bytes.len()
        );
    }
    println!(
        "ok: {} bytes, {} triangles, {} leaves, deepest level {}",
        bytes.len(),
        index.triangles().len(),
        index.grid().leaves().len(),
        index.grid().max_leaf_depth()
    );
    Ok(())
}

/// Something the probe commands can query.
enum Target {
    File(BcoFile),
    Mesh(RuntimeCollision),
}

/// Opens `path` as an OBJ mesh (by extension) or as a BCO file.
fn load_target(path: &Path) -> Result<Target> {
    let is_obj = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));
    if !is_obj {
        let file = BcoFile::open(path).with_context(|| format!("failed to read {}", path.display()))?;
        return Ok(Target::File(file));
    }

    let input = read_obj(open(path)?).with_context(|| format!("failed to parse {}", path.display()))?;
    let faces: Vec<[u32; 3]> = input
        .faces
        .iter()
        .map(|f| f.indices.map(|i| i - 1))
        .collect();
    let mesh = Mesh::from_indices(input.vertices, &faces)?;
    let runtime = RuntimeCollision::build(mesh)
        .with_context(|| format!("failed to index {}", path.display()))?;
    Ok(Target::Mesh(runtime))
}

fn ground<S: TriangleSource + ?Sized>(
    engine: QueryEngine<'_, S>,
    x: f32,
    z: f32,
    y: Option<f32>,
    closest: bool,
) -> Option<GroundHit> {
    match y {
        Some(y) if closest => engine.ground_closest(x, z, y),
        Some(y) => engine.ground_below(x, z, y),
        None => engine.ground_below(x, z, f32::INFINITY),
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("failed to open {}", path.display()))
}
