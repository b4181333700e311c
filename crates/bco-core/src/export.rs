// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! One export run: mesh in, BCO bytes out.

use std::borrow::Cow;
use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{info, instrument};

use crate::bco::{write_bco, EncodeError};
use crate::grid::BuildError;
use crate::index::CollisionIndex;
use crate::mesh::{IngestError, Mesh, MeshInput};
use crate::remap::RemapTable;
use crate::settings::{ExportSettings, SettingsError};

/// Any failure of [`export_mesh`].
#[derive(Debug, Error)]
pub enum ExportError {
    /// Settings out of range.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Input mesh is inconsistent.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// Index construction failed.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// The index does not fit the file format.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Output of [`export_mesh`].
#[derive(Debug, Clone)]
pub struct Export {
    /// The index that was encoded.
    pub index: CollisionIndex,
    /// Encoded file.
    pub bytes: Vec<u8>,
    /// Faces left out because their material did not resolve.
    pub excluded_faces: usize,
    /// Material names that did not resolve.
    pub unresolved_materials: BTreeSet<String>,
}

/// Ingests `input`, builds the index and encodes it.
///
/// Nothing touches the filesystem; the caller decides where the bytes go.
#[instrument(skip_all, fields(vertices = input.vertices.len(), faces = input.faces.len()))]
pub fn export_mesh(
    input: &MeshInput,
    remap: &RemapTable,
    settings: &ExportSettings,
) -> Result<Export, ExportError> {
    settings.validate()?;
    let input = if settings.flip_yz {
        let mut flipped = input.clone();
        flipped.flip_yz();
        Cow::Owned(flipped)
    } else {
        Cow::Borrowed(input)
    };

    let ingested = Mesh::ingest(&input, settings.index_base, remap)?;
    let index = CollisionIndex::build(&ingested.mesh, remap, &settings.build_params())?;
    let bytes = write_bco(&index)?;
    info!(
        triangles = index.triangles().len(),
        excluded = ingested.excluded_faces,
        materials = index.materials().len(),
        bytes = bytes.len(),
        "exported collision mesh"
    );
    Ok(Export {
        index,
        bytes,
        excluded_faces: ingested.excluded_faces,
        unresolved_materials: ingested.unresolved_materials,
    })
}
