use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::document::{Document, Entity};
use crate::error::ExtractError;

const INSERT: &str = "INSERT";
const NAME: i32 = 2;
const LAYER: i32 = 8;
const X: i32 = 10;
const Y: i32 = 20;
const Z: i32 = 30;

/// Insertion point of a block reference. Missing components read as 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// A block reference found in the drawing, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockCandidate {
    pub name: String,
    pub layer: Option<String>,
    pub coordinates: Coordinates,
}

/// Extract every usable block reference from document text.
///
/// Only `INSERT` records of the `ENTITIES` section are considered; their
/// order in the document is kept and duplicates are not merged. A record
/// without a name or without any insertion coordinate is skipped. Any
/// structural problem in the document fails the whole run.
pub fn extract(text: &str) -> Result<Vec<BlockCandidate>, ExtractError> {
    let document = Document::parse(text)?;
    Ok(from_document(&document))
}

fn from_document(document: &Document) -> Vec<BlockCandidate> {
    let Some(entities) = document.entities() else {
        info!("Document has no ENTITIES section");
        return Vec::new();
    };

    let candidates: Vec<BlockCandidate> = entities
        .iter()
        .filter(|entity| entity.kind() == INSERT)
        .filter_map(candidate)
        .collect();

    if candidates.is_empty() {
        info!(entities = entities.len(), "No block references found");
    } else {
        debug!(count = candidates.len(), "Extracted block references");
    }

    candidates
}

fn candidate(entity: &Entity) -> Option<BlockCandidate> {
    let name = match entity.string(NAME) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            warn!(line = entity.line(), "Skipping INSERT without a block name");
            return None;
        }
    };

    let (x, y) = (entity.float(X), entity.float(Y));
    if x.is_none() && y.is_none() {
        warn!(line = entity.line(), name = %name, "Skipping INSERT without a position");
        return None;
    }

    let layer = entity
        .string(LAYER)
        .filter(|layer| !layer.is_empty())
        .map(str::to_string);

    Some(BlockCandidate {
        name,
        layer,
        coordinates: Coordinates {
            x: x.unwrap_or(0.0),
            y: y.unwrap_or(0.0),
            z: entity.float(Z).unwrap_or(0.0),
        },
    })
}
