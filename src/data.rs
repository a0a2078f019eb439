//! Data loading functionality for Isleplan.
//!
//! This module loads the reference catalog from CSV files in a data
//! directory:
//!
//! - `materials.csv`: `name, source`
//! - `items.csv`: `id, name, hours, value, categories, materials`
//! - `patterns.csv` (optional): `item, cycle, pattern`
//!
//! Categories are `;`-separated names, materials are `;`-separated
//! `name:count` pairs, and patterns use `?`, `*` or a compact form such as
//! `4S` (peaks strongly in cycle 4) or `2W`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::models::{
    Category, Item, ItemId, ItemRow, Material, MaterialCost, MaterialRow, MaterialSource,
    PatternMatch, PatternRow,
};

/// Errors raised while loading reference data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("material '{material}' has unknown source '{source_name}'")]
    UnknownSource {
        material: String,
        source_name: String,
    },
    #[error("item '{item}' uses unknown material '{material}'")]
    UnknownMaterial { item: String, material: String },
    #[error("pattern row refers to unknown item '{0}'")]
    UnknownItem(String),
    #[error("item '{item}' has malformed {field}: '{value}'")]
    InvalidField {
        item: String,
        field: &'static str,
        value: String,
    },
    #[error("item '{item}' is invalid: {reason}")]
    InvalidItem { item: String, reason: String },
    #[error("duplicate item id {0}")]
    DuplicateItem(u32),
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    let wrap = |source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(wrap)?;

    rdr.deserialize().map(|row| row.map_err(wrap)).collect()
}

/// Splits a `;`-separated category list.
pub fn parse_categories(field: &str) -> Vec<Category> {
    field
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Category::new)
        .collect()
}

/// Parses `name:count;name:count` against the known materials.
///
/// # Errors
///
/// Fails on an unknown material name or a count that is not a positive
/// integer.
pub fn parse_materials(
    item: &str,
    field: &str,
    materials: &HashMap<String, Material>,
) -> Result<Vec<MaterialCost>, DataError> {
    let mut costs = Vec::new();
    for part in field.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, count) = part.rsplit_once(':').ok_or_else(|| DataError::InvalidField {
            item: item.to_string(),
            field: "materials",
            value: part.to_string(),
        })?;
        let count: u32 = count
            .trim()
            .parse()
            .ok()
            .filter(|&c| c > 0)
            .ok_or_else(|| DataError::InvalidField {
                item: item.to_string(),
                field: "materials",
                value: part.to_string(),
            })?;
        let material = materials
            .get(name.trim())
            .cloned()
            .ok_or_else(|| DataError::UnknownMaterial {
                item: item.to_string(),
                material: name.trim().to_string(),
            })?;
        costs.push(MaterialCost { material, count });
    }
    Ok(costs)
}

/// Loads material definitions, keyed by name.
pub fn load_materials(path: &Path) -> Result<HashMap<String, Material>, DataError> {
    let rows: Vec<MaterialRow> = read_rows(path)?;
    let mut materials = HashMap::with_capacity(rows.len());
    for row in rows {
        let source =
            MaterialSource::parse(&row.source).ok_or_else(|| DataError::UnknownSource {
                material: row.name.clone(),
                source_name: row.source.clone(),
            })?;
        materials.insert(
            row.name.clone(),
            Material {
                name: row.name,
                source,
            },
        );
    }
    Ok(materials)
}

/// Loads item definitions, resolving their materials.
pub fn load_items(
    path: &Path,
    materials: &HashMap<String, Material>,
) -> Result<Vec<Item>, DataError> {
    let rows: Vec<ItemRow> = read_rows(path)?;
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let mut item = Item::new(
            ItemId(row.id),
            row.name,
            row.hours,
            row.value,
            parse_categories(&row.categories),
        );
        if let Some(field) = row.materials.as_deref() {
            item.materials = parse_materials(&item.name, field, materials)?;
        }
        items.push(item);
    }
    Ok(items)
}

/// Applies pattern observations from `patterns.csv` to loaded items.
pub fn apply_patterns(path: &Path, items: &mut [Item]) -> Result<(), DataError> {
    let rows: Vec<PatternRow> = read_rows(path)?;
    let by_name: HashMap<String, usize> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.name.clone(), i))
        .collect();

    for row in &rows {
        let index = *by_name
            .get(&row.item)
            .ok_or_else(|| DataError::UnknownItem(row.item.clone()))?;
        let invalid = || DataError::InvalidField {
            item: row.item.clone(),
            field: "pattern",
            value: format!("cycle {} '{}'", row.cycle, row.pattern),
        };
        if row.cycle == 0 {
            return Err(invalid());
        }
        let pattern = PatternMatch::parse(&row.pattern).ok_or_else(invalid)?;
        items[index].set_pattern(row.cycle - 1, pattern);
    }
    debug!(observations = rows.len(), "applied demand patterns");
    Ok(())
}

/// Loads the complete catalog from the data directory.
///
/// `patterns.csv` is optional; without it every pattern lookup is unknown.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use isleplan::data::load_catalog;
///
/// let catalog = load_catalog(Path::new("data")).unwrap();
/// println!("Loaded {} items", catalog.len());
/// ```
pub fn load_catalog(data_dir: &Path) -> Result<Catalog, DataError> {
    let materials = load_materials(&data_dir.join("materials.csv"))?;
    let mut items = load_items(&data_dir.join("items.csv"), &materials)?;

    let patterns = data_dir.join("patterns.csv");
    if patterns.exists() {
        apply_patterns(&patterns, &mut items)?;
    }

    let catalog = Catalog::new(items)?;
    info!(
        items = catalog.len(),
        materials = materials.len(),
        dir = %data_dir.display(),
        "loaded reference data"
    );
    Ok(catalog)
}

/// Builds a catalog from a JSON array of items.
pub fn catalog_from_json(json: &str) -> Result<Catalog, DataError> {
    let items: Vec<Item> = serde_json::from_str(json)?;
    Catalog::new(items)
}
