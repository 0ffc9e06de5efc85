//! Region spec loading.
//!
//! A region spec is a YAML mapping from region name to `[x, y, width, height]`.
//! Declaration order is preserved; it determines the order of the extraction
//! output, one entry per region.

use std::path::Path;

use serde_yaml::Value;
use tracing::debug;

use crate::error::ConfigError;

/// A named rectangle defining where to look for one field on an image.
///
/// Immutable once parsed; coordinates are in pixels from the top-left
/// corner of the source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Region name, unique within a spec (e.g. "area_1").
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// An ordered set of regions, iterated in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    /// Build a set from already-validated regions, keeping their order.
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// Number of regions in the set.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterate regions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Look up a region by name.
    pub fn get(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

/// Load and validate a region spec file.
///
/// Fails if the file is unreadable, is not a YAML mapping of name to a
/// 4-element non-negative integer sequence, or contains a region with
/// zero width or height.
pub fn load_regions(path: &Path) -> Result<RegionSet, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    parse_regions(&content)
}

/// Parse a region spec from its YAML text.
pub fn parse_regions(content: &str) -> Result<RegionSet, ConfigError> {
    let mapping: serde_yaml::Mapping = serde_yaml::from_str(content)
        .map_err(|e| ConfigError::Malformed(format!("expected a mapping of regions: {e}")))?;

    let mut regions = Vec::with_capacity(mapping.len());

    for (key, value) in &mapping {
        let name = key
            .as_str()
            .ok_or_else(|| ConfigError::Malformed("region name must be a string".to_string()))?
            .to_string();

        let coords = coords_from_value(&name, value)?;
        let [x, y, width, height] = coords;

        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyRegion {
                name,
                width,
                height,
            });
        }

        regions.push(Region {
            name,
            x,
            y,
            width,
            height,
        });
    }

    debug!("Loaded {} regions", regions.len());
    Ok(RegionSet::new(regions))
}

fn coords_from_value(name: &str, value: &Value) -> Result<[u32; 4], ConfigError> {
    let seq = value.as_sequence().ok_or_else(|| {
        ConfigError::Malformed(format!("region '{name}' must be a [x, y, width, height] list"))
    })?;

    if seq.len() != 4 {
        return Err(ConfigError::Malformed(format!(
            "region '{name}' has {} coordinates, expected 4",
            seq.len()
        )));
    }

    let mut coords = [0u32; 4];
    for (i, item) in seq.iter().enumerate() {
        let n = item.as_u64().ok_or_else(|| {
            ConfigError::Malformed(format!(
                "region '{name}' coordinate {i} must be a non-negative integer"
            ))
        })?;
        coords[i] = u32::try_from(n).map_err(|_| {
            ConfigError::Malformed(format!("region '{name}' coordinate {i} is too large"))
        })?;
    }

    Ok(coords)
}
