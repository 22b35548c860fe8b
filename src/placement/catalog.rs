//! Placement rules keyed by asset name
//!
//! A rule matches when its key occurs in the file name of an asset path.
//! Rules are checked in declaration order and the first match wins.

use thiserror::Error;

use super::transform::Transform;

/// `#2df169`
pub const GLOW_GREEN: [f32; 3] = [45.0 / 255.0, 241.0 / 255.0, 105.0 / 255.0];

/// Emissive glow applied to every mesh of a matched asset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialOverride {
    pub emissive_color: [f32; 3],
    pub emissive_intensity: f32,
    /// Puts the meshes on the selective bloom layer
    pub glow_layer: bool,
}

impl MaterialOverride {
    pub const fn glow(emissive_color: [f32; 3], emissive_intensity: f32) -> Self {
        Self {
            emissive_color,
            emissive_intensity,
            glow_layer: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRule {
    pub key: &'static str,
    pub transform: Transform,
    pub material_override: Option<MaterialOverride>,
}

impl PlacementRule {
    pub const fn new(key: &'static str, transform: Transform) -> Self {
        Self {
            key,
            transform,
            material_override: None,
        }
    }

    pub const fn with_override(mut self, material_override: MaterialOverride) -> Self {
        self.material_override = Some(material_override);
        self
    }

    /// Substring match on the file name only; directory names never match
    pub fn matches(&self, path: &str) -> bool {
        file_name(path).contains(self.key)
    }
}

/// Where and how an asset is shown
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Placement {
    pub transform: Transform,
    pub material_override: Option<MaterialOverride>,
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("placement rule '{key}' matches none of the declared assets")]
    UnusedRule { key: &'static str },
    #[error("placement rule '{key}' has a non-positive scale {scale:?}")]
    DegenerateScale { key: &'static str, scale: [f32; 3] },
}

/// Findings of [`PlacementCatalog::validate`] that do not stop startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogReport {
    /// Asset paths matched by more than one rule, with the matching keys in order
    pub ambiguous: Vec<(String, Vec<&'static str>)>,
}

#[derive(Debug, Clone, Default)]
pub struct PlacementCatalog {
    rules: Vec<PlacementRule>,
}

impl PlacementCatalog {
    pub fn new(rules: Vec<PlacementRule>) -> Self {
        Self { rules }
    }

    /// Spawn point, statue and the glowing stag group
    pub fn standard() -> Self {
        Self::new(vec![
            PlacementRule::new("stylized_spawn_point", Transform::at([-4.0, 0.0, 0.0], 10.0)),
            PlacementRule::new("statue", Transform::at([0.0, 6.0, 0.0], 1.0)),
            PlacementRule::new(
                "stag_and_friends_original",
                Transform::at([10.0, 8.0, 30.0], 5.0),
            )
            .with_override(MaterialOverride::glow(GLOW_GREEN, 2.0)),
        ])
    }

    pub fn rules(&self) -> &[PlacementRule] {
        &self.rules
    }

    pub fn rule_for(&self, path: &str) -> Option<&PlacementRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// Placement for `path`; identity without override when no rule matches
    pub fn place(&self, path: &str) -> Placement {
        match self.rule_for(path) {
            Some(rule) => Placement {
                transform: rule.transform,
                material_override: rule.material_override,
            },
            None => Placement::default(),
        }
    }

    /// Checks the rules against the assets the scene actually declares
    pub fn validate(&self, paths: &[&str]) -> Result<CatalogReport, CatalogError> {
        for rule in &self.rules {
            if rule.transform.is_degenerate() {
                return Err(CatalogError::DegenerateScale {
                    key: rule.key,
                    scale: rule.transform.scale,
                });
            }
            if !paths.iter().any(|path| rule.matches(path)) {
                return Err(CatalogError::UnusedRule { key: rule.key });
            }
        }

        let mut report = CatalogReport::default();
        for path in paths {
            let keys: Vec<&'static str> = self
                .rules
                .iter()
                .filter(|rule| rule.matches(path))
                .map(|rule| rule.key)
                .collect();
            if keys.len() > 1 {
                log::warn!(
                    "{} matches placement rules {:?}; using '{}'",
                    path,
                    keys,
                    keys[0]
                );
                report.ambiguous.push((path.to_string(), keys));
            }
        }

        Ok(report)
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
