//! Configuration for report extraction
//!
//! The report layout is fixed, but its crop bands, tolerances, label fixes and
//! exported territories are kept in a TOML file so that layout drift is a
//! configuration change rather than a code change. Every key is optional.
//!
//! ```toml
//! [layout]
//! header = { top = 35.0, bottom = 65.0 }
//! body = { top = 80.0, bottom = 485.0 }
//! intersection_tolerance = 5.0
//!
//! [corrections]
//! llinois = "Illinois"
//!
//! [export]
//! excluded_states = ["Guam", "Puerto Rico"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::page::{BBox, Strategy, TableSettings};

/// Top-level configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub layout: PageLayout,
    /// Known mis-extracted state labels mapped to their correct form
    #[serde(default = "default_corrections")]
    pub corrections: BTreeMap<String, String>,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed or
    /// the resulting layout is inconsistent.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject bands and tolerances extraction cannot work with
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, band) in [("header", &self.layout.header), ("body", &self.layout.body)] {
            let finite = band.top.is_finite() && band.bottom.is_finite();
            if !finite || band.top < 0.0 || band.top >= band.bottom {
                bail!(
                    "layout.{} band must satisfy 0 <= top < bottom (got top={}, bottom={})",
                    name,
                    band.top,
                    band.bottom
                );
            }
        }
        for (name, value) in [
            ("header_x_tolerance", self.layout.header_x_tolerance),
            ("header_y_tolerance", self.layout.header_y_tolerance),
            ("intersection_tolerance", self.layout.intersection_tolerance),
        ] {
            if !value.is_finite() || value <= 0.0 {
                bail!("layout.{} must be positive and finite (got {})", name, value);
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: PageLayout::default(),
            corrections: default_corrections(),
            export: ExportConfig::default(),
        }
    }
}

/// A horizontal band of the page, full page width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub top: f64,
    pub bottom: f64,
}

impl Band {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// The band as a box spanning a page of the given width
    pub fn bbox(&self, page_width: f64) -> BBox {
        BBox::new(0.0, self.top, page_width, self.bottom)
    }
}

/// Named page regions and tolerances of the report layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Band holding the `<Month> - <Year>` label
    #[serde(default = "default_header")]
    pub header: Band,
    /// Band holding the state grid
    #[serde(default = "default_body")]
    pub body: Band,
    #[serde(default = "default_header_x_tolerance")]
    pub header_x_tolerance: f64,
    #[serde(default = "default_header_y_tolerance")]
    pub header_y_tolerance: f64,
    #[serde(default = "default_intersection_tolerance")]
    pub intersection_tolerance: f64,
}

impl PageLayout {
    /// Table settings for a body grid whose left border is at `left_edge`.
    ///
    /// The grid has no horizontal rules, so rows come from text alignment;
    /// the missing left border is supplied as an explicit vertical line.
    pub fn table_settings(&self, left_edge: f64) -> TableSettings {
        TableSettings {
            vertical_strategy: Strategy::Lines,
            horizontal_strategy: Strategy::Text,
            explicit_vertical_lines: vec![left_edge],
            intersection_tolerance: self.intersection_tolerance,
            ..TableSettings::default()
        }
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            header: default_header(),
            body: default_body(),
            header_x_tolerance: default_header_x_tolerance(),
            header_y_tolerance: default_header_y_tolerance(),
            intersection_tolerance: default_intersection_tolerance(),
        }
    }
}

fn default_header() -> Band {
    Band::new(35.0, 65.0)
}

fn default_body() -> Band {
    Band::new(80.0, 485.0)
}

fn default_header_x_tolerance() -> f64 {
    2.0
}

fn default_header_y_tolerance() -> f64 {
    3.0
}

fn default_intersection_tolerance() -> f64 {
    5.0
}

fn default_corrections() -> BTreeMap<String, String> {
    BTreeMap::from([("llinois".to_string(), "Illinois".to_string())])
}

/// Post-validation export filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Territories and districts left out of the exported CSV
    #[serde(default = "default_excluded_states")]
    pub excluded_states: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            excluded_states: default_excluded_states(),
        }
    }
}

fn default_excluded_states() -> Vec<String> {
    [
        "Guam",
        "District of Columbia",
        "Mariana Islands",
        "Northern Mariana Islands",
        "Virgin Islands",
        "Puerto Rico",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.layout, PageLayout::default());
        assert_eq!(config.corrections.get("llinois").unwrap(), "Illinois");
        assert_eq!(config.export.excluded_states.len(), 6);
    }

    #[test]
    fn test_default_matches_empty_file() {
        assert_eq!(Config::default(), Config::from_str("").unwrap());
    }

    #[test]
    fn test_partial_layout_override() {
        let toml = r#"
            [layout]
            body = { top = 90.0, bottom = 500.0 }
            intersection_tolerance = 4.0
        "#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.layout.body, Band::new(90.0, 500.0));
        assert_eq!(config.layout.header, Band::new(35.0, 65.0));
        assert_eq!(config.layout.intersection_tolerance, 4.0);
    }

    #[test]
    fn test_corrections_replace_defaults() {
        let toml = r#"
            [corrections]
            "ew York" = "New York"
        "#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.corrections.len(), 1);
        assert_eq!(config.corrections.get("ew York").unwrap(), "New York");
    }

    #[test]
    fn test_inverted_band_is_rejected() {
        let toml = r#"
            [layout]
            header = { top = 65.0, bottom = 35.0 }
        "#;
        assert!(Config::from_str(toml).is_err());
    }

    #[test]
    fn test_non_positive_tolerance_is_rejected() {
        let toml = r#"
            [layout]
            intersection_tolerance = 0.0
        "#;
        assert!(Config::from_str(toml).is_err());
    }

    #[test]
    fn test_non_finite_layout_values_are_rejected() {
        for toml in [
            "[layout]\nbody = { top = nan, bottom = 485.0 }",
            "[layout]\nheader = { top = 35.0, bottom = inf }",
            "[layout]\nheader_x_tolerance = nan",
            "[layout]\nintersection_tolerance = inf",
        ] {
            let err = Config::from_str(toml).unwrap_err();
            assert!(err.to_string().starts_with("layout."), "{toml}: {err}");
        }
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        assert!(Config::from_str("[layout").is_err());
    }

    #[test]
    fn test_table_settings_for_body() {
        let settings = PageLayout::default().table_settings(18.5);
        assert_eq!(settings.horizontal_strategy, Strategy::Text);
        assert_eq!(settings.explicit_vertical_lines, vec![18.5]);
        assert_eq!(settings.intersection_tolerance, 5.0);
    }

    #[test]
    fn test_band_bbox_spans_page_width() {
        let bbox = Band::new(80.0, 485.0).bbox(792.0);
        assert_eq!(bbox, BBox::new(0.0, 80.0, 792.0, 485.0));
    }
}
