use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationParams;

/// User-tunable behaviour, persisted as JSON in the platform config dir.
///
/// Tolerances named `*_tolerance`/`*_hit_radius`/`handle_radius` are screen
/// pixels; radii and sizes are image pixels.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub hit_tolerance: f64,
    pub handle_radius: f64,
    pub handle_hit_radius: f64,
    pub body_tolerance: f64,
    pub initial_radius: f64,
    pub min_radius: f64,
    pub default_rect_size: f64,
    pub min_draw_size: f64,
    pub reference_units: f64,
    pub reference_name: String,
    pub export_reference_circle: bool,
    pub clear_shapes_on_recalibrate: bool,
    pub export_file_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hit_tolerance: 20.0,
            handle_radius: 7.0,
            handle_hit_radius: 18.0,
            body_tolerance: 6.0,
            initial_radius: 60.0,
            min_radius: 10.0,
            default_rect_size: 100.0,
            min_draw_size: 5.0,
            reference_units: 67.0,
            reference_name: "Fangradius".to_string(),
            export_reference_circle: true,
            clear_shapes_on_recalibrate: true,
            export_file_name: "roi-export.json".to_string(),
        }
    }
}

impl Settings {
    pub fn calibration_params(&self) -> CalibrationParams {
        CalibrationParams {
            initial_radius: self.initial_radius,
            min_radius: self.min_radius,
        }
        .sanitized()
    }

    /// Replaces negative or non-finite numbers from a hand-edited file with
    /// the defaults, and floors the minimum radius.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fields = [
            (&mut self.hit_tolerance, defaults.hit_tolerance),
            (&mut self.handle_radius, defaults.handle_radius),
            (&mut self.handle_hit_radius, defaults.handle_hit_radius),
            (&mut self.body_tolerance, defaults.body_tolerance),
            (&mut self.initial_radius, defaults.initial_radius),
            (&mut self.min_radius, defaults.min_radius),
            (&mut self.default_rect_size, defaults.default_rect_size),
            (&mut self.min_draw_size, defaults.min_draw_size),
            (&mut self.reference_units, defaults.reference_units),
        ];
        for (value, fallback) in fields {
            if !value.is_finite() || *value < 0.0 {
                *value = fallback;
            }
        }
        let params = self.calibration_params();
        self.min_radius = params.min_radius;
        self.initial_radius = params.initial_radius;
        self
    }

    fn file_path() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("com", "roi-mapper", "roi-mapper")?;
        let config_dir = dirs.config_dir();
        std::fs::create_dir_all(config_dir).ok()?;
        Some(config_dir.join("settings.json"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::file_path().context("cannot resolve settings path")?;
        Self::load_from(&path)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::file_path().context("cannot resolve settings path")?;
        self.save_to(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let settings: Self = serde_json::from_str(&raw)
            .with_context(|| format!("cannot parse {}", path.display()))?;
        Ok(settings.sanitized())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let parsed: Settings =
            serde_json::from_str(r#"{"reference_units": 42.5}"#).expect("partial settings");
        assert_eq!(parsed.reference_units, 42.5);
        assert_eq!(parsed.export_file_name, "roi-export.json");
        assert!(parsed.export_reference_circle);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        let settings = Settings {
            min_radius: 8.0,
            clear_shapes_on_recalibrate: false,
            ..Settings::default()
        };
        settings.save_to(&path).expect("save");
        assert_eq!(Settings::load_from(&path).expect("load"), settings);
    }

    #[test]
    fn zero_min_radius_is_floored_on_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"min_radius": 0.0, "hit_tolerance": -3.0}"#).expect("write");

        let settings = Settings::load_from(&path).expect("load");
        assert_eq!(settings.min_radius, 1.0);
        assert_eq!(settings.hit_tolerance, 20.0);
        assert_eq!(settings.calibration_params().min_radius, 1.0);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").expect("write");
        assert!(Settings::load_from(&path).is_err());
    }
}
