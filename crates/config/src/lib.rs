//! Swadge Level Export Configuration
//!
//! Loads export options from `exportoptions.txt`, a flat `key = value`
//! file:
//!
//! ```text
//! # default format when the command line names none
//! format = swadge-land
//! tilesize = 16
//! anchortiles = 34, 64, 158
//! lumberjackswidth = 18
//! lumberjackstime = 30
//! breakouttargetmin = 16
//! breakouttargetmax = 127
//! loglevel = info
//! ```

use std::fs;
use std::path::Path;

use swlevel_core::{CoreError, TILE_SIZE_PX};
use swlevel_levels::{FormatOptions, MapFormat};

/// Options file read from the working directory when none is named
pub const DEFAULT_CONFIG_FILE: &str = "exportoptions.txt";

/// Complete export configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Format used when none is given (from "format" option)
    pub format: Option<MapFormat>,
    /// Tile edge in pixels for decoded levels (from "tilesize" option, default: 16)
    pub tile_size: u32,
    /// Tiles that keep a warp marker inline (from "anchortiles" option)
    pub anchor_tiles: Vec<u8>,
    /// Implied Lumber Jacks width (from "lumberjackswidth" option, default: 18)
    pub lumber_jacks_width: u8,
    /// Default Lumber Jacks timer (from "lumberjackstime" option, default: 30)
    pub lumber_jacks_time: u8,
    /// Breakout target id range (from "breakouttargetmin"/"breakouttargetmax")
    pub breakout_target_min: u8,
    pub breakout_target_max: u8,
    /// Log filter directive (from "loglevel" option, default: info)
    pub log_level: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let options = FormatOptions::default();
        Self {
            format: None,
            tile_size: TILE_SIZE_PX,
            anchor_tiles: options.anchor_tiles,
            lumber_jacks_width: options.lumber_jacks_width,
            lumber_jacks_time: options.lumber_jacks_time,
            breakout_target_min: options.breakout_target_min,
            breakout_target_max: options.breakout_target_max,
            log_level: "info".into(),
        }
    }
}

impl ExportConfig {
    /// Load configuration from an options file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Self::load_from_str(&content)
    }

    /// Parse options file content that has already been read
    pub fn load_from_str(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Self::parse(content)?;
        Ok(config)
    }

    /// Only the `loglevel` option of an options file
    ///
    /// Lets the caller install its log subscriber before the full parse, so
    /// warnings about the rest of the file are not lost.
    pub fn log_level_hint(content: &str) -> Option<String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#') && !line.starts_with("//"))
            .filter_map(|line| line.split_once('='))
            .filter(|(key, _)| key.trim() == "loglevel")
            .map(|(_, value)| value.trim().to_string())
            .last()
    }

    /// Parse options file content
    fn parse(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = Self::default();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }

            match line.split_once('=') {
                Some((key, value)) => config.parse_option(key.trim(), value.trim())?,
                None => tracing::warn!("Line {}: expected key = value, got {:?}", number + 1, line),
            }
        }

        if config.breakout_target_min > config.breakout_target_max {
            return Err(CoreError::Config(format!(
                "breakouttargetmin {} is above breakouttargetmax {}",
                config.breakout_target_min, config.breakout_target_max
            ))
            .into());
        }

        Ok(config)
    }

    fn parse_option(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        match key {
            "format" => {
                let format = MapFormat::from_name(value)
                    .ok_or_else(|| CoreError::Config(format!("unknown format {:?}", value)))?;
                self.format = Some(format);
            }
            "tilesize" => {
                self.tile_size = value.parse().unwrap_or(TILE_SIZE_PX);
            }
            "anchortiles" => {
                self.anchor_tiles = value
                    .split(',')
                    .map(str::trim)
                    .filter(|tile| !tile.is_empty())
                    .map(|tile| {
                        tile.parse::<u8>().map_err(|_| {
                            CoreError::Config(format!("anchor tile {:?} is not a tile id", tile))
                        })
                    })
                    .collect::<Result<_, _>>()?;
            }
            "lumberjackswidth" => {
                self.lumber_jacks_width = value.parse().unwrap_or(18);
            }
            "lumberjackstime" => {
                self.lumber_jacks_time = value.parse().unwrap_or(30);
            }
            "breakouttargetmin" => {
                self.breakout_target_min = value.parse().unwrap_or(16);
            }
            "breakouttargetmax" => {
                self.breakout_target_max = value.parse().unwrap_or(127);
            }
            "loglevel" => self.log_level = value.into(),
            _ => tracing::warn!("Unknown option {:?} ignored", key),
        }
        Ok(())
    }

    /// Options handed to the format drivers
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            anchor_tiles: self.anchor_tiles.clone(),
            tile_size: self.tile_size,
            lumber_jacks_width: self.lumber_jacks_width,
            lumber_jacks_time: self.lumber_jacks_time,
            breakout_target_min: self.breakout_target_min,
            breakout_target_max: self.breakout_target_max,
        }
    }

    /// Log the active configuration
    pub fn display(&self) {
        tracing::debug!("Export configuration:");
        match self.format {
            Some(format) => tracing::debug!("  Default format: {}", format),
            None => tracing::debug!("  Default format: (none)"),
        }
        tracing::debug!("  Tile size: {}", self.tile_size);
        tracing::debug!("  Anchor tiles: {:?}", self.anchor_tiles);
        tracing::debug!(
            "  Lumber Jacks: width {}, time {}",
            self.lumber_jacks_width,
            self.lumber_jacks_time
        );
        tracing::debug!(
            "  Breakout targets: {}..={}",
            self.breakout_target_min,
            self.breakout_target_max
        );
        tracing::debug!("  Log level: {}", self.log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ExportConfig::default();
        assert_eq!(config.format, None);
        assert_eq!(config.tile_size, 16);
        assert_eq!(config.anchor_tiles, vec![34, 64, 158]);
        assert_eq!(config.format_options(), FormatOptions::default());
    }

    #[test]
    fn test_parse_simple_config() {
        let config_text = r#"
# Swadge Land export
format = Swadge Land
// ids that hold a warp in place
anchortiles = 34, 64
lumberjackstime = 45
loglevel = debug
"#;
        let config = ExportConfig::parse(config_text).unwrap();
        assert_eq!(config.format, Some(MapFormat::SwadgeLand));
        assert_eq!(config.anchor_tiles, vec![34, 64]);
        assert_eq!(config.lumber_jacks_time, 45);
        assert_eq!(config.log_level, "debug");

        let options = config.format_options();
        assert_eq!(options.anchor_tiles, vec![34, 64]);
        assert_eq!(options.lumber_jacks_time, 45);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = ExportConfig::parse("tilesize = huge\nmystery = 1\n").unwrap();
        assert_eq!(config.tile_size, 16);
    }

    #[test]
    fn test_empty_anchor_list() {
        let config = ExportConfig::parse("anchortiles =").unwrap();
        assert!(config.anchor_tiles.is_empty());
    }

    #[test]
    fn test_invalid_options_rejected() {
        assert!(ExportConfig::parse("format = tetris").is_err());
        assert!(ExportConfig::parse("anchortiles = 34, 300").is_err());
        assert!(ExportConfig::parse("breakouttargetmin = 200\nbreakouttargetmax = 100").is_err());
    }

    #[test]
    fn test_log_level_hint() {
        let content = "# loglevel = trace\nformat = soko\nloglevel = warn\nloglevel = debug\n";
        assert_eq!(ExportConfig::log_level_hint(content), Some("debug".to_string()));
        assert_eq!(ExportConfig::log_level_hint("format = soko"), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "format = soko").unwrap();
        writeln!(file, "breakouttargetmax = 99").unwrap();

        let config = ExportConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.format, Some(MapFormat::Soko));
        assert_eq!(config.breakout_target_max, 99);
    }
}
