//! Per-instance configuration
//!
//! Configs are plain serde structs so the web shell can read them from a
//! canvas `data-config` attribute.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Straight-alpha RGBA color, serialized as `#RRGGBB` or `#RRGGBBAA`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RRGGBB` / `#RRGGBBAA` (leading `#` optional)
    pub fn from_hex(s: &str) -> Result<Self, ConfigError> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || ConfigError::InvalidColor(s.to_string());
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a,
        })
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Linear [0, 1] channels with `alpha` multiplied into the color's own alpha
    pub fn to_f32(&self, alpha: f32) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            (self.a as f32 / 255.0) * alpha.clamp(0.0, 1.0),
        ]
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::from_hex(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

/// Built-in palettes
pub mod palettes {
    use super::Color;

    /// Dark slate used by the hero decorations
    pub const SLATE: [Color; 1] = [Color::rgb(0x0f, 0x17, 0x2b)];

    /// Celebration palette
    pub const CELEBRATION: [Color; 10] = [
        Color::rgb(0xFF, 0xD7, 0x00), // Gold
        Color::rgb(0xFF, 0x6B, 0x6B), // Coral red
        Color::rgb(0x4E, 0xCD, 0xC4), // Teal
        Color::rgb(0xA8, 0x55, 0xF7), // Purple
        Color::rgb(0x3B, 0x82, 0xF6), // Blue
        Color::rgb(0xF9, 0x73, 0x16), // Orange
        Color::rgb(0x10, 0xB9, 0x81), // Emerald
        Color::rgb(0xEC, 0x48, 0x99), // Pink
        Color::rgb(0xFB, 0xBF, 0x24), // Amber
        Color::rgb(0x8B, 0x5C, 0xF6), // Violet
    ];
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Fraction of the configured population actually spawned
    pub fn population_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 1.0,
        }
    }

    /// Whether connective links are drawn
    pub fn links_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Configuration for the ambient field and the pointer-reactive network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig {
    /// Entity count, fixed until reconfigured
    pub population: usize,
    /// Colors entities draw from at creation
    pub palette: Vec<Color>,
    /// Gates the pointer repulsion force entirely
    pub pointer_interaction_enabled: bool,
    /// Device budget
    pub quality: QualityPreset,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            population: NETWORK_POPULATION,
            palette: palettes::SLATE.to_vec(),
            pointer_interaction_enabled: true,
            quality: QualityPreset::Medium,
        }
    }
}

impl FieldConfig {
    /// Floating-dot field defaults (no pointer, no links)
    pub fn ambient() -> Self {
        Self {
            population: AMBIENT_POPULATION,
            pointer_interaction_enabled: false,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_common(self.population, &self.palette)?;
        if self.population > RECOMMENDED_MAX_POPULATION {
            log::warn!(
                "population {} exceeds the tested scale of {}; link scan is O(n²)",
                self.population,
                RECOMMENDED_MAX_POPULATION
            );
        }
        Ok(())
    }

    /// Population after the quality preset is applied (never below 1)
    pub fn effective_population(&self) -> usize {
        let scaled = (self.population as f32 * self.quality.population_scale()).round() as usize;
        scaled.max(1)
    }

    /// True when a change requires the entity store to be rebuilt
    pub fn requires_reinit(&self, other: &FieldConfig) -> bool {
        self.effective_population() != other.effective_population() || self.palette != other.palette
    }
}

/// Configuration for the celebration overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    pub population: usize,
    pub palette: Vec<Color>,
    /// Auto-stop delay after `play()`
    pub duration_ms: f64,
    /// Passed through to the text reveal
    pub message: String,
    pub sub_message: String,
    /// Optional animated counter shown under the messages
    pub counter: Option<CounterConfig>,
}

/// Count-up reveal parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CounterConfig {
    pub start: f64,
    pub end: f64,
    pub duration_ms: f64,
    pub decimals: usize,
    pub separator: String,
    pub prefix: String,
    pub suffix: String,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 0.0,
            duration_ms: 2000.0,
            decimals: 0,
            separator: ",".to_string(),
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            population: CONFETTI_POPULATION,
            palette: palettes::CELEBRATION.to_vec(),
            duration_ms: OVERLAY_DURATION_MS,
            message: "🎉 Congratulations! 🎉".to_string(),
            sub_message: "You've achieved something amazing!".to_string(),
            counter: None,
        }
    }
}

impl OverlayConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_common(self.population, &self.palette)
    }
}

fn validate_common(population: usize, palette: &[Color]) -> Result<(), ConfigError> {
    if population == 0 {
        return Err(ConfigError::ZeroPopulation);
    }
    if palette.is_empty() {
        return Err(ConfigError::EmptyPalette);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_parse() {
        let c = Color::from_hex("#FFD700").unwrap();
        assert_eq!(c, Color::rgb(0xFF, 0xD7, 0x00));

        let c = Color::from_hex("0f172b80").unwrap();
        assert_eq!(c.a, 0x80);
        assert_eq!(c.to_hex(), "#0F172B80");

        assert!(Color::from_hex("#FFF").is_err());
        assert!(Color::from_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_field_config_json() {
        let json = r##"{"population": 20, "palette": ["#112233"], "pointerInteractionEnabled": false}"##;
        let config = FieldConfig::from_json(json).unwrap();
        assert_eq!(config.population, 20);
        assert_eq!(config.palette, vec![Color::rgb(0x11, 0x22, 0x33)]);
        assert!(!config.pointer_interaction_enabled);
        assert_eq!(config.quality, QualityPreset::Medium);
    }

    #[test]
    fn test_config_rejects_empty_palette_and_zero_population() {
        let json = r#"{"palette": []}"#;
        assert!(matches!(FieldConfig::from_json(json), Err(ConfigError::EmptyPalette)));

        let json = r#"{"population": 0}"#;
        assert!(matches!(OverlayConfig::from_json(json), Err(ConfigError::ZeroPopulation)));

        let json = r#"{"palette": ["red"]}"#;
        assert!(FieldConfig::from_json(json).is_err());
    }

    #[test]
    fn test_overlay_defaults() {
        let config = OverlayConfig::from_json(r#"{"durationMs": 1200}"#).unwrap();
        assert_eq!(config.duration_ms, 1200.0);
        assert_eq!(config.population, CONFETTI_POPULATION);
        assert_eq!(config.palette.len(), 10);
        assert!(config.counter.is_none());
    }

    #[test]
    fn test_overlay_counter_json() {
        let json = r#"{"counter": {"end": 1500, "suffix": "+"}}"#;
        let config = OverlayConfig::from_json(json).unwrap();
        let counter = config.counter.unwrap();
        assert_eq!(counter.end, 1500.0);
        assert_eq!(counter.suffix, "+");
        assert_eq!(counter.separator, ",");
    }

    #[test]
    fn test_requires_reinit() {
        let base = FieldConfig::default();
        let mut toggled = base.clone();
        toggled.pointer_interaction_enabled = false;
        assert!(!base.requires_reinit(&toggled));

        let mut bigger = base.clone();
        bigger.population += 5;
        assert!(base.requires_reinit(&bigger));

        let mut recolored = base.clone();
        recolored.palette = palettes::CELEBRATION.to_vec();
        assert!(base.requires_reinit(&recolored));
    }

    #[test]
    fn test_quality_scales_population() {
        let config = FieldConfig {
            population: 30,
            quality: QualityPreset::Low,
            ..FieldConfig::default()
        };
        assert_eq!(config.effective_population(), 15);
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert!(!QualityPreset::Low.links_enabled());
    }
}
