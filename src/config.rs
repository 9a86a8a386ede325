//! Scene configuration
//!
//! The single value produced by the outer layers (forms, HTTP handlers) and
//! consumed by the core. Deserialized from JSON with the same keys the web
//! editor sends.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SimError, SimResult};

/// Built-in scene layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    /// Two particles bouncing inside a ring
    #[default]
    RingBounce,
    /// One particle inside a rotating arc with a gap
    ArcEscape,
    /// Two squares bouncing inside a box
    SquareBattle,
    /// One particle in a ring that grows on every bounce
    GrowingBall,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Template::RingBounce => "ring_bounce",
            Template::ArcEscape => "arc_escape",
            Template::SquareBattle => "square_battle",
            Template::GrowingBall => "growing_ball",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "ring_bounce" | "ring" => Some(Template::RingBounce),
            "arc_escape" | "arc" => Some(Template::ArcEscape),
            "square_battle" | "box" => Some(Template::SquareBattle),
            "growing_ball" | "multisound" => Some(Template::GrowingBall),
            _ => None,
        }
    }

    /// Number of bodies the template spawns
    pub fn body_count(&self) -> usize {
        match self {
            Template::RingBounce => 2,
            Template::ArcEscape => 1,
            Template::SquareBattle => 2,
            Template::GrowingBall => 1,
        }
    }
}

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const RED: Color = Color([255, 0, 0, 255]);
    pub const BLUE: Color = Color([0, 0, 255, 255]);
    /// Used when an asset fails and no fallback color is configured
    pub const NEUTRAL: Color = Color([128, 128, 128, 255]);

    /// Parse `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(s: &str) -> SimResult<Self> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| SimError::config(format!("color '{s}' must start with '#'")))?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(SimError::config(format!("color '{s}' must be #rrggbb or #rrggbbaa")));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| SimError::config(format!("color '{s}' has invalid hex digits")))
        };
        let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Color([channel(0)?, channel(2)?, channel(4)?, alpha]))
    }
}

/// How a body is drawn: a solid color or an external image, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Appearance {
    Color(Color),
    Asset(String),
}

impl Appearance {
    /// `#...` is a color; any other non-empty string is an asset reference
    pub fn parse(s: &str) -> SimResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SimError::config("appearance must not be empty"));
        }
        if s.starts_with('#') {
            Ok(Appearance::Color(Color::from_hex(s)?))
        } else {
            Ok(Appearance::Asset(s.to_string()))
        }
    }
}

/// Tunable physics and timeline parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Fraction of gravity removed from vertical velocity after each bounce
    pub damping_ratio: f32,
    /// Whole-batch retries before placement gives up
    pub max_placement_attempts: u32,
    /// Silence (frames) that closes an audio cue
    pub cue_gap_frames: u64,
    /// Arc rotation per step (radians)
    pub arc_angular_velocity: f32,
    /// Radius gained per boundary bounce (GrowingBall)
    pub growth_per_bounce: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            damping_ratio: DAMPING_RATIO,
            max_placement_attempts: MAX_PLACEMENT_ATTEMPTS,
            cue_gap_frames: CUE_GAP_FRAMES,
            arc_angular_velocity: ARC_ANGULAR_VELOCITY,
            growth_per_bounce: 1.0,
        }
    }
}

/// `particle_N_color` / `square_N_appearance` keys, consulted after `appearances`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyAppearances {
    #[serde(default, alias = "square_1_appearance", skip_serializing_if = "Option::is_none")]
    pub particle_1_color: Option<String>,
    #[serde(default, alias = "square_2_appearance", skip_serializing_if = "Option::is_none")]
    pub particle_2_color: Option<String>,
}

impl LegacyAppearances {
    fn get(&self, index: usize) -> Option<&String> {
        match index {
            0 => self.particle_1_color.as_ref(),
            1 => self.particle_2_color.as_ref(),
            _ => None,
        }
    }
}

/// Numbered PNG frames under `path`: `frame0001.png` up to `frame{frame_count - 1}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceConfig {
    #[serde(rename = "sequence")]
    pub path: String,
    /// Playback rate of the sequence itself
    #[serde(rename = "sequence_fps")]
    pub fps: f32,
    #[serde(rename = "sequence_frame_count")]
    pub frame_count: u32,
}

impl SequenceConfig {
    /// Asset reference of every frame, in playback order
    pub fn frame_refs(&self) -> Vec<String> {
        (1..self.frame_count)
            .map(|i| format!("{}/frame{i:04}.png", self.path.trim_end_matches('/')))
            .collect()
    }
}

fn default_fps() -> u32 {
    TARGET_FPS
}

fn default_gap() -> f32 {
    ARC_GAP_DEGREES
}

/// Everything needed to build one simulation instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Run length in seconds (headless)
    pub duration: f64,
    #[serde(default)]
    pub seed: u32,
    #[serde(default)]
    pub template: Template,
    #[serde(default)]
    pub background_color: Option<String>,
    /// One entry per body: `#rrggbb` or an asset reference
    #[serde(default)]
    pub appearances: Vec<String>,
    /// Per-body keys sent by older editor payloads
    #[serde(flatten)]
    pub legacy: LegacyAppearances,
    /// Used for bodies without an entry in `appearances`
    #[serde(default)]
    pub fallback_appearance: Option<String>,
    #[serde(default)]
    pub collision_sound: Option<String>,
    #[serde(default)]
    pub escape_sound: Option<String>,
    /// Arc gap width in degrees
    #[serde(default = "default_gap")]
    pub gap_angle_deg: f32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Namespace token for event scoping (defaults to the seed)
    #[serde(default)]
    pub instance: Option<u64>,
    #[serde(default)]
    pub physics: PhysicsTuning,
    /// Image sequence shown at the center, advanced while bounces keep coming
    #[serde(flatten)]
    pub sequence: Option<SequenceConfig>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            canvas_width: 720,
            canvas_height: 1280,
            duration: 10.0,
            seed: 0,
            template: Template::default(),
            background_color: None,
            appearances: vec!["#3b82f6".to_string(), "#22c55e".to_string()],
            legacy: LegacyAppearances::default(),
            fallback_appearance: None,
            collision_sound: None,
            escape_sound: None,
            gap_angle_deg: ARC_GAP_DEGREES,
            fps: TARGET_FPS,
            instance: None,
            physics: PhysicsTuning::default(),
            sequence: None,
        }
    }
}

impl Configuration {
    /// Parse from a JSON string
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SimError::config(format!("malformed configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SimError::config(format!("cannot read {}: {e}", path.display())))?;
        log::info!("Loaded configuration from {}", path.display());
        Self::from_json(&json)
    }

    /// Reject geometrically or semantically invalid values
    pub fn validate(&self) -> SimResult<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(SimError::config("canvas dimensions must be non-zero"));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(SimError::config(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if self.fps == 0 {
            return Err(SimError::config("fps must be non-zero"));
        }
        if !(self.gap_angle_deg > 0.0 && self.gap_angle_deg < 360.0) {
            return Err(SimError::config(format!(
                "gap angle must be in (0, 360) degrees, got {}",
                self.gap_angle_deg
            )));
        }
        let p = &self.physics;
        if p.damping_ratio < 0.0 || p.growth_per_bounce < 0.0 || !p.arc_angular_velocity.is_finite()
        {
            return Err(SimError::config("physics tuning values must be non-negative"));
        }
        if p.max_placement_attempts == 0 {
            return Err(SimError::config("max_placement_attempts must be at least 1"));
        }
        if let Some(seq) = &self.sequence {
            if seq.frame_count < 2 || !(seq.fps.is_finite() && seq.fps > 0.0) {
                return Err(SimError::config(format!(
                    "sequence '{}' needs at least 2 frames and a positive fps",
                    seq.path
                )));
            }
        }
        if let Some(bg) = &self.background_color {
            Color::from_hex(bg)?;
        }
        self.body_appearances().map(|_| ())
    }

    /// Resolve one appearance per template body
    pub fn body_appearances(&self) -> SimResult<Vec<Appearance>> {
        let fallback = self
            .fallback_appearance
            .as_deref()
            .map(Appearance::parse)
            .transpose()?;
        (0..self.template.body_count())
            .map(|i| match self.appearances.get(i).or_else(|| self.legacy.get(i)) {
                Some(s) => Appearance::parse(s),
                None => fallback.clone().ok_or_else(|| {
                    SimError::config(format!("body {i} has no appearance and no fallback"))
                }),
            })
            .collect()
    }

    pub fn background(&self) -> Color {
        self.background_color
            .as_deref()
            .and_then(|s| Color::from_hex(s).ok())
            .unwrap_or(Color::BLACK)
    }

    /// Color used when a body's asset fails to load
    pub fn fallback_color(&self) -> Color {
        match self
            .fallback_appearance
            .as_deref()
            .map(Appearance::parse)
        {
            Some(Ok(Appearance::Color(c))) => c,
            _ => Color::NEUTRAL,
        }
    }

    /// Resolution scaling relative to the 720-wide layout
    pub fn scale_factor(&self) -> f32 {
        match self.canvas_width {
            480 => 2.0 / 3.0,
            720 => 1.0,
            1080 => 1.5,
            _ => 1.0,
        }
    }

    /// Steps in one headless run: floor(fps * duration)
    pub fn total_frames(&self) -> u64 {
        (self.fps as f64 * self.duration).floor() as u64
    }

    pub fn namespace_token(&self) -> u64 {
        self.instance.unwrap_or(self.seed as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_from_str() {
        assert_eq!(Template::from_str("Arc-Escape"), Some(Template::ArcEscape));
        assert_eq!(Template::from_str("multisound"), Some(Template::GrowingBall));
        assert_eq!(Template::from_str("nope"), None);
        assert_eq!(
            Template::from_str(Template::SquareBattle.as_str()),
            Some(Template::SquareBattle)
        );
    }

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#ff8000").unwrap(), Color([255, 128, 0, 255]));
        assert_eq!(Color::from_hex("#00000080").unwrap(), Color([0, 0, 0, 128]));
        assert!(Color::from_hex("ff8000").is_err());
        assert!(Color::from_hex("#ff80").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
    }

    #[test]
    fn test_appearance_parse() {
        assert_eq!(
            Appearance::parse("#0000ff").unwrap(),
            Appearance::Color(Color::BLUE)
        );
        assert_eq!(
            Appearance::parse("ball.png").unwrap(),
            Appearance::Asset("ball.png".into())
        );
        assert!(Appearance::parse("  ").is_err());
    }

    #[test]
    fn test_from_json_defaults() {
        let config = Configuration::from_json(
            r##"{
                "canvas_width": 480,
                "canvas_height": 854,
                "duration": 2,
                "seed": 17,
                "template": "arc_escape",
                "appearances": ["#ff0000"]
            }"##,
        )
        .unwrap();
        assert_eq!(config.fps, 60);
        assert_eq!(config.gap_angle_deg, 45.0);
        assert_eq!(config.total_frames(), 120);
        assert!((config.scale_factor() - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(config.namespace_token(), 17);
        assert_eq!(config.physics.cue_gap_frames, 60);
        assert_eq!(config.sequence, None);
    }

    #[test]
    fn test_total_frames_fractional_durations() {
        for (duration, frames) in [(0.7, 42), (2.3, 138), (1.5, 90), (10.0, 600), (0.01, 0)] {
            let config = Configuration {
                duration,
                ..Default::default()
            };
            assert_eq!(config.total_frames(), frames, "duration {duration}");
        }

        let config = Configuration::from_json(
            r##"{
                "canvas_width": 720,
                "canvas_height": 1280,
                "duration": 2.3,
                "appearances": ["#ff0000", "#00ff00"]
            }"##,
        )
        .unwrap();
        assert_eq!(config.total_frames(), 138);
    }

    #[test]
    fn test_legacy_appearance_keys() {
        let config = Configuration::from_json(
            r##"{
                "canvas_width": 720,
                "canvas_height": 1280,
                "duration": 1,
                "particle_1_color": "#ff0000",
                "particle_2_color": "ball.png"
            }"##,
        )
        .unwrap();
        assert_eq!(
            config.body_appearances().unwrap(),
            vec![
                Appearance::Color(Color::RED),
                Appearance::Asset("ball.png".into())
            ]
        );

        let squares = Configuration::from_json(
            r##"{
                "canvas_width": 720,
                "canvas_height": 1280,
                "duration": 1,
                "template": "square_battle",
                "appearances": ["#0000ff"],
                "square_1_appearance": "#ff0000",
                "square_2_appearance": "#00ff00"
            }"##,
        )
        .unwrap();
        // explicit list wins, the legacy key fills the gap
        assert_eq!(
            squares.body_appearances().unwrap(),
            vec![
                Appearance::Color(Color::BLUE),
                Appearance::Color(Color([0, 255, 0, 255]))
            ]
        );
    }

    #[test]
    fn test_sequence_keys() {
        let config = Configuration::from_json(
            r##"{
                "canvas_width": 720,
                "canvas_height": 1280,
                "duration": 1,
                "template": "growing_ball",
                "appearances": ["#ff0000"],
                "sequence": "clips/spin/",
                "sequence_fps": 30,
                "sequence_frame_count": 4
            }"##,
        )
        .unwrap();
        let seq = config.sequence.as_ref().unwrap();
        assert_eq!(seq.fps, 30.0);
        assert_eq!(
            seq.frame_refs(),
            vec![
                "clips/spin/frame0001.png",
                "clips/spin/frame0002.png",
                "clips/spin/frame0003.png"
            ]
        );

        let single = Configuration {
            sequence: Some(SequenceConfig {
                path: "clips".into(),
                fps: 30.0,
                frame_count: 1,
            }),
            ..config.clone()
        };
        assert!(single.validate().is_err());
        let frozen = Configuration {
            sequence: Some(SequenceConfig {
                path: "clips".into(),
                fps: 0.0,
                frame_count: 4,
            }),
            ..config
        };
        assert!(frozen.validate().is_err());
    }

    #[test]
    fn test_missing_appearance_is_fatal() {
        let config = Configuration {
            appearances: vec!["#ff0000".into()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SimError::Configuration { .. }));

        let with_fallback = Configuration {
            fallback_appearance: Some("#00ff00".into()),
            ..config
        };
        assert!(with_fallback.validate().is_ok());
        assert_eq!(with_fallback.body_appearances().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_gap_angle() {
        for gap in [0.0, 360.0, 400.0, -5.0] {
            let config = Configuration {
                gap_angle_deg: gap,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "gap {gap} accepted");
        }
    }

    #[test]
    fn test_invalid_duration() {
        let config = Configuration {
            duration: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fallback_color() {
        let config = Configuration {
            fallback_appearance: Some("#102030".into()),
            ..Default::default()
        };
        assert_eq!(config.fallback_color(), Color([16, 32, 48, 255]));
        assert_eq!(Configuration::default().fallback_color(), Color::NEUTRAL);
    }
}
