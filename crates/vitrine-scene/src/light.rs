//! Scene lighting: a small rig of directional, point and spot lights

use crate::patch::{parse_f32, parse_vec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;
use vitrine_core::{Color, Result, VitrineError};

pub const MAX_INTENSITY: f32 = 10.0;
pub const MAX_SHADOW_INTENSITY: f32 = 2.0;
pub const MAX_EXPOSURE: f32 = 10.0;
pub const MAX_DISTANCE: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LightId(pub u32);

impl std::fmt::Display for LightId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

impl std::str::FromStr for LightKind {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "directional" | "directionallight" => Ok(LightKind::Directional),
            "point" | "pointlight" => Ok(LightKind::Point),
            "spot" | "spotlight" => Ok(LightKind::Spot),
            other => Err(VitrineError::InvalidEnumValue {
                value: other.to_string(),
                allowed: vec!["directional".into(), "point".into(), "spot".into()],
            }),
        }
    }
}

/// One light of the rig.
///
/// `distance` applies to point and spot lights (0 = infinite range);
/// `angle` (radians) and `penumbra` only to spot lights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub id: LightId,
    pub kind: LightKind,
    #[serde(with = "hex_color")]
    pub color: Color,
    pub intensity: f32,
    pub position: [f32; 3],
    #[serde(default = "default_shadow_intensity")]
    pub shadow_intensity: f32,
    #[serde(default = "default_angle")]
    pub angle: f32,
    #[serde(default)]
    pub penumbra: f32,
    #[serde(default)]
    pub distance: f32,
}

fn default_shadow_intensity() -> f32 {
    1.0
}

fn default_angle() -> f32 {
    std::f32::consts::FRAC_PI_3
}

impl Light {
    fn new(id: LightId, kind: LightKind) -> Self {
        Self {
            id,
            kind,
            color: Color::WHITE,
            intensity: 1.0,
            position: [0.0, 0.0, 5.0],
            shadow_intensity: default_shadow_intensity(),
            angle: default_angle(),
            penumbra: 0.0,
            distance: 0.0,
        }
    }

    fn validate(&self) -> Result<()> {
        VitrineError::check_range("intensity", self.intensity as f64, 0.0, MAX_INTENSITY as f64)?;
        VitrineError::check_range(
            "shadow_intensity",
            self.shadow_intensity as f64,
            0.0,
            MAX_SHADOW_INTENSITY as f64,
        )?;
        VitrineError::check_range("angle", self.angle as f64, 0.0, PI)?;
        VitrineError::check_range("penumbra", self.penumbra as f64, 0.0, 1.0)?;
        VitrineError::check_range("distance", self.distance as f64, 0.0, MAX_DISTANCE as f64)?;
        if !self.position.iter().all(|v| v.is_finite()) {
            return Err(VitrineError::Validation(format!(
                "light {} has a non-finite position",
                self.id
            )));
        }
        Ok(())
    }
}

/// A single change to one light
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightUpdate {
    Color(Color),
    Intensity(f32),
    Position([f32; 3]),
    ShadowIntensity(f32),
    /// Spot only, radians 0..=π
    Angle(f32),
    /// Spot only, 0..=1
    Penumbra(f32),
    /// Point and spot, 0..=100
    Distance(f32),
}

impl LightUpdate {
    /// Parse a `key=value` edit: `color`, `intensity`, `position` (`x,y,z`),
    /// `shadow_intensity`, `angle` (radians), `penumbra`, `distance`.
    pub fn parse(key: &str, value: &str) -> Result<Self> {
        let normalized: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        let value = value.trim();
        Ok(match normalized.as_str() {
            "color" => LightUpdate::Color(Color::parse_hex(value)?),
            "intensity" => LightUpdate::Intensity(parse_f32(key, value)?),
            "position" => LightUpdate::Position(parse_vec3(key, value)?.to_array()),
            "shadowintensity" => LightUpdate::ShadowIntensity(parse_f32(key, value)?),
            "angle" => LightUpdate::Angle(parse_f32(key, value)?),
            "penumbra" => LightUpdate::Penumbra(parse_f32(key, value)?),
            "distance" => LightUpdate::Distance(parse_f32(key, value)?),
            _ => {
                return Err(VitrineError::InvalidEnumValue {
                    value: key.to_string(),
                    allowed: [
                        "color",
                        "intensity",
                        "position",
                        "shadow_intensity",
                        "angle",
                        "penumbra",
                        "distance",
                    ]
                    .iter()
                    .map(|k| k.to_string())
                    .collect(),
                })
            }
        })
    }
}

/// The scene's lights plus global shadow/exposure settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightRig {
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default = "default_true")]
    pub shadows_enabled: bool,
    #[serde(default = "default_exposure")]
    pub exposure: f32,
    #[serde(skip)]
    next_id: u32,
}

fn default_true() -> bool {
    true
}

fn default_exposure() -> f32 {
    1.0
}

impl Default for LightRig {
    /// One white directional light at (0, 0, 5)
    fn default() -> Self {
        let mut rig = Self {
            lights: Vec::new(),
            shadows_enabled: true,
            exposure: 1.0,
            next_id: 1,
        };
        rig.add(LightKind::Directional);
        rig
    }
}

impl LightRig {
    /// A rig without any light
    pub fn empty() -> Self {
        Self {
            lights: Vec::new(),
            shadows_enabled: true,
            exposure: 1.0,
            next_id: 1,
        }
    }

    pub fn add(&mut self, kind: LightKind) -> LightId {
        let id = LightId(self.next_id);
        self.next_id += 1;
        self.lights.push(Light::new(id, kind));
        log::debug!("Added {:?} light {}", kind, id);
        id
    }

    pub fn get(&self, id: LightId) -> Option<&Light> {
        self.lights.iter().find(|l| l.id == id)
    }

    pub fn update(&mut self, id: LightId, update: LightUpdate) -> Result<()> {
        let light = self
            .lights
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| VitrineError::NodeNotFound(format!("light {}", id)))?;

        match update {
            LightUpdate::Color(color) => light.color = color,
            LightUpdate::Intensity(v) => {
                VitrineError::check_range("intensity", v as f64, 0.0, MAX_INTENSITY as f64)?;
                light.intensity = v;
            }
            LightUpdate::Position(p) => {
                if !p.iter().all(|v| v.is_finite()) {
                    return Err(VitrineError::Validation(
                        "light position must be finite".to_string(),
                    ));
                }
                light.position = p;
            }
            LightUpdate::ShadowIntensity(v) => {
                VitrineError::check_range(
                    "shadow_intensity",
                    v as f64,
                    0.0,
                    MAX_SHADOW_INTENSITY as f64,
                )?;
                light.shadow_intensity = v;
            }
            LightUpdate::Angle(v) => {
                require_kind(light, &[LightKind::Spot], "angle")?;
                VitrineError::check_range("angle", v as f64, 0.0, PI)?;
                light.angle = v;
            }
            LightUpdate::Penumbra(v) => {
                require_kind(light, &[LightKind::Spot], "penumbra")?;
                VitrineError::check_range("penumbra", v as f64, 0.0, 1.0)?;
                light.penumbra = v;
            }
            LightUpdate::Distance(v) => {
                require_kind(light, &[LightKind::Point, LightKind::Spot], "distance")?;
                VitrineError::check_range("distance", v as f64, 0.0, MAX_DISTANCE as f64)?;
                light.distance = v;
            }
        }
        Ok(())
    }

    pub fn remove(&mut self, id: LightId) -> Option<Light> {
        let index = self.lights.iter().position(|l| l.id == id)?;
        Some(self.lights.remove(index))
    }

    /// Back to the default rig; shadow and exposure settings are kept
    pub fn reset(&mut self) {
        self.lights.clear();
        self.add(LightKind::Directional);
    }

    pub fn toggle_shadows(&mut self) -> bool {
        self.shadows_enabled = !self.shadows_enabled;
        self.shadows_enabled
    }

    pub fn set_exposure(&mut self, exposure: f32) -> Result<()> {
        VitrineError::check_range("exposure", exposure as f64, 0.0, MAX_EXPOSURE as f64)?;
        self.exposure = exposure;
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut rig: LightRig = toml::from_str(s)?;
        for light in &rig.lights {
            light.validate()?;
        }
        VitrineError::check_range("exposure", rig.exposure as f64, 0.0, MAX_EXPOSURE as f64)?;
        rig.next_id = rig.lights.iter().map(|l| l.id.0).max().unwrap_or(0) + 1;
        Ok(rig)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

fn require_kind(light: &Light, kinds: &[LightKind], field: &str) -> Result<()> {
    if kinds.contains(&light.kind) {
        Ok(())
    } else {
        Err(VitrineError::Validation(format!(
            "{} does not apply to {:?} light {}",
            field, light.kind, light.id
        )))
    }
}

mod hex_color {
    use serde::{Deserialize, Deserializer, Serializer};
    use vitrine_core::Color;

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&color.to_hex_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}
