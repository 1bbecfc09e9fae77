//! Material variants and kind conversion
//!
//! A material is one of eight shading kinds (the three.js mesh material
//! family) plus a property bag shared by all of them. Changing the kind of a
//! material builds a new value through [`convert`], which decides exactly
//! which fields survive.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use vitrine_core::{Color, Result, VitrineError};

/// The shading model of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Basic,
    Lambert,
    Phong,
    Standard,
    Normal,
    Physical,
    Toon,
    Matcap,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 8] = [
        MaterialKind::Basic,
        MaterialKind::Lambert,
        MaterialKind::Phong,
        MaterialKind::Standard,
        MaterialKind::Normal,
        MaterialKind::Physical,
        MaterialKind::Toon,
        MaterialKind::Matcap,
    ];

    /// The editor-facing type name, e.g. `MeshPhongMaterial`
    pub fn type_name(self) -> &'static str {
        match self {
            MaterialKind::Basic => "MeshBasicMaterial",
            MaterialKind::Lambert => "MeshLambertMaterial",
            MaterialKind::Phong => "MeshPhongMaterial",
            MaterialKind::Standard => "MeshStandardMaterial",
            MaterialKind::Normal => "MeshNormalMaterial",
            MaterialKind::Physical => "MeshPhysicalMaterial",
            MaterialKind::Toon => "MeshToonMaterial",
            MaterialKind::Matcap => "MeshMatcapMaterial",
        }
    }

    /// Normal materials shade from surface normals only.
    pub fn supports_map(self) -> bool {
        !matches!(self, MaterialKind::Normal)
    }

    pub fn supports_flat_shading(self) -> bool {
        !matches!(self, MaterialKind::Basic)
    }

    /// Physically based kinds carry roughness/metalness.
    pub fn is_pbr(self) -> bool {
        matches!(self, MaterialKind::Standard | MaterialKind::Physical)
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for MaterialKind {
    type Err = VitrineError;

    /// Accepts the full type name (`MeshPhongMaterial`) or the short form
    /// (`phong`), case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        let short = lowered
            .strip_prefix("mesh")
            .and_then(|rest| rest.strip_suffix("material"))
            .unwrap_or(&lowered);
        MaterialKind::ALL
            .into_iter()
            .find(|kind| {
                let name = kind.type_name().to_ascii_lowercase();
                name == lowered || name.trim_start_matches("mesh").trim_end_matches("material") == short
            })
            .ok_or_else(|| {
                VitrineError::Validation(format!(
                    "unknown material type '{}' (expected one of {})",
                    s,
                    MaterialKind::ALL.map(|k| k.type_name()).join(", ")
                ))
            })
    }
}

/// Kind plus the parameters only that kind understands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    Basic,
    Lambert,
    Phong {
        shininess: f32,
        specular: Color,
    },
    Standard {
        roughness: f32,
        metalness: f32,
    },
    Normal,
    Physical {
        roughness: f32,
        metalness: f32,
        clearcoat: f32,
        clearcoat_roughness: f32,
    },
    Toon,
    Matcap,
}

impl Shading {
    /// Default parameters for a kind (three.js defaults)
    pub fn default_for(kind: MaterialKind) -> Self {
        match kind {
            MaterialKind::Basic => Shading::Basic,
            MaterialKind::Lambert => Shading::Lambert,
            MaterialKind::Phong => Shading::Phong {
                shininess: 30.0,
                specular: Color::from_hex(0x111111),
            },
            MaterialKind::Standard => Shading::Standard {
                roughness: 1.0,
                metalness: 0.0,
            },
            MaterialKind::Normal => Shading::Normal,
            MaterialKind::Physical => Shading::Physical {
                roughness: 1.0,
                metalness: 0.0,
                clearcoat: 0.0,
                clearcoat_roughness: 0.0,
            },
            MaterialKind::Toon => Shading::Toon,
            MaterialKind::Matcap => Shading::Matcap,
        }
    }

    pub fn kind(&self) -> MaterialKind {
        match self {
            Shading::Basic => MaterialKind::Basic,
            Shading::Lambert => MaterialKind::Lambert,
            Shading::Phong { .. } => MaterialKind::Phong,
            Shading::Standard { .. } => MaterialKind::Standard,
            Shading::Normal => MaterialKind::Normal,
            Shading::Physical { .. } => MaterialKind::Physical,
            Shading::Toon => MaterialKind::Toon,
            Shading::Matcap => MaterialKind::Matcap,
        }
    }

    /// Roughness/metalness pair for PBR kinds
    pub fn pbr(&self) -> Option<(f32, f32)> {
        match *self {
            Shading::Standard {
                roughness,
                metalness,
            }
            | Shading::Physical {
                roughness,
                metalness,
                ..
            } => Some((roughness, metalness)),
            _ => None,
        }
    }
}

/// Which faces are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
            Side::Double => "double",
        }
    }
}

impl FromStr for Side {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" | "frontside" | "0" => Ok(Side::Front),
            "back" | "backside" | "1" => Ok(Side::Back),
            "double" | "doubleside" | "2" => Ok(Side::Double),
            other => Err(VitrineError::InvalidEnumValue {
                value: other.to_string(),
                allowed: vec!["front".into(), "back".into(), "double".into()],
            }),
        }
    }
}

/// Decoded RGBA8 image attached to a material
#[derive(Clone, PartialEq)]
pub struct Texture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Texture({} {}x{})", self.name, self.width, self.height)
    }
}

/// Properties shared by every material kind
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialProps {
    pub color: Color,
    pub wireframe: bool,
    pub transparent: bool,
    /// Only honored when `transparent` is set; 0..=1
    pub opacity: f32,
    pub depth_test: bool,
    pub depth_write: bool,
    pub alpha_hash: bool,
    pub side: Side,
    pub flat_shading: bool,
    pub vertex_colors: bool,
    pub map: Option<Arc<Texture>>,
}

impl Default for MaterialProps {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            wireframe: false,
            transparent: false,
            opacity: 1.0,
            depth_test: true,
            depth_write: true,
            alpha_hash: false,
            side: Side::Front,
            flat_shading: false,
            vertex_colors: false,
            map: None,
        }
    }
}

/// A material: shading kind plus shared properties
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub shading: Shading,
    pub props: MaterialProps,
}

impl Material {
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            name: String::new(),
            shading: Shading::default_for(kind),
            props: MaterialProps::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.props.color = color;
        self
    }

    pub fn kind(&self) -> MaterialKind {
        self.shading.kind()
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(MaterialKind::Standard)
    }
}

/// Build a material of `target` kind from `material`.
///
/// Survivors: name, color, wireframe, transparency and opacity, depth
/// test/write, alpha hash, side, vertex colors. Flat shading survives unless
/// the target is `Basic`; the color map survives unless the target is
/// `Normal`. Roughness/metalness carry over between `Standard` and
/// `Physical`; every other kind-specific parameter resets to the target's
/// defaults.
pub fn convert(material: &Material, target: MaterialKind) -> Material {
    if material.kind() == target {
        return material.clone();
    }

    let mut props = material.props.clone();
    if !target.supports_flat_shading() {
        props.flat_shading = false;
    }
    if !target.supports_map() {
        props.map = None;
    }

    let shading = match (material.shading.pbr(), target) {
        (Some((roughness, metalness)), MaterialKind::Standard) => Shading::Standard {
            roughness,
            metalness,
        },
        (Some((roughness, metalness)), MaterialKind::Physical) => Shading::Physical {
            roughness,
            metalness,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
        },
        _ => Shading::default_for(target),
    };

    Material {
        name: material.name.clone(),
        shading,
        props,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_and_short_names() {
        assert_eq!(
            "MeshPhongMaterial".parse::<MaterialKind>().unwrap(),
            MaterialKind::Phong
        );
        assert_eq!("toon".parse::<MaterialKind>().unwrap(), MaterialKind::Toon);
        assert_eq!(
            "meshmatcapmaterial".parse::<MaterialKind>().unwrap(),
            MaterialKind::Matcap
        );
    }

    #[test]
    fn parse_unknown_kind_is_validation_error() {
        let err = "MeshGlassMaterial".parse::<MaterialKind>().unwrap_err();
        assert!(matches!(err, VitrineError::Validation(_)));
    }

    #[test]
    fn type_names_round_trip() {
        for kind in MaterialKind::ALL {
            assert_eq!(kind.type_name().parse::<MaterialKind>().unwrap(), kind);
        }
    }

    #[test]
    fn convert_keeps_shared_props() {
        let mut standard = Material::new(MaterialKind::Standard).with_name("Body");
        standard.props.color = Color::RED;
        standard.props.wireframe = true;
        standard.props.transparent = true;
        standard.props.opacity = 0.4;
        standard.props.side = Side::Double;

        let phong = convert(&standard, MaterialKind::Phong);
        assert_eq!(phong.kind(), MaterialKind::Phong);
        assert_eq!(phong.name, "Body");
        assert_eq!(phong.props.color, Color::RED);
        assert!(phong.props.wireframe);
        assert!(phong.props.transparent);
        assert_eq!(phong.props.opacity, 0.4);
        assert_eq!(phong.props.side, Side::Double);
        assert_eq!(phong.shading, Shading::default_for(MaterialKind::Phong));
    }

    #[test]
    fn convert_carries_pbr_factors_between_pbr_kinds() {
        let mut standard = Material::new(MaterialKind::Standard);
        standard.shading = Shading::Standard {
            roughness: 0.3,
            metalness: 0.9,
        };
        let physical = convert(&standard, MaterialKind::Physical);
        assert_eq!(physical.shading.pbr(), Some((0.3, 0.9)));

        let lambert = convert(&physical, MaterialKind::Lambert);
        assert_eq!(lambert.shading, Shading::Lambert);
        let back = convert(&lambert, MaterialKind::Standard);
        assert_eq!(back.shading.pbr(), Some((1.0, 0.0)));
    }

    #[test]
    fn convert_drops_unsupported_fields() {
        let mut toon = Material::new(MaterialKind::Toon);
        toon.props.flat_shading = true;
        toon.props.map = Some(Arc::new(Texture {
            name: "albedo".into(),
            width: 1,
            height: 1,
            rgba: vec![255, 255, 255, 255],
        }));

        let basic = convert(&toon, MaterialKind::Basic);
        assert!(!basic.props.flat_shading);
        assert!(basic.props.map.is_some());

        let normal = convert(&toon, MaterialKind::Normal);
        assert!(normal.props.flat_shading);
        assert!(normal.props.map.is_none());
    }

    #[test]
    fn convert_to_same_kind_is_identity() {
        let mut phong = Material::new(MaterialKind::Phong);
        phong.shading = Shading::Phong {
            shininess: 80.0,
            specular: Color::WHITE,
        };
        assert_eq!(convert(&phong, MaterialKind::Phong), phong);
    }

    #[test]
    fn side_parses_three_names() {
        assert_eq!("DoubleSide".parse::<Side>().unwrap(), Side::Double);
        assert_eq!("back".parse::<Side>().unwrap(), Side::Back);
        assert!("sideways".parse::<Side>().is_err());
    }
}
