//! Editor state carried through glTF `extras`
//!
//! glTF has no notion of Phong or toon shading, wireframe or per-node
//! visibility, so the exporter stores them in `extras` and the importer
//! reads them back.

use crate::material::{Material, MaterialKind, Shading};
use serde::{Deserialize, Serialize};
use vitrine_core::{Color, Result};

/// Material `extras` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialExtras {
    /// Editor kind, e.g. `MeshPhongMaterial`
    #[serde(rename = "type")]
    pub kind: String,
    /// Linear RGB
    pub color: [f32; 3],
    pub wireframe: bool,
    pub transparent: bool,
    pub opacity: f32,
    pub depth_test: bool,
    pub depth_write: bool,
    pub alpha_hash: bool,
    pub side: String,
    pub flat_shading: bool,
    pub vertex_colors: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shininess: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specular: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clearcoat: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clearcoat_roughness: Option<f32>,
}

impl Default for MaterialExtras {
    fn default() -> Self {
        Self::from_material(&Material::default())
    }
}

impl MaterialExtras {
    pub fn from_material(material: &Material) -> Self {
        let props = &material.props;
        let mut extras = Self {
            kind: material.kind().type_name().to_string(),
            color: props.color.rgb(),
            wireframe: props.wireframe,
            transparent: props.transparent,
            opacity: props.opacity,
            depth_test: props.depth_test,
            depth_write: props.depth_write,
            alpha_hash: props.alpha_hash,
            side: props.side.as_str().to_string(),
            flat_shading: props.flat_shading,
            vertex_colors: props.vertex_colors,
            shininess: None,
            specular: None,
            clearcoat: None,
            clearcoat_roughness: None,
        };
        match material.shading {
            Shading::Phong {
                shininess,
                specular,
            } => {
                extras.shininess = Some(shininess);
                extras.specular = Some(specular.rgb());
            }
            Shading::Physical {
                clearcoat,
                clearcoat_roughness,
                ..
            } => {
                extras.clearcoat = Some(clearcoat);
                extras.clearcoat_roughness = Some(clearcoat_roughness);
            }
            _ => {}
        }
        extras
    }

    /// Rebuild an editor material.
    ///
    /// `pbr` supplies roughness/metalness for the PBR kinds, since those live
    /// in the standard glTF material fields.
    pub fn to_material(&self, name: &str, pbr: (f32, f32)) -> Result<Material> {
        let kind: MaterialKind = self.kind.parse()?;
        let mut material = Material::new(kind).with_name(name);
        let [r, g, b] = self.color;
        let props = &mut material.props;
        props.color = Color::new(r, g, b, 1.0);
        props.wireframe = self.wireframe;
        props.transparent = self.transparent;
        props.opacity = self.opacity.clamp(0.0, 1.0);
        props.depth_test = self.depth_test;
        props.depth_write = self.depth_write;
        props.alpha_hash = self.alpha_hash;
        props.side = self.side.parse()?;
        props.flat_shading = self.flat_shading && kind.supports_flat_shading();
        props.vertex_colors = self.vertex_colors;

        let (roughness, metalness) = pbr;
        material.shading = match material.shading {
            Shading::Phong {
                shininess,
                specular,
            } => Shading::Phong {
                shininess: self.shininess.unwrap_or(shininess),
                specular: self
                    .specular
                    .map(|[r, g, b]| Color::new(r, g, b, 1.0))
                    .unwrap_or(specular),
            },
            Shading::Standard { .. } => Shading::Standard {
                roughness,
                metalness,
            },
            Shading::Physical {
                clearcoat,
                clearcoat_roughness,
                ..
            } => Shading::Physical {
                roughness,
                metalness,
                clearcoat: self.clearcoat.unwrap_or(clearcoat),
                clearcoat_roughness: self.clearcoat_roughness.unwrap_or(clearcoat_roughness),
            },
            other => other,
        };
        Ok(material)
    }
}

/// Node `extras` payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeExtras {
    pub visible: bool,
}

impl Default for NodeExtras {
    fn default() -> Self {
        Self { visible: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Side;

    #[test]
    fn phong_material_survives_extras() {
        let mut phong = Material::new(MaterialKind::Phong).with_color(Color::RED);
        phong.props.side = Side::Double;
        phong.props.wireframe = true;

        let extras = MaterialExtras::from_material(&phong);
        assert_eq!(extras.kind, "MeshPhongMaterial");
        assert_eq!(extras.color, [1.0, 0.0, 0.0]);

        let back = extras.to_material("", (0.5, 0.5)).unwrap();
        assert_eq!(back, phong);
    }

    #[test]
    fn standard_takes_pbr_factors_from_caller() {
        let extras = MaterialExtras::default();
        let material = extras.to_material("Body", (0.2, 0.7)).unwrap();
        assert_eq!(material.name, "Body");
        assert_eq!(material.shading.pbr(), Some((0.2, 0.7)));
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let extras = MaterialExtras {
            kind: "MeshGlassMaterial".into(),
            ..MaterialExtras::default()
        };
        assert!(extras.to_material("x", (1.0, 0.0)).is_err());
    }
}
