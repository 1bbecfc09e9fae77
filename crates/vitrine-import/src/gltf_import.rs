//! glTF/GLB importer

use crate::fetch::Fetch;
use crate::source::ImportSource;
use crate::types::{
    ChannelInterpolation, ChannelProperty, ImportMeta, ImportResult, ImportedKeyframe,
    ImportedNodeChannel, ImportedNodeClip,
};
use gltf::animation::util::ReadOutputs;
use image::DynamicImage;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use vitrine_core::{ContentHash, Result, Transform, Vec3, VitrineError};
use vitrine_scene::{
    Geometry, Material, MaterialExtras, MaterialKind, MeshData, NodeExtras, SceneNode, Shading,
    Side, Texture,
};

/// Where the Draco decoder lives for clients that can decode compressed meshes
pub const DEFAULT_DRACO_DECODER_URL: &str =
    "https://www.gstatic.com/draco/versioned/decoders/1.5.7/";

const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// Importer settings
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    pub draco_decoder_url: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            draco_decoder_url: DEFAULT_DRACO_DECODER_URL.to_string(),
        }
    }
}

/// Import an asset with default options
pub fn import(source: &ImportSource, fetcher: &dyn Fetch) -> Result<ImportResult> {
    import_with(source, fetcher, &ImportOptions::default())
}

/// Load the source fully into memory, then decode it
pub fn import_with(
    source: &ImportSource,
    fetcher: &dyn Fetch,
    options: &ImportOptions,
) -> Result<ImportResult> {
    let name = source.display_name();
    match source {
        ImportSource::File(path) => {
            let data = std::fs::read(path)?;
            import_slice(&name, &data, path.parent(), options)
        }
        ImportSource::Url(url) => {
            let data = fetcher.fetch(url)?;
            import_slice(&name, &data, None, options)
        }
        ImportSource::Bytes { data, .. } => import_slice(&name, data, None, options),
    }
}

/// Decode a glTF JSON or GLB container.
///
/// `base` resolves relative buffer/image URIs; without it only embedded and
/// data-URI resources load.
pub fn import_slice(
    name: &str,
    data: &[u8],
    base: Option<&Path>,
    options: &ImportOptions,
) -> Result<ImportResult> {
    let probe = gltf::Gltf::from_slice_without_validation(data)
        .map_err(|e| VitrineError::Decode(format!("Failed to parse '{}': {}", name, e)))?;
    if probe
        .document
        .extensions_required()
        .any(|ext| ext == DRACO_EXTENSION)
    {
        return Err(VitrineError::Decode(format!(
            "'{}' uses {} and needs the Draco decoder at {}",
            name, DRACO_EXTENSION, options.draco_decoder_url
        )));
    }

    let gltf = gltf::Gltf::from_slice(data)
        .map_err(|e| VitrineError::Decode(format!("Invalid glTF '{}': {}", name, e)))?;
    let document = gltf.document;
    let buffers = gltf::import_buffers(&document, base, gltf.blob)
        .map_err(|e| VitrineError::Decode(format!("Failed to load buffers: {}", e)))?;
    let images = gltf::import_images(&document, base, &buffers)
        .map_err(|e| VitrineError::Decode(format!("Failed to load images: {}", e)))?;

    let textures: Vec<Option<Arc<Texture>>> = document
        .images()
        .zip(images.iter())
        .map(|(info, data)| {
            let tex_name = info
                .name()
                .map(String::from)
                .unwrap_or_else(|| format!("image_{}", info.index()));
            decode_texture(tex_name, data).map(Arc::new)
        })
        .collect();

    let materials: Vec<Material> = document
        .materials()
        .map(|m| build_material(&m, &textures))
        .collect();

    let mut builder = NodeBuilder {
        buffers: &buffers,
        materials: &materials,
        vertex_count: 0,
        visited: BTreeSet::new(),
    };

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());
    let root = match scene {
        Some(scene) => {
            let mut tops = scene
                .nodes()
                .map(|n| builder.build(&n))
                .collect::<Result<Vec<SceneNode>>>()?;
            if tops.len() == 1 {
                tops.remove(0)
            } else {
                let group = scene.name().unwrap_or("Scene");
                let mut root = SceneNode::new(group);
                root.children = tops;
                root
            }
        }
        None => {
            log::warn!("'{}' contains no scene; importing an empty group", name);
            SceneNode::new("Scene")
        }
    };

    let clips = read_clips(&document, &buffers);

    let meta = ImportMeta {
        name: name.to_string(),
        format: if data.starts_with(b"glTF") { "glb" } else { "gltf" }.to_string(),
        hash: ContentHash::from_bytes(data).to_prefixed_hex(),
        byte_len: data.len(),
        node_count: root.node_count(),
        mesh_count: document.meshes().count(),
        vertex_count: builder.vertex_count,
        material_count: materials.len(),
        texture_count: textures.iter().filter(|t| t.is_some()).count(),
    };

    log::info!(
        "Imported '{}' ({} nodes, {} meshes, {} clips)",
        name,
        meta.node_count,
        meta.mesh_count,
        clips.len()
    );

    Ok(ImportResult { root, clips, meta })
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map(String::from)
        .unwrap_or_else(|| format!("node_{}", node.index()))
}

struct NodeBuilder<'a> {
    buffers: &'a [gltf::buffer::Data],
    materials: &'a [Material],
    vertex_count: usize,
    /// Node indices already placed in the tree
    visited: BTreeSet<usize>,
}

impl NodeBuilder<'_> {
    /// Build `node` and its subtree. A node reached twice (a cycle or a
    /// shared child) is a decode error.
    fn build(&mut self, node: &gltf::Node) -> Result<SceneNode> {
        if !self.visited.insert(node.index()) {
            return Err(VitrineError::Decode(format!(
                "node {} appears more than once in the node hierarchy",
                node.index()
            )));
        }
        let name = node_name(node);
        let (translation, rotation, scale) = node.transform().decomposed();
        let mut scene_node = SceneNode::new(name.clone()).with_transform(Transform {
            position: Vec3::from_array(translation),
            rotation,
            scale: Vec3::from_array(scale),
        });
        if let Some(extras) = parse_extras::<NodeExtras>(node.extras()) {
            scene_node.visible = extras.visible;
        }

        if let Some(mesh) = node.mesh() {
            let primitives: Vec<gltf::Primitive> = mesh.primitives().collect();
            if primitives.len() == 1 {
                let (geometry, material) = self.primitive(&primitives[0]);
                scene_node.geometry = Some(geometry);
                scene_node.material = Some(material);
            } else {
                for (i, primitive) in primitives.iter().enumerate() {
                    let (geometry, material) = self.primitive(primitive);
                    scene_node.children.push(
                        SceneNode::new(format!("{}_{}", name, i))
                            .with_geometry(geometry)
                            .with_material(material),
                    );
                }
            }
        }

        for child in node.children() {
            scene_node.children.push(self.build(&child)?);
        }
        Ok(scene_node)
    }

    fn primitive(&mut self, primitive: &gltf::Primitive) -> (Geometry, Material) {
        let buffers = self.buffers;
        let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .map(|iter| iter.collect())
            .unwrap_or_default();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|iter| iter.collect())
            .unwrap_or_default();
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|iter| iter.into_f32().collect())
            .unwrap_or_default();
        let colors: Option<Vec<[f32; 4]>> = reader
            .read_colors(0)
            .map(|iter| iter.into_rgba_f32().collect());
        let indices: Vec<u32> = reader
            .read_indices()
            .map(|iter| iter.into_u32().collect())
            .unwrap_or_default();

        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!(
                "Primitive {} uses {:?}; kept as raw vertex data",
                primitive.index(),
                primitive.mode()
            );
        }

        self.vertex_count += positions.len();

        let material = primitive
            .material()
            .index()
            .and_then(|i| self.materials.get(i))
            .cloned()
            .unwrap_or_default();

        let mesh = MeshData {
            positions,
            normals,
            uvs,
            colors,
            indices,
        };
        (Geometry::Mesh(Arc::new(mesh)), material)
    }
}

fn build_material(material: &gltf::Material, textures: &[Option<Arc<Texture>>]) -> Material {
    let name = material
        .name()
        .map(String::from)
        .unwrap_or_else(|| format!("material_{}", material.index().unwrap_or(0)));

    let pbr = material.pbr_metallic_roughness();
    let factors = (pbr.roughness_factor(), pbr.metallic_factor());

    let restored = parse_extras::<MaterialExtras>(material.extras()).and_then(|extras| {
        extras
            .to_material(&name, factors)
            .map_err(|e| log::warn!("Ignoring editor extras on material '{}': {}", name, e))
            .ok()
    });

    let mut result = match restored {
        Some(m) => m,
        None => {
            let [r, g, b, a] = pbr.base_color_factor();
            let mut m = Material::new(MaterialKind::Standard).with_name(name);
            m.shading = Shading::Standard {
                roughness: factors.0,
                metalness: factors.1,
            };
            m.props.color = vitrine_core::Color::new(r, g, b, 1.0);
            if material.alpha_mode() == gltf::material::AlphaMode::Blend {
                m.props.transparent = true;
                m.props.opacity = a;
            }
            if material.double_sided() {
                m.props.side = Side::Double;
            }
            m
        }
    };

    if result.kind().supports_map() {
        result.props.map = pbr
            .base_color_texture()
            .and_then(|info| textures.get(info.texture().source().index()).cloned())
            .flatten();
    }
    result
}

fn decode_texture(name: String, data: &gltf::image::Data) -> Option<Texture> {
    use gltf::image::Format;

    let (width, height) = (data.width, data.height);
    let pixels = data.pixels.clone();
    let decoded = match data.format {
        Format::R8 => image::GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        Format::R8G8 => {
            image::GrayAlphaImage::from_raw(width, height, pixels).map(DynamicImage::ImageLumaA8)
        }
        Format::R8G8B8 => image::RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        Format::R8G8B8A8 => {
            image::RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
        }
        other => {
            log::warn!("Skipping texture '{}': unsupported pixel format {:?}", name, other);
            return None;
        }
    };
    let Some(decoded) = decoded else {
        log::warn!("Skipping texture '{}': pixel buffer size mismatch", name);
        return None;
    };
    Some(Texture {
        name,
        width,
        height,
        rgba: decoded.to_rgba8().into_raw(),
    })
}

fn parse_extras<T: DeserializeOwned>(extras: &gltf::json::Extras) -> Option<T> {
    let raw = extras.as_ref()?;
    match serde_json::from_str(raw.get()) {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("Ignoring malformed extras: {}", e);
            None
        }
    }
}

fn read_clips(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Vec<ImportedNodeClip> {
    let mut clips = Vec::new();

    for animation in document.animations() {
        let name = animation
            .name()
            .map(String::from)
            .unwrap_or_else(|| format!("animation_{}", animation.index()));
        let mut channels = Vec::new();
        let mut duration = 0.0f32;

        for channel in animation.channels() {
            let target = channel.target();
            let property = match target.property() {
                gltf::animation::Property::Translation => ChannelProperty::Translation,
                gltf::animation::Property::Rotation => ChannelProperty::Rotation,
                gltf::animation::Property::Scale => ChannelProperty::Scale,
                gltf::animation::Property::MorphTargetWeights => {
                    log::debug!("Skipping morph weight channel in '{}'", name);
                    continue;
                }
            };
            let interpolation = match channel.sampler().interpolation() {
                gltf::animation::Interpolation::Step => ChannelInterpolation::Step,
                gltf::animation::Interpolation::Linear => ChannelInterpolation::Linear,
                gltf::animation::Interpolation::CubicSpline => ChannelInterpolation::CubicSpline,
            };

            let reader = channel.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
            let Some(inputs) = reader.read_inputs() else {
                continue;
            };
            let times: Vec<f32> = inputs.collect();
            let Some(outputs) = reader.read_outputs() else {
                continue;
            };
            let values: Vec<Vec<f32>> = match outputs {
                ReadOutputs::Translations(it) => it.map(|v| v.to_vec()).collect(),
                ReadOutputs::Rotations(it) => it.into_f32().map(|v| v.to_vec()).collect(),
                ReadOutputs::Scales(it) => it.map(|v| v.to_vec()).collect(),
                ReadOutputs::MorphTargetWeights(_) => continue,
            };

            let node_name = node_name(&target.node());
            let Some(keyframes) = build_keyframes(&times, values, interpolation) else {
                log::warn!(
                    "Skipping channel on '{}' in '{}': {} times do not match the outputs",
                    node_name,
                    name,
                    times.len()
                );
                continue;
            };
            if let Some(last) = times.last() {
                duration = duration.max(*last);
            }
            channels.push(ImportedNodeChannel {
                node_name,
                property,
                interpolation,
                keyframes,
            });
        }

        if channels.is_empty() {
            log::debug!("Animation '{}' has no transform channels", name);
            continue;
        }
        clips.push(ImportedNodeClip {
            name,
            duration,
            channels,
        });
    }
    clips
}

fn build_keyframes(
    times: &[f32],
    values: Vec<Vec<f32>>,
    interpolation: ChannelInterpolation,
) -> Option<Vec<ImportedKeyframe>> {
    if interpolation == ChannelInterpolation::CubicSpline {
        if values.len() != times.len() * 3 {
            return None;
        }
        let mut values = values.into_iter();
        let mut keyframes = Vec::with_capacity(times.len());
        for &time in times {
            let in_tangent = values.next()?;
            let value = values.next()?;
            let out_tangent = values.next()?;
            keyframes.push(ImportedKeyframe {
                time,
                value,
                in_tangent: Some(in_tangent),
                out_tangent: Some(out_tangent),
            });
        }
        return Some(keyframes);
    }

    if values.len() != times.len() {
        return None;
    }
    Some(
        times
            .iter()
            .zip(values)
            .map(|(&time, value)| ImportedKeyframe {
                time,
                value,
                in_tangent: None,
                out_tangent: None,
            })
            .collect(),
    )
}
