//! Scene graph to glTF 2.0 / GLB

use crate::document::{
    Accessor, Animation, AnimationSampler, Buffer, BufferView, Channel, ChannelTarget, Document,
    Image, Material as GltfMaterial, Mesh, Node, PbrMetallicRoughness, Primitive, Scene, Texture,
    TextureInfo, COMPONENT_FLOAT, COMPONENT_UNSIGNED_INT, TARGET_ARRAY_BUFFER,
    TARGET_ELEMENT_ARRAY_BUFFER,
};
use crate::glb::{pad_to_four, write_glb};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;
use std::sync::Arc;
use vitrine_animation::{AnimationClip, AnimationTrack, Interpolation, TrackProperty};
use vitrine_core::{ContentHash, Result, Transform, VitrineError};
use vitrine_scene::{
    Geometry, Material, MaterialExtras, NodeExtras, SceneNode, Side, Texture as SceneTexture,
};

/// Metalness/roughness written for kinds without a PBR model
const NON_PBR_FACTOR: f32 = 0.5;

/// Exporter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// GLB when true, pretty-printed glTF JSON otherwise
    pub binary: bool,
    pub embed_images: bool,
    pub only_visible: bool,
    /// Longest texture edge in pixels
    pub max_texture_size: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            binary: true,
            embed_images: true,
            only_visible: false,
            max_texture_size: 4096,
        }
    }
}

/// A track that was left out because its node is not in the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedTrack {
    pub clip: String,
    pub node_name: String,
    pub property: TrackProperty,
}

/// What ended up in the document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    pub node_count: usize,
    pub mesh_count: usize,
    pub material_count: usize,
    pub texture_count: usize,
    pub animation_count: usize,
    pub dropped_tracks: Vec<DroppedTrack>,
    /// Clips with no track left after dropping
    pub dropped_clips: Vec<String>,
}

/// Serialized document plus its report
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub bytes: Vec<u8>,
    pub binary: bool,
    pub hash: ContentHash,
    pub report: ExportReport,
}

impl ExportOutput {
    pub fn extension(&self) -> &'static str {
        if self.binary {
            "glb"
        } else {
            "gltf"
        }
    }

    pub fn mime_type(&self) -> &'static str {
        if self.binary {
            "model/gltf-binary"
        } else {
            "model/gltf+json"
        }
    }

    pub fn default_file_name(&self) -> String {
        format!("Exported.{}", self.extension())
    }
}

/// Export `root` and the clips that animate it.
///
/// Works on a scratch copy: the caller's tree is never modified. The copy's
/// root transform is reset to identity.
pub fn export(
    root: &SceneNode,
    clips: &[AnimationClip],
    options: &ExportOptions,
) -> Result<ExportOutput> {
    let mut scratch = root.clone();
    scratch.transform = Transform::IDENTITY;
    if options.only_visible {
        scratch.retain_visible();
    }

    let mut report = ExportReport::default();
    let clips = retain_resolvable(&scratch, clips, &mut report);

    let mut writer = DocumentWriter::new(options);
    let root_index = writer.write_node(&scratch)?;
    writer.doc.scenes.push(Scene {
        name: scratch.name.clone(),
        nodes: vec![root_index],
    });
    for clip in &clips {
        writer.write_clip(clip);
    }

    report.node_count = writer.doc.nodes.len();
    report.mesh_count = writer.doc.meshes.len();
    report.material_count = writer.doc.materials.len();
    report.texture_count = writer.doc.textures.len();
    report.animation_count = writer.doc.animations.len();

    let bytes = writer.finish()?;
    let hash = ContentHash::from_bytes(&bytes);
    log::info!(
        "Exported '{}' as {} ({} bytes, {} nodes, {} animations)",
        root.name,
        if options.binary { "GLB" } else { "glTF" },
        bytes.len(),
        report.node_count,
        report.animation_count
    );

    Ok(ExportOutput {
        bytes,
        binary: options.binary,
        hash,
        report,
    })
}

/// Keep only tracks whose node survives in `scratch`, and clips that still
/// have tracks.
fn retain_resolvable(
    scratch: &SceneNode,
    clips: &[AnimationClip],
    report: &mut ExportReport,
) -> Vec<AnimationClip> {
    let names: BTreeSet<&str> = scratch.names().into_iter().collect();
    let mut kept = Vec::with_capacity(clips.len());
    for clip in clips {
        let mut clip = clip.clone();
        clip.tracks.retain(|track| {
            if names.contains(track.node_name.as_str()) {
                return true;
            }
            log::warn!(
                "Dropping {} track of '{}' in clip '{}': node is not exported",
                track.property.path(),
                track.node_name,
                clip.name
            );
            report.dropped_tracks.push(DroppedTrack {
                clip: clip.name.clone(),
                node_name: track.node_name.clone(),
                property: track.property,
            });
            false
        });
        clip.tracks.retain(|track| !track.keyframes.is_empty());
        if clip.tracks.is_empty() {
            log::warn!("Dropping clip '{}': no tracks left", clip.name);
            report.dropped_clips.push(clip.name);
        } else {
            kept.push(clip);
        }
    }
    kept
}

struct DocumentWriter<'a> {
    options: &'a ExportOptions,
    doc: Document,
    bin: Vec<u8>,
    /// First node in pre-order with each name
    node_indices: BTreeMap<String, u32>,
    materials: Vec<Material>,
    textures: Vec<Arc<SceneTexture>>,
}

impl<'a> DocumentWriter<'a> {
    fn new(options: &'a ExportOptions) -> Self {
        Self {
            options,
            doc: Document::default(),
            bin: Vec::new(),
            node_indices: BTreeMap::new(),
            materials: Vec::new(),
            textures: Vec::new(),
        }
    }

    fn write_node(&mut self, node: &SceneNode) -> Result<u32> {
        let index = self.doc.nodes.len() as u32;
        let t = &node.transform;
        let position = t.position.to_array();
        let scale = t.scale.to_array();
        self.doc.nodes.push(Node {
            name: node.name.clone(),
            translation: (position != [0.0; 3]).then_some(position),
            rotation: (t.rotation != Transform::IDENTITY.rotation).then_some(t.rotation),
            scale: (scale != [1.0; 3]).then_some(scale),
            extras: (!node.visible).then_some(NodeExtras { visible: false }),
            ..Default::default()
        });
        self.node_indices.entry(node.name.clone()).or_insert(index);

        let mesh = match &node.geometry {
            Some(geometry) => self.write_mesh(node, geometry)?,
            None => None,
        };

        let mut children = Vec::with_capacity(node.children.len());
        for child in &node.children {
            children.push(self.write_node(child)?);
        }

        let out = &mut self.doc.nodes[index as usize];
        out.mesh = mesh;
        out.children = children;
        Ok(index)
    }

    fn write_mesh(&mut self, node: &SceneNode, geometry: &Geometry) -> Result<Option<u32>> {
        let data = geometry.tessellate();
        let count = data.vertex_count();
        if count == 0 {
            log::debug!("Skipping empty geometry on '{}'", node.name);
            return Ok(None);
        }

        let mut attributes = BTreeMap::new();
        let positions: Vec<f32> = data.positions.iter().flatten().copied().collect();
        attributes.insert(
            "POSITION".to_string(),
            self.push_floats(&positions, 3, "VEC3", Some(TARGET_ARRAY_BUFFER), true),
        );
        if data.normals.len() == count {
            let normals: Vec<f32> = data.normals.iter().flatten().copied().collect();
            attributes.insert(
                "NORMAL".to_string(),
                self.push_floats(&normals, 3, "VEC3", Some(TARGET_ARRAY_BUFFER), false),
            );
        }
        if data.uvs.len() == count {
            let uvs: Vec<f32> = data.uvs.iter().flatten().copied().collect();
            attributes.insert(
                "TEXCOORD_0".to_string(),
                self.push_floats(&uvs, 2, "VEC2", Some(TARGET_ARRAY_BUFFER), false),
            );
        }
        if let Some(colors) = data.colors.as_ref().filter(|c| c.len() == count) {
            let colors: Vec<f32> = colors.iter().flatten().copied().collect();
            attributes.insert(
                "COLOR_0".to_string(),
                self.push_floats(&colors, 4, "VEC4", Some(TARGET_ARRAY_BUFFER), false),
            );
        }

        let indices = if data.indices.is_empty() {
            None
        } else {
            Some(self.push_indices(&data.indices))
        };

        let material = match &node.material {
            Some(material) => Some(self.write_material(material)?),
            None => None,
        };

        let index = self.doc.meshes.len() as u32;
        self.doc.meshes.push(Mesh {
            name: node.name.clone(),
            primitives: vec![Primitive {
                attributes,
                indices,
                material,
            }],
        });
        Ok(Some(index))
    }

    fn write_material(&mut self, material: &Material) -> Result<u32> {
        if let Some(existing) = self.materials.iter().position(|m| m == material) {
            return Ok(existing as u32);
        }

        let props = &material.props;
        let kind = material.kind();
        let (roughness, metalness) = material
            .shading
            .pbr()
            .unwrap_or((NON_PBR_FACTOR, NON_PBR_FACTOR));
        let [r, g, b] = props.color.rgb();
        let alpha = if props.transparent { props.opacity } else { 1.0 };

        let base_color_texture = match &props.map {
            Some(map) if self.options.embed_images && kind.supports_map() => Some(TextureInfo {
                index: self.write_texture(map)?,
            }),
            _ => None,
        };

        let index = self.doc.materials.len() as u32;
        self.doc.materials.push(GltfMaterial {
            name: material.name.clone(),
            pbr_metallic_roughness: PbrMetallicRoughness {
                base_color_factor: [r, g, b, alpha],
                base_color_texture,
                metallic_factor: metalness,
                roughness_factor: roughness,
            },
            alpha_mode: props.transparent.then(|| "BLEND".to_string()),
            double_sided: props.side == Side::Double,
            extras: MaterialExtras::from_material(material),
        });
        self.materials.push(material.clone());
        Ok(index)
    }

    fn write_texture(&mut self, texture: &Arc<SceneTexture>) -> Result<u32> {
        if let Some(existing) = self.textures.iter().position(|t| Arc::ptr_eq(t, texture)) {
            return Ok(existing as u32);
        }

        let png = encode_png(texture, self.options.max_texture_size)?;
        let view = self.push_view(&png, None);
        let image = self.doc.images.len() as u32;
        self.doc.images.push(Image {
            name: texture.name.clone(),
            buffer_view: view,
            mime_type: "image/png".to_string(),
        });
        let index = self.doc.textures.len() as u32;
        self.doc.textures.push(Texture { source: image });
        self.textures.push(Arc::clone(texture));
        Ok(index)
    }

    fn write_clip(&mut self, clip: &AnimationClip) {
        let mut animation = Animation {
            name: clip.name.clone(),
            channels: Vec::with_capacity(clip.tracks.len()),
            samplers: Vec::with_capacity(clip.tracks.len()),
        };
        for track in &clip.tracks {
            let Some(&node) = self.node_indices.get(&track.node_name) else {
                continue;
            };
            let times: Vec<f32> = track.keyframes.iter().map(|k| k.time as f32).collect();
            let input = self.push_floats(&times, 1, "SCALAR", None, true);
            let values = track_output(track);
            let kind = match track.property.width() {
                4 => "VEC4",
                _ => "VEC3",
            };
            let output = self.push_floats(&values, track.property.width(), kind, None, false);

            animation.channels.push(Channel {
                sampler: animation.samplers.len() as u32,
                target: ChannelTarget {
                    node,
                    path: track.property.path().to_string(),
                },
            });
            animation.samplers.push(AnimationSampler {
                input,
                output,
                interpolation: track.interpolation.gltf_name().to_string(),
            });
        }
        if !animation.channels.is_empty() {
            self.doc.animations.push(animation);
        }
    }

    fn push_view(&mut self, bytes: &[u8], target: Option<u32>) -> u32 {
        pad_to_four(&mut self.bin, 0);
        let index = self.doc.buffer_views.len() as u32;
        self.doc.buffer_views.push(BufferView {
            buffer: 0,
            byte_offset: self.bin.len() as u32,
            byte_length: bytes.len() as u32,
            target,
        });
        self.bin.extend_from_slice(bytes);
        index
    }

    fn push_floats(
        &mut self,
        values: &[f32],
        components: usize,
        kind: &str,
        target: Option<u32>,
        with_bounds: bool,
    ) -> u32 {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let view = self.push_view(&bytes, target);
        let (min, max) = if with_bounds {
            let (min, max) = component_bounds(values, components);
            (Some(min), Some(max))
        } else {
            (None, None)
        };
        let index = self.doc.accessors.len() as u32;
        self.doc.accessors.push(Accessor {
            buffer_view: view,
            component_type: COMPONENT_FLOAT,
            count: (values.len() / components) as u32,
            kind: kind.to_string(),
            min,
            max,
        });
        index
    }

    fn push_indices(&mut self, indices: &[u32]) -> u32 {
        let bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
        let view = self.push_view(&bytes, Some(TARGET_ELEMENT_ARRAY_BUFFER));
        let index = self.doc.accessors.len() as u32;
        self.doc.accessors.push(Accessor {
            buffer_view: view,
            component_type: COMPONENT_UNSIGNED_INT,
            count: indices.len() as u32,
            kind: "SCALAR".to_string(),
            min: None,
            max: None,
        });
        index
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        pad_to_four(&mut self.bin, 0);
        if self.options.binary {
            if !self.bin.is_empty() {
                self.doc.buffers.push(Buffer {
                    byte_length: self.bin.len() as u32,
                    uri: None,
                });
            }
            let json = serde_json::to_vec(&self.doc)
                .map_err(|e| VitrineError::Serialization(e.to_string()))?;
            Ok(write_glb(&json, &self.bin))
        } else {
            if !self.bin.is_empty() {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bin);
                self.doc.buffers.push(Buffer {
                    byte_length: self.bin.len() as u32,
                    uri: Some(format!("data:application/octet-stream;base64,{}", encoded)),
                });
            }
            serde_json::to_vec_pretty(&self.doc)
                .map_err(|e| VitrineError::Serialization(e.to_string()))
        }
    }
}

/// Sampler output values; cubic splines interleave in-tangent, value and
/// out-tangent per keyframe.
fn track_output(track: &AnimationTrack) -> Vec<f32> {
    let width = track.property.width();
    let mut out = Vec::with_capacity(track.keyframes.len() * width * 3);
    for key in &track.keyframes {
        if track.interpolation == Interpolation::CubicSpline {
            push_fitted(&mut out, key.in_tangent.as_deref().unwrap_or(&[]), width, 0.0);
            push_fitted(&mut out, &key.value, width, 0.0);
            push_fitted(&mut out, key.out_tangent.as_deref().unwrap_or(&[]), width, 0.0);
        } else {
            push_fitted(&mut out, &key.value, width, 0.0);
        }
    }
    out
}

fn push_fitted(out: &mut Vec<f32>, values: &[f32], width: usize, fill: f32) {
    out.extend((0..width).map(|i| values.get(i).copied().unwrap_or(fill)));
}

fn component_bounds(values: &[f32], components: usize) -> (Vec<f32>, Vec<f32>) {
    let mut min = vec![f32::INFINITY; components];
    let mut max = vec![f32::NEG_INFINITY; components];
    for chunk in values.chunks_exact(components) {
        for (i, v) in chunk.iter().enumerate() {
            min[i] = min[i].min(*v);
            max[i] = max[i].max(*v);
        }
    }
    (min, max)
}

/// PNG-encode a texture, downscaling so neither edge exceeds `max_size`
fn encode_png(texture: &SceneTexture, max_size: u32) -> Result<Vec<u8>> {
    let image = image::RgbaImage::from_raw(texture.width, texture.height, texture.rgba.clone())
        .ok_or_else(|| {
            VitrineError::Serialization(format!(
                "texture '{}' has {} bytes for {}x{}",
                texture.name,
                texture.rgba.len(),
                texture.width,
                texture.height
            ))
        })?;

    let longest = texture.width.max(texture.height);
    let image = if max_size > 0 && longest > max_size {
        let scale = max_size as f32 / longest as f32;
        let width = ((texture.width as f32 * scale).round() as u32).max(1);
        let height = ((texture.height as f32 * scale).round() as u32).max(1);
        log::debug!(
            "Downscaling texture '{}' {}x{} -> {}x{}",
            texture.name,
            texture.width,
            texture.height,
            width,
            height
        );
        image::imageops::resize(&image, width, height, image::imageops::FilterType::Triangle)
    } else {
        image
    };

    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| VitrineError::Serialization(format!("PNG encode failed: {}", e)))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_animation::{synthesize, AnimationDescriptor, ClipOrigin, Keyframe};
    use vitrine_core::{Color, Vec3};
    use vitrine_import::{import_slice, ImportOptions};
    use vitrine_scene::{convert, GeometryKind, MaterialKind};

    fn sample_scene() -> SceneNode {
        SceneNode::new("Robot")
            .with_transform(Transform::IDENTITY.with_position(Vec3::new(3.0, 0.0, 0.0)))
            .with_child(
                SceneNode::new("Body")
                    .with_geometry(Geometry::primitive(GeometryKind::Box).unwrap())
                    .with_material(Material::new(MaterialKind::Standard).with_name("paint"))
                    .with_child(
                        SceneNode::new("Head")
                            .with_transform(
                                Transform::IDENTITY.with_position(Vec3::new(0.0, 1.0, 0.0)),
                            )
                            .with_geometry(Geometry::primitive(GeometryKind::Sphere).unwrap()),
                    ),
            )
    }

    fn hop(target: &str) -> AnimationClip {
        synthesize(
            "hop",
            &AnimationDescriptor::new(1.0).with_position([0.0, 1.0, 0.0]),
            target,
        )
        .unwrap()
    }

    fn json_options() -> ExportOptions {
        ExportOptions {
            binary: false,
            ..Default::default()
        }
    }

    fn parse(output: &ExportOutput) -> serde_json::Value {
        serde_json::from_slice(&output.bytes).unwrap()
    }

    #[test]
    fn repeated_exports_are_identical() {
        let scene = sample_scene();
        let clips = vec![hop("Body")];
        for options in [ExportOptions::default(), json_options()] {
            let a = export(&scene, &clips, &options).unwrap();
            let b = export(&scene, &clips, &options).unwrap();
            assert_eq!(a.bytes, b.bytes);
            assert_eq!(a.hash, b.hash);
        }
    }

    #[test]
    fn root_transform_reset_and_scene_untouched() {
        let scene = sample_scene();
        let output = export(&scene, &[], &json_options()).unwrap();
        let doc = parse(&output);

        assert!(doc["nodes"][0].get("translation").is_none());
        assert_eq!(doc["nodes"][2]["translation"], serde_json::json!([0.0, 1.0, 0.0]));
        assert_eq!(scene.transform.position, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn phong_color_lands_in_extras() {
        let mut scene = sample_scene();
        let body = &mut scene.children[0];
        let phong = convert(body.material.as_ref().unwrap(), MaterialKind::Phong);
        body.material = Some(phong.with_color(Color::parse_hex("#ff0000").unwrap()));

        let doc = parse(&export(&scene, &[], &json_options()).unwrap());
        let extras = &doc["materials"][0]["extras"];
        assert_eq!(extras["type"], "MeshPhongMaterial");
        assert_eq!(extras["color"], serde_json::json!([1.0, 0.0, 0.0]));
        assert_eq!(
            doc["materials"][0]["pbrMetallicRoughness"]["metallicFactor"],
            serde_json::json!(0.5)
        );
    }

    #[test]
    fn position_accessors_have_bounds() {
        let doc = parse(&export(&sample_scene(), &[], &json_options()).unwrap());
        let position = doc["meshes"][0]["primitives"][0]["attributes"]["POSITION"]
            .as_u64()
            .unwrap() as usize;
        let accessor = &doc["accessors"][position];
        assert_eq!(accessor["min"], serde_json::json!([-0.5, -0.5, -0.5]));
        assert_eq!(accessor["max"], serde_json::json!([0.5, 0.5, 0.5]));
    }

    #[test]
    fn dangling_tracks_are_dropped_and_reported() {
        let ghost = hop("Ghost");
        let mut mixed = hop("Body");
        mixed.name = "mixed".into();
        mixed.tracks.push(AnimationTrack {
            node_name: "Ghost".into(),
            property: TrackProperty::Scale,
            interpolation: Interpolation::Linear,
            keyframes: vec![Keyframe::new(0.0, vec![1.0, 1.0, 1.0])],
        });

        let output = export(&sample_scene(), &[ghost, mixed], &json_options()).unwrap();
        let report = &output.report;
        assert_eq!(report.dropped_tracks.len(), 4);
        assert!(report.dropped_tracks.iter().all(|t| t.node_name == "Ghost"));
        assert_eq!(report.dropped_clips, vec!["hop".to_string()]);
        assert_eq!(report.animation_count, 1);

        let doc = parse(&output);
        assert_eq!(doc["animations"][0]["name"], "mixed");
        assert_eq!(doc["animations"][0]["channels"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn only_visible_skips_hidden_subtrees() {
        let mut scene = sample_scene();
        scene.children[0].children[0].visible = false;

        let all = export(&scene, &[hop("Head")], &json_options()).unwrap();
        assert_eq!(all.report.node_count, 3);
        let doc = parse(&all);
        assert_eq!(doc["nodes"][2]["extras"]["visible"], false);

        let visible = export(
            &scene,
            &[hop("Head")],
            &ExportOptions {
                only_visible: true,
                ..json_options()
            },
        )
        .unwrap();
        assert_eq!(visible.report.node_count, 2);
        assert_eq!(visible.report.dropped_clips, vec!["hop".to_string()]);
    }

    #[test]
    fn glb_round_trips_through_import() {
        let scene = sample_scene();
        let mut walk = hop("Body");
        walk.origin = ClipOrigin::Embedded;
        let output = export(&scene, &[walk], &ExportOptions::default()).unwrap();
        assert_eq!(output.extension(), "glb");
        assert_eq!(&output.bytes[0..4], b"glTF");

        let imported =
            import_slice("robot", &output.bytes, None, &ImportOptions::default()).unwrap();
        assert_eq!(imported.root.names(), scene.names());
        assert!(imported.root.transform.is_identity());
        assert_eq!(imported.clip_names(), vec!["hop"]);
        assert_eq!(imported.clips[0].channels.len(), 3);
    }

    #[test]
    fn json_round_trip_restores_material_kind() {
        let mut scene = sample_scene();
        let body = &mut scene.children[0];
        body.material = Some(convert(body.material.as_ref().unwrap(), MaterialKind::Toon));
        body.visible = false;

        let output = export(&scene, &[], &json_options()).unwrap();
        assert_eq!(output.mime_type(), "model/gltf+json");
        let imported =
            import_slice("robot", &output.bytes, None, &ImportOptions::default()).unwrap();
        let body = imported.root.find_by_name("Body").unwrap();
        assert_eq!(body.material.as_ref().unwrap().kind(), MaterialKind::Toon);
        assert!(!body.visible);
    }

    #[test]
    fn textures_are_downscaled_and_optional() {
        let texture = Arc::new(SceneTexture {
            name: "checker".into(),
            width: 4,
            height: 2,
            rgba: vec![255; 4 * 2 * 4],
        });
        let mut scene = sample_scene();
        scene.children[0].material.as_mut().unwrap().props.map = Some(texture);

        let output = export(
            &scene,
            &[],
            &ExportOptions {
                max_texture_size: 2,
                ..json_options()
            },
        )
        .unwrap();
        assert_eq!(output.report.texture_count, 1);
        let doc = parse(&output);
        let uri = doc["buffers"][0]["uri"].as_str().unwrap();
        let bin = base64::engine::general_purpose::STANDARD
            .decode(uri.trim_start_matches("data:application/octet-stream;base64,"))
            .unwrap();
        let view = &doc["bufferViews"][doc["images"][0]["bufferView"].as_u64().unwrap() as usize];
        let start = view["byteOffset"].as_u64().unwrap() as usize;
        let end = start + view["byteLength"].as_u64().unwrap() as usize;
        let png = image::load_from_memory(&bin[start..end]).unwrap();
        assert_eq!((png.width(), png.height()), (2, 1));

        let without = export(
            &scene,
            &[],
            &ExportOptions {
                embed_images: false,
                ..json_options()
            },
        )
        .unwrap();
        assert_eq!(without.report.texture_count, 0);
        assert!(parse(&without).get("images").is_none());
    }

    #[test]
    fn shared_materials_are_written_once() {
        let material = Material::new(MaterialKind::Lambert);
        let scene = SceneNode::new("pair")
            .with_child(
                SceneNode::new("a")
                    .with_geometry(Geometry::primitive(GeometryKind::Cone).unwrap())
                    .with_material(material.clone()),
            )
            .with_child(
                SceneNode::new("b")
                    .with_geometry(Geometry::primitive(GeometryKind::Cone).unwrap())
                    .with_material(material),
            );
        let output = export(&scene, &[], &json_options()).unwrap();
        assert_eq!(output.report.mesh_count, 2);
        assert_eq!(output.report.material_count, 1);
    }
}
