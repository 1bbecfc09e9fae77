//! Node geometry: imported meshes and parametric primitives

use glam::Vec3 as GVec3;
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use vitrine_core::{Result, VitrineError};

/// Triangle mesh vertex data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// Per-vertex RGBA colors, when the asset provides them
    pub colors: Option<Vec<[f32; 4]>>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        if self.indices.is_empty() {
            self.positions.len() / 3
        } else {
            self.indices.len() / 3
        }
    }

    /// Axis-aligned bounds of the positions as (min, max)
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.positions.first()?;
        let mut min = first;
        let mut max = first;
        for p in self.positions.iter().skip(1) {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        Some((min, max))
    }
}

/// Geometry type as picked in the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Mesh,
    Box,
    Sphere,
    Cone,
}

impl GeometryKind {
    pub fn type_name(self) -> &'static str {
        match self {
            GeometryKind::Mesh => "BufferGeometry",
            GeometryKind::Box => "BoxGeometry",
            GeometryKind::Sphere => "SphereGeometry",
            GeometryKind::Cone => "ConeGeometry",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for GeometryKind {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boxgeometry" | "box" | "cube" => Ok(GeometryKind::Box),
            "spheregeometry" | "sphere" => Ok(GeometryKind::Sphere),
            "conegeometry" | "cone" => Ok(GeometryKind::Cone),
            "buffergeometry" | "mesh" => Ok(GeometryKind::Mesh),
            _ => Err(VitrineError::Validation(format!(
                "unknown geometry type '{}' (expected BoxGeometry, SphereGeometry or ConeGeometry)",
                s
            ))),
        }
    }
}

/// Geometry attached to a scene node
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Vertex data decoded from an asset
    Mesh(Arc<MeshData>),
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Cone {
        radius: f32,
        height: f32,
        radial_segments: u32,
    },
}

impl Geometry {
    /// A primitive with the editor's default dimensions.
    ///
    /// `GeometryKind::Mesh` has no parametric form and is rejected.
    pub fn primitive(kind: GeometryKind) -> Result<Self> {
        match kind {
            GeometryKind::Box => Ok(Geometry::Box {
                width: 1.0,
                height: 1.0,
                depth: 1.0,
            }),
            GeometryKind::Sphere => Ok(Geometry::Sphere {
                radius: 1.0,
                width_segments: 32,
                height_segments: 16,
            }),
            GeometryKind::Cone => Ok(Geometry::Cone {
                radius: 1.0,
                height: 1.0,
                radial_segments: 32,
            }),
            GeometryKind::Mesh => Err(VitrineError::Validation(
                "a mesh geometry cannot be created from the editor".to_string(),
            )),
        }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Mesh(_) => GeometryKind::Mesh,
            Geometry::Box { .. } => GeometryKind::Box,
            Geometry::Sphere { .. } => GeometryKind::Sphere,
            Geometry::Cone { .. } => GeometryKind::Cone,
        }
    }

    /// Triangulated vertex data for this geometry
    pub fn tessellate(&self) -> Arc<MeshData> {
        match *self {
            Geometry::Mesh(ref data) => Arc::clone(data),
            Geometry::Box {
                width,
                height,
                depth,
            } => Arc::new(box_mesh(width, height, depth)),
            Geometry::Sphere {
                radius,
                width_segments,
                height_segments,
            } => Arc::new(sphere_mesh(
                radius,
                width_segments.max(3),
                height_segments.max(2),
            )),
            Geometry::Cone {
                radius,
                height,
                radial_segments,
            } => Arc::new(cone_mesh(radius, height, radial_segments.max(3))),
        }
    }
}

fn box_mesh(width: f32, height: f32, depth: f32) -> MeshData {
    let half = GVec3::new(width, height, depth) * 0.5;
    // (normal, u, v) with u x v == normal so quads wind counter-clockwise
    let faces = [
        (GVec3::X, GVec3::NEG_Z, GVec3::Y),
        (GVec3::NEG_X, GVec3::Z, GVec3::Y),
        (GVec3::Y, GVec3::X, GVec3::NEG_Z),
        (GVec3::NEG_Y, GVec3::X, GVec3::Z),
        (GVec3::Z, GVec3::X, GVec3::Y),
        (GVec3::NEG_Z, GVec3::NEG_X, GVec3::Y),
    ];

    let mut mesh = MeshData::default();
    for (normal, u, v) in faces {
        let base = mesh.positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = normal * half + u * half * su + v * half * sv;
            mesh.positions.push(p.to_array());
            mesh.normals.push(normal.to_array());
            mesh.uvs.push([(su + 1.0) * 0.5, (sv + 1.0) * 0.5]);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

fn sphere_mesh(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let row = width_segments + 1;

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let dir = GVec3::new(
                -(u * 2.0 * PI).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * 2.0 * PI).sin() * (v * PI).sin(),
            );
            mesh.positions.push((dir * radius).to_array());
            mesh.normals.push(dir.normalize_or_zero().to_array());
            mesh.uvs.push([u, 1.0 - v]);
        }
    }

    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

fn cone_mesh(radius: f32, height: f32, radial_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let half_h = height * 0.5;
    let slope = if height > 0.0 { radius / height } else { 0.0 };

    // Side: an apex/base vertex pair per segment boundary
    for i in 0..=radial_segments {
        let u = i as f32 / radial_segments as f32;
        let theta = u * 2.0 * PI;
        let (sin, cos) = theta.sin_cos();
        let normal = GVec3::new(sin, slope, cos).normalize_or_zero().to_array();

        mesh.positions.push([0.0, half_h, 0.0]);
        mesh.normals.push(normal);
        mesh.uvs.push([u, 1.0]);

        mesh.positions.push([radius * sin, -half_h, radius * cos]);
        mesh.normals.push(normal);
        mesh.uvs.push([u, 0.0]);
    }
    for i in 0..radial_segments {
        let top = i * 2;
        let bottom = top + 1;
        let next_bottom = top + 3;
        mesh.indices.extend_from_slice(&[top, bottom, next_bottom]);
    }

    // Base cap facing -Y
    let center = mesh.positions.len() as u32;
    mesh.positions.push([0.0, -half_h, 0.0]);
    mesh.normals.push([0.0, -1.0, 0.0]);
    mesh.uvs.push([0.5, 0.5]);
    for i in 0..=radial_segments {
        let theta = i as f32 / radial_segments as f32 * 2.0 * PI;
        let (sin, cos) = theta.sin_cos();
        mesh.positions.push([radius * sin, -half_h, radius * cos]);
        mesh.normals.push([0.0, -1.0, 0.0]);
        mesh.uvs.push([sin * 0.5 + 0.5, cos * 0.5 + 0.5]);
    }
    for i in 0..radial_segments {
        let ring = center + 1 + i;
        mesh.indices.extend_from_slice(&[center, ring + 1, ring]);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(mesh: &MeshData, tri: usize) -> GVec3 {
        let idx = &mesh.indices[tri * 3..tri * 3 + 3];
        let a = GVec3::from_array(mesh.positions[idx[0] as usize]);
        let b = GVec3::from_array(mesh.positions[idx[1] as usize]);
        let c = GVec3::from_array(mesh.positions[idx[2] as usize]);
        (b - a).cross(c - a).normalize_or_zero()
    }

    #[test]
    fn box_has_24_vertices_and_12_triangles() {
        let mesh = Geometry::primitive(GeometryKind::Box).unwrap().tessellate();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.bounds(), Some(([-0.5; 3], [0.5; 3])));
    }

    #[test]
    fn box_triangles_face_outward() {
        let mesh = box_mesh(2.0, 1.0, 3.0);
        for tri in 0..mesh.triangle_count() {
            let n = face_normal(&mesh, tri);
            let stored = GVec3::from_array(mesh.normals[mesh.indices[tri * 3] as usize]);
            assert!(n.dot(stored) > 0.99, "triangle {} winds inward", tri);
        }
    }

    #[test]
    fn sphere_counts_match_segments() {
        let mesh = sphere_mesh(1.0, 8, 4);
        assert_eq!(mesh.vertex_count(), 9 * 5);
        // Poles contribute one triangle per segment, middle rows two
        assert_eq!(mesh.triangle_count(), 8 + 8 * 2 * 2 + 8);
        for p in &mesh.positions {
            assert!((GVec3::from_array(*p).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn cone_base_faces_down() {
        let mesh = cone_mesh(1.0, 2.0, 6);
        let side_tris = 6;
        for tri in side_tris..mesh.triangle_count() {
            assert!(face_normal(&mesh, tri).y < -0.99);
        }
        let (min, max) = mesh.bounds().unwrap();
        assert!((min[1] + 1.0).abs() < 1e-6);
        assert!((max[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mesh_kind_has_no_primitive() {
        assert!(Geometry::primitive(GeometryKind::Mesh).is_err());
        assert_eq!("cube".parse::<GeometryKind>().unwrap(), GeometryKind::Box);
        assert!("torus".parse::<GeometryKind>().is_err());
    }
}
