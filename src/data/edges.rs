use std::collections::BTreeMap;

use bevy::{asset::RenderAssetUsages, math::Vec3};
use bevy_render::mesh::{Mesh, PrimitiveTopology, VertexAttributeValues};

/// Vertices closer than this are treated as the same point when matching
/// edges between triangles.
const WELD_PRECISION: f32 = 1e4;

type VertexKey = [i64; 3];

fn vertex_key(v: Vec3) -> VertexKey {
    [
        (v.x * WELD_PRECISION).round() as i64,
        (v.y * WELD_PRECISION).round() as i64,
        (v.z * WELD_PRECISION).round() as i64,
    ]
}

/// First triangle seen for an edge, waiting for its neighbour.
struct OpenEdge {
    from: Vec3,
    to: Vec3,
    normal: Vec3,
}

/// Extracts the feature edges of a triangle mesh.
///
/// An edge is kept when the two triangles sharing it have normals more than
/// `threshold_degrees` apart, or when only one triangle uses it. Coplanar
/// diagonals (the seam between the two triangles of a box face) are dropped.
///
/// Meshes that are not triangle lists, or have no `Float32x3` positions,
/// produce no edges.
pub fn edge_segments(mesh: &Mesh, threshold_degrees: f32) -> Vec<[Vec3; 2]> {
    if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
        return Vec::new();
    }
    let Some(VertexAttributeValues::Float32x3(positions)) = mesh.attribute(Mesh::ATTRIBUTE_POSITION)
    else {
        return Vec::new();
    };

    let indices: Vec<usize> = match mesh.indices() {
        Some(indices) => indices.iter().collect(),
        None => (0..positions.len()).collect(),
    };

    let threshold_dot = threshold_degrees.to_radians().cos();
    let mut open: BTreeMap<(VertexKey, VertexKey), OpenEdge> = BTreeMap::new();
    let mut segments = Vec::new();

    for triangle in indices.chunks_exact(3) {
        let Some(corners) = triangle
            .iter()
            .map(|&i| positions.get(i).map(|p| Vec3::from_array(*p)))
            .collect::<Option<Vec<Vec3>>>()
        else {
            continue;
        };

        let keys = [
            vertex_key(corners[0]),
            vertex_key(corners[1]),
            vertex_key(corners[2]),
        ];
        // Degenerate once welded
        if keys[0] == keys[1] || keys[1] == keys[2] || keys[2] == keys[0] {
            continue;
        }
        let Some(normal) = (corners[1] - corners[0])
            .cross(corners[2] - corners[0])
            .try_normalize()
        else {
            continue;
        };

        for j in 0..3 {
            let (a, b) = (j, (j + 1) % 3);
            let key = if keys[a] < keys[b] {
                (keys[a], keys[b])
            } else {
                (keys[b], keys[a])
            };

            match open.remove(&key) {
                Some(neighbour) => {
                    if normal.dot(neighbour.normal) <= threshold_dot {
                        segments.push([neighbour.from, neighbour.to]);
                    }
                }
                None => {
                    open.insert(
                        key,
                        OpenEdge {
                            from: corners[a],
                            to: corners[b],
                            normal,
                        },
                    );
                }
            }
        }
    }

    // Edges used by a single triangle outline the mesh
    segments.extend(open.into_values().map(|edge| [edge.from, edge.to]));
    segments
}

/// Builds a line-list mesh outlining the feature edges of `mesh`.
pub fn edges_mesh(mesh: &Mesh, threshold_degrees: f32) -> Mesh {
    let positions: Vec<[f32; 3]> = edge_segments(mesh, threshold_degrees)
        .into_iter()
        .flat_map(|[from, to]| [from.to_array(), to.to_array()])
        .collect();

    Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
}
