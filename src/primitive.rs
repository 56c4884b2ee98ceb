/*!
Closed triangle meshes with known topology, used to exercise the pipeline
without loading any files.
*/

use crate::{error::Error, graph::MeshGraph};
use glam::DVec3;
use std::collections::HashMap;

/// Raw surface input: point coordinates and triangle vertex indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceMesh {
    pub points: Vec<DVec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl SurfaceMesh {
    pub fn num_vertices(&self) -> usize {
        self.points.len()
    }

    pub fn num_faces(&self) -> usize {
        self.triangles.len()
    }

    /// Build the graph of this surface.
    pub fn graph(&self) -> Result<MeshGraph, Error> {
        MeshGraph::new(self.points.clone(), &self.triangles)
    }
}

/// Corners of a box, with the following numbering.
///
///  ```text
///       7-----------6
///      /|          /|
///     / |         / |
///    4-----------5  |
///    |  |        |  |
///    |  3--------|--2
///    | /         | /
///    |/          |/
///    0-----------1
///  ```
const BOX_POS: [(bool, bool, bool); 8] = [
    (false, false, false),
    (true, false, false),
    (true, true, false),
    (false, true, false),
    (false, false, true),
    (true, false, true),
    (true, true, true),
    (false, true, true),
];

/// Quad faces of a box, oriented outwards.
const BOX_IDX: [[u32; 4]; 6] = [
    [0, 3, 2, 1],
    [0, 1, 5, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 0, 4, 7],
    [4, 5, 6, 7],
];

/// Corners and quad faces of the axis aligned box spanning from `min` to `max`.
pub fn quad_box(min: DVec3, max: DVec3) -> ([DVec3; 8], [[u32; 4]; 6]) {
    let corners = BOX_POS.map(|(xf, yf, zf)| {
        DVec3::new(
            if xf { max.x } else { min.x },
            if yf { max.y } else { min.y },
            if zf { max.z } else { min.z },
        )
    });
    (corners, BOX_IDX)
}

/// Split a quad into two triangles along the diagonal from its first vertex.
pub(crate) fn split_quad([a, b, c, d]: [u32; 4]) -> [[u32; 3]; 2] {
    [[a, b, c], [a, c, d]]
}

/// Box spanning from `min` to `max`, with every side split into two
/// triangles.
pub fn box_surface(min: DVec3, max: DVec3) -> SurfaceMesh {
    let (corners, quads) = quad_box(min, max);
    SurfaceMesh {
        points: corners.to_vec(),
        triangles: quads.into_iter().flat_map(split_quad).collect(),
    }
}

/// Tetrahedron centered at the origin with a unit circumradius. The first face
/// is `(0, 1, 2)`.
pub fn tetrahedron() -> SurfaceMesh {
    let a = 1.0f64 / 3.0;
    let b = (8.0 / 9.0f64).sqrt();
    let c = (2.0 / 9.0f64).sqrt();
    let d = (2.0 / 3.0f64).sqrt();
    SurfaceMesh {
        points: vec![
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(-c, d, -a),
            DVec3::new(-c, -d, -a),
            DVec3::new(b, 0.0, -a),
        ],
        triangles: vec![[0, 1, 2], [0, 2, 3], [0, 3, 1], [3, 2, 1]],
    }
}

/// Octahedron centered at the origin with the given circumradius. The vertices
/// are the points on the axes, in the order +x, -x, +y, -y, +z, -z.
pub fn octahedron(radius: f64) -> SurfaceMesh {
    SurfaceMesh {
        points: vec![
            DVec3::X * radius,
            DVec3::NEG_X * radius,
            DVec3::Y * radius,
            DVec3::NEG_Y * radius,
            DVec3::Z * radius,
            DVec3::NEG_Z * radius,
        ],
        triangles: vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ],
    }
}

/// Torus around the z axis, with `nu` segments around the axis and `nv`
/// segments around the tube. Both must be at least 3. Vertex `i * nv + j` is
/// the `j`-th point around the tube in the `i`-th cross section.
pub fn torus(major: f64, minor: f64, nu: u32, nv: u32) -> SurfaceMesh {
    let mut points = Vec::with_capacity((nu * nv) as usize);
    for i in 0..nu {
        let u = std::f64::consts::TAU * i as f64 / nu as f64;
        for j in 0..nv {
            let v = std::f64::consts::TAU * j as f64 / nv as f64;
            let ring = major + minor * v.cos();
            points.push(DVec3::new(ring * u.cos(), ring * u.sin(), minor * v.sin()));
        }
    }
    let index = |i: u32, j: u32| (i % nu) * nv + (j % nv);
    let triangles = (0..nu)
        .flat_map(|i| (0..nv).map(move |j| (i, j)))
        .flat_map(|(i, j)| {
            split_quad([
                index(i, j),
                index(i + 1, j),
                index(i + 1, j + 1),
                index(i, j + 1),
            ])
        })
        .collect();
    SurfaceMesh { points, triangles }
}

/// Outward normal of each side of a unit cube, and the corners of that side as
/// offsets from the minimum corner of the cube.
const CUBE_SIDES: [([i32; 3], [[i32; 3]; 4]); 6] = [
    ([1, 0, 0], [[1, 0, 0], [1, 1, 0], [1, 1, 1], [1, 0, 1]]),
    ([-1, 0, 0], [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]]),
    ([0, 1, 0], [[0, 1, 0], [0, 1, 1], [1, 1, 1], [1, 1, 0]]),
    ([0, -1, 0], [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]]),
    ([0, 0, 1], [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]]),
    ([0, 0, -1], [[0, 0, 0], [0, 1, 0], [1, 1, 0], [1, 0, 0]]),
];

/// Boundary of a union of unit cubes, each identified by its minimum corner.
///
/// Sides shared by two cubes are dropped, and lattice points are shared by all
/// the sides that touch them. Cubes that only touch along an edge or a corner
/// produce a non-manifold surface.
pub fn voxel_surface(voxels: &[[i32; 3]]) -> SurfaceMesh {
    let occupied: std::collections::HashSet<[i32; 3]> = voxels.iter().copied().collect();
    let mut lookup: HashMap<[i32; 3], u32> = HashMap::new();
    let mut points = Vec::new();
    let mut triangles = Vec::new();
    for voxel in voxels {
        for &(normal, corners) in CUBE_SIDES.iter() {
            let neighbor = [0, 1, 2].map(|k| voxel[k] + normal[k]);
            if occupied.contains(&neighbor) {
                continue;
            }
            let quad = corners.map(|offset| {
                let p = [0, 1, 2].map(|k| voxel[k] + offset[k]);
                *lookup.entry(p).or_insert_with(|| {
                    points.push(DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64));
                    (points.len() - 1) as u32
                })
            });
            triangles.extend(split_quad(quad));
        }
    }
    SurfaceMesh { points, triangles }
}
