/*!
Graphs of tetrahedralized solids.

The solid enclosed by a surface is meshed by an external tetrahedral mesher,
together with a box around it. The mesher is told to leave a hole at a seed
point, which carves out the region the seed lies in. Every tetrahedron then
contributes all four of its triangles to the graph, so faces shared by two
tetrahedra appear twice.

Cycles that bound a disk inside the solid are trivial in the volumetric graph.
Annotating the surface with the homology of the solid therefore leaves only
the loops that go around the handles, see [`handle_loops`].
*/

use crate::{
    annotate::Annotator,
    element::VH,
    error::Error,
    graph::{GraphKind, MeshGraph},
    optimize::{Cycle, HomologyBasisOptimizer},
    primitive::quad_box,
};
use glam::DVec3;

/// Surface points returned by the mesher may differ from the input by at
/// most this much.
pub const POINT_TOLERANCE: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumetricOptions {
    /// Gap between the bounding box of the surface and the enclosing box.
    pub box_margin: f64,
    /// Seed point of the region the mesher leaves empty.
    pub hole: DVec3,
}

impl Default for VolumetricOptions {
    fn default() -> Self {
        VolumetricOptions {
            box_margin: 0.5,
            hole: DVec3::splat(0.9),
        }
    }
}

/// Axis aligned box around `points`, grown by `margin` on every side. Returns
/// the corners and the quad sides of the box.
pub fn enclosing_box(points: &[DVec3], margin: f64) -> ([DVec3; 8], [[u32; 4]; 6]) {
    let (min, max) = points.iter().fold(
        (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
        |(min, max), p| (min.min(*p), max.max(*p)),
    );
    log::info!("Bounding box of the surface spans {} to {}", min, max);
    quad_box(min - DVec3::splat(margin), max + DVec3::splat(margin))
}

/// Everything the tetrahedral mesher needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TetrahedralizeInput {
    /// The surface points, followed by the corners of the enclosing box.
    pub points: Vec<DVec3>,
    /// Polygonal facets to preserve: the surface triangles, followed by the
    /// sides of the enclosing box.
    pub facets: Vec<Vec<u32>>,
    pub holes: Vec<DVec3>,
    /// Number of points that belong to the surface.
    pub num_surface_points: usize,
}

impl TetrahedralizeInput {
    pub fn new(points: &[DVec3], triangles: &[[u32; 3]], options: &VolumetricOptions) -> Self {
        let (corners, sides) = enclosing_box(points, options.box_margin);
        let offset = points.len() as u32;
        let mut all_points = Vec::with_capacity(points.len() + corners.len());
        all_points.extend_from_slice(points);
        all_points.extend_from_slice(&corners);
        let facets = triangles
            .iter()
            .map(|t| t.to_vec())
            .chain(sides.iter().map(|s| s.iter().map(|i| i + offset).collect()))
            .collect();
        TetrahedralizeInput {
            points: all_points,
            facets,
            holes: vec![options.hole],
            num_surface_points: points.len(),
        }
    }
}

/// Output of the tetrahedral mesher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TetMesh {
    pub points: Vec<DVec3>,
    pub tets: Vec<[u32; 4]>,
}

/// Tetrahedral mesher. The output must start with the input points, in the
/// same order and at the same positions.
pub trait Tetrahedralizer {
    fn tetrahedralize(&self, input: &TetrahedralizeInput) -> Result<TetMesh, Error>;
}

impl MeshGraph {
    /// Graph of the triangles of a set of tetrahedra.
    pub fn from_tetrahedra(points: Vec<DVec3>, tets: &[[u32; 4]]) -> Result<Self, Error> {
        let faces: Vec<[u32; 3]> = tets
            .iter()
            .flat_map(|&[a, b, c, d]| [[a, b, c], [a, b, d], [a, c, d], [b, c, d]])
            .collect();
        Self::with_kind(points, &faces, GraphKind::Volumetric)
    }

    /// Tetrahedralize the region between the surface and an enclosing box, and
    /// build the graph of the result.
    pub fn volumetric<T>(
        points: &[DVec3],
        triangles: &[[u32; 3]],
        options: &VolumetricOptions,
        mesher: &T,
    ) -> Result<Self, Error>
    where
        T: Tetrahedralizer + ?Sized,
    {
        let input = TetrahedralizeInput::new(points, triangles, options);
        let output = mesher.tetrahedralize(&input)?;
        check_prefix(points, &output.points)?;
        log::info!(
            "Tetrahedral mesh has {} points and {} tetrahedra",
            output.points.len(),
            output.tets.len()
        );
        Self::from_tetrahedra(output.points, &output.tets)
    }
}

/// `actual` must start with the points in `expected`.
fn check_prefix(expected: &[DVec3], actual: &[DVec3]) -> Result<(), Error> {
    let moved = expected.iter().enumerate().find(|(i, p)| {
        !actual
            .get(*i)
            .is_some_and(|q| q.abs_diff_eq(**p, POINT_TOLERANCE))
    });
    match moved {
        Some((i, _)) => Err(Error::PointMismatch(VH::from(i as u32))),
        None => Ok(()),
    }
}

/// Shortest loops around the handles of a surface.
///
/// The homology of `volumetric`, the graph of the solid bounded by `surface`,
/// is used to annotate the surface, which must not have an annotation yet. The
/// vertices of `surface` must come first in `volumetric`, so that the surface
/// edges are edges of the solid. A surface of genus `g` gets `g` loops.
pub fn handle_loops(surface: &MeshGraph, volumetric: &MeshGraph) -> Result<Vec<Cycle>, Error> {
    check_prefix(surface.points(), volumetric.points())?;
    let annotation = Annotator::new(volumetric).compute_annotation()?;
    log::info!(
        "Transferring annotation of dimension {} to a surface of genus {}",
        annotation.dim(),
        surface.genus()
    );
    surface.set_annotation(annotation)?;
    HomologyBasisOptimizer::new(surface).compute_optimal_basis()
}

#[cfg(test)]
mod test {
    use super::{
        TetMesh, TetrahedralizeInput, Tetrahedralizer, VolumetricOptions, enclosing_box,
        handle_loops,
    };
    use crate::{
        annotate::Annotator,
        element::VH,
        error::Error,
        graph::{GraphKind, MeshGraph},
        optimize::shortest_basis,
        primitive,
    };
    use glam::DVec3;
    use std::collections::HashMap;

    /// Unit cube cut into four corner tetrahedra and one in the middle.
    const CUBE_TETS: [[u32; 4]; 5] = [
        [0, 1, 3, 4],
        [2, 1, 3, 6],
        [5, 1, 4, 6],
        [7, 3, 4, 6],
        [1, 3, 4, 6],
    ];

    /// Meshes the surface points as a cube, whatever the input was.
    struct CubeMesher {
        nudge: Option<usize>,
        drop_points: bool,
    }

    impl Tetrahedralizer for CubeMesher {
        fn tetrahedralize(&self, input: &TetrahedralizeInput) -> Result<TetMesh, Error> {
            let mut points = input.points[..input.num_surface_points].to_vec();
            if let Some(i) = self.nudge {
                points[i] += DVec3::splat(1e-3);
            }
            if self.drop_points {
                points.truncate(5);
            }
            Ok(TetMesh {
                points,
                tets: CUBE_TETS.to_vec(),
            })
        }
    }

    /// Returns the same solid for any input.
    struct SolidMesher(TetMesh);

    impl Tetrahedralizer for SolidMesher {
        fn tetrahedralize(&self, _input: &TetrahedralizeInput) -> Result<TetMesh, Error> {
            Ok(self.0.clone())
        }
    }

    struct FailingMesher;

    impl Tetrahedralizer for FailingMesher {
        fn tetrahedralize(&self, _input: &TetrahedralizeInput) -> Result<TetMesh, Error> {
            Err(Error::TetrahedralizationFailed("self intersecting facets".into()))
        }
    }

    fn cube() -> primitive::SurfaceMesh {
        primitive::box_surface(DVec3::ZERO, DVec3::ONE)
    }

    /// Corners of a unit cube, in the order of the indices in `CUBE_TETS`.
    const CORNERS: [(u32, u32, u32); 8] = [
        (0, 0, 0),
        (1, 0, 0),
        (1, 1, 0),
        (0, 1, 0),
        (0, 0, 1),
        (1, 0, 1),
        (1, 1, 1),
        (0, 1, 1),
    ];

    /// `CUBE_TETS` reflected in the x direction.
    const MIRROR: [u32; 8] = [1, 0, 3, 2, 5, 4, 7, 6];

    /// Ring of eight unit cubes around the missing cube at (1, 1, 0). The
    /// middle tetrahedron of every cube sits on the corners with an odd
    /// coordinate sum, so neighboring cubes cut their shared side along the
    /// same diagonal.
    fn ring_solid() -> TetMesh {
        let lattice = |x: u32, y: u32, z: u32| x + 4 * y + 16 * z;
        let points = (0..2u32)
            .flat_map(|z| {
                (0..4u32).flat_map(move |y| {
                    (0..4u32).map(move |x| DVec3::new(x as f64, y as f64, z as f64))
                })
            })
            .collect();
        let mut tets = Vec::new();
        for (x, y) in (0..3u32).flat_map(|x| (0..3u32).map(move |y| (x, y))) {
            if (x, y) == (1, 1) {
                continue;
            }
            let corner = |k: u32| {
                let k = if (x + y) % 2 == 1 { MIRROR[k as usize] } else { k };
                let (dx, dy, dz) = CORNERS[k as usize];
                lattice(x + dx, y + dy, dz)
            };
            tets.extend(CUBE_TETS.iter().map(|&t| t.map(&corner)));
        }
        TetMesh { points, tets }
    }

    /// Faces that belong to exactly one tetrahedron.
    fn boundary_triangles(tets: &[[u32; 4]]) -> Vec<[u32; 3]> {
        let mut count: HashMap<[u32; 3], usize> = HashMap::new();
        for &[a, b, c, d] in tets {
            for mut face in [[a, b, c], [a, b, d], [a, c, d], [b, c, d]] {
                face.sort();
                *count.entry(face).or_default() += 1;
            }
        }
        let mut out: Vec<[u32; 3]> = count
            .into_iter()
            .filter(|(_, n)| *n == 1)
            .map(|(face, _)| face)
            .collect();
        out.sort();
        out
    }

    #[test]
    fn t_enclosing_box() {
        let points = [DVec3::new(1.0, -2.0, 0.0), DVec3::new(-1.0, 2.0, 4.0)];
        let (corners, sides) = enclosing_box(&points, 0.5);
        assert_eq!(DVec3::new(-1.5, -2.5, -0.5), corners[0]);
        assert_eq!(DVec3::new(1.5, 2.5, 4.5), corners[6]);
        assert_eq!(6, sides.len());
    }

    #[test]
    fn t_input_layout() {
        let mesh = cube();
        let options = VolumetricOptions::default();
        let input = TetrahedralizeInput::new(&mesh.points, &mesh.triangles, &options);
        assert_eq!(16, input.points.len());
        assert_eq!(8, input.num_surface_points);
        assert_eq!(&mesh.points[..], &input.points[..8]);
        assert_eq!(DVec3::splat(-0.5), input.points[8]);
        assert_eq!(DVec3::splat(1.5), input.points[14]);
        assert_eq!(18, input.facets.len());
        assert_eq!(vec![0, 3, 2, 1], input.facets[12].iter().map(|i| i - 8).collect::<Vec<_>>());
        assert!(input.facets[12..].iter().all(|f| f.len() == 4 && f.iter().all(|&i| i >= 8)));
        assert_eq!(vec![DVec3::splat(0.9)], input.holes);
    }

    #[test]
    fn t_from_tetrahedra() {
        let graph = MeshGraph::from_tetrahedra(cube().points, &CUBE_TETS).unwrap();
        assert_eq!(GraphKind::Volumetric, graph.kind());
        // Twelve sides and six diagonals. Faces shared by two tetrahedra count
        // twice.
        assert_eq!((8, 18, 20), (graph.num_vertices(), graph.num_edges(), graph.num_faces()));
        assert_eq!(-4, graph.genus());
        // A solid has no handles.
        assert_eq!(
            Err(Error::TrivialGenus),
            Annotator::new(&graph).compute_annotation().map(|_| ())
        );
    }

    #[test]
    fn t_volumetric() {
        let mesh = cube();
        let options = VolumetricOptions::default();
        let good = CubeMesher {
            nudge: None,
            drop_points: false,
        };
        let graph = MeshGraph::volumetric(&mesh.points, &mesh.triangles, &options, &good).unwrap();
        assert_eq!(18, graph.num_edges());
        let nudged = CubeMesher {
            nudge: Some(3),
            drop_points: false,
        };
        assert_eq!(
            Some(Error::PointMismatch(VH::from(3))),
            MeshGraph::volumetric(&mesh.points, &mesh.triangles, &options, &nudged).err()
        );
        let dropped = CubeMesher {
            nudge: None,
            drop_points: true,
        };
        assert_eq!(
            Some(Error::PointMismatch(VH::from(5))),
            MeshGraph::volumetric(&mesh.points, &mesh.triangles, &options, &dropped).err()
        );
        assert!(matches!(
            MeshGraph::volumetric(&mesh.points, &mesh.triangles, &options, &FailingMesher),
            Err(Error::TetrahedralizationFailed(_))
        ));
    }

    #[test]
    fn t_odd_euler_characteristic() {
        // Solid octahedron cut into four tetrahedra around its axis. Shared
        // faces count twice, and V - E + F = 6 - 13 + 16 is odd.
        let points = primitive::octahedron(1.0).points;
        let tets = [[4, 5, 0, 2], [4, 5, 2, 1], [4, 5, 1, 3], [4, 5, 3, 0]];
        assert!(matches!(
            MeshGraph::from_tetrahedra(points, &tets),
            Err(Error::InvalidTopology {
                vertices: 6,
                edges: 13,
                faces: 16,
                ..
            })
        ));
    }

    #[test]
    fn t_handle_loops() {
        let solid = ring_solid();
        let points = solid.points.clone();
        let triangles = boundary_triangles(&solid.tets);
        assert_eq!(64, triangles.len());
        let surface = MeshGraph::new(points.clone(), &triangles).unwrap();
        assert_eq!(1, surface.genus());
        let volumetric = MeshGraph::volumetric(
            &points,
            &triangles,
            &VolumetricOptions::default(),
            &SolidMesher(solid),
        )
        .unwrap();
        assert_eq!(
            (32, 104, 160),
            (
                volumetric.num_vertices(),
                volumetric.num_edges(),
                volumetric.num_faces()
            )
        );
        assert_eq!(-43, volumetric.genus());
        let loops = handle_loops(&surface, &volumetric).unwrap();
        assert_eq!(1, surface.annotation().unwrap().dim());
        assert_eq!(1, loops.len());
        let cycle = &loops[0];
        assert!((cycle.length - 4.0).abs() < 1e-9);
        assert_eq!(5, cycle.path.len());
        assert_eq!(cycle.path.first(), cycle.path.last());
        // Around the missing cube, in the top or the bottom plane.
        let z = surface.point(cycle.path[0]).unwrap().z;
        for &v in &cycle.path {
            let p = surface.point(v).unwrap();
            assert!(p.x == 1.0 || p.x == 2.0);
            assert!(p.y == 1.0 || p.y == 2.0);
            assert_eq!(z, p.z);
        }
        // The loops around the tube bound disks in the solid. Without the
        // solid they are part of the basis.
        let alone = MeshGraph::new(points, &triangles).unwrap();
        let all = shortest_basis(&alone).unwrap();
        assert_eq!(2, all.len());
        for cycle in &all {
            assert!((cycle.length - 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn t_handle_loops_point_mismatch() {
        let solid = ring_solid();
        let surface = MeshGraph::new(solid.points.clone(), &boundary_triangles(&solid.tets)).unwrap();
        // Same first two corners, then the cube goes its own way.
        let cube = MeshGraph::from_tetrahedra(cube().points, &CUBE_TETS).unwrap();
        assert_eq!(
            Some(Error::PointMismatch(VH::from(2))),
            handle_loops(&surface, &cube).err()
        );
        assert!(surface.annotation().is_none());
    }
}
