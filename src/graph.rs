use crate::{
    annotate::{Annotation, BoundaryBasis},
    element::{EH, FH, Handle, VH},
    error::Error,
    linalg::{BitMatrix, BitVector},
    tree::SpanningTree,
};
use glam::DVec3;
use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// How far the genus computed from the Euler characteristic may stray from an
/// integer before the input is rejected.
pub const GENUS_TOLERANCE: f64 = 1e-3;

/// Where the faces of a graph come from. This decides which topology checks
/// are run on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    /// Triangles of a closed orientable surface.
    Surface,
    /// Faces of the tetrahedra of a solid. The boundary of a solid is always
    /// closed, so the open boundary check is skipped.
    Volumetric,
}

/// Results derived from the topology, each computed at most once.
#[derive(Default)]
pub(crate) struct DerivedCache {
    pub(crate) mst: OnceCell<SpanningTree>,
    pub(crate) boundary: OnceCell<BoundaryBasis>,
    pub(crate) cycles: OnceCell<BitMatrix>,
}

/// Weighted graph of the vertices and edges of a triangle mesh.
///
/// The topology is fixed on construction. Edges are undirected and keyed by
/// their canonical `(min, max)` vertex pair, and numbered in the order they are
/// first seen while walking the faces.
pub struct MeshGraph {
    points: Vec<DVec3>,
    faces: Vec<[VH; 3]>,
    face_edges: Vec<[EH; 3]>,
    // Neighbors of every vertex with the length of the connecting edge, sorted
    // by neighbor index.
    adjacency: Vec<Vec<(VH, f64)>>,
    edges: Vec<(VH, VH)>,
    edge_lookup: HashMap<(VH, VH), EH>,
    genus: i64,
    kind: GraphKind,
    cache: DerivedCache,
    annotation: OnceCell<Annotation>,
}

impl MeshGraph {
    /// Build the graph of a closed triangulated surface.
    pub fn new(points: Vec<DVec3>, triangles: &[[u32; 3]]) -> Result<Self, Error> {
        Self::with_kind(points, triangles, GraphKind::Surface)
    }

    pub fn with_kind(
        points: Vec<DVec3>,
        triangles: &[[u32; 3]],
        kind: GraphKind,
    ) -> Result<Self, Error> {
        let nverts = points.len();
        let mut faces = Vec::with_capacity(triangles.len());
        let mut face_edges = Vec::with_capacity(triangles.len());
        let mut adjacency: Vec<Vec<(VH, f64)>> = vec![Vec::new(); nverts];
        let mut edges: Vec<(VH, VH)> = Vec::with_capacity(triangles.len() * 3 / 2);
        let mut edge_lookup = HashMap::with_capacity(triangles.len() * 3 / 2);
        for (fi, tri) in triangles.iter().enumerate() {
            let fv: [VH; 3] = tri.map(VH::from);
            if let Some(v) = fv.iter().find(|v| v.index() as usize >= nverts) {
                return Err(Error::VertexOutOfBounds(*v));
            }
            if fv[0] == fv[1] || fv[1] == fv[2] || fv[0] == fv[2] {
                return Err(Error::DegenerateFace(FH::from(fi as u32)));
            }
            let mut fe = [EH::from(0); 3];
            for (slot, (a, b)) in [(fv[0], fv[1]), (fv[1], fv[2]), (fv[0], fv[2])]
                .into_iter()
                .enumerate()
            {
                let key = VH::canonical(a, b);
                fe[slot] = *edge_lookup.entry(key).or_insert_with(|| {
                    let e = EH::from(edges.len() as u32);
                    let dist = points[usize::from(a)].distance(points[usize::from(b)]);
                    adjacency[usize::from(a)].push((b, dist));
                    adjacency[usize::from(b)].push((a, dist));
                    edges.push(key);
                    e
                });
            }
            faces.push(fv);
            face_edges.push(fe);
        }
        for nbrs in adjacency.iter_mut() {
            nbrs.sort_by_key(|(v, _)| *v);
        }
        let genus = Self::compute_genus(nverts, edges.len(), faces.len(), kind)?;
        log::info!(
            "V={}, E={}, F={}, genus={} ({:?})",
            nverts,
            edges.len(),
            faces.len(),
            genus,
            kind
        );
        Ok(MeshGraph {
            points,
            faces,
            face_edges,
            adjacency,
            edges,
            edge_lookup,
            genus,
            kind,
            cache: DerivedCache::default(),
            annotation: OnceCell::new(),
        })
    }

    /// Genus from Euler's formula `V - E + F = 2 - 2g`.
    fn compute_genus(
        nverts: usize,
        nedges: usize,
        nfaces: usize,
        kind: GraphKind,
    ) -> Result<i64, Error> {
        let chi = nverts as i64 - nedges as i64 + nfaces as i64;
        let genus = 1.0 - chi as f64 / 2.0;
        let invalid = Error::InvalidTopology {
            vertices: nverts,
            edges: nedges,
            faces: nfaces,
            genus,
        };
        // A half integer genus is what a disk-like surface with an open boundary
        // produces.
        if kind == GraphKind::Surface && (genus - 0.5).abs() < GENUS_TOLERANCE {
            return Err(invalid);
        }
        if (genus.round() - genus).abs() >= GENUS_TOLERANCE {
            return Err(invalid);
        }
        Ok(genus.round() as i64)
    }

    pub fn num_vertices(&self) -> usize {
        self.points.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn genus(&self) -> i64 {
        self.genus
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<> {
        (0..self.points.len() as u32).map(VH::from)
    }

    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    pub fn point(&self, v: VH) -> Result<DVec3, Error> {
        self.points
            .get(usize::from(v))
            .copied()
            .ok_or(Error::VertexOutOfBounds(v))
    }

    pub fn faces(&self) -> &[[VH; 3]] {
        &self.faces
    }

    /// The three edges bounding each face, in the order `(v0, v1)`, `(v1, v2)`,
    /// `(v0, v2)`.
    pub fn face_edges(&self) -> &[[EH; 3]] {
        &self.face_edges
    }

    /// Neighbors of `v` and their distances, sorted by neighbor index.
    pub fn neighbors(&self, v: VH) -> Result<&[(VH, f64)], Error> {
        self.adjacency
            .get(usize::from(v))
            .map(|n| n.as_slice())
            .ok_or(Error::VertexOutOfBounds(v))
    }

    /// All edges as `(a, b, length)` with `a < b`, in edge index order.
    pub fn edges(&self) -> impl Iterator<Item = (VH, VH, f64)> + '_ {
        self.edges
            .iter()
            .map(|&(a, b)| (a, b, self.points[usize::from(a)].distance(self.points[usize::from(b)])))
    }

    pub fn edge_index(&self, a: VH, b: VH) -> Option<EH> {
        self.edge_lookup.get(&VH::canonical(a, b)).copied()
    }

    /// Canonical vertex pair of an edge.
    pub fn edge_vertices(&self, e: EH) -> Option<(VH, VH)> {
        self.edges.get(usize::from(e)).copied()
    }

    /// Sum of the lengths of the edges between consecutive vertices of `path`.
    /// Consecutive vertices must be connected by an edge.
    pub fn path_length(&self, path: &[VH]) -> Result<f64, Error> {
        path.windows(2).try_fold(0.0, |total, pair| {
            let (a, b) = (pair[0], pair[1]);
            self.edge_index(a, b).ok_or(Error::NotAnEdge(a, b))?;
            Ok(total + self.point(a)?.distance(self.point(b)?))
        })
    }

    /// Indicator vector over the edges of the graph for the edges of `path`.
    ///
    /// The path must not use any edge twice, otherwise the edge would have a
    /// coefficient of 2 and the result would not be a binary vector. Paths with
    /// fewer than two vertices have no edges.
    pub fn path_vector(&self, path: &[VH]) -> Result<BitVector, Error> {
        let mut out = BitVector::zeros(self.num_edges());
        for pair in path.windows(2) {
            let e = self
                .edge_index(pair[0], pair[1])
                .ok_or(Error::NotAnEdge(pair[0], pair[1]))?;
            let ei = usize::from(e);
            if out.get(ei) {
                return Err(Error::MalformedBinaryVector {
                    index: ei,
                    value: 2,
                });
            }
            out.set(ei, true);
        }
        Ok(out)
    }

    /// Canonical vertex pairs of the edges set in an indicator vector.
    pub fn edge_list_from_vector(&self, vector: &BitVector) -> Result<Vec<(VH, VH)>, Error> {
        if vector.len() != self.num_edges() {
            return Err(Error::DimensionMismatch(self.num_edges(), vector.len()));
        }
        Ok(vector.ones().map(|e| self.edges[e]).collect())
    }

    /// Minimum spanning tree rooted at the first vertex, built on first use.
    pub fn minimum_spanning_tree(&self) -> Result<&SpanningTree, Error> {
        self.cache.mst.get_or_try_init(|| {
            let mut tree = SpanningTree::new();
            tree.build_mst(self, VH::from(0))?;
            Ok(tree)
        })
    }

    pub(crate) fn cache(&self) -> &DerivedCache {
        &self.cache
    }

    /// Assign the homology annotation of the edges. This can only be done once.
    pub fn set_annotation(&self, annotation: Annotation) -> Result<(), Error> {
        self.annotation
            .set(annotation)
            .map_err(|_| Error::AnnotationAlreadySet)
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.get()
    }

    /// Annotation of the edge between `a` and `b`, which is the null vector for
    /// edges that were not assigned one.
    pub fn edge_annotation(&self, a: VH, b: VH) -> Result<&BitVector, Error> {
        self.annotation()
            .map(|ann| ann.edge(a, b))
            .ok_or(Error::MissingAnnotation)
    }
}
