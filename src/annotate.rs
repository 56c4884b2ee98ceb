/*!
Homology annotations of the edges of a [`MeshGraph`].

An annotation assigns every edge a vector in GF(2)^d, where d is the dimension
of the first homology group, such that the sum of the annotations along any
cycle identifies the homology class of that cycle. Cycles that bound a set of
faces sum to the null vector.

The annotation is computed from a spanning tree. Every residual edge closes a
fundamental cycle. These cycles are expressed in a basis made of a maximal
independent set of face boundaries followed by the independent cycles that are
left over, and the coordinates along the latter are the annotation of the
residual edge. Tree edges are annotated with the null vector.
*/

use crate::{
    element::VH,
    error::Error,
    graph::MeshGraph,
    linalg::{BitMatrix, BitVector, independent_columns, solve},
    tree::SpanningTree,
};
use std::collections::HashMap;

/// Map from edges to their homology annotation.
///
/// Lookups are total: edges that were never assigned a vector are annotated
/// with the null vector of the declared dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    map: HashMap<(VH, VH), BitVector>,
    null: BitVector,
}

impl Annotation {
    /// Empty annotation of dimension `dim`.
    pub fn new(dim: usize) -> Self {
        Annotation {
            map: HashMap::new(),
            null: BitVector::zeros(dim),
        }
    }

    /// Annotate the edge between `a` and `b`. The order of the vertices doesn't
    /// matter.
    pub fn insert(&mut self, a: VH, b: VH, value: BitVector) -> Result<(), Error> {
        if value.len() != self.dim() {
            return Err(Error::DimensionMismatch(self.dim(), value.len()));
        }
        self.map.insert(VH::canonical(a, b), value);
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.null.len()
    }

    /// Number of edges with an explicitly assigned vector.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn null(&self) -> &BitVector {
        &self.null
    }

    pub fn edge(&self, a: VH, b: VH) -> &BitVector {
        self.map.get(&VH::canonical(a, b)).unwrap_or(&self.null)
    }

    /// Explicitly annotated edges as canonical vertex pairs, in no particular
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = ((VH, VH), &BitVector)> {
        self.map.iter().map(|(e, v)| (*e, v))
    }
}

/// Face boundaries of a graph, one column per face with a row per edge, and
/// the pivot columns that span the boundary subgroup.
#[derive(Debug, Clone)]
pub struct BoundaryBasis {
    pub(crate) matrix: BitMatrix,
    pub(crate) pivots: Vec<usize>,
}

impl BoundaryBasis {
    pub fn matrix(&self) -> &BitMatrix {
        &self.matrix
    }

    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    /// Dimension of the boundary subgroup.
    pub fn rank(&self) -> usize {
        self.pivots.len()
    }
}

/// Independent columns of `[boundaries | cycles]`.
#[derive(Debug, Clone)]
pub struct H1Basis {
    /// The pivot columns of the combined matrix. The boundary columns come
    /// first, followed by the homology generators.
    pub(crate) coeffs: BitMatrix,
    pub(crate) pivots: Vec<usize>,
    pub(crate) boundary_rank: usize,
}

impl H1Basis {
    /// Pivot columns of the combined matrix.
    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    /// Pivot columns that are not boundaries. These are indices into the
    /// combined matrix.
    pub fn generators(&self) -> &[usize] {
        &self.pivots[self.boundary_rank..]
    }

    /// Dimension of the first homology group.
    pub fn dim(&self) -> usize {
        self.pivots.len() - self.boundary_rank
    }
}

/// Computes the boundary and cycle subgroups of a graph, and from them the
/// homology annotation of its edges.
pub struct Annotator<'a> {
    graph: &'a MeshGraph,
}

impl<'a> Annotator<'a> {
    pub fn new(graph: &'a MeshGraph) -> Self {
        Annotator { graph }
    }

    /// Boundary basis of the graph, computed on first use.
    pub fn boundary_basis(&self) -> &'a BoundaryBasis {
        let graph = self.graph;
        graph.cache().boundary.get_or_init(|| {
            let mut matrix = BitMatrix::zeros(graph.num_edges(), graph.num_faces());
            for (fi, fe) in graph.face_edges().iter().enumerate() {
                for e in fe {
                    matrix.set(usize::from(*e), fi, true);
                }
            }
            let pivots = independent_columns(&matrix);
            log::info!("Boundary subgroup has rank {}", pivots.len());
            BoundaryBasis { matrix, pivots }
        })
    }

    /// One column per residual edge of `tree`, holding the fundamental cycle
    /// that edge closes.
    pub fn cycle_basis(&self, tree: &SpanningTree) -> Result<BitMatrix, Error> {
        let graph = self.graph;
        let columns = tree
            .residual_edges()
            .iter()
            .map(|&(vs, vd)| {
                let mut column = graph.path_vector(&tree.get_path(vs, vd)?)?;
                let closing = graph
                    .edge_index(vs, vd)
                    .ok_or(Error::NotAnEdge(vs, vd))?;
                let ci = usize::from(closing);
                if column.get(ci) {
                    // The tree path already uses the closing edge.
                    return Err(Error::MalformedBinaryVector {
                        index: ci,
                        value: 2,
                    });
                }
                column.set(ci, true);
                Ok(column)
            })
            .collect::<Result<Vec<_>, Error>>()?;
        log::debug!("Cycle basis has {} columns", columns.len());
        BitMatrix::from_columns(graph.num_edges(), columns.iter())
    }

    /// Cycle basis of the minimum spanning tree, computed on first use.
    pub fn mst_cycle_basis(&self) -> Result<&'a BitMatrix, Error> {
        let graph = self.graph;
        graph
            .cache()
            .cycles
            .get_or_try_init(|| self.cycle_basis(graph.minimum_spanning_tree()?))
    }

    /// Find the independent columns of `[boundaries | cycles]`.
    ///
    /// The boundary columns are eliminated first, so they must come out with
    /// exactly the pivots they have on their own. Every pivot after those is a
    /// homology generator.
    pub fn h1_basis(&self, boundary: &BoundaryBasis, cycles: &BitMatrix) -> Result<H1Basis, Error> {
        let combined = boundary.matrix.hconcat(cycles)?;
        let pivots = independent_columns(&combined);
        let rank = boundary.rank();
        let agree = pivots
            .iter()
            .zip(boundary.pivots.iter())
            .take_while(|(a, b)| a == b)
            .count();
        if agree != rank {
            return Err(Error::RankMismatch {
                context: "h1 basis: boundary pivots",
                expected: rank,
                actual: agree,
            });
        }
        let coeffs = combined.select_columns(&pivots);
        log::info!(
            "Combined basis has rank {}, first homology has dimension {}",
            pivots.len(),
            pivots.len() - rank
        );
        Ok(H1Basis {
            coeffs,
            pivots,
            boundary_rank: rank,
        })
    }

    /// Annotate the residual edges of the minimum spanning tree.
    pub fn compute_annotation(&self) -> Result<Annotation, Error> {
        let graph = self.graph;
        let boundary = self.boundary_basis();
        let cycles = self.mst_cycle_basis()?;
        let h1 = self.h1_basis(boundary, cycles)?;
        let dim = h1.dim();
        if dim == 0 {
            return Err(Error::TrivialGenus);
        }
        if graph.kind() == crate::graph::GraphKind::Surface && dim as i64 != 2 * graph.genus() {
            log::warn!(
                "Homology has dimension {} but the surface has genus {}",
                dim,
                graph.genus()
            );
        }
        // Coordinates of every fundamental cycle in the combined basis. The
        // trailing `dim` rows are the homology part.
        let coords = solve(&h1.coeffs, cycles)?;
        let tree = graph.minimum_spanning_tree()?;
        let mut annotation = Annotation::new(dim);
        for (k, &(vs, vd)) in tree.residual_edges().iter().enumerate() {
            let value: BitVector = (0..dim)
                .map(|i| coords.get(h1.boundary_rank + i, k))
                .collect();
            annotation.insert(vs, vd, value)?;
        }
        log::info!(
            "Annotated {} edges with vectors of dimension {}",
            annotation.len(),
            dim
        );
        Ok(annotation)
    }

    /// Annotation assigned to the graph, computing and assigning it first if
    /// the graph doesn't have one yet.
    pub fn annotate(&self) -> Result<&'a Annotation, Error> {
        let graph = self.graph;
        if let Some(annotation) = graph.annotation() {
            return Ok(annotation);
        }
        graph.set_annotation(self.compute_annotation()?)?;
        graph.annotation().ok_or(Error::MissingAnnotation)
    }
}
