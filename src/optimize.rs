/*!
Shortest homology basis.

Every vertex roots an annotated shortest path tree, and every residual edge of
that tree closes a candidate cycle. The candidates are sorted by length and a
greedy pass over their annotations keeps each cycle that is independent of the
ones already kept. The result is a basis of the first homology group in which
no generator can be replaced by a shorter cycle.

Candidates only remember where they came from. The walks of the selected
cycles are extracted at the end from trees rebuilt for their roots.
*/

use crate::{
    annotate::{Annotation, Annotator},
    element::VH,
    error::Error,
    graph::MeshGraph,
    linalg::{BitMatrix, BitVector, independent_columns},
    tree::SpanningTree,
};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A closed walk on the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    pub length: f64,
    /// Vertices of the walk. The first and last vertex are the same.
    pub path: Vec<VH>,
    /// Homology class of the cycle.
    pub annotation: BitVector,
}

impl Cycle {
    /// Edges of the cycle as canonical vertex pairs, in edge index order.
    pub fn edges(&self, graph: &MeshGraph) -> Result<Vec<(VH, VH)>, Error> {
        graph.edge_list_from_vector(&graph.path_vector(&self.path)?)
    }
}

struct Candidate {
    length: f64,
    root: VH,
    edge: (VH, VH),
    annotation: BitVector,
}

pub struct HomologyBasisOptimizer<'a> {
    graph: &'a MeshGraph,
}

impl<'a> HomologyBasisOptimizer<'a> {
    /// The graph must already be annotated.
    pub fn new(graph: &'a MeshGraph) -> Self {
        HomologyBasisOptimizer { graph }
    }

    fn annotated_tree(&self, annotation: &Annotation, root: VH) -> Result<SpanningTree, Error> {
        let mut tree = SpanningTree::new();
        tree.build_spt(self.graph, root, Some(annotation))?;
        Ok(tree)
    }

    /// Cycles closed by the residual edges of the shortest path tree of `root`.
    fn candidates(&self, annotation: &Annotation, root: VH) -> Result<Vec<Candidate>, Error> {
        let graph = self.graph;
        let tree = self.annotated_tree(annotation, root)?;
        tree.residual_edges()
            .iter()
            .map(|&(vs, vd)| {
                let path = tree.get_path(vs, vd)?;
                let length = graph.path_length(&path)? + graph.path_length(&[vd, vs])?;
                let mut value = tree
                    .vertex_annotation(vs)
                    .ok_or(Error::MissingAnnotation)?
                    .clone();
                value ^= tree.vertex_annotation(vd).ok_or(Error::MissingAnnotation)?;
                value ^= annotation.edge(vs, vd);
                Ok(Candidate {
                    length,
                    root,
                    edge: (vs, vd),
                    annotation: value,
                })
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn all_candidates(&self, annotation: &Annotation) -> Result<Vec<Candidate>, Error> {
        let roots: Vec<VH> = self.graph.vertices().collect();
        let per_root = roots
            .par_iter()
            .map(|&root| self.candidates(annotation, root))
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(per_root.into_iter().flatten().collect())
    }

    #[cfg(not(feature = "parallel"))]
    fn all_candidates(&self, annotation: &Annotation) -> Result<Vec<Candidate>, Error> {
        let mut out = Vec::new();
        for root in self.graph.vertices() {
            out.extend(self.candidates(annotation, root)?);
        }
        Ok(out)
    }

    /// Shortest set of cycles whose annotations span the homology group,
    /// sorted by length.
    pub fn compute_optimal_basis(&self) -> Result<Vec<Cycle>, Error> {
        let annotation = self.graph.annotation().ok_or(Error::MissingAnnotation)?;
        let dim = annotation.dim();
        if dim == 0 {
            return Err(Error::TrivialGenus);
        }
        let mut candidates = self.all_candidates(annotation)?;
        log::info!("Collected {} candidate cycles", candidates.len());
        // Stable, so equal lengths keep the order of their roots.
        candidates.sort_by(|a, b| a.length.total_cmp(&b.length));
        let matrix = BitMatrix::from_columns(dim, candidates.iter().map(|c| &c.annotation))?;
        let pivots = independent_columns(&matrix);
        if pivots.len() != dim {
            return Err(Error::RankMismatch {
                context: "optimal basis: selected cycles",
                expected: dim,
                actual: pivots.len(),
            });
        }
        let basis = pivots
            .into_iter()
            .map(|i| self.materialize(annotation, &candidates[i]))
            .collect::<Result<Vec<_>, Error>>()?;
        for cycle in &basis {
            log::info!(
                "Selected cycle of length {} with {} edges",
                cycle.length,
                cycle.path.len() - 1
            );
        }
        Ok(basis)
    }

    /// Rebuild the tree of the candidate's root and extract its walk.
    fn materialize(&self, annotation: &Annotation, candidate: &Candidate) -> Result<Cycle, Error> {
        let (vs, vd) = candidate.edge;
        let tree = self.annotated_tree(annotation, candidate.root)?;
        let mut path = tree.get_path(vs, vd)?;
        path.push(vs);
        Ok(Cycle {
            length: candidate.length,
            path,
            annotation: candidate.annotation.clone(),
        })
    }
}

/// Annotate the graph if needed, then compute its shortest homology basis.
pub fn shortest_basis(graph: &MeshGraph) -> Result<Vec<Cycle>, Error> {
    Annotator::new(graph).annotate()?;
    HomologyBasisOptimizer::new(graph).compute_optimal_basis()
}
