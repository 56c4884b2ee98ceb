use crate::element::{FH, VH};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    // Topology.
    /// The Euler characteristic does not describe a closed orientable surface.
    #[error("invalid topology: V={vertices}, E={edges}, F={faces} gives genus {genus}")]
    InvalidTopology {
        vertices: usize,
        edges: usize,
        faces: usize,
        genus: f64,
    },
    #[error("graph is disconnected: spanning tree reached {reached} of {expected} vertices")]
    DisconnectedGraph { reached: usize, expected: usize },
    #[error("vertex {0} is out of bounds")]
    VertexOutOfBounds(VH),
    #[error("face {0} uses the same vertex more than once")]
    DegenerateFace(FH),
    #[error("vertices {0} and {1} are not connected by an edge")]
    NotAnEdge(VH, VH),
    // Trees.
    #[error("spanning tree is already built")]
    TreeAlreadyBuilt,
    #[error("spanning tree is not built yet")]
    TreeNotBuilt,
    #[error("a path needs two distinct end points, got {0} twice")]
    DegeneratePath(VH),
    // Homology.
    #[error("the first homology group is trivial, there is nothing to annotate")]
    TrivialGenus,
    #[error("rank mismatch in {context}: expected {expected}, found {actual}")]
    RankMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A vector meant to hold GF(2) values contains something other than 0 or 1.
    #[error("malformed binary vector: entry {index} has value {value}")]
    MalformedBinaryVector { index: usize, value: u32 },
    #[error("dimension mismatch: expected {0}, found {1}")]
    DimensionMismatch(usize, usize),
    #[error("annotation was already assigned to this graph")]
    AnnotationAlreadySet,
    #[error("graph has no annotation")]
    MissingAnnotation,
    // Input.
    #[error("failed to load obj file: {0}")]
    ObjLoadFailed(String),
    #[error("expected a multiple of 3 coordinates, found {0}")]
    IncorrectNumberOfCoordinates(usize),
    #[error("tetrahedralization failed: {0}")]
    TetrahedralizationFailed(String),
    /// The tetrahedral mesher moved or dropped one of the surface points.
    #[error("tetrahedral mesh does not reproduce surface point {0}")]
    PointMismatch(VH),
}
