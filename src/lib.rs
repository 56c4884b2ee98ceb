/*!
Shortest homology basis loops on closed triangulated surfaces.

The loops found by this crate go around the handles and tunnels of a surface.
Cutting a surface along them is a common first step for parameterization and
seam placement.

# Overview

+ A [`MeshGraph`] is built from the points and triangles of a closed surface.
  Its genus is computed from the Euler characteristic, and inputs that can't be
  closed orientable surfaces are rejected.

+ A [`SpanningTree`] is grown over the graph, either as a minimum spanning tree
  or as a shortest path tree.

+ The [`Annotator`] uses the minimum spanning tree to compute the boundary and
  cycle subgroups of the graph as matrices over GF(2) (see [`linalg`]), and
  from them the [`Annotation`] of every edge: a binary vector that identifies
  the homology class of any cycle running over that edge.

+ The [`HomologyBasisOptimizer`] grows an annotated shortest path tree from
  every vertex, collects the cycles closed by their residual edges, and keeps
  the shortest independent ones. [`shortest_basis`] runs the whole pipeline.

+ Surfaces can be loaded from OBJ files (`obj` feature), or generated with the
  functions in [`primitive`]. The [`volume`] module builds graphs from the
  tetrahedra of a solid, produced by an external [`Tetrahedralizer`]. Its
  homology annotates the surface in [`handle_loops`], which keeps only the
  loops around the handles.

+ With the `parallel` feature, the per-vertex trees of the optimizer are grown
  on the `rayon` thread pool. The result is the same either way.

```
use homloop::{primitive, shortest_basis};

let graph = primitive::torus(3.0, 1.0, 8, 6).graph()?;
assert_eq!(1, graph.genus());
let loops = shortest_basis(&graph)?;
assert_eq!(2, loops.len());
assert!(loops[0].length <= loops[1].length);
# Ok::<(), homloop::Error>(())
```
*/

mod annotate;
mod element;
mod error;
mod graph;
mod macros;
#[cfg(feature = "obj")]
mod obj;
mod optimize;
mod queue;
mod tree;

pub mod linalg;
pub mod primitive;
pub mod volume;

pub use annotate::{Annotation, Annotator, BoundaryBasis, H1Basis};
pub use element::{EH, FH, Handle, VH};
pub use error::Error;
pub use graph::{GENUS_TOLERANCE, GraphKind, MeshGraph};
pub use optimize::{Cycle, HomologyBasisOptimizer, shortest_basis};
pub use tree::SpanningTree;
pub use volume::{TetMesh, TetrahedralizeInput, Tetrahedralizer, VolumetricOptions, handle_loops};
