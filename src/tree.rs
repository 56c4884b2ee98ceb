/*!
Rooted spanning trees over a [`MeshGraph`].

A tree is either a minimum spanning tree grown with Prim's algorithm, or a
shortest path tree grown with Dijkstra's algorithm. Both grow the tree from
the root by repeatedly attaching the cheapest frontier vertex, using the
indexed [`Queue`] to lower the cost of queued vertices in place. Equal costs
are resolved in favour of the lower vertex index, so the same graph always
produces the same tree.
*/

use crate::{
    annotate::Annotation,
    element::{Handle, VH},
    error::Error,
    graph::MeshGraph,
    linalg::BitVector,
    queue::Queue,
};

/// A tree is built once, by exactly one of [`SpanningTree::build_mst`] or
/// [`SpanningTree::build_spt`], and is immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct SpanningTree {
    root: Option<VH>,
    // For every vertex except the root: the parent and the length of the edge
    // to it.
    parent: Vec<Option<(VH, f64)>>,
    // Graph edges not in the tree, in edge index order.
    residual: Vec<(VH, VH)>,
    // Distance from the root, only for shortest path trees.
    dists: Vec<f64>,
    // Homology annotation of the tree path from the root to every vertex. Only
    // for shortest path trees built with an annotation.
    annotation: Vec<BitVector>,
}

impl SpanningTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_built(&self) -> bool {
        self.root.is_some()
    }

    fn check_unbuilt(&self, graph: &MeshGraph, root: VH) -> Result<(), Error> {
        if self.is_built() {
            return Err(Error::TreeAlreadyBuilt);
        }
        if root.index() as usize >= graph.num_vertices() {
            return Err(Error::VertexOutOfBounds(root));
        }
        Ok(())
    }

    /// Grow a minimum spanning tree from `root` with Prim's algorithm, using
    /// edge lengths as weights.
    pub fn build_mst(&mut self, graph: &MeshGraph, root: VH) -> Result<(), Error> {
        self.check_unbuilt(graph, root)?;
        let nverts = graph.num_vertices();
        let mut parent: Vec<Option<(VH, f64)>> = vec![None; nverts];
        // Cheapest known link from the tree to every frontier vertex.
        let mut frontier: Vec<Option<(VH, f64)>> = vec![None; nverts];
        let mut visited = vec![false; nverts];
        let mut queue: Queue<VH, (f64, u32)> = Queue::new(nverts);
        visited[usize::from(root)] = true;
        for &(nb, dist) in graph.neighbors(root)? {
            queue.insert(nb, (dist, nb.index()));
            frontier[usize::from(nb)] = Some((root, dist));
        }
        while let Some((v, _)) = queue.pop() {
            let vi = usize::from(v);
            visited[vi] = true;
            parent[vi] = frontier[vi].take();
            for &(nb, dist) in graph.neighbors(v)? {
                let ni = usize::from(nb);
                if !visited[ni] && queue.decrease(nb, (dist, nb.index())) {
                    frontier[ni] = Some((v, dist));
                }
            }
        }
        self.finish(graph, root, parent)?;
        log::debug!("Built minimum spanning tree rooted at {}", root);
        Ok(())
    }

    /// Grow a shortest path tree from `root` with Dijkstra's algorithm.
    ///
    /// If an annotation is given, every vertex is labelled with the sum of the
    /// edge annotations along its tree path from the root. The root gets the
    /// null vector.
    pub fn build_spt(
        &mut self,
        graph: &MeshGraph,
        root: VH,
        annotation: Option<&Annotation>,
    ) -> Result<(), Error> {
        self.check_unbuilt(graph, root)?;
        let nverts = graph.num_vertices();
        let mut parent: Vec<Option<(VH, f64)>> = vec![None; nverts];
        let mut dists = vec![f64::INFINITY; nverts];
        let mut done = vec![false; nverts];
        let mut labels: Vec<BitVector> = match annotation {
            Some(ann) => vec![ann.null().clone(); nverts],
            None => Vec::new(),
        };
        let mut queue: Queue<VH, (f64, u32)> = Queue::new(nverts);
        dists[usize::from(root)] = 0.0;
        queue.insert(root, (0.0, root.index()));
        while let Some((v, (vdist, _))) = queue.pop() {
            let vi = usize::from(v);
            done[vi] = true;
            for &(nb, len) in graph.neighbors(v)? {
                let ni = usize::from(nb);
                let alt = vdist + len;
                if done[ni] || alt >= dists[ni] {
                    continue;
                }
                dists[ni] = alt;
                parent[ni] = Some((v, len));
                queue.insert(nb, (alt, nb.index()));
                if let Some(ann) = annotation {
                    let label = &labels[vi] ^ ann.edge(v, nb);
                    labels[ni] = label;
                }
            }
        }
        self.finish(graph, root, parent)?;
        self.dists = dists;
        self.annotation = labels;
        log::debug!("Built shortest path tree rooted at {}", root);
        Ok(())
    }

    /// Record the parents, and collect the residual edges.
    fn finish(
        &mut self,
        graph: &MeshGraph,
        root: VH,
        parent: Vec<Option<(VH, f64)>>,
    ) -> Result<(), Error> {
        let reached = 1 + parent.iter().flatten().count();
        if reached != graph.num_vertices() {
            return Err(Error::DisconnectedGraph {
                reached,
                expected: graph.num_vertices(),
            });
        }
        let mut in_tree = vec![false; graph.num_edges()];
        for (child, link) in graph.vertices().zip(parent.iter()) {
            if let Some((p, _)) = link {
                let e = graph.edge_index(child, *p).ok_or(Error::NotAnEdge(child, *p))?;
                in_tree[usize::from(e)] = true;
            }
        }
        self.residual = graph
            .edges()
            .zip(in_tree)
            .filter_map(|((a, b, _), used)| if used { None } else { Some((a, b)) })
            .collect();
        self.parent = parent;
        self.root = Some(root);
        Ok(())
    }

    pub fn root(&self) -> Option<VH> {
        self.root
    }

    /// Parent of `v` and the length of the edge to it. `None` for the root.
    pub fn parent(&self, v: VH) -> Option<(VH, f64)> {
        self.parent.get(usize::from(v)).copied().flatten()
    }

    /// Number of edges in the tree.
    pub fn num_edges(&self) -> usize {
        self.parent.iter().flatten().count()
    }

    /// Graph edges that are not part of this tree, as canonical vertex pairs.
    pub fn residual_edges(&self) -> &[(VH, VH)] {
        &self.residual
    }

    /// Distance from the root along the tree. Only available for shortest path
    /// trees.
    pub fn distance(&self, v: VH) -> Option<f64> {
        self.dists.get(usize::from(v)).copied()
    }

    /// Annotation of the tree path from the root to `v`. Only available for
    /// shortest path trees built with an annotation.
    pub fn vertex_annotation(&self, v: VH) -> Option<&BitVector> {
        self.annotation.get(usize::from(v))
    }

    /// Vertices from `v` up to and including the root.
    pub fn path_to_root(&self, v: VH) -> Result<Vec<VH>, Error> {
        if !self.is_built() {
            return Err(Error::TreeNotBuilt);
        }
        if usize::from(v) >= self.parent.len() {
            return Err(Error::VertexOutOfBounds(v));
        }
        let mut path = vec![v];
        let mut current = v;
        while let Some((p, _)) = self.parent(current) {
            path.push(p);
            current = p;
        }
        Ok(path)
    }

    /// The tree path from `start` to `end`, including both.
    ///
    /// Both vertices are walked up to the root, and the shared trunk above the
    /// vertex where the two walks meet is dropped.
    pub fn get_path(&self, start: VH, end: VH) -> Result<Vec<VH>, Error> {
        if start == end {
            return Err(Error::DegeneratePath(start));
        }
        let mut spath = self.path_to_root(start)?;
        let mut epath = self.path_to_root(end)?;
        let mut junction = start;
        while let (Some(&a), Some(&b)) = (spath.last(), epath.last()) {
            if a != b {
                break;
            }
            junction = a;
            spath.pop();
            epath.pop();
        }
        spath.push(junction);
        spath.extend(epath.into_iter().rev());
        Ok(spath)
    }
}

#[cfg(test)]
mod test {
    use super::SpanningTree;
    use crate::{
        annotate::Annotation,
        element::VH,
        error::Error,
        graph::MeshGraph,
        linalg::BitVector,
        primitive,
    };
    use glam::DVec3;
    use proptest::prelude::*;

    fn vh(i: u32) -> VH {
        i.into()
    }

    /// Tetrahedron squashed flat onto the rectangle 0-1-2-3, twice as wide as
    /// it is tall. Both diagonals are edges.
    fn flat_tet() -> MeshGraph {
        let points = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(2.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ];
        MeshGraph::new(points, &[[0, 1, 2], [0, 2, 3], [0, 1, 3], [1, 2, 3]]).unwrap()
    }

    #[test]
    fn t_mst_picks_short_edges() {
        let graph = flat_tet();
        let mut tree = SpanningTree::new();
        tree.build_mst(&graph, vh(0)).unwrap();
        assert_eq!(Some(vh(0)), tree.root());
        assert_eq!(3, tree.num_edges());
        assert_eq!(None, tree.parent(vh(0)));
        assert_eq!(Some((vh(0), 1.0)), tree.parent(vh(3)));
        // 1 and 2 are both 2 away from the tree after 3 joins, the lower index
        // goes first and then pulls 2 closer.
        assert_eq!(Some((vh(0), 2.0)), tree.parent(vh(1)));
        assert_eq!(Some((vh(1), 1.0)), tree.parent(vh(2)));
        assert_eq!(
            &[(vh(0), vh(2)), (vh(2), vh(3)), (vh(1), vh(3))],
            tree.residual_edges()
        );
        assert_eq!(None, tree.distance(vh(1)));
    }

    #[test]
    fn t_spt_distances() {
        let graph = flat_tet();
        let mut tree = SpanningTree::new();
        tree.build_spt(&graph, vh(0), None).unwrap();
        assert_eq!(Some(0.0), tree.distance(vh(0)));
        assert_eq!(Some(2.0), tree.distance(vh(1)));
        assert_eq!(Some(1.0), tree.distance(vh(3)));
        assert_eq!(Some(5f64.sqrt()), tree.distance(vh(2)));
        assert_eq!(Some((vh(0), 5f64.sqrt())), tree.parent(vh(2)));
        assert_eq!(
            &[(vh(1), vh(2)), (vh(2), vh(3)), (vh(1), vh(3))],
            tree.residual_edges()
        );
        assert_eq!(None, tree.vertex_annotation(vh(2)));
    }

    #[test]
    fn t_build_once() {
        let graph = flat_tet();
        let mut tree = SpanningTree::new();
        assert_eq!(Err(Error::TreeNotBuilt), tree.get_path(vh(0), vh(1)));
        tree.build_mst(&graph, vh(0)).unwrap();
        assert_eq!(Err(Error::TreeAlreadyBuilt), tree.build_mst(&graph, vh(1)));
        assert_eq!(
            Err(Error::TreeAlreadyBuilt),
            tree.build_spt(&graph, vh(0), None)
        );
        let mut other = SpanningTree::new();
        assert_eq!(
            Err(Error::VertexOutOfBounds(vh(9))),
            other.build_spt(&graph, vh(9), None)
        );
    }

    #[test]
    fn t_disconnected() {
        // Two separate tetrahedra.
        let tet = primitive::tetrahedron();
        let mut points = tet.points.clone();
        points.extend(tet.points.iter().map(|p| *p + DVec3::splat(5.0)));
        let mut triangles = tet.triangles.clone();
        triangles.extend(tet.triangles.iter().map(|t| t.map(|i| i + 4)));
        // Two spheres have Euler characteristic 4, which is a whole genus.
        let graph = MeshGraph::new(points, &triangles).unwrap();
        assert_eq!(
            Err(Error::DisconnectedGraph {
                reached: 4,
                expected: 8
            }),
            SpanningTree::new().build_mst(&graph, vh(0))
        );
        assert!(matches!(
            SpanningTree::new().build_spt(&graph, vh(5), None),
            Err(Error::DisconnectedGraph { reached: 4, .. })
        ));
        assert!(graph.minimum_spanning_tree().is_err());
    }

    #[test]
    fn t_get_path() {
        let graph = flat_tet();
        let mut tree = SpanningTree::new();
        tree.build_mst(&graph, vh(0)).unwrap();
        // Chain 3 - 0 - 1 - 2.
        assert_eq!(vec![vh(2), vh(1), vh(0)], tree.path_to_root(vh(2)).unwrap());
        assert_eq!(vec![vh(2), vh(1), vh(0), vh(3)], tree.get_path(vh(2), vh(3)).unwrap());
        assert_eq!(vec![vh(3), vh(0), vh(1), vh(2)], tree.get_path(vh(3), vh(2)).unwrap());
        assert_eq!(vec![vh(1), vh(2)], tree.get_path(vh(1), vh(2)).unwrap());
        assert_eq!(vec![vh(0), vh(1), vh(2)], tree.get_path(vh(0), vh(2)).unwrap());
        assert_eq!(Err(Error::DegeneratePath(vh(2))), tree.get_path(vh(2), vh(2)));
    }

    #[test]
    fn t_get_path_through_junction() {
        let graph = primitive::octahedron(1.0).graph().unwrap();
        let mut tree = SpanningTree::new();
        tree.build_spt(&graph, vh(4), None).unwrap();
        // Every equator vertex hangs directly off the pole.
        for v in 0..4 {
            assert_eq!(Some(vh(4)), tree.parent(vh(v)).map(|(p, _)| p));
        }
        assert_eq!(vec![vh(0), vh(4), vh(1)], tree.get_path(vh(0), vh(1)).unwrap());
    }

    #[test]
    fn t_spt_annotation_propagates() {
        let graph = flat_tet();
        let mut ann = Annotation::new(2);
        ann.insert(vh(3), vh(0), BitVector::from_values(&[1u8, 0]).unwrap())
            .unwrap();
        ann.insert(vh(0), vh(2), BitVector::from_values(&[0u8, 1]).unwrap())
            .unwrap();
        let mut tree = SpanningTree::new();
        tree.build_spt(&graph, vh(0), Some(&ann)).unwrap();
        let label = |v| tree.vertex_annotation(vh(v)).unwrap().to_values();
        assert_eq!(vec![0, 0], label(0));
        assert_eq!(vec![0, 0], label(1));
        assert_eq!(vec![0, 1], label(2));
        assert_eq!(vec![1, 0], label(3));
    }

    #[test]
    fn t_spt_labels_follow_parents() {
        let graph = primitive::torus(3.0, 1.0, 8, 6).graph().unwrap();
        let mut ann = Annotation::new(3);
        for (i, (a, b, _)) in graph.edges().enumerate() {
            let bits: BitVector = (0..3).map(|k| (i >> k) & 1 == 1).collect();
            ann.insert(a, b, bits).unwrap();
        }
        let mut tree = SpanningTree::new();
        tree.build_spt(&graph, vh(7), Some(&ann)).unwrap();
        assert!(tree.vertex_annotation(vh(7)).unwrap().is_zero());
        for v in graph.vertices() {
            let Some((p, len)) = tree.parent(v) else {
                assert_eq!(vh(7), v);
                continue;
            };
            let expected = tree.vertex_annotation(p).unwrap() ^ ann.edge(p, v);
            assert_eq!(&expected, tree.vertex_annotation(v).unwrap());
            let dist = tree.distance(p).unwrap() + len;
            assert!((dist - tree.distance(v).unwrap()).abs() < 1e-12);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn p_tree_paths_are_simple_chains(root in 0u32..48, a in 0u32..48, b in 0u32..48) {
            prop_assume!(a != b);
            let graph = primitive::torus(3.0, 1.0, 8, 6).graph().unwrap();
            let mut tree = SpanningTree::new();
            tree.build_spt(&graph, vh(root), None).unwrap();
            let path = tree.get_path(vh(a), vh(b)).unwrap();
            prop_assert_eq!(vh(a), path[0]);
            prop_assert_eq!(vh(b), *path.last().unwrap());
            // A tree path never repeats an edge, so its chain is binary and has
            // exactly one edge per step.
            let vector = graph.path_vector(&path).unwrap();
            prop_assert_eq!(path.len() - 1, vector.count_ones());
            let length = graph.path_length(&path).unwrap();
            prop_assert!(length >= graph.point(vh(a)).unwrap().distance(graph.point(vh(b)).unwrap()) - 1e-9);
        }
    }
}
