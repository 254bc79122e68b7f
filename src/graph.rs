pub type NodeId = usize;

/// Undirected multigraph with 1-based node ids.
///
/// Every node keeps its incident edges in insertion order, and that order
/// decides which edge [`Graph::select`] picks at a given tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    adj: Vec<Vec<NodeId>>,
    edge_count: usize,
}

impl Graph {
    pub fn new(node_count: usize) -> Self {
        Self {
            adj: vec![Vec::new(); node_count + 1],
            edge_count: 0,
        }
    }

    pub fn from_edges<I>(node_count: usize, edges: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut graph = Self::new(node_count);
        edges.into_iter().for_each(|(u, v)| graph.add_edge(u, v));
        graph
    }

    /// Panics if either endpoint is outside `1..=node_count`, callers validate first.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) {
        assert!(self.contains(u) && self.contains(v), "edge ({u}, {v}) out of range");
        self.adj[u].push(v);
        self.adj[v].push(u);
        self.edge_count += 1;
    }

    pub fn contains(&self, node: NodeId) -> bool {
        (1..=self.node_count()).contains(&node)
    }

    pub fn node_count(&self) -> usize {
        self.adj.len() - 1
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.adj.get(node).map_or(0, Vec::len)
    }

    pub fn neighbours(&self, node: NodeId) -> &[NodeId] {
        self.adj.get(node).map_or(&[][..], Vec::as_slice)
    }

    /// 按时刻选择出边：`edges(u)[t mod d(u)]`，孤立点没有可走的边
    pub fn select(&self, node: NodeId, time: u64) -> Option<NodeId> {
        match self.degree(node) {
            0 => None,
            d => Some(self.adj[node][(time % d as u64) as usize]),
        }
    }
}
