/// Type used to index the nodes of the graph.
pub type NodeT = u32;

/// Type used to count dyads, which may overflow a u32 on large graphs.
pub type DyadT = u64;

/// Result type shared by the whole crate.
pub type Result<T> = std::result::Result<T, String>;

/// Sentinel for a missing binary attribute value.
pub const BINARY_NA: i32 = -1;

/// Sentinel for a missing categorical attribute value.
pub const CATEGORICAL_NA: i32 = -1;

/// Return the provided node id validated against the number of nodes.
///
/// # Arguments
/// * `node_id`: NodeT - The node id to validate.
/// * `number_of_nodes`: NodeT - The number of nodes in the graph.
pub(crate) fn validate_node_id(node_id: NodeT, number_of_nodes: NodeT) -> Result<NodeT> {
    if node_id >= number_of_nodes {
        return Err(format!(
            "The node id {} is out of range for a graph with {} nodes.",
            node_id, number_of_nodes
        ));
    }
    Ok(node_id)
}
