//! Whole-graph sufficient statistics.

use crate::change_statistics::{calc_change_stats, Model};
use ::graph::{Graph, Result};
use itertools::izip;

/// Compute the sufficient statistics of the graph by telescoping: strip a
/// scratch copy of every arc, then re-insert them one at a time summing the
/// change statistics. The telescoped sum is exact for any insertion order.
///
/// # Arguments
/// * `graph`: &Graph - The graph to evaluate.
/// * `model`: &Model - The model whose statistics are computed.
pub fn compute_statistics(graph: &Graph, model: &Model) -> Result<Vec<f64>> {
    let mut scratch = graph.clone();
    let arcs: Vec<_> = scratch.iter_arc_node_ids().collect();
    for &(src, dst) in arcs.iter() {
        scratch.remove_arc(src, dst)?;
    }
    let zero_theta = vec![0.0; model.len()];
    let mut statistics = vec![0.0; model.len()];
    let mut changes = vec![0.0; model.len()];
    for &(src, dst) in arcs.iter() {
        calc_change_stats(&scratch, model, src, dst, &zero_theta, false, &mut changes);
        for (statistic, change) in izip!(statistics.iter_mut(), changes.iter()) {
            *statistic += change;
        }
        scratch.insert_arc(src, dst)?;
    }
    Ok(statistics)
}
