use crate::graph::Graph;
use crate::two_paths::TwoPathCounters;
use crate::*;

/// Remove the first occurrence of `value` from the list by swap-removal.
fn remove_from_neighbour_list(list: &mut Vec<NodeT>, value: NodeT) {
    let position = list
        .iter()
        .position(|&neighbour| neighbour == value)
        .unwrap_or_else(|| unreachable!("The incident-arc lists lost an arc they must contain."));
    list.swap_remove(position);
}

/// # Graph mutation methods
///
/// The two methods below are the only way the arc set changes, and they keep
/// every derived index exact: the reverse lists stay the transpose of the
/// forward lists, the flat arc list supports O(1) uniform picks, the
/// two-path tables match a from-scratch recount and the snowball and
/// citation side lists contain exactly the toggleable arcs.
impl Graph {
    /// Return the canonical key of the arc inside the flat list.
    #[inline]
    pub(crate) fn arc_key(&self, src: NodeT, dst: NodeT) -> (NodeT, NodeT) {
        if self.directed || src <= dst {
            (src, dst)
        } else {
            (dst, src)
        }
    }

    /// Insert the arc from `src` to `dst`, updating every derived index.
    ///
    /// # Arguments
    /// * `src`: NodeT - The source node of the arc to insert.
    /// * `dst`: NodeT - The destination node of the arc to insert.
    ///
    /// # Raises
    /// * If either node id is out of range.
    /// * If the arc is already present.
    /// * If a self-loop is inserted in an undirected graph.
    /// * If the endpoints are in the same mode of a bipartite graph.
    pub fn insert_arc(&mut self, src: NodeT, dst: NodeT) -> Result<()> {
        validate_node_id(src, self.number_of_nodes)?;
        validate_node_id(dst, self.number_of_nodes)?;
        if !self.directed && src == dst {
            return Err(format!(
                "Cannot insert the self-loop {0} - {0} in an undirected graph.",
                src
            ));
        }
        if let Some(mode_a) = self.number_of_mode_a_nodes {
            if (src < mode_a) == (dst < mode_a) {
                return Err(format!(
                    "Cannot insert the edge {} - {}: both endpoints are in the same bipartite mode.",
                    src, dst
                ));
            }
        }
        if self.has_arc_from_node_ids(src, dst) {
            return Err(format!("The arc {} -> {} is already present.", src, dst));
        }

        // The delta routine runs while the arc is still absent, so the new
        // paths it counts never include the transient arc itself.
        self.update_two_paths(src, dst, 1);

        self.out_neighbours[src as usize].push(dst);
        if self.directed {
            self.in_neighbours[dst as usize].push(src);
        } else {
            self.out_neighbours[dst as usize].push(src);
        }

        let key = self.arc_key(src, dst);
        self.arc_positions.insert(key, self.arcs.len());
        self.arcs.push(key);

        if let Some(zones) = self.zones.as_mut() {
            let src_zone = zones.zone[src as usize];
            let dst_zone = zones.zone[dst as usize];
            if src_zone == dst_zone + 1 {
                zones.prev_wave_degree[src as usize] += 1;
            }
            if dst_zone == src_zone + 1 {
                zones.prev_wave_degree[dst as usize] += 1;
            }
            if zones.is_inner[src as usize] && zones.is_inner[dst as usize] {
                zones.inner_arc_positions.insert(key, zones.inner_arcs.len());
                zones.inner_arcs.push(key);
            }
        }

        if let Some(terms) = self.terms.as_mut() {
            if terms.is_maxterm[src as usize] {
                terms
                    .maxtermsender_arc_positions
                    .insert(key, terms.maxtermsender_arcs.len());
                terms.maxtermsender_arcs.push(key);
            }
        }

        Ok(())
    }

    /// Remove the arc from `src` to `dst`, updating every derived index.
    ///
    /// # Arguments
    /// * `src`: NodeT - The source node of the arc to remove.
    /// * `dst`: NodeT - The destination node of the arc to remove.
    ///
    /// # Raises
    /// * If either node id is out of range.
    /// * If the arc is not present.
    pub fn remove_arc(&mut self, src: NodeT, dst: NodeT) -> Result<()> {
        validate_node_id(src, self.number_of_nodes)?;
        validate_node_id(dst, self.number_of_nodes)?;
        let key = self.arc_key(src, dst);
        let position = self.arc_positions.remove(&key).ok_or_else(|| {
            format!(
                "Cannot remove the arc {} -> {} since it is not present.",
                src, dst
            )
        })?;

        self.arcs.swap_remove(position);
        if position < self.arcs.len() {
            self.arc_positions.insert(self.arcs[position], position);
        }

        remove_from_neighbour_list(&mut self.out_neighbours[src as usize], dst);
        if self.directed {
            remove_from_neighbour_list(&mut self.in_neighbours[dst as usize], src);
        } else {
            remove_from_neighbour_list(&mut self.out_neighbours[dst as usize], src);
        }

        if let Some(zones) = self.zones.as_mut() {
            let src_zone = zones.zone[src as usize];
            let dst_zone = zones.zone[dst as usize];
            if src_zone == dst_zone + 1 {
                zones.prev_wave_degree[src as usize] -= 1;
            }
            if dst_zone == src_zone + 1 {
                zones.prev_wave_degree[dst as usize] -= 1;
            }
            if let Some(inner_position) = zones.inner_arc_positions.remove(&key) {
                zones.inner_arcs.swap_remove(inner_position);
                if inner_position < zones.inner_arcs.len() {
                    zones
                        .inner_arc_positions
                        .insert(zones.inner_arcs[inner_position], inner_position);
                }
            }
        }

        if let Some(terms) = self.terms.as_mut() {
            if let Some(sender_position) = terms.maxtermsender_arc_positions.remove(&key) {
                terms.maxtermsender_arcs.swap_remove(sender_position);
                if sender_position < terms.maxtermsender_arcs.len() {
                    terms
                        .maxtermsender_arc_positions
                        .insert(terms.maxtermsender_arcs[sender_position], sender_position);
                }
            }
        }

        // Mirror of insertion: the deltas are applied once the arc is gone,
        // so the destroyed paths never include the arc being removed.
        self.update_two_paths(src, dst, -1);

        Ok(())
    }

    /// Apply the two-path deltas of toggling the arc `src -> dst`.
    ///
    /// Must be called while the arc is absent from the incident-arc lists:
    /// before insertion and after removal.
    fn update_two_paths(&mut self, src: NodeT, dst: NodeT, delta: i32) {
        let Graph {
            two_paths,
            out_neighbours,
            in_neighbours,
            ..
        } = self;
        match two_paths {
            TwoPathCounters::Directed {
                mixed,
                shared_source,
                shared_target,
            } => {
                // New mixed paths src -> dst -> k and k -> src -> dst.
                for &k in out_neighbours[dst as usize].iter() {
                    mixed.add(src, k, delta);
                }
                for &k in in_neighbours[src as usize].iter() {
                    mixed.add(k, dst, delta);
                }
                if src == dst {
                    // The loop is both hops of the path src -> src -> src.
                    mixed.add(src, src, delta);
                }
                // dst gains src as an in-neighbour: every other target of
                // src now shares a source with dst.
                for &k in out_neighbours[src as usize].iter() {
                    shared_source.add(dst, k, delta);
                    shared_source.add(k, dst, delta);
                }
                shared_source.add(dst, dst, delta);
                // src gains dst as an out-neighbour: every other sender to
                // dst now shares a target with src.
                for &k in in_neighbours[dst as usize].iter() {
                    shared_target.add(src, k, delta);
                    shared_target.add(k, src, delta);
                }
                shared_target.add(src, src, delta);
            }
            TwoPathCounters::Undirected { paths } => {
                for &k in out_neighbours[dst as usize].iter() {
                    paths.add(src, k, delta);
                    paths.add(k, src, delta);
                }
                for &k in out_neighbours[src as usize].iter() {
                    paths.add(dst, k, delta);
                    paths.add(k, dst, delta);
                }
                paths.add(src, src, delta);
                paths.add(dst, dst, delta);
            }
        }
    }
}
