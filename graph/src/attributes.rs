use crate::*;
use hashbrown::HashSet;

/// Per-node attribute columns, read-only after load.
///
/// Missing values are encoded with the sentinels of the source data: `-1`
/// for binary and categorical columns, NaN for continuous columns and
/// `None` for set columns.
#[derive(Clone, Debug, Default)]
pub struct NodeAttributes {
    pub(crate) binary: Vec<(String, Vec<i32>)>,
    pub(crate) categorical: Vec<(String, Vec<i32>)>,
    pub(crate) continuous: Vec<(String, Vec<f64>)>,
    pub(crate) sets: Vec<(String, Vec<Option<HashSet<u32>>>)>,
}

impl NodeAttributes {
    pub(crate) fn validate(&self, number_of_nodes: NodeT) -> Result<()> {
        let expected = number_of_nodes as usize;
        let mismatch = self
            .binary
            .iter()
            .map(|(name, column)| (name, column.len()))
            .chain(
                self.categorical
                    .iter()
                    .map(|(name, column)| (name, column.len())),
            )
            .chain(
                self.continuous
                    .iter()
                    .map(|(name, column)| (name, column.len())),
            )
            .chain(self.sets.iter().map(|(name, column)| (name, column.len())))
            .find(|(_, len)| *len != expected);
        if let Some((name, len)) = mismatch {
            return Err(format!(
                "The attribute column {} has {} values but the graph has {} nodes.",
                name, len, number_of_nodes
            ));
        }
        Ok(())
    }

    pub(crate) fn add_binary_column(&mut self, name: String, column: Vec<i32>) {
        self.binary.push((name, column));
    }

    pub(crate) fn add_categorical_column(&mut self, name: String, column: Vec<i32>) {
        self.categorical.push((name, column));
    }

    pub(crate) fn add_continuous_column(&mut self, name: String, column: Vec<f64>) {
        self.continuous.push((name, column));
    }

    pub(crate) fn add_set_column(&mut self, name: String, column: Vec<Option<HashSet<u32>>>) {
        self.sets.push((name, column));
    }
}

/// # Attribute queries
impl crate::graph::Graph {
    /// Return the id of the binary attribute with the given name.
    pub fn get_binary_attribute_id_from_name(&self, name: &str) -> Result<usize> {
        column_id(&self.attributes.binary, name, "binary")
    }

    /// Return the id of the categorical attribute with the given name.
    pub fn get_categorical_attribute_id_from_name(&self, name: &str) -> Result<usize> {
        column_id(&self.attributes.categorical, name, "categorical")
    }

    /// Return the id of the continuous attribute with the given name.
    pub fn get_continuous_attribute_id_from_name(&self, name: &str) -> Result<usize> {
        column_id(&self.attributes.continuous, name, "continuous")
    }

    /// Return the id of the set attribute with the given name.
    pub fn get_set_attribute_id_from_name(&self, name: &str) -> Result<usize> {
        column_id(&self.attributes.sets, name, "set")
    }

    /// Return the binary value of the given node, `BINARY_NA` when missing.
    #[inline]
    pub fn get_binary_attribute_value(&self, attribute_id: usize, node_id: NodeT) -> i32 {
        self.attributes.binary[attribute_id].1[node_id as usize]
    }

    /// Return the categorical value of the given node, `CATEGORICAL_NA` when missing.
    #[inline]
    pub fn get_categorical_attribute_value(&self, attribute_id: usize, node_id: NodeT) -> i32 {
        self.attributes.categorical[attribute_id].1[node_id as usize]
    }

    /// Return the continuous value of the given node, NaN when missing.
    #[inline]
    pub fn get_continuous_attribute_value(&self, attribute_id: usize, node_id: NodeT) -> f64 {
        self.attributes.continuous[attribute_id].1[node_id as usize]
    }

    /// Return the category set of the given node, None when missing.
    #[inline]
    pub fn get_set_attribute_value(
        &self,
        attribute_id: usize,
        node_id: NodeT,
    ) -> Option<&HashSet<u32>> {
        self.attributes.sets[attribute_id].1[node_id as usize].as_ref()
    }
}

fn column_id<V>(columns: &[(String, V)], name: &str, kind: &str) -> Result<usize> {
    columns
        .iter()
        .position(|(column_name, _)| column_name == name)
        .ok_or_else(|| {
            format!(
                "There is no {} attribute named {}. The loaded {} attributes are {:?}.",
                kind,
                name,
                kind,
                columns
                    .iter()
                    .map(|(column_name, _)| column_name.as_str())
                    .collect::<Vec<_>>()
            )
        })
}
