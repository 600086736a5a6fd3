//! Attribute change statistics.
//!
//! Every formula returns 0 when a node it touches carries the missing-value
//! sentinel of its column.

use super::{single_argument, ChangeStatistic, ModelTerm};
use crate::config::ParamSpec;
use ::graph::{Graph, NodeT, Result, CATEGORICAL_NA};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttributeStatistic {
    // Binary columns.
    Sender { attribute_id: usize },
    Receiver { attribute_id: usize },
    Interaction { attribute_id: usize },
    Activity { attribute_id: usize },
    // Categorical columns.
    Matching { attribute_id: usize },
    MatchingReciprocity { attribute_id: usize },
    Mismatching { attribute_id: usize },
    // Continuous columns.
    ContinuousSender { attribute_id: usize },
    ContinuousReceiver { attribute_id: usize },
    ContinuousActivity { attribute_id: usize },
    Diff { attribute_id: usize },
    Sum { attribute_id: usize },
    // Set columns.
    JaccardSimilarity { attribute_id: usize },
}

impl AttributeStatistic {
    #[inline]
    pub(crate) fn evaluate(&self, graph: &Graph, src: NodeT, dst: NodeT) -> f64 {
        match *self {
            AttributeStatistic::Sender { attribute_id } => {
                (graph.get_binary_attribute_value(attribute_id, src) == 1) as u8 as f64
            }
            AttributeStatistic::Receiver { attribute_id } => {
                (graph.get_binary_attribute_value(attribute_id, dst) == 1) as u8 as f64
            }
            AttributeStatistic::Interaction { attribute_id } => {
                (graph.get_binary_attribute_value(attribute_id, src) == 1
                    && graph.get_binary_attribute_value(attribute_id, dst) == 1)
                    as u8 as f64
            }
            AttributeStatistic::Activity { attribute_id } => {
                (graph.get_binary_attribute_value(attribute_id, src) == 1) as u8 as f64
                    + (graph.get_binary_attribute_value(attribute_id, dst) == 1) as u8 as f64
            }
            AttributeStatistic::Matching { attribute_id } => {
                let first = graph.get_categorical_attribute_value(attribute_id, src);
                let second = graph.get_categorical_attribute_value(attribute_id, dst);
                (first != CATEGORICAL_NA && first == second) as u8 as f64
            }
            AttributeStatistic::MatchingReciprocity { attribute_id } => {
                let first = graph.get_categorical_attribute_value(attribute_id, src);
                let second = graph.get_categorical_attribute_value(attribute_id, dst);
                (first != CATEGORICAL_NA
                    && first == second
                    && graph.has_arc_from_node_ids(dst, src)) as u8 as f64
            }
            AttributeStatistic::Mismatching { attribute_id } => {
                let first = graph.get_categorical_attribute_value(attribute_id, src);
                let second = graph.get_categorical_attribute_value(attribute_id, dst);
                (first != CATEGORICAL_NA && second != CATEGORICAL_NA && first != second) as u8
                    as f64
            }
            AttributeStatistic::ContinuousSender { attribute_id } => {
                finite_or_zero(graph.get_continuous_attribute_value(attribute_id, src))
            }
            AttributeStatistic::ContinuousReceiver { attribute_id } => {
                finite_or_zero(graph.get_continuous_attribute_value(attribute_id, dst))
            }
            AttributeStatistic::ContinuousActivity { attribute_id } => {
                finite_or_zero(graph.get_continuous_attribute_value(attribute_id, src))
                    + finite_or_zero(graph.get_continuous_attribute_value(attribute_id, dst))
            }
            AttributeStatistic::Diff { attribute_id } => {
                let first = graph.get_continuous_attribute_value(attribute_id, src);
                let second = graph.get_continuous_attribute_value(attribute_id, dst);
                if first.is_nan() || second.is_nan() {
                    0.0
                } else {
                    (first - second).abs()
                }
            }
            AttributeStatistic::Sum { attribute_id } => {
                let first = graph.get_continuous_attribute_value(attribute_id, src);
                let second = graph.get_continuous_attribute_value(attribute_id, dst);
                if first.is_nan() || second.is_nan() {
                    0.0
                } else {
                    first + second
                }
            }
            AttributeStatistic::JaccardSimilarity { attribute_id } => {
                match (
                    graph.get_set_attribute_value(attribute_id, src),
                    graph.get_set_attribute_value(attribute_id, dst),
                ) {
                    (Some(first), Some(second)) => {
                        let union = first.union(second).count();
                        if union == 0 {
                            0.0
                        } else {
                            first.intersection(second).count() as f64 / union as f64
                        }
                    }
                    _ => 0.0,
                }
            }
        }
    }

    fn requires_directed(&self) -> bool {
        matches!(
            self,
            AttributeStatistic::Sender { .. }
                | AttributeStatistic::Receiver { .. }
                | AttributeStatistic::MatchingReciprocity { .. }
                | AttributeStatistic::ContinuousSender { .. }
                | AttributeStatistic::ContinuousReceiver { .. }
        )
    }

    fn requires_undirected(&self) -> bool {
        matches!(
            self,
            AttributeStatistic::Activity { .. } | AttributeStatistic::ContinuousActivity { .. }
        )
    }
}

/// Parse one attribute parameter specification into a model term, binding
/// the attribute name to the column of the family the statistic reads.
pub(crate) fn parse_attribute_term(spec: &ParamSpec, graph: &Graph) -> Result<ModelTerm> {
    let attribute_name = single_argument(spec, &spec.name)?;
    let statistic = match spec.name.as_str() {
        "Sender" => AttributeStatistic::Sender {
            attribute_id: graph.get_binary_attribute_id_from_name(attribute_name)?,
        },
        "Receiver" => AttributeStatistic::Receiver {
            attribute_id: graph.get_binary_attribute_id_from_name(attribute_name)?,
        },
        "Interaction" => AttributeStatistic::Interaction {
            attribute_id: graph.get_binary_attribute_id_from_name(attribute_name)?,
        },
        "Activity" => AttributeStatistic::Activity {
            attribute_id: graph.get_binary_attribute_id_from_name(attribute_name)?,
        },
        "Matching" => AttributeStatistic::Matching {
            attribute_id: graph.get_categorical_attribute_id_from_name(attribute_name)?,
        },
        "MatchingReciprocity" => AttributeStatistic::MatchingReciprocity {
            attribute_id: graph.get_categorical_attribute_id_from_name(attribute_name)?,
        },
        "Mismatching" => AttributeStatistic::Mismatching {
            attribute_id: graph.get_categorical_attribute_id_from_name(attribute_name)?,
        },
        "ContinuousSender" => AttributeStatistic::ContinuousSender {
            attribute_id: graph.get_continuous_attribute_id_from_name(attribute_name)?,
        },
        "ContinuousReceiver" => AttributeStatistic::ContinuousReceiver {
            attribute_id: graph.get_continuous_attribute_id_from_name(attribute_name)?,
        },
        "ContinuousActivity" => AttributeStatistic::ContinuousActivity {
            attribute_id: graph.get_continuous_attribute_id_from_name(attribute_name)?,
        },
        "Diff" => AttributeStatistic::Diff {
            attribute_id: graph.get_continuous_attribute_id_from_name(attribute_name)?,
        },
        "Sum" => AttributeStatistic::Sum {
            attribute_id: graph.get_continuous_attribute_id_from_name(attribute_name)?,
        },
        "JaccardSimilarity" => AttributeStatistic::JaccardSimilarity {
            attribute_id: graph.get_set_attribute_id_from_name(attribute_name)?,
        },
        unknown => {
            return Err(format!(
                concat!(
                    "The attribute parameter {} is not supported. The supported ",
                    "parameters are Sender, Receiver, Interaction and Activity ",
                    "over binary columns, Matching, MatchingReciprocity and ",
                    "Mismatching over categorical columns, ContinuousSender, ",
                    "ContinuousReceiver, ContinuousActivity, Diff and Sum over ",
                    "continuous columns, and JaccardSimilarity over set columns."
                ),
                unknown
            ))
        }
    };
    if !graph.is_directed() && statistic.requires_directed() {
        return Err(format!(
            "The attribute parameter {} only applies to directed graphs.",
            spec.name
        ));
    }
    if graph.is_directed() && statistic.requires_undirected() {
        return Err(format!(
            "The attribute parameter {} only applies to undirected graphs.",
            spec.name
        ));
    }
    Ok(ModelTerm {
        name: format!("{}_{}", spec.name, attribute_name),
        statistic: ChangeStatistic::Attribute(statistic),
    })
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}
