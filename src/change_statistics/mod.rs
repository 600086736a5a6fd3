//! The change-statistic registry.
//!
//! Every model term is a tagged variant carrying the indices it needs, and
//! every variant evaluates through the single [`ChangeStatistic::evaluate`]
//! dispatch: the change of its sufficient statistic induced by *adding* the
//! arc `src -> dst`, computed while the arc is absent and without mutating
//! the graph. Callers negate for deletions.

use crate::config::ParamSpec;
use crate::Config;
use ::graph::{Graph, NodeT, Result};

mod structural;
pub use structural::StructuralStatistic;

mod attribute;
pub use attribute::AttributeStatistic;

mod dyadic;
pub use dyadic::{AttributeInteractionStatistic, DyadicStatistic};

/// Default decay for the alternating statistics.
pub const DEFAULT_DECAY: f64 = 2.0;

/// A single position of the model, bound to one change-statistic function.
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeStatistic {
    Structural(StructuralStatistic),
    Attribute(AttributeStatistic),
    Dyadic(DyadicStatistic),
    AttributeInteraction(AttributeInteractionStatistic),
}

impl ChangeStatistic {
    /// Return the change of the sufficient statistic induced by adding the
    /// arc `src -> dst`, which must be absent from the graph.
    #[inline]
    pub fn evaluate(&self, graph: &Graph, src: NodeT, dst: NodeT) -> f64 {
        match self {
            ChangeStatistic::Structural(statistic) => statistic.evaluate(graph, src, dst),
            ChangeStatistic::Attribute(statistic) => statistic.evaluate(graph, src, dst),
            ChangeStatistic::Dyadic(statistic) => statistic.evaluate(graph, src, dst),
            ChangeStatistic::AttributeInteraction(statistic) => {
                statistic.evaluate(graph, src, dst)
            }
        }
    }
}

/// A named model term.
#[derive(Clone, Debug)]
pub struct ModelTerm {
    /// Column name used in the trajectory files.
    pub name: String,
    pub statistic: ChangeStatistic,
}

/// The model: an ordered list of terms, one per parameter position, in the
/// structural, attribute, dyadic, attribute-interaction order.
#[derive(Clone, Debug, Default)]
pub struct Model {
    pub terms: Vec<ModelTerm>,
}

impl Model {
    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.iter().map(|term| term.name.as_str())
    }

    /// Return the name of the first term whose change formula is not exact
    /// in the presence of self-loops, if any.
    pub fn first_loop_unsafe_term(&self) -> Option<&str> {
        self.terms
            .iter()
            .find(|term| match &term.statistic {
                ChangeStatistic::Structural(statistic) => !statistic.supports_loops(),
                _ => false,
            })
            .map(|term| term.name.as_str())
    }

    /// Return whether the model carries an explicit density term, which the
    /// IFD sampler replaces with its auxiliary parameter.
    pub fn has_density_term(&self) -> bool {
        self.terms.iter().any(|term| {
            matches!(
                term.statistic,
                ChangeStatistic::Structural(StructuralStatistic::Arc)
                    | ChangeStatistic::Structural(StructuralStatistic::Edge)
            )
        })
    }
}

/// Compute every change statistic of the candidate arc and the theta-weighted
/// acceptance total, negated for deletions.
///
/// The per-position changes written into `changes` always keep the
/// add-direction sign; only the returned total flips for deletions, so that
/// the algorithm-S and algorithm-EE accumulators can combine them under their
/// own conventions.
///
/// # Arguments
/// * `graph`: &Graph - The graph, with the candidate arc absent.
/// * `model`: &Model - The model whose terms are evaluated.
/// * `src`: NodeT - The source of the candidate arc.
/// * `dst`: NodeT - The destination of the candidate arc.
/// * `theta`: &[f64] - The current parameter vector.
/// * `is_delete`: bool - Whether the candidate move removes the arc.
/// * `changes`: &mut [f64] - Output slot for the per-position changes.
pub fn calc_change_stats(
    graph: &Graph,
    model: &Model,
    src: NodeT,
    dst: NodeT,
    theta: &[f64],
    is_delete: bool,
    changes: &mut [f64],
) -> f64 {
    let mut total = 0.0;
    for (position, term) in model.terms.iter().enumerate() {
        let change = term.statistic.evaluate(graph, src, dst);
        changes[position] = change;
        total += theta[position] * change;
    }
    if is_delete {
        -total
    } else {
        total
    }
}

/// Build the model from the parameter lists of the configuration, binding
/// attribute names to the columns loaded into the graph.
///
/// # Raises
/// * If a parameter name is unknown for its family.
/// * If a term does not apply to the direction of the graph.
/// * If an attribute name is not loaded.
pub fn build_model(config: &Config, graph: &Graph) -> Result<Model> {
    let mut terms = Vec::new();
    for spec in config.struct_params.iter() {
        terms.push(structural::parse_structural_term(spec, graph)?);
    }
    for spec in config.attr_params.iter() {
        terms.push(attribute::parse_attribute_term(spec, graph)?);
    }
    for spec in config.dyadic_params.iter() {
        terms.push(dyadic::parse_dyadic_term(spec, graph)?);
    }
    for spec in config.attr_interaction_params.iter() {
        terms.push(dyadic::parse_interaction_term(spec, graph)?);
    }
    if terms.is_empty() {
        return Err("The model has no parameters: every parameter list is empty.".to_string());
    }
    Ok(Model { terms })
}

pub(crate) fn single_argument<'a>(spec: &'a ParamSpec, family: &str) -> Result<&'a str> {
    if spec.arguments.len() != 1 {
        return Err(format!(
            "The parameter {} takes exactly one attribute name, found {}.",
            family,
            spec.arguments.len()
        ));
    }
    Ok(&spec.arguments[0])
}

pub(crate) fn argument_pair<'a>(spec: &'a ParamSpec, family: &str) -> Result<(&'a str, &'a str)> {
    if spec.arguments.len() != 2 {
        return Err(format!(
            "The parameter {} takes exactly two attribute names, found {}.",
            family,
            spec.arguments.len()
        ));
    }
    Ok((&spec.arguments[0], &spec.arguments[1]))
}
