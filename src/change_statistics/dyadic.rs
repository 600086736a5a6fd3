//! Dyadic-covariate and attribute-interaction change statistics.

use super::{argument_pair, ChangeStatistic, ModelTerm};
use crate::config::ParamSpec;
use ::graph::{Graph, NodeT, Result, CATEGORICAL_NA};

/// Earth radius in kilometres, for the great-circle distance covariate.
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DyadicStatistic {
    /// Great-circle distance between the endpoints, from latitude and
    /// longitude columns in decimal degrees.
    GeoDistance {
        latitude_attribute_id: usize,
        longitude_attribute_id: usize,
    },
    /// Euclidean distance between the endpoints in a two-dimensional
    /// continuous covariate space.
    EuclideanDistance {
        x_attribute_id: usize,
        y_attribute_id: usize,
    },
}

impl DyadicStatistic {
    #[inline]
    pub(crate) fn evaluate(&self, graph: &Graph, src: NodeT, dst: NodeT) -> f64 {
        match *self {
            DyadicStatistic::GeoDistance {
                latitude_attribute_id,
                longitude_attribute_id,
            } => {
                let src_latitude = graph.get_continuous_attribute_value(latitude_attribute_id, src);
                let src_longitude =
                    graph.get_continuous_attribute_value(longitude_attribute_id, src);
                let dst_latitude = graph.get_continuous_attribute_value(latitude_attribute_id, dst);
                let dst_longitude =
                    graph.get_continuous_attribute_value(longitude_attribute_id, dst);
                if src_latitude.is_nan()
                    || src_longitude.is_nan()
                    || dst_latitude.is_nan()
                    || dst_longitude.is_nan()
                {
                    return 0.0;
                }
                haversine_distance(src_latitude, src_longitude, dst_latitude, dst_longitude)
            }
            DyadicStatistic::EuclideanDistance {
                x_attribute_id,
                y_attribute_id,
            } => {
                let src_x = graph.get_continuous_attribute_value(x_attribute_id, src);
                let src_y = graph.get_continuous_attribute_value(y_attribute_id, src);
                let dst_x = graph.get_continuous_attribute_value(x_attribute_id, dst);
                let dst_y = graph.get_continuous_attribute_value(y_attribute_id, dst);
                if src_x.is_nan() || src_y.is_nan() || dst_x.is_nan() || dst_y.is_nan() {
                    return 0.0;
                }
                ((src_x - dst_x).powi(2) + (src_y - dst_y).powi(2)).sqrt()
            }
        }
    }
}

fn haversine_distance(
    first_latitude: f64,
    first_longitude: f64,
    second_latitude: f64,
    second_longitude: f64,
) -> f64 {
    let delta_latitude = (second_latitude - first_latitude).to_radians();
    let delta_longitude = (second_longitude - first_longitude).to_radians();
    let half_chord = (delta_latitude / 2.0).sin().powi(2)
        + first_latitude.to_radians().cos()
            * second_latitude.to_radians().cos()
            * (delta_longitude / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * half_chord.sqrt().asin()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttributeInteractionStatistic {
    /// Indicator of the endpoints matching on both categorical columns.
    MatchingInteraction {
        first_attribute_id: usize,
        second_attribute_id: usize,
    },
}

impl AttributeInteractionStatistic {
    #[inline]
    pub(crate) fn evaluate(&self, graph: &Graph, src: NodeT, dst: NodeT) -> f64 {
        match *self {
            AttributeInteractionStatistic::MatchingInteraction {
                first_attribute_id,
                second_attribute_id,
            } => {
                let src_first = graph.get_categorical_attribute_value(first_attribute_id, src);
                let dst_first = graph.get_categorical_attribute_value(first_attribute_id, dst);
                let src_second = graph.get_categorical_attribute_value(second_attribute_id, src);
                let dst_second = graph.get_categorical_attribute_value(second_attribute_id, dst);
                (src_first != CATEGORICAL_NA
                    && src_first == dst_first
                    && src_second != CATEGORICAL_NA
                    && src_second == dst_second) as u8 as f64
            }
        }
    }
}

/// Parse one dyadic-covariate parameter specification into a model term.
pub(crate) fn parse_dyadic_term(spec: &ParamSpec, graph: &Graph) -> Result<ModelTerm> {
    let (first, second) = argument_pair(spec, &spec.name)?;
    let statistic = match spec.name.as_str() {
        "GeoDistance" => DyadicStatistic::GeoDistance {
            latitude_attribute_id: graph.get_continuous_attribute_id_from_name(first)?,
            longitude_attribute_id: graph.get_continuous_attribute_id_from_name(second)?,
        },
        "EuclideanDistance" => DyadicStatistic::EuclideanDistance {
            x_attribute_id: graph.get_continuous_attribute_id_from_name(first)?,
            y_attribute_id: graph.get_continuous_attribute_id_from_name(second)?,
        },
        unknown => {
            return Err(format!(
                concat!(
                    "The dyadic parameter {} is not supported. The supported ",
                    "parameters are GeoDistance and EuclideanDistance over pairs ",
                    "of continuous columns."
                ),
                unknown
            ))
        }
    };
    Ok(ModelTerm {
        name: format!("{}_{}_{}", spec.name, first, second),
        statistic: ChangeStatistic::Dyadic(statistic),
    })
}

/// Parse one attribute-interaction parameter specification into a model term.
pub(crate) fn parse_interaction_term(spec: &ParamSpec, graph: &Graph) -> Result<ModelTerm> {
    let (first, second) = argument_pair(spec, &spec.name)?;
    let statistic = match spec.name.as_str() {
        "MatchingInteraction" => AttributeInteractionStatistic::MatchingInteraction {
            first_attribute_id: graph.get_categorical_attribute_id_from_name(first)?,
            second_attribute_id: graph.get_categorical_attribute_id_from_name(second)?,
        },
        unknown => {
            return Err(format!(
                concat!(
                    "The attribute-interaction parameter {} is not supported. ",
                    "The only supported parameter is MatchingInteraction over a ",
                    "pair of categorical columns."
                ),
                unknown
            ))
        }
    };
    Ok(ModelTerm {
        name: format!("{}_{}_{}", spec.name, first, second),
        statistic: ChangeStatistic::AttributeInteraction(statistic),
    })
}
