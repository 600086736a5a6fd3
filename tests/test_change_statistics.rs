//! Every change statistic must equal the difference of its from-scratch
//! sufficient statistic across the toggle, on any graph and any candidate
//! arc. The oracles below recompute the statistics from their whole-graph
//! definitions, independently of the incremental formulas under test.

use estimnet::{calc_change_stats, ChangeStatistic, Model, ModelTerm, StructuralStatistic};
use graph::{Graph, NodeAttributes, NodeT, TwoPathMode, CATEGORICAL_NA};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const DECAY: f64 = 2.0;
const TOLERANCE: f64 = 1e-9;

fn mix_count(graph: &Graph, a: NodeT, b: NodeT) -> u32 {
    (0..graph.get_number_of_nodes())
        .filter(|&k| graph.has_arc_from_node_ids(a, k) && graph.has_arc_from_node_ids(k, b))
        .count() as u32
}

fn shared_source_count(graph: &Graph, a: NodeT, b: NodeT) -> u32 {
    (0..graph.get_number_of_nodes())
        .filter(|&k| graph.has_arc_from_node_ids(k, a) && graph.has_arc_from_node_ids(k, b))
        .count() as u32
}

fn shared_target_count(graph: &Graph, a: NodeT, b: NodeT) -> u32 {
    (0..graph.get_number_of_nodes())
        .filter(|&k| graph.has_arc_from_node_ids(a, k) && graph.has_arc_from_node_ids(b, k))
        .count() as u32
}

/// From-scratch value of a directed structural statistic.
fn directed_oracle(statistic: &StructuralStatistic, graph: &Graph) -> f64 {
    let n = graph.get_number_of_nodes();
    match *statistic {
        StructuralStatistic::Arc => graph.get_number_of_arcs() as f64,
        StructuralStatistic::Reciprocity => {
            let mut mutual = 0;
            for a in 0..n {
                for b in a + 1..n {
                    if graph.has_arc_from_node_ids(a, b) && graph.has_arc_from_node_ids(b, a) {
                        mutual += 1;
                    }
                }
            }
            mutual as f64
        }
        StructuralStatistic::Sink => (0..n)
            .filter(|&v| {
                graph.get_out_degree_from_node_id(v) == 0 && graph.get_in_degree_from_node_id(v) > 0
            })
            .count() as f64,
        StructuralStatistic::Source => (0..n)
            .filter(|&v| {
                graph.get_in_degree_from_node_id(v) == 0 && graph.get_out_degree_from_node_id(v) > 0
            })
            .count() as f64,
        StructuralStatistic::Isolates => (0..n)
            .filter(|&v| {
                graph.get_in_degree_from_node_id(v) == 0
                    && graph.get_out_degree_from_node_id(v) == 0
            })
            .count() as f64,
        StructuralStatistic::Loop => (0..n)
            .filter(|&v| graph.has_arc_from_node_ids(v, v))
            .count() as f64,
        StructuralStatistic::AltInStars { decay } => {
            let y = 1.0 - 1.0 / decay;
            decay
                * decay
                * (0..n)
                    .map(|v| {
                        let degree = graph.get_in_degree_from_node_id(v) as f64;
                        y.powi(degree as i32) - 1.0 + degree / decay
                    })
                    .sum::<f64>()
        }
        StructuralStatistic::AltOutStars { decay } => {
            let y = 1.0 - 1.0 / decay;
            decay
                * decay
                * (0..n)
                    .map(|v| {
                        let degree = graph.get_out_degree_from_node_id(v) as f64;
                        y.powi(degree as i32) - 1.0 + degree / decay
                    })
                    .sum::<f64>()
        }
        StructuralStatistic::AltKTrianglesT { decay } => {
            let y = 1.0 - 1.0 / decay;
            graph
                .iter_arc_node_ids()
                .map(|(a, b)| decay * (1.0 - y.powi(mix_count(graph, a, b) as i32)))
                .sum()
        }
        StructuralStatistic::AltKTrianglesC { decay } => {
            let y = 1.0 - 1.0 / decay;
            graph
                .iter_arc_node_ids()
                .map(|(a, b)| decay * (1.0 - y.powi(mix_count(graph, b, a) as i32)))
                .sum()
        }
        StructuralStatistic::AltTwoPathsT { decay } => {
            let y = 1.0 - 1.0 / decay;
            let mut total = 0.0;
            for a in 0..n {
                for b in 0..n {
                    if a != b {
                        total += decay * (1.0 - y.powi(mix_count(graph, a, b) as i32));
                    }
                }
            }
            total
        }
        StructuralStatistic::AltTwoPathsD { decay } => {
            let y = 1.0 - 1.0 / decay;
            let mut total = 0.0;
            for a in 0..n {
                for b in a + 1..n {
                    total += decay * (1.0 - y.powi(shared_source_count(graph, a, b) as i32));
                }
            }
            total
        }
        StructuralStatistic::AltTwoPathsU { decay } => {
            let y = 1.0 - 1.0 / decay;
            let mut total = 0.0;
            for a in 0..n {
                for b in a + 1..n {
                    total += decay * (1.0 - y.powi(shared_target_count(graph, a, b) as i32));
                }
            }
            total
        }
        StructuralStatistic::AltTwoPathsTD { decay } => {
            directed_oracle(&StructuralStatistic::AltTwoPathsT { decay }, graph)
                + directed_oracle(&StructuralStatistic::AltTwoPathsD { decay }, graph)
        }
        _ => unreachable!("not a directed statistic"),
    }
}

/// From-scratch value of an undirected structural statistic.
fn undirected_oracle(statistic: &StructuralStatistic, graph: &Graph) -> f64 {
    let n = graph.get_number_of_nodes();
    match *statistic {
        StructuralStatistic::Edge => graph.get_number_of_arcs() as f64,
        StructuralStatistic::Isolates => (0..n)
            .filter(|&v| graph.get_degree_from_node_id(v) == 0)
            .count() as f64,
        StructuralStatistic::AltStars { decay } => {
            let y = 1.0 - 1.0 / decay;
            decay
                * decay
                * (0..n)
                    .map(|v| {
                        let degree = graph.get_degree_from_node_id(v) as f64;
                        y.powi(degree as i32) - 1.0 + degree / decay
                    })
                    .sum::<f64>()
        }
        StructuralStatistic::AltKTriangles { decay } => {
            let y = 1.0 - 1.0 / decay;
            graph
                .iter_arc_node_ids()
                .map(|(a, b)| decay * (1.0 - y.powi(mix_count(graph, a, b) as i32)))
                .sum()
        }
        StructuralStatistic::AltTwoPaths { decay } => {
            let y = 1.0 - 1.0 / decay;
            let mut total = 0.0;
            for a in 0..n {
                for b in a + 1..n {
                    total += decay * (1.0 - y.powi(mix_count(graph, a, b) as i32));
                }
            }
            total
        }
        _ => unreachable!("not an undirected statistic"),
    }
}

fn random_directed_graph(n: NodeT, density: f64, seed: u64) -> Result<Graph, String> {
    let mut graph = Graph::new(true, n, None, TwoPathMode::Dense)?;
    let mut rng = SmallRng::seed_from_u64(seed);
    for src in 0..n {
        for dst in 0..n {
            if src != dst && rng.gen::<f64>() < density {
                graph.insert_arc(src, dst)?;
            }
        }
    }
    Ok(graph)
}

fn random_undirected_graph(n: NodeT, density: f64, seed: u64) -> Result<Graph, String> {
    let mut graph = Graph::new(false, n, None, TwoPathMode::Dense)?;
    let mut rng = SmallRng::seed_from_u64(seed);
    for a in 0..n {
        for b in a + 1..n {
            if rng.gen::<f64>() < density {
                graph.insert_arc(a, b)?;
            }
        }
    }
    Ok(graph)
}

fn check_toggle_deltas<F>(
    graph: &mut Graph,
    statistic: StructuralStatistic,
    include_loops: bool,
    oracle: F,
) -> Result<(), String>
where
    F: Fn(&StructuralStatistic, &Graph) -> f64,
{
    let n = graph.get_number_of_nodes();
    for src in 0..n {
        for dst in 0..n {
            if graph.has_arc_from_node_ids(src, dst) {
                continue;
            }
            if src == dst && !include_loops {
                continue;
            }
            let change = ChangeStatistic::Structural(statistic).evaluate(graph, src, dst);
            let before = oracle(&statistic, graph);
            graph.insert_arc(src, dst)?;
            let after = oracle(&statistic, graph);
            graph.remove_arc(src, dst)?;
            if (change - (after - before)).abs() > TOLERANCE {
                return Err(format!(
                    "{:?}: the change of adding {} -> {} is {} but the oracle difference is {}.",
                    statistic,
                    src,
                    dst,
                    change,
                    after - before
                ));
            }
        }
    }
    Ok(())
}

#[test]
/// Every directed structural statistic agrees with its oracle difference
/// on random graphs of up to ten nodes.
fn test_directed_structural_deltas() -> Result<(), String> {
    let statistics = [
        StructuralStatistic::Arc,
        StructuralStatistic::Reciprocity,
        StructuralStatistic::Sink,
        StructuralStatistic::Source,
        StructuralStatistic::Isolates,
        StructuralStatistic::AltInStars { decay: DECAY },
        StructuralStatistic::AltOutStars { decay: DECAY },
        StructuralStatistic::AltKTrianglesT { decay: DECAY },
        StructuralStatistic::AltKTrianglesC { decay: DECAY },
        StructuralStatistic::AltTwoPathsT { decay: DECAY },
        StructuralStatistic::AltTwoPathsD { decay: DECAY },
        StructuralStatistic::AltTwoPathsU { decay: DECAY },
        StructuralStatistic::AltTwoPathsTD { decay: DECAY },
    ];
    for seed in 0..8 {
        let mut graph = random_directed_graph(8, 0.25, seed)?;
        for statistic in statistics.iter() {
            check_toggle_deltas(&mut graph, *statistic, false, directed_oracle)?;
        }
        // A sparser and a denser graph with a different decay.
        let mut graph = random_directed_graph(10, 0.5, seed + 100)?;
        for statistic in [
            StructuralStatistic::AltInStars { decay: 3.0 },
            StructuralStatistic::AltKTrianglesT { decay: 3.0 },
            StructuralStatistic::AltTwoPathsTD { decay: 3.0 },
        ]
        .iter()
        {
            check_toggle_deltas(&mut graph, *statistic, false, directed_oracle)?;
        }
    }
    Ok(())
}

#[test]
/// The structural statistics stay exact when self-loops are allowed,
/// including loop toggles themselves.
fn test_loop_deltas() -> Result<(), String> {
    let mut graph = random_directed_graph(6, 0.3, 0x1007)?;
    graph.insert_arc(2, 2)?;
    // The alternating path statistics are excluded here: their change
    // formulas assume a loop-free graph and the configuration validation
    // keeps them apart from allowLoops.
    for statistic in [
        StructuralStatistic::Loop,
        StructuralStatistic::Arc,
        StructuralStatistic::Reciprocity,
        StructuralStatistic::Sink,
        StructuralStatistic::Source,
        StructuralStatistic::Isolates,
        StructuralStatistic::AltInStars { decay: DECAY },
        StructuralStatistic::AltOutStars { decay: DECAY },
    ]
    .iter()
    {
        check_toggle_deltas(&mut graph, *statistic, true, directed_oracle)?;
    }
    Ok(())
}

#[test]
/// Every undirected structural statistic agrees with its oracle difference.
fn test_undirected_structural_deltas() -> Result<(), String> {
    let statistics = [
        StructuralStatistic::Edge,
        StructuralStatistic::Isolates,
        StructuralStatistic::AltStars { decay: DECAY },
        StructuralStatistic::AltKTriangles { decay: DECAY },
        StructuralStatistic::AltTwoPaths { decay: DECAY },
    ];
    for seed in 0..8 {
        let mut graph = random_undirected_graph(9, 0.3, seed)?;
        for statistic in statistics.iter() {
            check_toggle_deltas(&mut graph, *statistic, false, undirected_oracle)?;
        }
    }
    Ok(())
}

#[test]
/// The aggregator is pure: two evaluations of the same candidate produce
/// bit-identical outputs, the delete total is the negated add total, and
/// the graph is untouched.
fn test_calc_change_stats_purity() -> Result<(), String> {
    let graph = random_directed_graph(8, 0.3, 7)?;
    let model = Model {
        terms: vec![
            ModelTerm {
                name: "Arc".to_string(),
                statistic: ChangeStatistic::Structural(StructuralStatistic::Arc),
            },
            ModelTerm {
                name: "AltKTrianglesT".to_string(),
                statistic: ChangeStatistic::Structural(StructuralStatistic::AltKTrianglesT {
                    decay: DECAY,
                }),
            },
        ],
    };
    let theta = vec![-1.5, 0.75];
    let arcs_before = graph.get_number_of_arcs();
    let mut first = vec![0.0; model.len()];
    let mut second = vec![0.0; model.len()];
    for src in 0..8 {
        for dst in 0..8 {
            if src == dst || graph.has_arc_from_node_ids(src, dst) {
                continue;
            }
            let first_total =
                calc_change_stats(&graph, &model, src, dst, &theta, false, &mut first);
            let second_total =
                calc_change_stats(&graph, &model, src, dst, &theta, false, &mut second);
            if first_total.to_bits() != second_total.to_bits() {
                return Err("The aggregator total is not reproducible.".to_string());
            }
            for (a, b) in first.iter().zip(second.iter()) {
                if a.to_bits() != b.to_bits() {
                    return Err("A per-position change is not reproducible.".to_string());
                }
            }
            let delete_total =
                calc_change_stats(&graph, &model, src, dst, &theta, true, &mut second);
            if (first_total + delete_total).abs() > TOLERANCE {
                return Err("The delete total must be the negated add total.".to_string());
            }
        }
    }
    if graph.get_number_of_arcs() != arcs_before {
        return Err("The aggregator mutated the graph.".to_string());
    }
    Ok(())
}

/// Write one column of every attribute kind and attach them to the graph.
/// The chosen node carries the missing-value sentinel in every column.
fn attach_attributes(graph: &mut Graph, n: NodeT, missing_node: NodeT) -> Result<(), String> {
    let mut binary = Vec::new();
    let mut categorical = Vec::new();
    let mut continuous = Vec::new();
    let mut sets = Vec::new();
    for node in 0..n {
        if node == missing_node {
            binary.push("NA".to_string());
            categorical.push("NA".to_string());
            continuous.push("NA".to_string());
            sets.push("NA".to_string());
        } else {
            binary.push((node % 2).to_string());
            categorical.push((node % 3).to_string());
            continuous.push(format!("{}.5", node));
            sets.push(format!("{},{}", node % 2, node % 4));
        }
    }
    let base = std::env::temp_dir()
        .join("estimnet_attr_fixture")
        .to_str()
        .unwrap()
        .to_string();
    std::fs::write(
        format!("{}_bin.txt", base),
        format!("flag\n{}\n", binary.join("\n")),
    )
    .map_err(|error| error.to_string())?;
    std::fs::write(
        format!("{}_cat.txt", base),
        format!("group\n{}\n", categorical.join("\n")),
    )
    .map_err(|error| error.to_string())?;
    std::fs::write(
        format!("{}_cont.txt", base),
        format!("score\n{}\n", continuous.join("\n")),
    )
    .map_err(|error| error.to_string())?;
    std::fs::write(
        format!("{}_set.txt", base),
        format!("tags\n{}\n", sets.join("\n")),
    )
    .map_err(|error| error.to_string())?;
    let mut attributes = NodeAttributes::default();
    attributes.load_binary_file(&format!("{}_bin.txt", base))?;
    attributes.load_categorical_file(&format!("{}_cat.txt", base))?;
    attributes.load_continuous_file(&format!("{}_cont.txt", base))?;
    attributes.load_set_file(&format!("{}_set.txt", base))?;
    graph.set_attributes(attributes)?;
    Ok(())
}

/// From-scratch oracle of an attribute, dyadic or interaction term,
/// recomputed from the raw attribute columns.
fn attribute_oracle(name: &str, graph: &Graph) -> Result<f64, String> {
    let flag = graph.get_binary_attribute_id_from_name("flag")?;
    let group = graph.get_categorical_attribute_id_from_name("group")?;
    let score = graph.get_continuous_attribute_id_from_name("score")?;
    let tags = graph.get_set_attribute_id_from_name("tags")?;
    let dyad_value = |src: NodeT, dst: NodeT| -> f64 {
        let src_group = graph.get_categorical_attribute_value(group, src);
        let dst_group = graph.get_categorical_attribute_value(group, dst);
        let src_score = graph.get_continuous_attribute_value(score, src);
        let dst_score = graph.get_continuous_attribute_value(score, dst);
        match name {
            "Sender_flag" => (graph.get_binary_attribute_value(flag, src) == 1) as u8 as f64,
            "Receiver_flag" => (graph.get_binary_attribute_value(flag, dst) == 1) as u8 as f64,
            "Interaction_flag" => {
                (graph.get_binary_attribute_value(flag, src) == 1
                    && graph.get_binary_attribute_value(flag, dst) == 1) as u8 as f64
            }
            "Matching_group" => {
                (src_group != CATEGORICAL_NA && src_group == dst_group) as u8 as f64
            }
            "Mismatching_group" => (src_group != CATEGORICAL_NA
                && dst_group != CATEGORICAL_NA
                && src_group != dst_group) as u8 as f64,
            "ContinuousSender_score" => {
                if src_score.is_nan() {
                    0.0
                } else {
                    src_score
                }
            }
            "ContinuousReceiver_score" => {
                if dst_score.is_nan() {
                    0.0
                } else {
                    dst_score
                }
            }
            "Diff_score" => {
                if src_score.is_nan() || dst_score.is_nan() {
                    0.0
                } else {
                    (src_score - dst_score).abs()
                }
            }
            "Sum_score" => {
                if src_score.is_nan() || dst_score.is_nan() {
                    0.0
                } else {
                    src_score + dst_score
                }
            }
            "JaccardSimilarity_tags" => match (
                graph.get_set_attribute_value(tags, src),
                graph.get_set_attribute_value(tags, dst),
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
            },
            "EuclideanDistance_score_score" => {
                if src_score.is_nan() || dst_score.is_nan() {
                    0.0
                } else {
                    // Both axes read the same column, so the distance
                    // reduces to sqrt(2) times the absolute difference.
                    std::f64::consts::SQRT_2 * (src_score - dst_score).abs()
                }
            }
            "MatchingInteraction_group_group" => {
                (src_group != CATEGORICAL_NA && src_group == dst_group) as u8 as f64
            }
            other => unreachable!("no oracle for {}", other),
        }
    };
    if name == "MatchingReciprocity_group" {
        let n = graph.get_number_of_nodes();
        let mut total = 0.0;
        for a in 0..n {
            for b in a + 1..n {
                let a_group = graph.get_categorical_attribute_value(group, a);
                if a_group != CATEGORICAL_NA
                    && a_group == graph.get_categorical_attribute_value(group, b)
                    && graph.has_arc_from_node_ids(a, b)
                    && graph.has_arc_from_node_ids(b, a)
                {
                    total += 1.0;
                }
            }
        }
        return Ok(total);
    }
    Ok(graph
        .iter_arc_node_ids()
        .map(|(src, dst)| dyad_value(src, dst))
        .sum())
}

#[test]
/// Attribute, dyadic and interaction statistics agree with their oracle
/// differences, the telescoped whole-graph statistics match the oracles,
/// and toggles touching an all-sentinel node contribute nothing.
fn test_attribute_deltas() -> Result<(), String> {
    let n = 8;
    let missing_node = 3;
    let mut graph = random_directed_graph(n, 0.25, 11)?;
    attach_attributes(&mut graph, n, missing_node)?;
    let mut config = estimnet::Config::default();
    config.attr_params = vec![
        spec("Sender", &["flag"]),
        spec("Receiver", &["flag"]),
        spec("Interaction", &["flag"]),
        spec("Matching", &["group"]),
        spec("MatchingReciprocity", &["group"]),
        spec("Mismatching", &["group"]),
        spec("ContinuousSender", &["score"]),
        spec("ContinuousReceiver", &["score"]),
        spec("Diff", &["score"]),
        spec("Sum", &["score"]),
        spec("JaccardSimilarity", &["tags"]),
    ];
    config.dyadic_params = vec![spec("EuclideanDistance", &["score", "score"])];
    config.attr_interaction_params = vec![spec("MatchingInteraction", &["group", "group"])];
    let model = estimnet::build_model(&config, &graph)?;

    let telescoped = estimnet::compute_statistics(&graph, &model)?;
    for (position, term) in model.terms.iter().enumerate() {
        let expected = attribute_oracle(&term.name, &graph)?;
        if (telescoped[position] - expected).abs() > TOLERANCE {
            return Err(format!(
                "The telescoped statistic of {} is {} but the oracle gives {}.",
                term.name, telescoped[position], expected
            ));
        }
        for src in 0..n {
            for dst in 0..n {
                if src == dst || graph.has_arc_from_node_ids(src, dst) {
                    continue;
                }
                let change = term.statistic.evaluate(&graph, src, dst);
                let before = attribute_oracle(&term.name, &graph)?;
                graph.insert_arc(src, dst)?;
                let after = attribute_oracle(&term.name, &graph)?;
                graph.remove_arc(src, dst)?;
                if (change - (after - before)).abs() > TOLERANCE {
                    return Err(format!(
                        "{}: the change of adding {} -> {} is {} but the oracle difference is {}.",
                        term.name,
                        src,
                        dst,
                        change,
                        after - before
                    ));
                }
                if (src == missing_node || dst == missing_node) && change != 0.0 {
                    return Err(format!(
                        "{} must be 0 for a toggle touching an all-sentinel node.",
                        term.name
                    ));
                }
            }
        }
    }
    Ok(())
}

fn spec(name: &str, arguments: &[&str]) -> estimnet::ParamSpec {
    estimnet::ParamSpec {
        name: name.to_string(),
        arguments: arguments.iter().map(|argument| argument.to_string()).collect(),
        value: 0.0,
    }
}
