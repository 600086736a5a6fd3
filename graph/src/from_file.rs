use crate::attributes::NodeAttributes;
use crate::graph::Graph;
use crate::*;
use hashbrown::HashSet;
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};

fn open_lines(path: &str) -> Result<impl Iterator<Item = Result<String>> + '_> {
    let file = File::open(path)
        .map_err(|error| format!("Cannot open the file {}: {}.", path, error))?;
    Ok(BufReader::new(file).lines().map(move |line| {
        line.map_err(|error| format!("Cannot read the file {}: {}.", path, error))
    }))
}

/// Reader for Pajek arc-list files.
///
/// The format opens with `*vertices N`, optionally followed by a second
/// count for the first bipartite mode, then a `*arcs` or `*edges` section of
/// 1-based `i j` lines.
#[derive(Clone, Debug)]
pub struct PajekFileReader {
    pub(crate) path: String,
    pub(crate) directed: bool,
    pub(crate) two_path_mode: TwoPathMode,
}

impl PajekFileReader {
    /// Return a new reader for the given path, defaulting to a directed
    /// graph with automatically chosen two-path storage.
    pub fn new<S: Into<String>>(path: S) -> PajekFileReader {
        PajekFileReader {
            path: path.into(),
            directed: true,
            two_path_mode: TwoPathMode::Auto,
        }
    }

    pub fn set_directed(mut self, directed: Option<bool>) -> PajekFileReader {
        if let Some(directed) = directed {
            self.directed = directed;
        }
        self
    }

    pub fn set_two_path_mode(mut self, two_path_mode: Option<TwoPathMode>) -> PajekFileReader {
        if let Some(two_path_mode) = two_path_mode {
            self.two_path_mode = two_path_mode;
        }
        self
    }

    /// Load the graph from the file.
    ///
    /// # Raises
    /// * If the file cannot be opened or parsed.
    /// * If an arc references a node outside `1..=N`.
    pub fn load(&self) -> Result<Graph> {
        let mut graph: Option<Graph> = None;
        let mut in_arc_section = false;
        for line in open_lines(&self.path)? {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let lowercase = line.to_lowercase();
            if lowercase.starts_with("*vertices") {
                let mut counts = line.split_whitespace().skip(1);
                let number_of_nodes: NodeT = counts
                    .next()
                    .ok_or_else(|| {
                        format!("The file {} has a *vertices line without a count.", self.path)
                    })?
                    .parse()
                    .map_err(|_| {
                        format!("The file {} has a malformed *vertices count.", self.path)
                    })?;
                let number_of_mode_a_nodes = match counts.next() {
                    Some(token) => Some(token.parse::<NodeT>().map_err(|_| {
                        format!("The file {} has a malformed bipartite mode count.", self.path)
                    })?),
                    None => None,
                };
                graph = Some(Graph::new(
                    self.directed,
                    number_of_nodes,
                    number_of_mode_a_nodes,
                    self.two_path_mode,
                )?);
                continue;
            }
            if lowercase.starts_with("*arcs") || lowercase.starts_with("*edges") {
                if lowercase.starts_with("*edges") && self.directed {
                    warn!(
                        "The file {} declares an *edges section but the graph is read as directed.",
                        self.path
                    );
                }
                in_arc_section = true;
                continue;
            }
            if lowercase.starts_with('*') {
                // Any other section ends the arcs.
                in_arc_section = false;
                continue;
            }
            if !in_arc_section {
                // Vertex label lines are skipped.
                continue;
            }
            let graph = graph.as_mut().ok_or_else(|| {
                format!("The file {} lists arcs before the *vertices line.", self.path)
            })?;
            let mut endpoints = line.split_whitespace();
            let src = parse_pajek_node_id(endpoints.next(), graph, &self.path)?;
            let dst = parse_pajek_node_id(endpoints.next(), graph, &self.path)?;
            if graph.has_arc_from_node_ids(src, dst) {
                warn!(
                    "The file {} lists the arc {} -> {} more than once.",
                    self.path,
                    src + 1,
                    dst + 1
                );
                continue;
            }
            graph.insert_arc(src, dst)?;
        }
        let graph = graph.ok_or_else(|| {
            format!("The file {} does not contain a *vertices line.", self.path)
        })?;
        info!(
            "Loaded graph with {} nodes and {} arcs from {}.",
            graph.get_number_of_nodes(),
            graph.get_number_of_arcs(),
            self.path
        );
        Ok(graph)
    }
}

fn parse_pajek_node_id(token: Option<&str>, graph: &Graph, path: &str) -> Result<NodeT> {
    let node_id: NodeT = token
        .ok_or_else(|| format!("The file {} has an arc line with missing endpoints.", path))?
        .parse()
        .map_err(|_| format!("The file {} has a malformed arc endpoint.", path))?;
    if node_id == 0 || node_id > graph.get_number_of_nodes() {
        return Err(format!(
            "The file {} references node {} which is out of range for {} nodes.",
            path,
            node_id,
            graph.get_number_of_nodes()
        ));
    }
    // Pajek node ids are 1-based.
    Ok(node_id - 1)
}

/// # Pajek output
impl Graph {
    /// Write the graph to the given path in Pajek arc-list form.
    pub fn to_pajek_file(&self, path: &str) -> Result<()> {
        let file = File::create(path)
            .map_err(|error| format!("Cannot create the file {}: {}.", path, error))?;
        let mut writer = BufWriter::new(file);
        let write_error = |error| format!("Cannot write the file {}: {}.", path, error);
        match self.number_of_mode_a_nodes {
            Some(mode_a) => writeln!(writer, "*vertices {} {}", self.number_of_nodes, mode_a),
            None => writeln!(writer, "*vertices {}", self.number_of_nodes),
        }
        .map_err(write_error)?;
        writeln!(writer, "{}", if self.directed { "*arcs" } else { "*edges" })
            .map_err(write_error)?;
        for (src, dst) in self.iter_arc_node_ids() {
            writeln!(writer, "{} {}", src + 1, dst + 1).map_err(write_error)?;
        }
        Ok(())
    }
}

/// Parse the header line of a whitespace-separated attribute file.
fn parse_attribute_header(line: Option<Result<String>>, path: &str) -> Result<Vec<String>> {
    let header = line.ok_or_else(|| format!("The attribute file {} is empty.", path))??;
    Ok(header.split_whitespace().map(str::to_string).collect())
}

fn parse_attribute_rows<T, F>(path: &str, parse: F) -> Result<Vec<(String, Vec<T>)>>
where
    F: Fn(&str) -> Result<T>,
{
    let mut lines = open_lines(path)?;
    let names = parse_attribute_header(lines.next(), path)?;
    let mut columns: Vec<Vec<T>> = names.iter().map(|_| Vec::new()).collect();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let values: Vec<&str> = line.split_whitespace().collect();
        if values.len() != names.len() {
            return Err(format!(
                "The attribute file {} has a row with {} values but {} column names.",
                path,
                values.len(),
                names.len()
            ));
        }
        for (column, value) in columns.iter_mut().zip(values.iter().copied()) {
            column.push(
                parse(value).map_err(|error| format!("In the file {}: {}", path, error))?,
            );
        }
    }
    Ok(names.into_iter().zip(columns.into_iter()).collect())
}

fn is_missing(token: &str) -> bool {
    token.eq_ignore_ascii_case("na")
}

/// # Attribute file loading
impl NodeAttributes {
    /// Load a whitespace-separated file of binary columns (`0`, `1` or `NA`).
    pub fn load_binary_file(&mut self, path: &str) -> Result<()> {
        for (name, column) in parse_attribute_rows(path, |token| {
            if is_missing(token) {
                return Ok(BINARY_NA);
            }
            match token {
                "0" => Ok(0),
                "1" => Ok(1),
                _ => Err(format!("the binary value {} is not 0, 1 or NA.", token)),
            }
        })? {
            self.add_binary_column(name, column);
        }
        Ok(())
    }

    /// Load a whitespace-separated file of categorical columns
    /// (non-negative integers or `NA`).
    pub fn load_categorical_file(&mut self, path: &str) -> Result<()> {
        for (name, column) in parse_attribute_rows(path, |token| {
            if is_missing(token) {
                return Ok(CATEGORICAL_NA);
            }
            token
                .parse::<u32>()
                .map(|value| value as i32)
                .map_err(|_| format!("the categorical value {} is not an integer or NA.", token))
        })? {
            self.add_categorical_column(name, column);
        }
        Ok(())
    }

    /// Load a whitespace-separated file of continuous columns (floats or `NA`).
    pub fn load_continuous_file(&mut self, path: &str) -> Result<()> {
        for (name, column) in parse_attribute_rows(path, |token| {
            if is_missing(token) {
                return Ok(f64::NAN);
            }
            token
                .parse::<f64>()
                .map_err(|_| format!("the continuous value {} is not a number or NA.", token))
        })? {
            self.add_continuous_column(name, column);
        }
        Ok(())
    }

    /// Load a whitespace-separated file of set columns: comma-separated
    /// category ids, `none` for the empty set or `NA` for missing.
    pub fn load_set_file(&mut self, path: &str) -> Result<()> {
        for (name, column) in parse_attribute_rows(path, |token| {
            if is_missing(token) {
                return Ok(None);
            }
            if token.eq_ignore_ascii_case("none") {
                return Ok(Some(HashSet::new()));
            }
            token
                .split(',')
                .map(|category| {
                    category.parse::<u32>().map_err(|_| {
                        format!("the set value {} is not a comma-separated id list.", token)
                    })
                })
                .collect::<Result<HashSet<u32>>>()
                .map(Some)
        })? {
            self.add_set_column(name, column);
        }
        Ok(())
    }
}

/// Load a single-column file of snowball zones or citation terms. The
/// header line names the column; every following line is one node.
pub fn read_node_integer_file(path: &str, column_kind: &str) -> Result<Vec<u32>> {
    let mut lines = open_lines(path)?;
    let names = parse_attribute_header(lines.next(), path)?;
    if names.len() != 1 {
        return Err(format!(
            "The {} file {} must have exactly one column, found {}.",
            column_kind,
            path,
            names.len()
        ));
    }
    let mut values = Vec::new();
    for line in lines {
        let line = line?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        values.push(token.parse::<u32>().map_err(|_| {
            format!(
                "The {} file {} has the malformed value {}.",
                column_kind, path, token
            )
        })?);
    }
    Ok(values)
}
