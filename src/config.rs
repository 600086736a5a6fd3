//! Configuration files.
//!
//! UTF-8 text of case-insensitive `keyword = value` pairs with `#` comments
//! and `{ .. }` parameter lists that may span lines. The parameter lists
//! come in four families matching the four change-statistic families; each
//! entry is a bare name, a `name(args)` form, and optionally carries a
//! `= value` initial parameter used by the simulator.

use ::graph::Result;
use hashbrown::HashSet;
use log::warn;
use std::fs;

/// One entry of a parameter list.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub arguments: Vec<String>,
    /// Parameter value attached with `= value`; zero when absent.
    pub value: f64,
}

/// The full configuration consumed by the estimator and the simulator.
#[derive(Clone, Debug)]
pub struct Config {
    // Step sizes and iteration counts.
    pub aca_s: f64,
    pub aca_ee: f64,
    pub comp_c: f64,
    pub sampler_steps: u64,
    pub s_steps: u64,
    pub ee_steps: u64,
    pub ee_inner_steps: u64,
    pub output_all_steps: bool,
    // Sampler selection.
    pub use_ifd_sampler: bool,
    pub ifd_k: f64,
    pub use_tnt_sampler: bool,
    pub use_borisenko_update: bool,
    pub learning_rate: f64,
    pub min_theta: f64,
    pub min_theta_mean: f64,
    pub theta_sd_threshold: f64,
    // Constraint regimes.
    pub use_conditional_estimation: bool,
    pub citation_ergm: bool,
    pub forbid_reciprocity: bool,
    pub allow_loops: bool,
    pub is_directed: bool,
    pub is_bipartite: bool,
    // Inputs.
    pub arclist_file: Option<String>,
    pub binattr_file: Option<String>,
    pub catattr_file: Option<String>,
    pub contattr_file: Option<String>,
    pub setattr_file: Option<String>,
    pub zone_file: Option<String>,
    pub term_file: Option<String>,
    // Outputs.
    pub theta_file_prefix: String,
    pub dza_file_prefix: String,
    pub sim_net_file_prefix: String,
    pub stats_file_prefix: String,
    pub output_simulated_network: bool,
    // Driver.
    pub num_tasks: u64,
    pub random_seed: u64,
    // Simulation.
    pub num_nodes: Option<u32>,
    pub sim_burnin: u64,
    pub sim_sample_size: u64,
    pub sim_interval: u64,
    // Parameter lists, in model order.
    pub struct_params: Vec<ParamSpec>,
    pub attr_params: Vec<ParamSpec>,
    pub dyadic_params: Vec<ParamSpec>,
    pub attr_interaction_params: Vec<ParamSpec>,
    /// Lowercased keys seen in the file, for ignored-option warnings.
    pub(crate) set_keys: HashSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            aca_s: 0.1,
            aca_ee: 1e-9,
            comp_c: 1e-2,
            sampler_steps: 1_000,
            s_steps: 100,
            ee_steps: 500,
            ee_inner_steps: 100,
            output_all_steps: false,
            use_ifd_sampler: false,
            ifd_k: 0.1,
            use_tnt_sampler: false,
            use_borisenko_update: false,
            learning_rate: 0.001,
            min_theta: 0.01,
            min_theta_mean: 0.1,
            theta_sd_threshold: 1e-10,
            use_conditional_estimation: false,
            citation_ergm: false,
            forbid_reciprocity: false,
            allow_loops: false,
            is_directed: true,
            is_bipartite: false,
            arclist_file: None,
            binattr_file: None,
            catattr_file: None,
            contattr_file: None,
            setattr_file: None,
            zone_file: None,
            term_file: None,
            theta_file_prefix: "theta_values".to_string(),
            dza_file_prefix: "dzA_values".to_string(),
            sim_net_file_prefix: "simulated".to_string(),
            stats_file_prefix: "stats".to_string(),
            output_simulated_network: false,
            num_tasks: 1,
            random_seed: 42,
            num_nodes: None,
            sim_burnin: 1_000,
            sim_sample_size: 100,
            sim_interval: 1_000,
            struct_params: Vec::new(),
            attr_params: Vec::new(),
            dyadic_params: Vec::new(),
            attr_interaction_params: Vec::new(),
            set_keys: HashSet::new(),
        }
    }
}

impl Config {
    /// Parse a configuration file.
    pub fn from_file(path: &str) -> Result<Config> {
        let text = fs::read_to_string(path)
            .map_err(|error| format!("Cannot open the config file {}: {}.", path, error))?;
        Config::parse(&text).map_err(|error| format!("In the config file {}: {}", path, error))
    }

    /// Parse configuration text.
    pub fn parse(text: &str) -> Result<Config> {
        let mut config = Config::default();
        // Comments run to the end of the line; the statement scanner below
        // then works on the comment-free text.
        let stripped: String = text
            .lines()
            .map(|line| line.split('#').next().unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n");
        let mut rest = stripped.trim_start();
        while !rest.is_empty() {
            let key_end = rest
                .find('=')
                .ok_or_else(|| format!("Expected `key = value`, found: {}", truncate(rest)))?;
            let key = rest[..key_end].trim();
            if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(format!("Malformed option name: {}", truncate(rest)));
            }
            rest = rest[key_end + 1..].trim_start();
            let value;
            if rest.starts_with('{') {
                let close = rest
                    .find('}')
                    .ok_or_else(|| format!("The list of {} is never closed.", key))?;
                value = &rest[1..close];
                rest = rest[close + 1..].trim_start();
            } else {
                let end = rest
                    .find(|c: char| c.is_whitespace())
                    .unwrap_or(rest.len());
                value = &rest[..end];
                rest = rest[end..].trim_start();
            }
            config.apply(key, value)?;
        }
        Ok(config)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let lowercase = key.to_lowercase();
        if !self.set_keys.insert(lowercase.clone()) {
            return Err(format!("The option {} is set more than once.", key));
        }
        match lowercase.as_str() {
            "aca_s" => self.aca_s = parse_float(key, value)?,
            "aca_ee" => self.aca_ee = parse_float(key, value)?,
            "compc" => self.comp_c = parse_float(key, value)?,
            "samplersteps" => self.sampler_steps = parse_count(key, value)?,
            "ssteps" => self.s_steps = parse_count(key, value)?,
            "eesteps" => self.ee_steps = parse_count(key, value)?,
            "eeinnersteps" => self.ee_inner_steps = parse_count(key, value)?,
            "outputallsteps" => self.output_all_steps = parse_bool(key, value)?,
            "useifdsampler" => self.use_ifd_sampler = parse_bool(key, value)?,
            "ifd_k" => self.ifd_k = parse_float(key, value)?,
            "usetntsampler" => self.use_tnt_sampler = parse_bool(key, value)?,
            "useborisenkoupdate" => self.use_borisenko_update = parse_bool(key, value)?,
            "learningrate" => self.learning_rate = parse_float(key, value)?,
            "mintheta" => self.min_theta = parse_float(key, value)?,
            "minthetamean" => self.min_theta_mean = parse_float(key, value)?,
            "thetasdthreshold" => self.theta_sd_threshold = parse_float(key, value)?,
            "useconditionalestimation" => {
                self.use_conditional_estimation = parse_bool(key, value)?
            }
            "citationergm" => self.citation_ergm = parse_bool(key, value)?,
            "forbidreciprocity" => self.forbid_reciprocity = parse_bool(key, value)?,
            "allowloops" => self.allow_loops = parse_bool(key, value)?,
            "isdirected" => self.is_directed = parse_bool(key, value)?,
            "isbipartite" => self.is_bipartite = parse_bool(key, value)?,
            "arclistfile" => self.arclist_file = Some(value.to_string()),
            "binattrfile" => self.binattr_file = Some(value.to_string()),
            "catattrfile" => self.catattr_file = Some(value.to_string()),
            "contattrfile" => self.contattr_file = Some(value.to_string()),
            "setattrfile" => self.setattr_file = Some(value.to_string()),
            "zonefile" => self.zone_file = Some(value.to_string()),
            "termfile" => self.term_file = Some(value.to_string()),
            "thetafileprefix" => self.theta_file_prefix = value.to_string(),
            "dzafileprefix" => self.dza_file_prefix = value.to_string(),
            "simnetfileprefix" => self.sim_net_file_prefix = value.to_string(),
            "statsfileprefix" => self.stats_file_prefix = value.to_string(),
            "outputsimulatednetwork" => {
                self.output_simulated_network = parse_bool(key, value)?
            }
            "numtasks" => self.num_tasks = parse_count(key, value)?,
            "randomseed" => self.random_seed = parse_count(key, value)?,
            "numnodes" => self.num_nodes = Some(parse_count(key, value)? as u32),
            "simburnin" => self.sim_burnin = parse_count(key, value)?,
            "simsamplesize" => self.sim_sample_size = parse_count(key, value)?,
            "siminterval" => self.sim_interval = parse_count(key, value)?,
            "structparams" => self.struct_params = parse_param_list(value)?,
            "attrparams" => self.attr_params = parse_param_list(value)?,
            "dyadicparams" => self.dyadic_params = parse_param_list(value)?,
            "attrinteractionparams" => self.attr_interaction_params = parse_param_list(value)?,
            _ => return Err(format!("Unknown option: {}.", key)),
        }
        Ok(())
    }

    /// Return every parameter specification in model order.
    pub fn iter_param_specs(&self) -> impl Iterator<Item = &ParamSpec> + '_ {
        self.struct_params
            .iter()
            .chain(self.attr_params.iter())
            .chain(self.dyadic_params.iter())
            .chain(self.attr_interaction_params.iter())
    }

    /// Validate the option combinations shared by estimation and simulation.
    ///
    /// # Raises
    /// * On any contradictory option pair of the error-handling matrix.
    pub fn validate(&self) -> Result<()> {
        if self.use_ifd_sampler && self.use_tnt_sampler {
            return Err("At most one of useIFDsampler and useTNTsampler may be set.".to_string());
        }
        if self.use_conditional_estimation && self.citation_ergm {
            return Err(concat!(
                "useConditionalEstimation and citationERGM are mutually ",
                "exclusive conditioning regimes."
            )
            .to_string());
        }
        if self.use_conditional_estimation && self.zone_file.is_none() {
            return Err("useConditionalEstimation requires a zoneFile.".to_string());
        }
        if self.citation_ergm && self.term_file.is_none() {
            return Err("citationERGM requires a termFile.".to_string());
        }
        if self.citation_ergm && !self.is_directed {
            return Err("citationERGM requires a directed graph.".to_string());
        }
        if self.forbid_reciprocity && (self.use_conditional_estimation || self.citation_ergm) {
            return Err(
                "forbidReciprocity cannot be combined with conditional estimation.".to_string(),
            );
        }
        if self.allow_loops && (self.use_conditional_estimation || self.citation_ergm) {
            return Err("allowLoops cannot be combined with conditional estimation.".to_string());
        }
        if self.allow_loops && !self.is_directed {
            return Err("allowLoops requires a directed graph.".to_string());
        }
        if self.forbid_reciprocity && !self.is_directed {
            return Err("forbidReciprocity requires a directed graph.".to_string());
        }
        if self.is_bipartite && self.is_directed {
            return Err("isBipartite requires isDirected = false.".to_string());
        }
        if self.use_tnt_sampler
            && (self.use_conditional_estimation || self.citation_ergm || self.forbid_reciprocity)
        {
            return Err(
                "useTNTsampler only supports the unconstrained proposal regime.".to_string(),
            );
        }
        if self.ee_inner_steps == 0 || self.sampler_steps == 0 {
            return Err("samplerSteps and EEinnerSteps must be positive.".to_string());
        }
        // Options set but ignored by the active algorithm are worth a
        // warning, not an error.
        if self.set_keys.contains("ifd_k") && !self.use_ifd_sampler {
            warn!("ifd_K is set but the IFD sampler is not selected; the value is ignored.");
        }
        for key in ["learningrate", "mintheta"] {
            if self.set_keys.contains(key) && !self.use_borisenko_update {
                warn!(
                    "{} is set but the Borisenko update is not selected; the value is ignored.",
                    key
                );
            }
        }
        if self.use_borisenko_update {
            for key in ["compc", "minthetamean", "thetasdthreshold"] {
                if self.set_keys.contains(key) {
                    warn!(
                        "{} is set but the Borisenko update bypasses the derivative rescale; \
                         the value is ignored.",
                        key
                    );
                }
            }
        }
        Ok(())
    }

    /// Validate the options an estimation run additionally needs.
    pub fn validate_for_estimation(&self) -> Result<()> {
        self.validate()?;
        if self.arclist_file.is_none() {
            return Err("Estimation requires an arclistFile.".to_string());
        }
        Ok(())
    }

    /// Validate the options a simulation run additionally needs.
    pub fn validate_for_simulation(&self) -> Result<()> {
        self.validate()?;
        if self.arclist_file.is_none() && self.num_nodes.is_none() {
            return Err(
                "Simulation requires either an arclistFile or a numNodes count.".to_string(),
            );
        }
        if self.sim_interval == 0 {
            return Err("simInterval must be positive.".to_string());
        }
        Ok(())
    }
}

fn truncate(rest: &str) -> String {
    rest.chars().take(40).collect()
}

fn parse_float(key: &str, value: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|_| format!("The option {} expects a number, found {}.", key, value))
}

fn parse_count(key: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| format!("The option {} expects a non-negative integer, found {}.", key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        _ => Err(format!(
            "The option {} expects True or False, found {}.",
            key, value
        )),
    }
}

/// Split a `{ .. }` body into parameter specifications.
fn parse_param_list(body: &str) -> Result<Vec<ParamSpec>> {
    let mut specs = Vec::new();
    // Commas inside argument parentheses do not separate entries.
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (offset, character) in body.char_indices() {
        match character {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return Err(format!("Unbalanced parentheses in: {}", truncate(body)));
                }
                depth -= 1;
            }
            ',' if depth == 0 => {
                entries.push(&body[start..offset]);
                start = offset + 1;
            }
            _ => {}
        }
    }
    entries.push(&body[start..]);
    for entry in entries {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        specs.push(parse_param_entry(entry)?);
    }
    Ok(specs)
}

fn parse_param_entry(entry: &str) -> Result<ParamSpec> {
    // An `= value` suffix may follow the name or the closing parenthesis.
    let (head, value) = match entry.rfind('=') {
        Some(position) if !entry[position..].contains(')') => {
            let value: f64 = entry[position + 1..].trim().parse().map_err(|_| {
                format!(
                    "The parameter value of {} is not a number.",
                    entry[..position].trim()
                )
            })?;
            (entry[..position].trim(), value)
        }
        _ => (entry, 0.0),
    };
    let (name, arguments) = match head.find('(') {
        Some(open) => {
            let close = head
                .rfind(')')
                .ok_or_else(|| format!("The parameter {} is missing a closing parenthesis.", head))?;
            let arguments: Vec<String> = head[open + 1..close]
                .split(',')
                .map(str::trim)
                .filter(|argument| !argument.is_empty())
                .map(str::to_string)
                .collect();
            (head[..open].trim(), arguments)
        }
        None => (head, Vec::new()),
    };
    if name.is_empty() {
        return Err(format!("A parameter entry has no name: {}", entry));
    }
    Ok(ParamSpec {
        name: name.to_string(),
        arguments,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param_entries() {
        let specs = parse_param_list(
            "Arc, AltInStars(2.0), Sender(smoker) = 0.5,\n  GeoDistance(lat, lon)",
        )
        .unwrap();
        assert_eq!(specs.len(), 4);
        assert_eq!(specs[0].name, "Arc");
        assert!(specs[0].arguments.is_empty());
        assert_eq!(specs[1].arguments, vec!["2.0".to_string()]);
        assert_eq!(specs[2].value, 0.5);
        assert_eq!(
            specs[3].arguments,
            vec!["lat".to_string(), "lon".to_string()]
        );
    }

    #[test]
    fn test_duplicate_key_rejected() {
        assert!(Config::parse("Ssteps = 10\nSsteps = 20").is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::parse("frobnicate = 1").is_err());
    }
}
