use clap::Args;
use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::error::{KeyvolveError, KvResult};
use crate::optimizer::crossover::CrossoverMethod;
use crate::optimizer::locks::LockMask;
use crate::optimizer::mutation::MutationMethod;
use crate::optimizer::selection::SelectionMethod;
use crate::optimizer::EvolutionParams;

/// Bigram pattern the scorer should favor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PreferredPattern {
    #[default]
    NoPreference,
    PreferAlternations,
}

/// Toggles for the optional effort components. Base effort is always on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsConfig {
    pub distance_penalty: bool,
    pub row_switch_penalty: bool,
    pub hand_balance_penalty: bool,
    pub pattern: PreferredPattern,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            distance_penalty: true,
            row_switch_penalty: true,
            hand_balance_penalty: true,
            pattern: PreferredPattern::NoPreference,
        }
    }
}

/// Scoring knobs as they arrive from the command line.
#[derive(Args, Debug, Clone)]
pub struct MetricsOptions {
    /// Penalize consecutive keystrokes on the same finger
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub distance_penalty: bool,

    /// Penalize bigrams that jump between rows on the same hand
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub row_switch_penalty: bool,

    /// Scale total effort by how unevenly the hands share the load
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub hand_balance_penalty: bool,

    /// Typing pattern to reward: no-preference or prefer-alternations
    #[arg(long, default_value = "no-preference")]
    pub pattern: String,
}

impl MetricsOptions {
    pub fn resolve(&self) -> KvResult<MetricsConfig> {
        let pattern = self
            .pattern
            .parse::<PreferredPattern>()
            .map_err(|_| KeyvolveError::Config(format!("unknown pattern '{}'", self.pattern)))?;
        Ok(MetricsConfig {
            distance_penalty: self.distance_penalty,
            row_switch_penalty: self.row_switch_penalty,
            hand_balance_penalty: self.hand_balance_penalty,
            pattern,
        })
    }
}

/// Evolutionary search knobs as they arrive from the command line.
/// Algorithm tags stay as strings here and are checked in `resolve`,
/// so a typo fails before any work starts.
#[derive(Args, Debug, Clone)]
pub struct SearchOptions {
    /// Number of generations to evolve
    #[arg(long, default_value_t = 100)]
    pub generations: usize,

    /// Individuals per generation
    #[arg(long, default_value_t = 50)]
    pub population_size: usize,

    /// Top individuals copied unchanged into the next generation
    #[arg(long, default_value_t = 5)]
    pub elitism: usize,

    /// Per-individual mutation probability, 0-100
    #[arg(long, default_value_t = 10.0)]
    pub mutation_rate: f64,

    /// Parents drawn by selection each generation
    #[arg(long, default_value_t = 20)]
    pub num_parents: usize,

    /// Entrants per tournament (tournament selection only)
    #[arg(long, default_value_t = 3)]
    pub tournament_size: usize,

    /// Exponent applied to rank weights (rank selection only)
    #[arg(long, default_value_t = 1.0)]
    pub rank_exponent: f64,

    /// Seed for the random number generator; omit for a random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Selection method: tournament, roulette, rank or sus
    #[arg(long, default_value = "tournament")]
    pub selection: String,

    /// Crossover method: reverse-sequence, pmx or aex
    #[arg(long, default_value = "pmx")]
    pub crossover: String,

    /// Mutation method: reverse-sequence, swap, scramble or displacement
    #[arg(long, default_value = "swap")]
    pub mutation: String,

    /// Pin a symbol to a grid position, e.g. --lock 13=A (flat index 0-29).
    /// Repeat the flag for multiple pins.
    #[arg(long = "lock", value_name = "POS=SYMBOL")]
    pub locks: Vec<String>,
}

impl SearchOptions {
    pub fn resolve(&self) -> KvResult<EvolutionParams> {
        let selection = self
            .selection
            .parse::<SelectionMethod>()
            .map_err(|_| KeyvolveError::Config(format!("unknown selection method '{}'", self.selection)))?;
        let crossover = self
            .crossover
            .parse::<CrossoverMethod>()
            .map_err(|_| KeyvolveError::Config(format!("unknown crossover method '{}'", self.crossover)))?;
        let mutation = self
            .mutation
            .parse::<MutationMethod>()
            .map_err(|_| KeyvolveError::Config(format!("unknown mutation method '{}'", self.mutation)))?;

        let locks = if self.locks.is_empty() {
            None
        } else {
            Some(LockMask::from_pairs(parse_lock_pairs(&self.locks)?)?)
        };

        let params = EvolutionParams {
            population_size: self.population_size,
            generations: self.generations,
            elitism: self.elitism,
            mutation_rate: self.mutation_rate,
            num_parents: self.num_parents,
            tournament_size: self.tournament_size,
            rank_exponent: self.rank_exponent,
            selection,
            crossover,
            mutation,
            locks,
            seed: self.seed.unwrap_or_else(|| fastrand::u64(..)),
        };
        params.validate()?;
        Ok(params)
    }
}

fn parse_lock_pairs(raw: &[String]) -> KvResult<Vec<(usize, u8)>> {
    let mut pairs = Vec::with_capacity(raw.len());
    for entry in raw {
        let (pos, symbol) = entry
            .split_once('=')
            .ok_or_else(|| KeyvolveError::Config(format!("lock '{entry}' is not POS=SYMBOL")))?;
        let pos: usize = pos
            .trim()
            .parse()
            .map_err(|_| KeyvolveError::Config(format!("lock '{entry}' has a non-numeric position")))?;
        let symbol = symbol.trim();
        let mut chars = symbol.chars();
        let c = match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_ascii_uppercase(),
            _ => {
                return Err(KeyvolveError::Config(format!(
                    "lock '{entry}' must pin exactly one symbol"
                )))
            }
        };
        if !c.is_ascii() {
            return Err(KeyvolveError::Config(format!("lock '{entry}' pins a non-ASCII symbol")));
        }
        pairs.push((pos, c as u8));
    }
    Ok(pairs)
}
