//! Run configuration: defaults, then an optional JSON file, then CLI flags.

use crate::common::defs::Continous;
use crate::envs::grid_world::SlipModel;
use crate::error::{Error, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Rewards of the configurable terminal, one run each
    pub rewards: Vec<Continous>,

    /// Discount factor, in (0, 1)
    pub gamma: Continous,

    /// Convergence threshold on the largest per-state change
    pub epsilon: Continous,

    /// Optional cap on sweeps (value iteration) or rounds (policy iteration)
    pub max_iterations: Option<usize>,

    pub slip: SlipModel,

    /// Monte Carlo episodes to play with the solved policy
    pub rollouts: Option<usize>,

    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rewards: vec![100., 3., 0., -3.],
            gamma: 0.99,
            epsilon: 1e-6,
            max_iterations: None,
            slip: SlipModel::default(),
            rollouts: None,
            seed: 2718,
        }
    }
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config '{}'", path.display()),
            source,
        })?;

        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.gamma > 0. && self.gamma < 1.) {
            return Err(Error::InvalidDiscount { gamma: self.gamma });
        }

        if !(self.epsilon.is_finite() && self.epsilon > 0.) {
            return Err(Error::InvalidThreshold {
                epsilon: self.epsilon,
            });
        }

        self.slip.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "gridmdp")]
#[command(version, about = "Value and policy iteration on a slippery 3x3 grid world", long_about = None)]
pub struct Args {
    /// JSON run configuration; flags override its fields
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Reward of the top left terminal (repeat for several runs)
    #[arg(long = "reward", short = 'r', allow_negative_numbers = true)]
    pub rewards: Vec<Continous>,

    /// Discount factor
    #[arg(long)]
    pub gamma: Option<Continous>,

    /// Convergence threshold
    #[arg(long)]
    pub epsilon: Option<Continous>,

    /// Cap on solver iterations
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Play this many episodes with the solved policy
    #[arg(long)]
    pub rollouts: Option<usize>,

    /// Random seed for rollouts
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Args {
    pub fn resolve(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path)?,
            None => RunConfig::default(),
        };

        if !self.rewards.is_empty() {
            config.rewards = self.rewards.clone();
        }
        if let Some(gamma) = self.gamma {
            config.gamma = gamma;
        }
        if let Some(epsilon) = self.epsilon {
            config.epsilon = epsilon;
        }
        if self.max_iterations.is_some() {
            config.max_iterations = self.max_iterations;
        }
        if self.rollouts.is_some() {
            config.rollouts = self.rollouts;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        config.validate()?;
        Ok(config)
    }
}
