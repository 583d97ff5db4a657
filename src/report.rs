use crate::algos::model_based::mdp::{
    pi::PolicyIteration,
    simulator::{mean_return, PolicyRollout},
    vi::ValueIteration,
    MdpSolver,
};
use crate::common::defs::*;
use crate::config::RunConfig;
use crate::envs::grid_world::GridWorld;
use crate::error::Result;
use itertools::Itertools;
use serde::Serialize;
use std::rc::Rc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverReport {
    pub iterations: usize,
    pub converged: bool,
    pub values: Vec<Continous>,
    pub policy: Vec<String>,
}

impl SolverReport {
    fn new(values: &[Continous], policy: &[Action], converged: bool, iterations: usize) -> Self {
        Self {
            iterations,
            converged,
            values: values.to_vec(),
            policy: policy.iter().map(|a| a.name.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RolloutSummary {
    pub start: StateId,
    pub episodes: usize,
    pub mean_return: Continous,
}

/// Everything one terminal reward value produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub reward: Continous,
    pub rows: usize,
    pub cols: usize,
    pub value_iteration: SolverReport,
    pub policy_iteration: SolverReport,
    pub rollout: Option<RolloutSummary>,
}

impl RunReport {
    pub fn solve(reward: Continous, config: &RunConfig) -> Result<Self> {
        let gw = Rc::new(GridWorld::standard(reward).with_slip(config.slip)?);

        let vi = &mut ValueIteration::new(gw.clone(), config.gamma);
        let (converged, iterations) = vi.exec(config.epsilon, config.max_iterations);
        let value_iteration = SolverReport::new(vi.values(), vi.policy(), converged, iterations);

        let pi = &mut PolicyIteration::new(gw.clone(), config.gamma);
        let (stable, iterations) = pi.exec(config.epsilon, config.max_iterations);
        let policy_iteration = SolverReport::new(pi.values(), pi.policy(), stable, iterations);

        info!(
            reward,
            vi_iterations = value_iteration.iterations,
            pi_iterations = policy_iteration.iterations,
            "solved grid world"
        );

        // bottom left corner, the cell furthest from both terminals
        let start = (gw.rows() - 1) * gw.cols();
        let rollout = config.rollouts.map(|episodes| {
            let eps = PolicyRollout {
                mdp: &*gw,
                policy: vi.policy(),
                start,
                max_steps: 10_000,
            }
            .generate(episodes, Some(config.seed));

            RolloutSummary {
                start,
                episodes,
                mean_return: mean_return(&eps, config.gamma),
            }
        });

        Ok(Self {
            reward,
            rows: gw.rows(),
            cols: gw.cols(),
            value_iteration,
            policy_iteration,
            rollout,
        })
    }

    pub fn render(&self) -> String {
        let vi = &self.value_iteration;
        let pi = &self.policy_iteration;
        let mut out = vec![
            format!("Current r: {}", self.reward),
            format!("Value iteration sweeps: {} (converged: {})", vi.iterations, vi.converged),
            "State values:".to_string(),
            render_values(&vi.values, self.cols),
            "State policies:".to_string(),
            render_policy(&vi.policy, self.cols),
            format!(
                "Policy iteration rounds: {} (stable: {})",
                pi.iterations, pi.converged
            ),
            render_policy(&pi.policy, self.cols),
        ];

        if let Some(rollout) = &self.rollout {
            out.push(format!(
                "Mean return from state {} over {} episodes: {:.4} (value {:.4})",
                rollout.start, rollout.episodes, rollout.mean_return, vi.values[rollout.start]
            ));
        }

        out.join("\n")
    }
}

/// One grid row per line.
pub fn render_values(u: &[Continous], cols: usize) -> String {
    u.chunks(cols.max(1))
        .map(|row| row.iter().map(|v| format!("{v:.4}")).join("   "))
        .join("\n")
}

pub fn render_policy(names: &[String], cols: usize) -> String {
    names.chunks(cols.max(1)).map(|row| row.join(" ")).join("\n")
}
