//! Exact dynamic programming on finite MDPs: value iteration, policy
//! evaluation, greedy policy extraction and policy iteration, over a slippery
//! grid world.

pub mod algos;
pub mod common;
pub mod config;
pub mod envs;
pub mod error;
pub mod report;

pub use algos::model_based::mdp::{
    common::{policy_evaluation, policy_extraction, q_value},
    pi::{policy_iteration, PolicyIteration},
    vi::{value_iteration, ValueIteration},
    Mdp, MdpSolver, TransitionModel,
};
pub use common::defs::*;
pub use envs::grid_world::{GridWorld, SlipModel};
pub use error::{Error, Result};
