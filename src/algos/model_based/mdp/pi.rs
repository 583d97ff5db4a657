use super::{common::*, Mdp, MdpSolver, TransitionModel};
use crate::common::defs::*;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Improvement {
    pub policy: Policy,
    /// Values of the last evaluated policy.
    pub values: Vec<Continous>,
    pub iterations: usize,
    pub stable: bool,
}

/// Alternates evaluation and greedy improvement, starting from the first
/// action everywhere, until the policy maps to itself. With a cap on the
/// rounds, an unstable run returns the latest improved policy.
pub fn improve_policy<M: TransitionModel + ?Sized>(
    states: &[State],
    actions: &[Action],
    model: &M,
    gamma: Continous,
    epsilon: Continous,
    max_iterations: Option<usize>,
) -> Improvement {
    let Some(first) = actions.first() else {
        return Improvement {
            policy: vec![],
            values: vec![0.; states.len()],
            iterations: 0,
            stable: true,
        };
    };

    let mut policy = vec![first.clone(); states.len()];
    let mut iterations = 0;
    loop {
        let values = policy_evaluation(states, &policy, model, gamma, epsilon);
        let next = policy_extraction(states, actions, model, &values, gamma);
        iterations += 1;

        let stable = next == policy;
        if stable || max_iterations.is_some_and(|n| iterations >= n) {
            debug!(iterations, stable, "policy iteration done");
            return Improvement {
                policy: next,
                values,
                iterations,
                stable,
            };
        }

        policy = next;
    }
}

/// Returns the optimal policy and the number of improvement rounds.
pub fn policy_iteration<M: TransitionModel + ?Sized>(
    states: &[State],
    actions: &[Action],
    model: &M,
    gamma: Continous,
    epsilon: Continous,
) -> (Policy, usize) {
    let run = improve_policy(states, actions, model, gamma, epsilon, None);

    (run.policy, run.iterations)
}

#[derive(Clone)]
pub struct PolicyIteration {
    mdp: Rc<dyn Mdp>,
    gamma: Continous,
    v: Vec<Continous>,
    pi: Policy,
}

impl PolicyIteration {
    pub fn new(mdp: Rc<dyn Mdp>, gamma: Continous) -> Self {
        let n_s = mdp.n_s();

        Self {
            mdp,
            gamma,
            v: vec![0.; n_s],
            pi: vec![],
        }
    }

    pub fn values(&self) -> &[Continous] {
        &self.v
    }

    pub fn policy(&self) -> &[Action] {
        &self.pi
    }
}

impl MdpSolver<bool> for PolicyIteration {
    fn v_star(&self, s: StateId) -> Continous {
        self.v[s]
    }

    fn q_star(&self, s: StateId, a: ActionId) -> Option<Continous> {
        let states = self.mdp.states();
        let s = states.get(s)?;
        let a = self.mdp.actions().get(a)?;

        Some(q_value(states, &*self.mdp, &self.v, s, a, self.gamma))
    }

    fn pi_star(&self, s: StateId) -> Option<ActionId> {
        self.pi.get(s).map(|a| a.id)
    }

    /// Returns whether the policy is stable, and the improvement rounds run.
    fn exec(&mut self, theta: Continous, num_iterations: Option<usize>) -> (bool, usize) {
        let run = improve_policy(
            self.mdp.states(),
            self.mdp.actions(),
            &*self.mdp,
            self.gamma,
            theta,
            num_iterations,
        );

        if !run.stable {
            warn!(
                iterations = run.iterations,
                "policy iteration stopped before the policy was stable"
            );
        }

        self.v = run.values;
        self.pi = run.policy;

        (run.stable, run.iterations)
    }
}
