use super::{common::*, Mdp, MdpSolver, TransitionModel};
use crate::common::defs::*;
use std::rc::Rc;
use tracing::{debug, warn};

/// U* by repeated Bellman optimality backups, with an optional sweep cap.
pub fn optimal_values<M: TransitionModel + ?Sized>(
    states: &[State],
    actions: &[Action],
    model: &M,
    gamma: Continous,
    epsilon: Continous,
    max_iterations: Option<usize>,
) -> Sweep {
    let sweep = bellman_sweep(states, epsilon, max_iterations, |u, s| {
        actions
            .iter()
            .map(|a| q_value(states, model, u, s, a, gamma))
            .fold(Continous::NEG_INFINITY, Continous::max)
    });
    debug!(
        iterations = sweep.iterations,
        delta = sweep.delta,
        "value iteration done"
    );

    sweep
}

/// Returns U* and the number of sweeps it took.
pub fn value_iteration<M: TransitionModel + ?Sized>(
    states: &[State],
    actions: &[Action],
    model: &M,
    gamma: Continous,
    epsilon: Continous,
) -> (Vec<Continous>, usize) {
    let sweep = optimal_values(states, actions, model, gamma, epsilon, None);

    (sweep.values, sweep.iterations)
}

#[derive(Clone)]
pub struct ValueIteration {
    mdp: Rc<dyn Mdp>,
    gamma: Continous,
    v: Vec<Continous>,
    pi: Policy,
}

impl ValueIteration {
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

    /// Greedy policy on the last computed values. Empty before `exec`.
    pub fn policy(&self) -> &[Action] {
        &self.pi
    }
}

impl MdpSolver<bool> for ValueIteration {
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

    /// Returns whether the values converged below `theta`, and the sweeps run.
    fn exec(&mut self, theta: Continous, num_iterations: Option<usize>) -> (bool, usize) {
        let (states, actions) = (self.mdp.states(), self.mdp.actions());
        let sweep = optimal_values(
            states,
            actions,
            &*self.mdp,
            self.gamma,
            theta,
            num_iterations,
        );

        let converged = sweep.converged(theta);
        if !converged {
            warn!(
                iterations = sweep.iterations,
                delta = sweep.delta,
                "value iteration stopped before converging"
            );
        }

        self.pi = policy_extraction(states, actions, &*self.mdp, &sweep.values, self.gamma);
        self.v = sweep.values;

        (converged, sweep.iterations)
    }
}
