use super::TransitionModel;
use crate::common::defs::*;
use tracing::debug;

/// Outcome of repeated synchronous Bellman backups.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    pub values: Vec<Continous>,
    pub iterations: usize,
    /// Largest per-state change in the final sweep.
    pub delta: Continous,
}

impl Sweep {
    pub fn converged(&self, epsilon: Continous) -> bool {
        self.delta < epsilon
    }
}

/// r(s) + γ Σ_{s'} U(s') P(s' | s, a)
pub fn q_value<M: TransitionModel + ?Sized>(
    states: &[State],
    model: &M,
    u: &[Continous],
    s: &State,
    a: &Action,
    gamma: Continous,
) -> Continous {
    s.reward
        + gamma
            * states
                .iter()
                .map(|next| u[next.id] * model.probability(s, next, a))
                .sum::<Continous>()
}

/// Starts from U = 0 and applies `backup` to every state until the largest
/// change drops below `epsilon`, or `max_iterations` sweeps have run.
///
/// Every sweep reads only the previous sweep's values (Jacobi updates).
/// Without a cap this relies on `backup` being a contraction, which holds for
/// Bellman backups with γ < 1.
pub fn bellman_sweep<F>(
    states: &[State],
    epsilon: Continous,
    max_iterations: Option<usize>,
    backup: F,
) -> Sweep
where
    F: Fn(&[Continous], &State) -> Continous,
{
    let mut u = vec![0. as Continous; states.len()];
    let mut iterations = 0;
    loop {
        let u_new = states.iter().map(|s| backup(&u, s)).collect::<Vec<_>>();
        let delta = u_new
            .iter()
            .zip(&u)
            .map(|(new, old)| (new - old).abs())
            .fold(0., Continous::max);

        u = u_new;
        iterations += 1;

        if delta < epsilon || max_iterations.is_some_and(|n| iterations >= n) {
            return Sweep {
                values: u,
                iterations,
                delta,
            };
        }
    }
}

/// U^π for a fixed policy, with an optional cap on the number of sweeps.
pub fn evaluate_policy<M: TransitionModel + ?Sized>(
    states: &[State],
    policy: &[Action],
    model: &M,
    gamma: Continous,
    epsilon: Continous,
    max_iterations: Option<usize>,
) -> Sweep {
    let sweep = bellman_sweep(states, epsilon, max_iterations, |u, s| {
        q_value(states, model, u, s, &policy[s.id], gamma)
    });
    debug!(
        iterations = sweep.iterations,
        delta = sweep.delta,
        "policy evaluation done"
    );

    sweep
}

pub fn policy_evaluation<M: TransitionModel + ?Sized>(
    states: &[State],
    policy: &[Action],
    model: &M,
    gamma: Continous,
    epsilon: Continous,
) -> Vec<Continous> {
    evaluate_policy(states, policy, model, gamma, epsilon, None).values
}

/// Best action for `s` by one step lookahead on `u`. A later action only
/// wins on a strictly greater value, so ties go to the earliest action.
pub fn greedy_action<'a, M: TransitionModel + ?Sized>(
    states: &[State],
    actions: &'a [Action],
    model: &M,
    u: &[Continous],
    s: &State,
    gamma: Continous,
) -> Option<(&'a Action, Continous)> {
    actions.iter().fold(None, |best, a| {
        let q = q_value(states, model, u, s, a, gamma);
        match best {
            Some((_, b)) if q <= b => best,
            _ => Some((a, q)),
        }
    })
}

/// Greedy policy with respect to `u`. Empty when there are no actions.
pub fn policy_extraction<M: TransitionModel + ?Sized>(
    states: &[State],
    actions: &[Action],
    model: &M,
    u: &[Continous],
    gamma: Continous,
) -> Policy {
    states
        .iter()
        .filter_map(|s| greedy_action(states, actions, model, u, s, gamma))
        .map(|(a, _)| a.clone())
        .collect()
}
