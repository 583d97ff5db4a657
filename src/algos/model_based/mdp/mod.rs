pub mod common;
pub mod pi;
pub mod simulator;
pub mod vi;

use crate::common::defs::*;

/// P(s' | s, a). Solvers only ever see the model through this trait.
pub trait TransitionModel {
    fn probability(&self, from: &State, to: &State, action: &Action) -> Continous;

    /// Reachable successors of `from` under `action`, in state order.
    fn successors(
        &self,
        states: &[State],
        from: &State,
        action: &Action,
    ) -> Vec<(StateId, Continous)> {
        states
            .iter()
            .map(|to| (to.id, self.probability(from, to, action)))
            .filter(|(_, p)| *p > 0.)
            .collect()
    }
}

/// Markov Decision Process - Sutton & Barto 2018.
pub trait Mdp: TransitionModel {
    fn states(&self) -> &[State];

    fn actions(&self) -> &[Action];

    fn n_s(&self) -> usize {
        self.states().len()
    }

    fn n_a(&self) -> usize {
        self.actions().len()
    }
}

pub trait MdpSolver<T> {
    fn v_star(&self, s: StateId) -> Continous;

    fn q_star(&self, s: StateId, a: ActionId) -> Option<Continous>;

    fn pi_star(&self, s: StateId) -> Option<ActionId>;

    fn exec(&mut self, theta: Continous, num_iterations: Option<usize>) -> (T, usize);
}
