use super::Mdp;
use crate::common::defs::*;
use rand::distributions::WeightedIndex;
use rand::prelude::*;

pub trait Weighted<S> {
    fn s(&self) -> S;

    fn p(&self) -> Continous;
}

impl Weighted<StateId> for (StateId, Continous) {
    fn s(&self) -> StateId {
        self.0
    }

    fn p(&self) -> Continous {
        self.1
    }
}

/// None when there is nothing with positive weight to pick from.
pub fn pick_next<T, S>(rng: &mut StdRng, ts: &[T]) -> Option<S>
where
    T: Weighted<S>,
{
    let dist = WeightedIndex::new(ts.iter().map(|item| item.p())).ok()?;
    ts.get(dist.sample(rng)).map(|item| item.s())
}

/// Plays a fixed policy on a model from one start state.
pub struct PolicyRollout<'a, M: Mdp + ?Sized> {
    pub mdp: &'a M,
    pub policy: &'a [Action],
    pub start: StateId,
    pub max_steps: usize,
}

impl<'a, M: Mdp + ?Sized> PolicyRollout<'a, M> {
    fn episode(&self, rng: &mut StdRng) -> Vec<EpisodeEvent> {
        let states = self.mdp.states();
        let mut ep = vec![];
        let mut s = self.start;
        for _ in 0..=self.max_steps {
            let Some(state) = states.get(s) else {
                break;
            };
            ep.push(EpisodeEvent {
                s,
                r: state.reward,
            });
            if state.terminal {
                break;
            }

            let Some(action) = self.policy.get(s) else {
                break;
            };
            match pick_next(rng, &self.mdp.successors(states, state, action)) {
                Some(next) => s = next,
                None => break,
            }
        }

        ep
    }
}

impl<'a, M: Mdp + ?Sized> EpisodeGenerator for PolicyRollout<'a, M> {
    fn generate(&self, n: usize, seed: Option<u64>) -> Vec<Vec<EpisodeEvent>> {
        let rng = &mut match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        (0..n).map(|_| self.episode(rng)).collect()
    }
}

/// G = Σ_t γ^t r_t, the visited state's reward counted on arrival.
pub fn discounted_return(ep: &[EpisodeEvent], gamma: Continous) -> Continous {
    ep.iter().rev().fold(0., |g, e| e.r + gamma * g)
}

pub fn mean_return(eps: &[Vec<EpisodeEvent>], gamma: Continous) -> Continous {
    if eps.is_empty() {
        return 0.;
    }

    eps.iter().map(|ep| discounted_return(ep, gamma)).sum::<Continous>() / eps.len() as Continous
}
