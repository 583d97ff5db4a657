use crate::algos::model_based::mdp::{Mdp, TransitionModel};
use crate::common::defs::*;
use crate::error::{Error, Result};
use itertools::iproduct;
use serde::{Deserialize, Serialize};

/// How an intended move spreads over the intended cell and its two neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlipModel {
    pub intended: Continous,
    pub lateral: Continous,
}

impl Default for SlipModel {
    fn default() -> Self {
        Self {
            intended: 0.8,
            lateral: 0.1,
        }
    }
}

impl SlipModel {
    pub fn new(intended: Continous, lateral: Continous) -> Result<Self> {
        let slip = Self { intended, lateral };
        slip.validate()?;

        Ok(slip)
    }

    pub fn validate(&self) -> Result<()> {
        let in_range = |p: Continous| (0.0..=1.0).contains(&p);
        let total = self.intended + 2. * self.lateral;
        if in_range(self.intended) && in_range(self.lateral) && (total - 1.).abs() <= 1e-9 {
            Ok(())
        } else {
            Err(Error::InvalidSlip {
                intended: self.intended,
                lateral: self.lateral,
            })
        }
    }
}

/// Rectangular grid with slippery compass moves. Moves that would leave the
/// grid leave the agent where it is.
#[derive(Debug, Clone)]
pub struct GridWorld {
    rows: usize,
    cols: usize,
    states: Vec<State>,
    actions: Vec<Action>,
    slip: SlipModel,
}

impl GridWorld {
    /// 3x3 board with a configurable terminal reward `r` in the top left
    /// corner and a terminal reward of 10 in the top right corner.
    pub fn standard(r: Continous) -> Self {
        let rewards = [
            vec![r, -1., 10.],
            vec![-1., -1., -1.],
            vec![-1., -1., -1.],
        ];

        Self::build(&rewards, &[(0, 0), (0, 2)], SlipModel::default())
    }

    pub fn from_rewards(
        rewards: Vec<Vec<Continous>>,
        terminals: &[(usize, usize)],
        slip: SlipModel,
    ) -> Result<Self> {
        let cols = rewards.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(Error::EmptyGrid);
        }

        if let Some((row, r)) = rewards.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(Error::RaggedGrid {
                row,
                expected: cols,
                got: r.len(),
            });
        }

        if let Some(&(row, col)) = terminals
            .iter()
            .find(|(row, col)| *row >= rewards.len() || *col >= cols)
        {
            return Err(Error::TerminalOutOfBounds { row, col });
        }

        slip.validate()?;

        Ok(Self::build(&rewards, terminals, slip))
    }

    /// Replace the compass actions. Enumeration order decides ties.
    pub fn with_actions(mut self, actions: Vec<Action>) -> Result<Self> {
        if actions.is_empty() {
            return Err(Error::NoActions);
        }

        self.actions = actions;
        Ok(self)
    }

    pub fn with_slip(mut self, slip: SlipModel) -> Result<Self> {
        slip.validate()?;

        self.slip = slip;
        Ok(self)
    }

    fn build(rewards: &[Vec<Continous>], terminals: &[(usize, usize)], slip: SlipModel) -> Self {
        let rows = rewards.len();
        let cols = rewards.first().map_or(0, Vec::len);
        let states = iproduct!(0..rows, 0..cols)
            .enumerate()
            .map(|(id, (row, col))| State {
                id,
                position: Position::new(row as i32, col as i32),
                reward: rewards[row][col],
                terminal: terminals.contains(&(row, col)),
            })
            .collect();

        Self {
            rows,
            cols,
            states,
            actions: compass(),
            slip,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn slip(&self) -> SlipModel {
        self.slip
    }

    pub fn state_at(&self, row: usize, col: usize) -> Option<&State> {
        if row < self.rows && col < self.cols {
            self.states.get(row * self.cols + col)
        } else {
            None
        }
    }

    fn contains(&self, p: Position) -> bool {
        (0..self.rows as i32).contains(&p.row) && (0..self.cols as i32).contains(&p.col)
    }

    fn landing(&self, from: Position, d: Direction) -> Position {
        let to = from + d;
        if self.contains(to) {
            to
        } else {
            from
        }
    }

    /// Intended move first, then the two lateral slips.
    pub fn outcomes(&self, from: Position, d: Direction) -> [(Position, Continous); 3] {
        let [left, right] = d.perpendiculars();
        [
            (self.landing(from, d), self.slip.intended),
            (self.landing(from, left), self.slip.lateral),
            (self.landing(from, right), self.slip.lateral),
        ]
    }
}

/// East, West, South, North.
pub fn compass() -> Vec<Action> {
    [("East", 0, 1), ("West", 0, -1), ("South", 1, 0), ("North", -1, 0)]
        .into_iter()
        .enumerate()
        .map(|(id, (name, d_row, d_col))| Action {
            id,
            name: name.to_string(),
            direction: Direction { d_row, d_col },
        })
        .collect()
}

impl TransitionModel for GridWorld {
    fn probability(&self, from: &State, to: &State, action: &Action) -> Continous {
        if from.terminal {
            return 0.;
        }

        self.outcomes(from.position, action.direction)
            .iter()
            .filter(|(p, _)| *p == to.position)
            .map(|(_, pr)| *pr)
            .sum()
    }
}

impl Mdp for GridWorld {
    fn states(&self) -> &[State] {
        &self.states
    }

    fn actions(&self) -> &[Action] {
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertor::*;
    use float_eq::*;
    use rstest::*;

    fn total(gw: &GridWorld, from: &State, a: &Action) -> Continous {
        gw.states().iter().map(|to| gw.probability(from, to, a)).sum()
    }

    fn p(gw: &GridWorld, from: StateId, to: StateId, a: ActionId) -> Continous {
        let s = gw.states();
        gw.probability(&s[from], &s[to], &gw.actions()[a])
    }

    #[rstest]
    #[case(100.)]
    #[case(3.)]
    #[case(0.)]
    #[case(-3.)]
    fn probabilities_sum_to_one_for_non_terminals(#[case] r: Continous) {
        let gw = GridWorld::standard(r);
        for s in gw.states().iter().filter(|s| !s.terminal) {
            for a in gw.actions() {
                assert_float_eq!(total(&gw, s, a), 1., abs <= 1e-9);
            }
        }
    }

    #[test]
    fn terminals_are_absorbing() {
        let gw = GridWorld::standard(100.);
        for s in gw.states().iter().filter(|s| s.terminal) {
            for to in gw.states() {
                for a in gw.actions() {
                    assert_eq!(gw.probability(s, to, a), 0.);
                }
            }
        }
    }

    #[test]
    fn standard_board_layout() {
        let gw = GridWorld::standard(-3.);

        assert_that!(gw.n_s()).is_equal_to(9);
        assert_that!(gw.n_a()).is_equal_to(4);
        let terminals: Vec<_> = gw.states().iter().filter(|s| s.terminal).map(|s| s.id).collect();
        assert_eq!(terminals, vec![0, 2]);
        assert_eq!(gw.state_at(0, 0).map(|s| s.reward), Some(-3.));
        assert_eq!(gw.state_at(0, 2).map(|s| s.reward), Some(10.));
        assert_eq!(gw.state_at(2, 1).map(|s| s.id), Some(7));
        assert!(gw.state_at(3, 0).is_none());
    }

    #[test]
    fn off_grid_moves_accumulate_on_the_start_cell() {
        let gw = GridWorld::standard(100.);
        let (east, west, north) = (0, 1, 3);

        // bottom left corner, heading west: intended and southern slip bounce
        assert_float_eq!(p(&gw, 6, 6, west), 0.9, abs <= 1e-12);
        assert_float_eq!(p(&gw, 6, 3, west), 0.1, abs <= 1e-12);
        assert_float_eq!(p(&gw, 6, 7, west), 0., abs <= 1e-12);

        // bottom middle, heading north: nothing leaves the grid
        assert_float_eq!(p(&gw, 7, 4, north), 0.8, abs <= 1e-12);
        assert_float_eq!(p(&gw, 7, 6, north), 0.1, abs <= 1e-12);
        assert_float_eq!(p(&gw, 7, 8, north), 0.1, abs <= 1e-12);
        assert_eq!(p(&gw, 7, 7, north), 0.);

        // right edge, heading east
        assert_float_eq!(p(&gw, 5, 5, east), 0.8, abs <= 1e-12);
        assert_float_eq!(p(&gw, 5, 2, east), 0.1, abs <= 1e-12);
        assert_float_eq!(p(&gw, 5, 8, east), 0.1, abs <= 1e-12);
    }

    #[test]
    fn successors_list_only_reachable_states() {
        let gw = GridWorld::standard(100.);
        let s = gw.states();
        let next = gw.successors(s, &s[4], &gw.actions()[3]);

        assert_eq!(next, vec![(1, 0.8), (3, 0.1), (5, 0.1)]);
        assert!(gw.successors(s, &s[0], &gw.actions()[0]).is_empty());
    }

    #[rstest]
    #[case(SlipModel { intended: 0.8, lateral: 0.1 })]
    #[case(SlipModel { intended: 0.6, lateral: 0.2 })]
    #[case(SlipModel { intended: 1.0, lateral: 0.0 })]
    fn rectangular_grids_stay_normalized(#[case] slip: SlipModel) {
        let gw = GridWorld::from_rewards(
            vec![vec![-1., -1., -1., 1.], vec![-1., -1., -1., -1.]],
            &[(0, 3)],
            slip,
        )
        .unwrap();

        assert_eq!(gw.rows(), 2);
        assert_eq!(gw.cols(), 4);
        for s in gw.states().iter().filter(|s| !s.terminal) {
            for a in gw.actions() {
                assert_float_eq!(total(&gw, s, a), 1., abs <= 1e-9);
            }
        }
    }

    #[test]
    fn single_cell_grid_loops_on_itself() {
        let gw = GridWorld::from_rewards(vec![vec![-1.]], &[], SlipModel::default()).unwrap();
        let s = &gw.states()[0];

        for a in gw.actions() {
            assert_float_eq!(gw.probability(s, s, a), 1., abs <= 1e-12);
        }
    }

    #[test]
    fn invalid_grids_are_rejected() {
        let slip = SlipModel::default();

        assert!(matches!(
            GridWorld::from_rewards(vec![], &[], slip),
            Err(Error::EmptyGrid)
        ));
        assert!(matches!(
            GridWorld::from_rewards(vec![vec![1., 2.], vec![3.]], &[], slip),
            Err(Error::RaggedGrid {
                row: 1,
                expected: 2,
                got: 1
            })
        ));
        assert!(matches!(
            GridWorld::from_rewards(vec![vec![1., 2.]], &[(0, 2)], slip),
            Err(Error::TerminalOutOfBounds { row: 0, col: 2 })
        ));
        assert!(matches!(
            GridWorld::from_rewards(vec![vec![1.]], &[], SlipModel { intended: 0.8, lateral: 0.2 }),
            Err(Error::InvalidSlip { .. })
        ));
        assert!(matches!(
            GridWorld::standard(0.).with_actions(vec![]),
            Err(Error::NoActions)
        ));
    }

    #[test]
    fn slip_model_validation() {
        assert!(SlipModel::new(0.8, 0.1).is_ok());
        assert!(SlipModel::new(0.5, 0.25).is_ok());
        assert!(SlipModel::new(1.2, -0.1).is_err());
        assert!(SlipModel::new(0.7, 0.1).is_err());
    }
}
