use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::Add;

pub type Continous = f64;
pub type StateId = usize;
pub type ActionId = usize;

/// One action per state, indexed by [`StateId`].
pub type Policy = Vec<Action>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl Add<Direction> for Position {
    type Output = Position;

    fn add(self, d: Direction) -> Position {
        Position::new(self.row + d.d_row, self.col + d.d_col)
    }
}

/// Axis aligned unit step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    pub d_row: i32,
    pub d_col: i32,
}

impl Direction {
    pub fn new(d_row: i32, d_col: i32) -> Option<Self> {
        match (d_row.abs(), d_col.abs()) {
            (1, 0) | (0, 1) => Some(Self { d_row, d_col }),
            _ => None,
        }
    }

    /// The two directions at ±90° to this one.
    pub fn perpendiculars(&self) -> [Direction; 2] {
        [
            Direction {
                d_row: self.d_col,
                d_col: -self.d_row,
            },
            Direction {
                d_row: -self.d_col,
                d_col: self.d_row,
            },
        ]
    }
}

/// A decision point of the MDP. Immutable once the model is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub position: Position,
    pub reward: Continous,
    pub terminal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub name: String,
    pub direction: Direction,
}

impl Action {
    pub fn new(id: ActionId, name: &str, d_row: i32, d_col: i32) -> Result<Self> {
        let direction = Direction::new(d_row, d_col).ok_or_else(|| Error::InvalidDirection {
            name: name.to_string(),
            d_row,
            d_col,
        })?;

        Ok(Self {
            id,
            name: name.to_string(),
            direction,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeEvent {
    pub s: StateId,
    pub r: Continous,
}

pub trait EpisodeGenerator {
    fn generate(&self, n: usize, seed: Option<u64>) -> Vec<Vec<EpisodeEvent>>;
}
