use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// First square past the playable track. Pawns at or beyond it have finished.
pub const HOME: u8 = 30;

/// Squares where a pawn can never be captured.
pub const SAFE_SQUARES: [u8; 4] = [14, 25, 27, 28];

/// Landing here sends the pawn back to the rebirth square.
pub const WATER_SQUARE: u8 = 26;
pub const REBIRTH_SQUARE: u8 = 14;

pub const PAWNS_PER_SIDE: usize = 5;

const STICK_COUNT: usize = 4;

// Throw values that keep the turn. 0 is the sentinel before the first throw.
const REROLL_VALUES: [u8; 4] = [0, 1, 4, 5];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("active side has no pawn on square {0}")]
    NoPawnAt(u8),
}

/// Mutable board of a single Senet game.
///
/// The track has 30 playable squares (0..=29); positions `>= HOME` are
/// finished pawns. All mutation goes through [`roll_sticks`](Self::roll_sticks),
/// [`move_pawn`](Self::move_pawn) and [`pass_turn`](Self::pass_turn);
/// `movable_positions` always reflects the side holding the turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub white_positions: Vec<u8>,
    pub black_positions: Vec<u8>,
    pub movable_positions: Vec<u8>,
    pub sticks: Vec<u8>,
    pub sticks_value: u8,
    pub is_white_turn: bool,
}

impl BoardState {
    /// Starting layout with an initial throw already made for white.
    pub fn new() -> Self {
        let mut board = Self {
            white_positions: vec![0, 2, 4, 6, 8],
            black_positions: vec![1, 3, 5, 7, 9],
            movable_positions: Vec::new(),
            sticks: Vec::new(),
            sticks_value: 0,
            is_white_turn: true,
        };
        board.roll_sticks();
        board
    }

    /// Throws the four sticks for the side holding the turn.
    ///
    /// If the previous value was 2 or 3 the turn passes first; 1, 4 and 5
    /// grant another throw to the same side. Recomputes the movable set.
    pub fn roll_sticks(&mut self) {
        if !REROLL_VALUES.contains(&self.sticks_value) {
            self.is_white_turn = !self.is_white_turn;
        }
        let mut rng = rand::thread_rng();
        self.sticks = (0..STICK_COUNT).map(|_| rng.gen_range(0..=1)).collect();
        self.sticks_value = sticks_value(&self.sticks);
        self.set_movable();
    }

    /// Gives the turn to the other side without moving, then throws for them.
    /// Used when the movable set is empty.
    pub fn pass_turn(&mut self) {
        let next_turn_white = !self.is_white_turn;
        self.roll_sticks();
        self.is_white_turn = next_turn_white;
        self.set_movable();
    }

    /// Recomputes which of the active side's pawns may move by the current
    /// throw value.
    pub fn set_movable(&mut self) {
        let (own, enemy) = if self.is_white_turn {
            (&self.white_positions, &self.black_positions)
        } else {
            (&self.black_positions, &self.white_positions)
        };
        let throw = self.sticks_value;
        let movable: Vec<u8> = own
            .iter()
            .copied()
            .filter(|&pawn| pawn < HOME && pawn_can_move(own, enemy, pawn, throw))
            .collect();
        self.movable_positions = movable;
    }

    /// Relocates the active side's pawn at `source` by the current throw.
    ///
    /// A lone enemy pawn on the target square is swapped back to `source`;
    /// landing on the water square warps the mover to the rebirth square,
    /// cascading backwards past occupied squares. Does not throw again or
    /// toggle the turn.
    pub fn move_pawn(&mut self, source: u8) -> Result<(), BoardError> {
        let throw = self.sticks_value;
        let (own, enemy) = if self.is_white_turn {
            (&mut self.white_positions, &mut self.black_positions)
        } else {
            (&mut self.black_positions, &mut self.white_positions)
        };
        let index = own
            .iter()
            .position(|&pawn| pawn == source)
            .ok_or(BoardError::NoPawnAt(source))?;

        let target = source + throw;
        if target < HOME {
            if let Some(captured) = enemy.iter().position(|&pawn| pawn == target) {
                enemy[captured] = source;
            }
        }
        own[index] = target;

        if target == WATER_SQUARE {
            let mut rebirth = REBIRTH_SQUARE;
            while own.contains(&rebirth) || enemy.contains(&rebirth) {
                rebirth -= 1;
            }
            own[index] = rebirth;
        }
        Ok(())
    }

    pub fn white_finished(&self) -> bool {
        self.white_positions.iter().all(|&pawn| pawn >= HOME)
    }

    pub fn black_finished(&self) -> bool {
        self.black_positions.iter().all(|&pawn| pawn >= HOME)
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

fn sticks_value(sticks: &[u8]) -> u8 {
    match sticks.iter().filter(|&&stick| stick == 1).count() {
        0 => 5,
        1 => 1,
        2 => 2,
        3 => 3,
        _ => 4,
    }
}

fn pawn_can_move(own: &[u8], enemy: &[u8], location: u8, throw: u8) -> bool {
    let target = location + throw;

    if is_enemy_guarded(enemy, target) {
        return false;
    }
    // Safe squares block landing only when it would capture.
    if SAFE_SQUARES.contains(&target) && enemy.contains(&target) {
        return false;
    }
    if is_enemy_blockaded(enemy, target, throw) {
        return false;
    }
    // Own pawns may only pile up once finished.
    if own.contains(&target) && target < HOME {
        return false;
    }
    // Home free from 25; a pawn on 29 always has its final exit.
    if location == 25 || (location == 29 && target >= HOME) {
        return true;
    }
    // The final stretch is only entered square by square from 25.
    if target > 25 && target < HOME && location != 25 {
        return false;
    }
    // 27 and 28 must land exactly on home.
    if (location == 27 || location == 28) && target != HOME {
        return false;
    }
    true
}

fn is_enemy_guarded(enemy: &[u8], target: u8) -> bool {
    if !enemy.contains(&target) {
        return false;
    }
    (target > 0 && enemy.contains(&(target - 1))) || (target < 29 && enemy.contains(&(target + 1)))
}

fn is_enemy_blockaded(enemy: &[u8], target: u8, throw: u8) -> bool {
    // Four-square runs only matter for throws that could leap them; the run
    // may end on the square before the target or one past it.
    throw > 3
        && target >= 4
        && enemy.contains(&(target - 2))
        && enemy.contains(&(target - 3))
        && (enemy.contains(&(target - 1)) || enemy.contains(&(target - 4)))
}
