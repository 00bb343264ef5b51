//! Pluggable board evaluation interfaces and the endgame-aware scorers.
//!
//! Search stays modular by delegating static position scoring to the
//! `BoardScorer` trait. `select_scorer` picks the middle-game scorer or one
//! of the specialised endgame scorers from the material still on the board.
//! All scores are in pawns.

use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, PieceKind, Position, CORNERS};

pub trait BoardScorer: Send + Sync {
    /// Score from `perspective`'s point of view.
    fn score(&self, board: &Board, perspective: Color) -> f64;

    fn name(&self) -> &'static str;
}

/// Figure counts per color and kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inventory {
    counts: [[u8; 6]; 2],
}

impl Inventory {
    pub fn of(board: &Board) -> Self {
        let mut inventory = Self::default();
        for figure in board.figures() {
            inventory.counts[figure.color().index()][figure.kind().index()] += 1;
        }
        inventory
    }

    #[inline]
    pub fn count(&self, color: Color, kind: PieceKind) -> u8 {
        self.counts[color.index()][kind.index()]
    }

    pub fn pawns(&self, color: Color) -> u8 {
        self.count(color, PieceKind::Pawn)
    }

    pub fn minors(&self, color: Color) -> u8 {
        self.count(color, PieceKind::Knight) + self.count(color, PieceKind::Bishop)
    }

    pub fn heavies(&self, color: Color) -> u8 {
        self.count(color, PieceKind::Rook) + self.count(color, PieceKind::Queen)
    }

    /// Only the king is left.
    pub fn is_bare_king(&self, color: Color) -> bool {
        self.pawns(color) == 0 && self.minors(color) == 0 && self.heavies(color) == 0
    }

    pub fn material(&self, color: Color) -> f64 {
        PieceKind::ALL
            .iter()
            .map(|kind| f64::from(self.count(color, *kind)) * kind.value())
            .sum()
    }

    pub fn material_balance(&self, perspective: Color) -> f64 {
        self.material(perspective) - self.material(perspective.opposite())
    }
}

/// Chooses the scorer that fits the material on the board.
pub fn select_scorer(inventory: &Inventory) -> &'static dyn BoardScorer {
    let [white, black] = Color::BOTH;
    let no_pawns = inventory.pawns(white) == 0 && inventory.pawns(black) == 0;
    let no_heavies = inventory.heavies(white) == 0 && inventory.heavies(black) == 0;
    let no_minors = inventory.minors(white) == 0 && inventory.minors(black) == 0;

    let lone_king_against_heavy = Color::BOTH.iter().any(|&color| {
        inventory.is_bare_king(color) && inventory.heavies(color.opposite()) > 0
    });

    if lone_king_against_heavy {
        &KingToEdgeScorer
    } else if no_pawns && no_heavies && !no_minors {
        &KingToCornerScorer
    } else if no_heavies && no_minors && !no_pawns {
        &PawnRaceScorer
    } else {
        &MiddleGameScorer
    }
}

/// Static score of the side to move, using the fitting scorer.
pub fn static_score(board: &Board) -> f64 {
    let inventory = Inventory::of(board);
    select_scorer(&inventory).score(board, board.side_to_move())
}

#[inline]
fn signed(white_minus_black: f64, perspective: Color) -> f64 {
    match perspective {
        Color::White => white_minus_black,
        Color::Black => -white_minus_black,
    }
}

/// Material, piece placement and pawn structure.
#[derive(Debug, Clone, Copy, Default)]
pub struct MiddleGameScorer;

impl MiddleGameScorer {
    const BISHOP_PAIR_BONUS: f64 = 0.28;
    const DOUBLED_PAWN_PENALTY: f64 = 0.15;
    const ISOLATED_PAWN_PENALTY: f64 = 0.12;
    const PASSED_PAWN_STEP_BONUS: f64 = 0.06;

    fn positional_white_minus_black(board: &Board) -> f64 {
        board
            .figures()
            .map(|figure| {
                let bonus = f64::from(piece_square_bonus(figure.kind(), figure.color(), figure.position()));
                signed(bonus / 100.0, figure.color())
            })
            .sum()
    }

    fn pawn_structure(board: &Board, color: Color) -> f64 {
        let own = pawn_files(board, color);
        let mut score = 0.0;
        for (file, count) in own.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            if *count > 1 {
                score -= Self::DOUBLED_PAWN_PENALTY * f64::from(count - 1);
            }
            let left = file.checked_sub(1).map_or(0, |f| own[f]);
            let right = own.get(file + 1).copied().unwrap_or(0);
            if left == 0 && right == 0 {
                score -= Self::ISOLATED_PAWN_PENALTY * f64::from(*count);
            }
        }
        for pawn in pawns_of(board, color) {
            if is_passed_pawn(board, pawn, color) {
                score += Self::PASSED_PAWN_STEP_BONUS * f64::from(advancement(pawn, color));
            }
        }
        score
    }
}

impl BoardScorer for MiddleGameScorer {
    fn score(&self, board: &Board, perspective: Color) -> f64 {
        let inventory = Inventory::of(board);
        let mut white_minus_black = inventory.material_balance(Color::White);
        white_minus_black += Self::positional_white_minus_black(board);
        white_minus_black +=
            Self::pawn_structure(board, Color::White) - Self::pawn_structure(board, Color::Black);
        for color in Color::BOTH {
            if inventory.count(color, PieceKind::Bishop) >= 2 {
                white_minus_black += signed(Self::BISHOP_PAIR_BONUS, color);
            }
        }
        signed(white_minus_black, perspective)
    }

    fn name(&self) -> &'static str {
        "middle game"
    }
}

/// Rook or queen against a bare king: drive the king to the edge and bring
/// the own king closer.
#[derive(Debug, Clone, Copy, Default)]
pub struct KingToEdgeScorer;

impl BoardScorer for KingToEdgeScorer {
    fn score(&self, board: &Board, perspective: Color) -> f64 {
        let inventory = Inventory::of(board);
        let strong = if inventory.is_bare_king(Color::Black) {
            Color::White
        } else {
            Color::Black
        };
        let weak_king = board.king_position(strong.opposite());
        let strong_king = board.king_position(strong);

        let edge_push = f64::from(weak_king.center_distance()) * 0.5;
        let king_closeness = f64::from(14 - weak_king.manhattan_distance(strong_king)) * 0.1;
        let strong_score = inventory.material_balance(strong) + edge_push + king_closeness;
        if perspective == strong {
            strong_score
        } else {
            -strong_score
        }
    }

    fn name(&self) -> &'static str {
        "king to edge"
    }
}

/// Only minor pieces left: drive the weaker king into a corner, for bishop
/// and knight into a corner of the bishop's colour.
#[derive(Debug, Clone, Copy, Default)]
pub struct KingToCornerScorer;

impl KingToCornerScorer {
    fn mating_corner_distance(board: &Board, strong: Color, weak_king: Position) -> u8 {
        let bishops: Vec<Position> = board
            .figures_of(strong)
            .filter(|figure| figure.kind() == PieceKind::Bishop)
            .map(|figure| figure.position())
            .collect();
        let has_knight = board
            .figures_of(strong)
            .any(|figure| figure.kind() == PieceKind::Knight);

        match bishops.as_slice() {
            [bishop] if has_knight => CORNERS
                .iter()
                .filter(|corner| corner.is_light_square() == bishop.is_light_square())
                .map(|corner| weak_king.distance(*corner))
                .min()
                .unwrap_or(0),
            _ => weak_king.corner_distance(),
        }
    }
}

impl BoardScorer for KingToCornerScorer {
    fn score(&self, board: &Board, perspective: Color) -> f64 {
        let inventory = Inventory::of(board);
        let balance = inventory.material_balance(Color::White);
        if balance == 0.0 {
            return 0.0;
        }
        let strong = if balance > 0.0 { Color::White } else { Color::Black };
        let weak_king = board.king_position(strong.opposite());
        let strong_king = board.king_position(strong);

        let corner_push = f64::from(7 - Self::mating_corner_distance(board, strong, weak_king)) * 0.3;
        let king_closeness = f64::from(7 - weak_king.distance(strong_king)) * 0.1;
        let strong_score = balance.abs() + corner_push + king_closeness;
        if perspective == strong {
            strong_score
        } else {
            -strong_score
        }
    }

    fn name(&self) -> &'static str {
        "king to corner"
    }
}

/// Kings and pawns only: passed pawns that the enemy king can no longer
/// catch (rule of the square) are counted almost as a queen.
#[derive(Debug, Clone, Copy, Default)]
pub struct PawnRaceScorer;

impl PawnRaceScorer {
    const UNSTOPPABLE_BONUS: f64 = 7.0;
    const STEP_BONUS: f64 = 0.1;

    fn race_score(board: &Board, color: Color) -> f64 {
        let enemy_king = board.king_position(color.opposite());
        let enemy_to_move = board.side_to_move() != color;
        let mut best_unstoppable: Option<u8> = None;
        let mut score = 0.0;

        for pawn in pawns_of(board, color) {
            score += Self::STEP_BONUS * f64::from(advancement(pawn, color));
            if !is_passed_pawn(board, pawn, color) {
                continue;
            }
            let mut steps = pawn.row().abs_diff(color.promotion_row());
            if pawn.row() == color.pawn_row() {
                steps -= 1;
            }
            let Some(queening) = Position::new(pawn.column(), color.promotion_row()) else {
                continue;
            };
            let king_steps = enemy_king.distance(queening);
            let reach = if enemy_to_move { king_steps.saturating_sub(1) } else { king_steps };
            if reach > steps {
                best_unstoppable = Some(best_unstoppable.map_or(steps, |best| best.min(steps)));
            }
        }

        if let Some(steps) = best_unstoppable {
            score += Self::UNSTOPPABLE_BONUS - f64::from(steps) * Self::STEP_BONUS;
        }
        score
    }
}

impl BoardScorer for PawnRaceScorer {
    fn score(&self, board: &Board, perspective: Color) -> f64 {
        let inventory = Inventory::of(board);
        let king_activity = |color: Color| {
            f64::from(3 - board.king_position(color).center_distance()) * 0.05
        };
        let white_minus_black = inventory.material_balance(Color::White)
            + Self::race_score(board, Color::White)
            - Self::race_score(board, Color::Black)
            + king_activity(Color::White)
            - king_activity(Color::Black);
        signed(white_minus_black, perspective)
    }

    fn name(&self) -> &'static str {
        "pawn race"
    }
}

/// Placement bonus in centipawns.
fn piece_square_bonus(piece: PieceKind, color: Color, position: Position) -> i32 {
    let file = i32::from(position.column());
    let r = match color {
        Color::White => i32::from(position.row()),
        Color::Black => 7 - i32::from(position.row()),
    };
    let dist_center = (file - 3).abs() + (r - 3).abs();
    let center_bonus = 4 - dist_center;

    match piece {
        PieceKind::Pawn => r * 8 - (file - 3).abs() * 2,
        PieceKind::Knight => center_bonus * 6,
        PieceKind::Bishop => center_bonus * 4 + r,
        PieceKind::Rook => r * 2,
        PieceKind::Queen => center_bonus * 2,
        PieceKind::King => {
            if r <= 1 {
                8 - (file - 4).abs() * 2
            } else {
                -center_bonus * 4
            }
        }
    }
}

fn pawns_of(board: &Board, color: Color) -> impl Iterator<Item = Position> + '_ {
    board
        .figures_of(color)
        .filter(|figure| figure.kind() == PieceKind::Pawn)
        .map(|figure| figure.position())
}

fn pawn_files(board: &Board, color: Color) -> [u8; 8] {
    let mut files = [0u8; 8];
    for pawn in pawns_of(board, color) {
        files[pawn.column() as usize] += 1;
    }
    files
}

/// Rows advanced from the pawn's start row.
fn advancement(pawn: Position, color: Color) -> u8 {
    pawn.row().abs_diff(color.pawn_row())
}

/// No enemy pawn ahead on the same or an adjacent file.
fn is_passed_pawn(board: &Board, pawn: Position, color: Color) -> bool {
    let enemy = color.opposite();
    !pawns_of(board, enemy).any(|other| {
        let ahead = match color {
            Color::White => other.row() > pawn.row(),
            Color::Black => other.row() < pawn.row(),
        };
        ahead && other.column().abs_diff(pawn.column()) <= 1
    })
}
