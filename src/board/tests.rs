use super::*;
use crate::error::{EngineError, MoveError};

#[test]
fn test_stone_opponent() {
    assert_eq!(Stone::Black.opponent(), Stone::White);
    assert_eq!(Stone::White.opponent(), Stone::Black);
    assert_eq!(Stone::Empty.opponent(), Stone::Empty);
}

#[test]
fn test_pos_conversion() {
    let pos = Pos::new(9, 9); // Center
    assert_eq!(pos.to_index(), 180);
    assert_eq!(Pos::from_index(180), pos);
    assert_eq!(pos, CENTER);
}

#[test]
fn test_pos_validity() {
    assert!(Pos::is_valid(0, 0));
    assert!(Pos::is_valid(18, 18));
    assert!(!Pos::is_valid(-1, 0));
    assert!(!Pos::is_valid(19, 0));
    assert!(Pos::try_new(0, 19).is_none());
    assert_eq!(Pos::new(5, 5).offset(1, -1, 5), Some(Pos::new(10, 0)));
    assert_eq!(Pos::new(5, 5).offset(1, -1, 6), None);
}

#[test]
fn test_board_constants() {
    assert_eq!(BOARD_SIZE, 19);
    assert_eq!(TOTAL_CELLS, 361);
    assert_eq!(WIN_LENGTH, 6);
}

#[test]
fn test_pos_ordering() {
    assert!(Pos::new(0, 0) < Pos::new(0, 1));
    assert!(Pos::new(0, 18) < Pos::new(1, 0));
}

#[test]
fn test_notation_center_and_corners() {
    assert_eq!(Pos::from_notation("JJ"), Ok(CENTER));
    // Row letters count from the bottom
    assert_eq!(Pos::from_notation("AS"), Ok(Pos::new(0, 0)));
    assert_eq!(Pos::from_notation("AA"), Ok(Pos::new(18, 0)));
    assert_eq!(Pos::from_notation("sa"), Ok(Pos::new(18, 18)));
    assert_eq!(Pos::new(0, 0).to_notation(), "AS");
    assert_eq!(Pos::new(3, 14).to_notation(), "OP");
    assert_eq!(Pos::from_notation("OP"), Ok(Pos::new(3, 14)));
}

#[test]
fn test_notation_rejects_out_of_range() {
    assert!(matches!(Pos::from_notation("TA"), Err(MoveError::OutOfRange(_))));
    assert!(matches!(Pos::from_notation("A"), Err(MoveError::Malformed(_))));
    assert!(matches!(Move::from_notation("JJK"), Err(MoveError::Malformed(_))));
}

#[test]
fn test_move_notation() {
    let mv = Move::from_notation("JJKK").unwrap();
    assert_eq!(mv, Move::pair(Pos::new(9, 9), Pos::new(8, 10)));
    assert_eq!(mv.to_notation(), "JJKK");
    assert_eq!(Move::from_notation("JJ").unwrap(), Move::single(CENTER));
    assert!(Move::from_notation("JJJJ").unwrap().is_single());
}

#[test]
fn test_move_same_cells() {
    let a = Pos::new(1, 1);
    let b = Pos::new(2, 2);
    assert!(Move::pair(a, b).same_cells(&Move::pair(b, a)));
    assert!(!Move::pair(a, b).same_cells(&Move::single(a)));
    assert!(Move::pair(a, b).contains(b));
}

#[test]
fn test_board_place_remove() {
    let mut board = Board::new();
    board.place_stone(Pos::new(4, 4), Stone::White);
    assert_eq!(board.get(Pos::new(4, 4)), Stone::White);
    assert_eq!(board.stone_count(), 1);
    assert_eq!(board.empty_count(), 360);
    board.remove_stone(Pos::new(4, 4));
    assert!(board.is_board_empty());
}

#[test]
fn test_opening_turn_is_single_stone() {
    let mut position = Position::new();
    assert_eq!(position.side_to_move(), Stone::Black);
    assert_eq!(position.stones_this_turn(), 1);

    let err = position.apply(Move::pair(Pos::new(9, 9), Pos::new(9, 10))).unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidMove(MoveError::WrongStoneCount { expected: 1, got: 2 })
    );
    assert_eq!(position, Position::new(), "rejected move must not mutate");

    position.apply(Move::single(CENTER)).unwrap();
    assert_eq!(position.side_to_move(), Stone::White);
    assert_eq!(position.stones_this_turn(), 2);
}

#[test]
fn test_apply_rejects_occupied_cell() {
    let mut position = Position::new();
    position.apply(Move::single(CENTER)).unwrap();
    let snapshot = position.clone();
    let err = position.apply(Move::pair(CENTER, Pos::new(0, 0))).unwrap_err();
    assert_eq!(err, EngineError::InvalidMove(MoveError::Occupied(CENTER)));
    assert_eq!(position, snapshot);
}

#[test]
fn test_apply_undo_restores_exactly() {
    let mut position = Position::new();
    position.apply(Move::single(CENTER)).unwrap();
    position.apply(Move::pair(Pos::new(8, 8), Pos::new(10, 10))).unwrap();
    let snapshot = position.clone();

    position.apply(Move::pair(Pos::new(9, 10), Pos::new(9, 11))).unwrap();
    assert_ne!(position.hash(), snapshot.hash());
    position.undo();

    assert_eq!(position, snapshot);
    assert_eq!(position.hash(), snapshot.hash());
    assert_eq!(position.side_to_move(), snapshot.side_to_move());
}

#[test]
fn test_incremental_hash_matches_full() {
    let mut position = Position::new();
    let moves = [
        Move::single(CENTER),
        Move::pair(Pos::new(8, 8), Pos::new(10, 10)),
        Move::pair(Pos::new(9, 10), Pos::new(9, 11)),
        Move::pair(Pos::new(9, 8), Pos::new(9, 12)),
    ];
    for mv in moves {
        position.apply(mv).unwrap();
        assert!(position.verify_hash().is_ok());
    }
    while position.undo().is_some() {
        assert!(position.verify_hash().is_ok());
    }
    assert_eq!(position.hash(), 0);
}

#[test]
fn test_transposed_move_orders_share_hash() {
    let mut a = Position::new();
    let mut b = Position::new();
    for position in [&mut a, &mut b] {
        position.apply(Move::single(CENTER)).unwrap();
    }
    a.apply(Move::pair(Pos::new(1, 1), Pos::new(2, 2))).unwrap();
    b.apply(Move::pair(Pos::new(2, 2), Pos::new(1, 1))).unwrap();
    assert_eq!(a.hash(), b.hash());
}

#[test]
fn test_scoped_move_undoes_on_drop() {
    let mut position = Position::new();
    position.apply(Move::single(CENTER)).unwrap();
    let snapshot = position.clone();
    {
        let mut child = position.play_scoped(Move::pair(Pos::new(0, 0), Pos::new(0, 1)));
        assert_eq!(child.side_to_move(), Stone::Black);
        let grandchild = child.play_scoped(Move::pair(Pos::new(5, 5), Pos::new(6, 6)));
        assert_eq!(grandchild.board().stone_count(), 5);
    }
    assert_eq!(position, snapshot);
}

#[test]
fn test_pass_scoped_restores() {
    let mut position = Position::new();
    position.apply(Move::single(CENTER)).unwrap();
    let snapshot = position.clone();
    {
        let passed = position.pass_scoped();
        assert_eq!(passed.side_to_move(), Stone::Black);
        assert!(passed.verify_hash().is_ok());
    }
    assert_eq!(position, snapshot);
}

#[test]
fn test_from_stones_derives_turn() {
    let black = [Pos::new(9, 9), Pos::new(9, 10), Pos::new(9, 11)];
    let white = [Pos::new(0, 0), Pos::new(0, 1)];
    let position = Position::from_stones(&black, &white, Stone::White).unwrap();
    assert_eq!(position.side_to_move(), Stone::White);
    assert_eq!(position.stones_this_turn(), 2);
    assert!(position.verify_hash().is_ok());

    let clash = Position::from_stones(&[CENTER], &[CENTER], Stone::Black);
    assert!(clash.is_err());
}

#[test]
fn test_color_swapped_keeps_side() {
    let position =
        Position::from_stones(&[CENTER], &[Pos::new(0, 0), Pos::new(0, 1)], Stone::Black).unwrap();
    let swapped = position.color_swapped();
    assert_eq!(swapped.side_to_move(), Stone::Black);
    assert_eq!(swapped.board().get(CENTER), Stone::White);
    assert_eq!(swapped.board().get(Pos::new(0, 0)), Stone::Black);
    assert!(swapped.verify_hash().is_ok());
}

#[test]
fn test_winner_and_game_over() {
    let black: Vec<Pos> = (3..9).map(|c| Pos::new(5, c)).collect();
    let white = [Pos::new(0, 0), Pos::new(0, 2), Pos::new(0, 4), Pos::new(0, 6), Pos::new(0, 8)];
    let mut position = Position::from_stones(&black, &white, Stone::White).unwrap();
    assert_eq!(position.winner(), Some(Stone::Black));
    let err = position.apply(Move::pair(Pos::new(10, 10), Pos::new(11, 11))).unwrap_err();
    assert_eq!(err, EngineError::InvalidMove(MoveError::GameOver));
}
