use super::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn cells(list: &[u8]) -> Board {
    list.iter().fold(0, |board, &cell| board | (1u128 << cell))
}

fn sub_board_cells(sub_board: u8) -> Vec<u8> {
    (sub_board * 9..sub_board * 9 + 9).collect()
}

#[test]
fn test_initial_state() {
    let state = GameState::new(Player::Me);
    assert_eq!(state.my_cells(), 0);
    assert_eq!(state.opp_cells(), 0);
    assert_eq!(state.ply(), 0);
    assert_eq!(state.last_move(), None);
    assert!(state.is_my_turn());
    assert!(!state.is_terminal());
    assert_eq!(state.legal_moves(), vec![codec::CENTER_CELL]);
}

#[test]
fn test_opening_without_forced_center() {
    let rules = Rules::default().with_forced_center_opening(false);
    let state = GameState::with_rules(Player::Opponent, rules);
    assert_eq!(state.legal_move_count(), 81);
    assert_eq!(state.legal_moves_mask(), BOARD_MASK);
}

#[test]
fn test_center_opening_sends_to_center_sub_board() {
    let mut state = GameState::new(Player::Me);
    state.play(codec::CENTER_CELL).unwrap();

    let expected: Vec<u8> = sub_board_cells(4)
        .into_iter()
        .filter(|&c| c != codec::CENTER_CELL)
        .collect();
    assert_eq!(state.legal_moves(), expected);
    assert_eq!(state.to_move(), Player::Opponent);
    assert_eq!(state.last_move(), Some(codec::CENTER_CELL));
    assert_eq!(state.ply(), 1);
    assert_eq!(state.my_cells(), 1u128 << codec::CENTER_CELL);
}

#[test]
fn test_local_position_selects_next_sub_board() {
    // 36 is the top-left cell of sub-board 4, so the reply goes to sub-board 0
    let state = GameState::from_moves(Player::Me, Rules::default(), &[40, 36]).unwrap();
    assert_eq!(state.legal_moves(), sub_board_cells(0));
    assert!(state.is_my_turn());
}

#[test]
fn test_illegal_move_is_rejected() {
    let mut state = GameState::new(Player::Me);
    let before = state;

    let err = state.play(0).unwrap_err();
    assert_eq!(
        err,
        GameError::IllegalMove {
            cell: 0,
            last_move: None
        }
    );
    assert_eq!(state, before);

    assert!(state.play(81).is_err());
    assert!(state.play(200).is_err());

    state.play(40).unwrap();
    // occupied cell
    assert!(state.play(40).is_err());
    // outside the forced sub-board
    assert!(state.play(0).is_err());
}

#[test]
fn test_after_leaves_original_untouched() {
    let state = GameState::new(Player::Me);
    let next = state.after(40).unwrap();
    assert_eq!(state.ply(), 0);
    assert_eq!(next.ply(), 1);
    assert!(state.after(3).is_err());
}

#[test]
fn test_completing_a_line_wins_the_sub_board() {
    // me: 0 and 1 of sub-board 0; opponent just played 9 (local 0 of sub-board 1)
    let state = GameState::from_parts(
        cells(&[0, 1]),
        cells(&[9]),
        Player::Me,
        Some(9),
        Rules::default(),
    )
    .unwrap();
    assert_eq!(state.legal_moves(), (2..9).collect::<Vec<_>>());

    let next = state.after(2).unwrap();
    assert_eq!(next.my_won_sub_boards(), 0b1);
    assert_eq!(next.sub_board_status(0), SubBoardStatus::WonByMe);
    // no cell of a won sub-board is ever legal again
    assert_eq!(next.legal_moves_mask() & sub_board_mask(0), 0);
    // 2 is local position 2, so the reply goes to sub-board 2
    assert_eq!(next.legal_moves(), sub_board_cells(2));
}

#[test]
fn test_won_target_falls_back_to_every_open_cell() {
    // sub-board 0 is won by me, opponent was sent there by my move at 9
    let state = GameState::from_parts(
        cells(&[0, 1, 2, 9]),
        0,
        Player::Opponent,
        Some(9),
        Rules::default(),
    )
    .unwrap();
    assert_eq!(state.sub_board_status(0), SubBoardStatus::WonByMe);
    assert_eq!(state.legal_move_count(), 81 - 9 - 1);
    assert_eq!(state.legal_moves_mask() & sub_board_mask(0), 0);
    assert!(!state.is_legal(9));
}

#[test]
fn test_full_target_falls_back_without_crediting_anyone() {
    // sub-board 0 full, no line: me {0,2,3,7,8}, opponent {1,4,5,6}
    let state = GameState::from_parts(
        cells(&[0, 2, 3, 7, 8]),
        cells(&[1, 4, 5, 6, 18]),
        Player::Me,
        Some(18),
        Rules::default(),
    )
    .unwrap();
    assert_eq!(state.sub_board_status(0), SubBoardStatus::Drawn);
    assert_eq!(state.my_won_sub_boards(), 0);
    assert_eq!(state.opp_won_sub_boards(), 0);
    assert_eq!(state.legal_move_count(), 81 - 9 - 1);
    assert!(!state.is_terminal());
}

#[test]
fn test_meta_line_ends_the_game() {
    // me wins sub-boards 0, 1 and 2 with their top rows
    let mine = cells(&[0, 1, 2, 9, 10, 11, 18, 19, 20]);
    let state =
        GameState::from_parts(mine, cells(&[40]), Player::Opponent, Some(20), Rules::default())
            .unwrap();
    assert_eq!(state.my_won_sub_boards(), 0b111);
    assert!(state.is_terminal());
    assert_eq!(state.winner(), Some(Player::Me));
    assert!((state.outcome() - 1.0).abs() < 1e-6);

    let swapped = GameState::from_parts(
        cells(&[40]),
        mine,
        Player::Me,
        Some(20),
        Rules::default(),
    )
    .unwrap();
    assert_eq!(swapped.winner(), Some(Player::Opponent));
    assert!(swapped.outcome().abs() < 1e-6);
}

#[test]
fn test_stalemate_scoring() {
    // me wins sub-boards 0 and 4 (no line), opponent wins sub-board 5
    let mine = cells(&[0, 1, 2, 36, 37, 38]);
    let theirs = cells(&[45, 46, 47]);
    let counted =
        GameState::from_parts(mine, theirs, Player::Me, None, Rules::default()).unwrap();
    assert_eq!(counted.winner(), None);
    assert!((counted.outcome() - 1.0).abs() < 1e-6);

    let draw_rules = Rules::default().with_count_won_boards_on_stalemate(false);
    let plain = GameState::from_parts(mine, theirs, Player::Me, None, draw_rules).unwrap();
    assert!((plain.outcome() - 0.5).abs() < 1e-6);

    let behind = GameState::from_parts(theirs, mine, Player::Me, None, Rules::default()).unwrap();
    assert!(behind.outcome().abs() < 1e-6);

    let level = GameState::from_parts(
        cells(&[0, 1, 2]),
        theirs,
        Player::Me,
        None,
        Rules::default(),
    )
    .unwrap();
    assert!((level.outcome() - 0.5).abs() < 1e-6);
}

#[test]
fn test_from_parts_rejects_bad_input() {
    assert!(matches!(
        GameState::from_parts(cells(&[3]), cells(&[3]), Player::Me, None, Rules::default()),
        Err(GameError::InvalidPosition(_))
    ));
    assert!(GameState::from_parts(1u128 << 90, 0, Player::Me, None, Rules::default()).is_err());
    assert!(GameState::from_parts(0, 0, Player::Me, Some(81), Rules::default()).is_err());
}

#[test]
fn test_nth_legal_move() {
    let state = GameState::from_moves(Player::Me, Rules::default(), &[40]).unwrap();
    assert_eq!(state.nth_legal_move(0), Some(36));
    assert_eq!(state.nth_legal_move(4), Some(41));
    assert_eq!(state.nth_legal_move(8), None);
}

#[test]
fn test_random_games_keep_invariants() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);

    for game in 0..200 {
        let rules = Rules::default().with_forced_center_opening(game % 2 == 0);
        let mut state = GameState::with_rules(Player::Me, rules);

        while !state.is_terminal() {
            assert!(state.legal_move_count() > 0);
            let occupied = state.my_cells() | state.opp_cells();
            assert_eq!(state.legal_moves_mask() & occupied, 0);
            for sub_board in 0..9u8 {
                if matches!(
                    state.sub_board_status(sub_board),
                    SubBoardStatus::WonByMe | SubBoardStatus::WonByOpponent
                ) {
                    assert_eq!(state.legal_moves_mask() & sub_board_mask(sub_board), 0);
                }
            }

            let pick = rng.gen_range(0..state.legal_move_count() as usize);
            let cell = state.nth_legal_move(pick).unwrap();
            let ply = state.ply();
            state.play(cell).unwrap();

            assert_eq!(state.my_cells() & state.opp_cells(), 0);
            assert_eq!(state.ply(), ply + 1);
            assert_eq!(state.last_move(), Some(cell));
        }

        let outcome = state.outcome();
        assert!(outcome == 0.0 || outcome == 0.5 || outcome == 1.0);
        assert!(state.ply() <= 81);
    }
}
