#[cfg(test)]
pub mod test {
    use anyhow::Result;

    use crate::{
        board::WIN_LINES,
        solver::{self, Solver},
        tablebase::{decode_position, position_code, reachable_positions, Tablebase},
        *,
    };

    fn immediate_wins(board: &Board, side: Side) -> Vec<usize> {
        board
            .legal_moves()
            .filter(|&index| board.play(index, side).winner() == Some(side))
            .collect()
    }

    /// Plays every possible human line against the computer, returning the number of finished games
    fn play_every_line(session: &GameSession) -> Result<usize> {
        match session.phase() {
            Phase::Terminal(outcome) => {
                assert_ne!(
                    outcome,
                    Outcome::Win(Side::Player),
                    "computer lost:\n{}",
                    session.board()
                );
                Ok(1)
            }
            Phase::AwaitingComputerMove => {
                let mut next = session.clone();
                next.computer_turn()?;
                play_every_line(&next)
            }
            Phase::AwaitingPlayerMove => {
                let mut games = 0;
                for index in session.board().legal_moves() {
                    let mut next = session.clone();
                    next.play(index)?;
                    games += play_every_line(&next)?;
                }
                Ok(games)
            }
        }
    }

    #[test]
    pub fn full_board_without_line_is_draw() -> Result<()> {
        let board: Board = "XOXXOOOXX".parse()?;
        assert!(board.is_full());
        assert_eq!(board.winner(), None);
        assert_eq!(board.outcome(), Outcome::Draw);
        Ok(())
    }

    #[test]
    pub fn every_line_wins_for_both_sides() {
        for side in [Side::Player, Side::Opponent].iter().copied() {
            for line in WIN_LINES.iter() {
                let board = line
                    .iter()
                    .fold(Board::new(), |board, &index| board.play(index, side));
                assert_eq!(board.outcome(), Outcome::Win(side), "line {:?}", line);
            }
        }
    }

    #[test]
    pub fn win_takes_precedence_over_draw() -> Result<()> {
        let board: Board = "XXXOOXOXO".parse()?;
        assert!(board.is_full());
        assert_eq!(board.outcome(), Outcome::Win(Side::Player));

        let board: Board = "XXO_O_OX_".parse()?;
        assert_eq!(board.outcome(), Outcome::Win(Side::Opponent));
        Ok(())
    }

    #[test]
    pub fn outcome_is_pure() -> Result<()> {
        let board: Board = "XO_OX____".parse()?;
        let first = outcome(&board);
        assert_eq!(first, Outcome::InProgress);
        assert_eq!(outcome(&board), first);
        assert_eq!(board, "XO_OX____".parse::<Board>()?);
        Ok(())
    }

    #[test]
    pub fn reset_gives_fresh_game() {
        assert_eq!(outcome(&reset()), Outcome::InProgress);
        assert_eq!(reset(), new_game());
        assert_eq!(new_game().legal_moves().count(), CELLS);
    }

    #[test]
    pub fn apply_rejects_occupied_cells() -> Result<()> {
        let board: Board = "X___O____".parse()?;

        assert_eq!(
            apply(&board, 0, Side::Opponent),
            Err(InvalidMove::Occupied(0))
        );
        assert_eq!(board.apply(4, Side::Player), Err(InvalidMove::Occupied(4)));
        assert_eq!(board.apply(9, Side::Player), Err(InvalidMove::OutOfRange(9)));
        assert_eq!(board, "X___O____".parse::<Board>()?);

        let next = board.apply(8, Side::Player)?;
        assert_eq!(next.get(8), Some(Cell::PlayerMark));
        // the original is a separate value
        assert_eq!(board.get(8), Some(Cell::Empty));
        assert_eq!(next.legal_moves().count(), board.legal_moves().count() - 1);
        Ok(())
    }

    #[test]
    pub fn legal_moves_ascending() -> Result<()> {
        let board: Board = "X_O_X_O__".parse()?;
        assert_eq!(board.legal_moves().collect::<Vec<_>>(), vec![1, 3, 5, 7, 8]);
        assert!(!board.is_full());

        let board: Board = "XOXXOOOXX".parse()?;
        assert_eq!(board.legal_moves().count(), 0);
        Ok(())
    }

    #[test]
    pub fn side_to_move_alternates() -> Result<()> {
        let board: Board = "X________".parse()?;
        assert_eq!(board.side_to_move(Side::Player), Side::Opponent);

        let board: Board = "XO_______".parse()?;
        assert_eq!(board.side_to_move(Side::Player), Side::Player);
        assert_eq!(board.side_to_move(Side::Opponent), Side::Opponent);
        Ok(())
    }

    #[test]
    pub fn parse_and_display() -> Result<()> {
        let board: Board = "xo.-_OX__".parse()?;
        assert_eq!(board.to_string(), "XO_\n__O\nX__");

        assert_eq!(
            "XO".parse::<Board>(),
            Err(ParseBoardError::WrongLength { found: 2 })
        );
        assert_eq!(
            "XO_?_____".parse::<Board>(),
            Err(ParseBoardError::UnknownCell('?'))
        );
        Ok(())
    }

    #[test]
    pub fn takes_immediate_win() -> Result<()> {
        let board: Board = "OO_XX____".parse()?;
        assert_eq!(best_move(&board, Side::Opponent), Some(2));
        Ok(())
    }

    #[test]
    pub fn blocks_immediate_loss() -> Result<()> {
        let board: Board = "XX_O_____".parse()?;
        assert_eq!(best_move(&board, Side::Opponent), Some(2));
        Ok(())
    }

    #[test]
    pub fn ties_go_to_lowest_cell() -> Result<()> {
        // both 6 and 8 win immediately
        let board: Board = "OXXOOX_X_".parse()?;
        let mut solver = Solver::new(board, Side::Opponent);
        assert_eq!(solver.solve(), Some((10, 6)));

        // every opening move draws
        assert_eq!(Solver::new(Board::new(), Side::Player).solve(), Some((0, 0)));
        Ok(())
    }

    #[test]
    pub fn prefers_fastest_win() {
        let mut checked = 0;
        for board in reachable_positions(Side::Player) {
            if board.outcome().is_terminal() {
                continue;
            }
            let side = board.side_to_move(Side::Player);
            let wins = immediate_wins(&board, side);
            if let Some(&first_win) = wins.first() {
                let mut search = Solver::new(board, side);
                assert_eq!(
                    search.solve(),
                    Some((solver::WIN_SCORE, first_win)),
                    "\n{}",
                    board
                );
                checked += 1;
            }
        }
        assert!(checked > 0);
    }

    #[test]
    pub fn unavoidable_loss() -> Result<()> {
        // X threatens both 2 and 6
        let board: Board = "XX_XO___O".parse()?;
        let mut solver = Solver::new(board, Side::Opponent);
        let (score, best) = solver.solve().unwrap();

        assert_eq!((score, best), (-9, 2));
        assert_eq!(solver.score_to_win_distance(score), 2);
        assert!(solver.node_count > 0);
        Ok(())
    }

    #[test]
    pub fn win_distance() -> Result<()> {
        let solver = Solver::new("OO_XX____".parse()?, Side::Opponent);
        assert_eq!(solver.score_to_win_distance(10), 1);
        assert_eq!(solver.score_to_win_distance(0), 5);

        let solver = Solver::new(Board::new(), Side::Player);
        assert_eq!(solver.score_to_win_distance(0), 9);
        Ok(())
    }

    #[test]
    pub fn evaluate_scores_finished_games_by_depth() -> Result<()> {
        let won: Board = "OOOXX_X__".parse()?;
        assert_eq!(solver::evaluate(&won, Side::Opponent, 0, false), 10);
        assert_eq!(solver::evaluate(&won, Side::Opponent, 3, false), 7);
        assert_eq!(solver::evaluate(&won, Side::Player, 3, true), -7);

        let drawn: Board = "XOXXOOOXX".parse()?;
        assert_eq!(solver::evaluate(&drawn, Side::Opponent, 4, true), 0);
        Ok(())
    }

    #[test]
    pub fn best_move_is_always_empty() {
        for first in [Side::Player, Side::Opponent].iter().copied() {
            for board in reachable_positions(first) {
                if board.outcome().is_terminal() {
                    continue;
                }
                let side = board.side_to_move(first);
                match best_move(&board, side) {
                    Some(index) => assert!(board.is_empty(index), "\n{}", board),
                    None => panic!("no move found for\n{}", board),
                }
            }
        }
    }

    #[test]
    pub fn perfect_play_draws() -> Result<()> {
        let mut board = new_game();
        let mut side = Side::Player;
        while outcome(&board) == Outcome::InProgress {
            let index = best_move(&board, side).unwrap();
            board = apply(&board, index, side)?;
            side = side.opponent();
        }
        assert_eq!(outcome(&board), Outcome::Draw);
        Ok(())
    }

    #[test]
    pub fn computer_never_loses() -> Result<()> {
        let games = play_every_line(&GameSession::new(Side::Player))?;
        assert!(games > 0);

        let games = play_every_line(&GameSession::new(Side::Opponent))?;
        assert!(games > 0);
        Ok(())
    }

    #[test]
    pub fn session_turn_order() -> Result<()> {
        let mut session = GameSession::default();
        assert_eq!(session.phase(), Phase::AwaitingPlayerMove);
        assert_eq!(session.computer_turn(), Err(SessionError::NotComputerTurn));

        assert_eq!(session.play(4)?, Phase::AwaitingComputerMove);
        assert_eq!(session.play(0), Err(SessionError::NotPlayerTurn));

        let index = session.computer_turn()?;
        assert_ne!(index, 4);
        assert_eq!(session.board().get(index), Some(Cell::OpponentMark));
        assert_eq!(session.phase(), Phase::AwaitingPlayerMove);

        let before = *session.board();
        assert_eq!(
            session.play(index),
            Err(SessionError::InvalidMove(InvalidMove::Occupied(index)))
        );
        assert_eq!(*session.board(), before);
        assert_eq!(session.phase(), Phase::AwaitingPlayerMove);
        Ok(())
    }

    #[test]
    pub fn computer_can_open() -> Result<()> {
        let mut session = GameSession::new(Side::Opponent);
        assert_eq!(session.phase(), Phase::AwaitingComputerMove);
        assert_eq!(session.computer_turn()?, 0);
        assert_eq!(session.phase(), Phase::AwaitingPlayerMove);
        Ok(())
    }

    #[test]
    pub fn terminal_is_absorbing_until_reset() -> Result<()> {
        let mut session = GameSession::new(Side::Player);

        // the human always takes the lowest free cell
        while !session.outcome().is_terminal() {
            if session.phase() == Phase::AwaitingPlayerMove {
                let index = session.board().legal_moves().next().unwrap();
                session.play(index)?;
            } else {
                session.computer_turn()?;
            }
        }

        let outcome = session.outcome();
        assert_eq!(session.phase(), Phase::Terminal(outcome));
        assert_ne!(outcome, Outcome::Win(Side::Player));
        assert_eq!(session.play(0), Err(SessionError::GameOver));
        assert_eq!(session.computer_turn(), Err(SessionError::GameOver));

        session.reset();
        assert_eq!(session.phase(), Phase::AwaitingPlayerMove);
        assert_eq!(session.outcome(), Outcome::InProgress);
        assert_eq!(*session.board(), Board::new());
        Ok(())
    }

    #[test]
    pub fn offloaded_search() -> Result<()> {
        let mut session = GameSession::default();
        session.play(0)?;

        let request = session.search_request()?;
        let index = std::thread::spawn(move || request.solve())
            .join()
            .unwrap()
            .unwrap();
        assert_eq!(request.board(), session.board());
        assert_eq!(best_move(session.board(), Side::Opponent), Some(index));

        session.commit(&request, index)?;
        assert_eq!(session.board().get(index), Some(Cell::OpponentMark));
        Ok(())
    }

    #[test]
    pub fn stale_search_is_rejected() -> Result<()> {
        let mut session = GameSession::default();
        session.play(0)?;
        let request = session.search_request()?;
        let index = request.solve().unwrap();

        // the same board, reached again after a reset, is still a different game
        session.reset();
        session.play(0)?;
        assert_eq!(
            session.commit(&request, index),
            Err(SessionError::StaleSearch)
        );
        assert_eq!(session.board().count(Side::Opponent), 0);
        Ok(())
    }

    #[test]
    pub fn reachable_position_count() {
        assert_eq!(reachable_positions(Side::Player).len(), 5478);
        assert_eq!(reachable_positions(Side::Opponent).len(), 5478);
    }

    #[test]
    pub fn position_codes() -> Result<()> {
        let board: Board = "XO_OX___O".parse()?;
        let code = position_code(&board, Side::Opponent);
        assert_eq!(decode_position(code), Some((board, Side::Opponent)));
        assert_ne!(code, position_code(&board, Side::Player));
        assert_eq!(decode_position(0b11), None);
        Ok(())
    }

    /// Writes raw bytes to a scratch file and tries to load them as a tablebase
    fn load_bytes(name: &str, bytes: &[u8]) -> Result<Result<Tablebase>> {
        let path = std::env::temp_dir().join(format!(
            "tictactoe_{}_{}.bin",
            name,
            std::process::id()
        ));
        std::fs::write(&path, bytes)?;
        let loaded = Tablebase::load(&path);
        std::fs::remove_file(&path)?;
        Ok(loaded)
    }

    fn entry_bytes(code: u32, score: i8, best_move: u8) -> Vec<u8> {
        let mut bytes = code.to_be_bytes().to_vec();
        bytes.push(score as u8);
        bytes.push(best_move);
        bytes
    }

    #[test]
    pub fn tablebase_rejects_huge_header() -> Result<()> {
        let err = load_bytes("huge_header", &[0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00])?.unwrap_err();
        assert!(err.to_string().contains("at most"), "{}", err);

        // a plausible count with missing entries runs out of data
        assert!(load_bytes("truncated", &[0x00, 0x00, 0x00, 0x02])?.is_err());
        Ok(())
    }

    #[test]
    pub fn tablebase_rejects_bad_entries() -> Result<()> {
        let empty = position_code(&Board::new(), Side::Player);

        let mut bytes = 1u32.to_be_bytes().to_vec();
        bytes.extend(entry_bytes(empty, 0, 9));
        let err = load_bytes("move_out_of_range", &bytes)?.unwrap_err();
        assert!(err.to_string().contains("corrupt"), "{}", err);

        let mut bytes = 1u32.to_be_bytes().to_vec();
        bytes.extend(entry_bytes(0b11, 0, 0));
        assert!(load_bytes("bad_code", &bytes)?.is_err());

        let second = position_code(&"X________".parse()?, Side::Opponent);
        let mut bytes = 2u32.to_be_bytes().to_vec();
        bytes.extend(entry_bytes(second, 0, 4));
        bytes.extend(entry_bytes(empty, 0, 0));
        let err = load_bytes("unsorted", &bytes)?.unwrap_err();
        assert!(err.to_string().contains("not sorted"), "{}", err);

        let mut bytes = 2u32.to_be_bytes().to_vec();
        bytes.extend(entry_bytes(empty, 0, 0));
        bytes.extend(entry_bytes(second, 0, 4));
        let table = load_bytes("sorted", &bytes)?;
        assert_eq!(table?.len(), 2);
        Ok(())
    }

    #[test]
    pub fn tablebase_file() -> Result<()> {
        let table = Tablebase::generate(false);
        assert!(!table.is_empty());

        let entry = table.get(&Board::new(), Side::Player).unwrap();
        assert_eq!((entry.score, entry.best_move), (0, 0));

        let board: Board = "OO_XX____".parse()?;
        let entry = table.get(&board, Side::Player).unwrap();
        // X to move wins at once on 5
        assert_eq!((entry.score, entry.best_move), (10, 5));

        let path = std::env::temp_dir().join(format!("tictactoe_tablebase_{}.bin", std::process::id()));
        table.write(&path)?;
        let loaded = Tablebase::load(&path);
        std::fs::remove_file(&path)?;
        let loaded = loaded?;

        assert_eq!(loaded.entries(), table.entries());
        assert!(loaded.check(false).is_empty());
        Ok(())
    }
}
