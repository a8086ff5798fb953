//! Tests for the session state machine.

use tictactoe_core::invariants::{InvariantSet, SessionInvariants};
use tictactoe_core::{
    Cell, Difficulty, GameEngine, GameMode, GameSession, GameStatus, InviteRejection, Mark,
    MoveRejection, Outcome, PlayerResult, Position, StatUpdate, Transition,
};

fn applied(transition: Transition) -> tictactoe_core::AppliedMove {
    match transition {
        Transition::Applied(applied) => applied,
        Transition::Rejected { reason, .. } => panic!("move rejected: {reason}"),
    }
}

fn rejected(transition: Transition) -> (GameSession, MoveRejection) {
    match transition {
        Transition::Rejected { session, reason } => (session, reason),
        Transition::Applied(_) => panic!("move should have been rejected"),
    }
}

/// Plays a peer game from invite to the end, alternating alice (X) and bob (O).
fn play_peer_game(engine: &mut GameEngine, moves: &[Position]) -> Vec<tictactoe_core::AppliedMove> {
    let session = engine.create_invite_game("peer".into(), "alice".into());
    let mut session = engine
        .accept_invite(session, "bob".into())
        .expect("invite open");

    let mut reports = Vec::new();
    for (i, pos) in moves.iter().enumerate() {
        let (actor, mark) = if i % 2 == 0 {
            ("alice", Mark::X)
        } else {
            ("bob", Mark::O)
        };
        let report = applied(engine.apply_move(session, actor, *pos, mark).expect("engine ok"));
        session = report.session().clone();
        reports.push(report);
    }
    reports
}

#[test]
fn test_ai_game_starts_active_with_x_to_move() {
    let engine = GameEngine::from_seed(1);
    let session = engine.create_ai_game("g1".into(), "alice".into(), Difficulty::Medium);

    assert_eq!(session.mode(), GameMode::AiMedium);
    assert_eq!(session.status(), GameStatus::Active);
    assert_eq!(session.next_turn(), Some(Mark::X));
    assert_eq!(session.board().occupied(), 0);
    assert_eq!(session.version(), 0);
    assert!(session.invite_code().is_none());
}

#[test]
fn test_ai_replies_in_the_same_call() {
    let mut engine = GameEngine::from_seed(1);
    let session = engine.create_ai_game("g1".into(), "alice".into(), Difficulty::Hard);

    let report = applied(
        engine
            .apply_move(session, "alice", Position::TopLeft, Mark::X)
            .unwrap(),
    );

    assert_eq!(report.plies().len(), 2);
    assert_eq!(report.plies()[0].player().as_deref(), Some("alice"));
    assert_eq!(*report.plies()[1].mark(), Mark::O);
    assert!(report.plies()[1].player().is_none());
    assert_eq!(*report.plies()[1].position(), Position::Center);

    let session = report.session();
    assert_eq!(session.current_turn(), Mark::X);
    assert_eq!(session.version(), 1);
    assert_eq!(*report.previous_version(), 0);
    assert_eq!(session.moves().len(), 2);
}

#[test]
fn test_hard_ai_blocks_the_top_row() {
    let mut engine = GameEngine::from_seed(9);
    let session = engine.create_ai_game("g1".into(), "alice".into(), Difficulty::Hard);

    let session = applied(
        engine
            .apply_move(session, "alice", Position::TopLeft, Mark::X)
            .unwrap(),
    )
    .into_session();
    let report = applied(
        engine
            .apply_move(session, "alice", Position::TopCenter, Mark::X)
            .unwrap(),
    );

    assert_eq!(
        report.session().board().get(Position::TopRight),
        Cell::Occupied(Mark::O)
    );
}

#[test]
fn test_occupied_cell_is_a_no_op() {
    let mut engine = GameEngine::from_seed(2);
    let session = engine.create_ai_game("g1".into(), "alice".into(), Difficulty::Hard);
    let session = applied(
        engine
            .apply_move(session, "alice", Position::Center, Mark::X)
            .unwrap(),
    )
    .into_session();

    let before = session.clone();
    let (after, reason) = rejected(
        engine
            .apply_move(session, "alice", Position::Center, Mark::X)
            .unwrap(),
    );

    assert_eq!(reason, MoveRejection::CellOccupied(Position::Center));
    assert_eq!(after, before);
}

#[test]
fn test_wrong_turn_is_a_no_op() {
    let mut engine = GameEngine::from_seed(3);
    let session = engine.create_ai_game("g1".into(), "alice".into(), Difficulty::Easy);
    let before = session.clone();

    let (after, reason) = rejected(
        engine
            .apply_move(session, "alice", Position::Center, Mark::O)
            .unwrap(),
    );

    assert_eq!(
        reason,
        MoveRejection::WrongTurn {
            expected: Mark::X,
            got: Mark::O
        }
    );
    assert_eq!(after, before);
}

#[test]
fn test_stranger_cannot_move() {
    let mut engine = GameEngine::from_seed(4);
    let session = engine.create_ai_game("g1".into(), "alice".into(), Difficulty::Easy);

    let (_, reason) = rejected(
        engine
            .apply_move(session, "mallory", Position::Center, Mark::X)
            .unwrap(),
    );
    assert_eq!(reason, MoveRejection::NotAParticipant);
}

#[test]
fn test_player_cannot_move_the_other_mark() {
    let mut engine = GameEngine::from_seed(5);
    let session = engine.create_invite_game("peer".into(), "alice".into());
    let session = engine.accept_invite(session, "bob".into()).unwrap();

    let (_, reason) = rejected(
        engine
            .apply_move(session, "bob", Position::Center, Mark::X)
            .unwrap(),
    );
    assert_eq!(reason, MoveRejection::NotYourMark(Mark::X));
}

#[test]
fn test_waiting_game_rejects_moves() {
    let mut engine = GameEngine::from_seed(6);
    let session = engine.create_invite_game("peer".into(), "alice".into());

    let (after, reason) = rejected(
        engine
            .apply_move(session, "alice", Position::Center, Mark::X)
            .unwrap(),
    );
    assert_eq!(reason, MoveRejection::GameNotActive);
    assert_eq!(after.status(), GameStatus::Waiting);
}

#[test]
fn test_invite_flow() {
    let mut engine = GameEngine::from_seed(7);
    let session = engine.create_invite_game("peer".into(), "alice".into());

    assert_eq!(session.status(), GameStatus::Waiting);
    assert_eq!(session.mode(), GameMode::Multiplayer);
    let code = session.invite_code().expect("invite code").to_string();
    assert_eq!(code.len(), 6);
    assert!(
        code.chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    );

    assert_eq!(
        engine.accept_invite(session.clone(), "alice".into()),
        Err(InviteRejection::OwnInvite)
    );

    let active = engine.accept_invite(session, "bob".into()).unwrap();
    assert_eq!(active.status(), GameStatus::Active);
    assert_eq!(active.player_o(), Some("bob"));
    assert_eq!(active.next_turn(), Some(Mark::X));
    assert_eq!(active.version(), 1);

    assert_eq!(
        engine.accept_invite(active, "carol".into()),
        Err(InviteRejection::NotWaiting)
    );
}

#[test]
fn test_peer_win_records_win_and_loss() {
    let mut engine = GameEngine::from_seed(8);
    let reports = play_peer_game(
        &mut engine,
        &[
            Position::TopLeft,
            Position::MiddleLeft,
            Position::TopCenter,
            Position::Center,
            Position::TopRight,
        ],
    );

    let last = reports.last().unwrap();
    assert_eq!(last.session().status(), GameStatus::Finished);
    assert_eq!(last.session().outcome(), Some(Outcome::Winner(Mark::X)));
    assert_eq!(
        last.stat_updates(),
        &vec![
            StatUpdate::new("alice".into(), PlayerResult::Win),
            StatUpdate::new("bob".into(), PlayerResult::Loss),
        ]
    );
    assert!(
        reports[..reports.len() - 1]
            .iter()
            .all(|r| r.stat_updates().is_empty())
    );
}

#[test]
fn test_peer_draw_records_a_draw_for_both() {
    let mut engine = GameEngine::from_seed(8);
    let reports = play_peer_game(
        &mut engine,
        &[
            Position::TopLeft,
            Position::TopCenter,
            Position::TopRight,
            Position::MiddleLeft,
            Position::Center,
            Position::BottomRight,
            Position::MiddleRight,
            Position::BottomLeft,
            Position::BottomCenter,
        ],
    );

    let last = reports.last().unwrap();
    assert_eq!(last.session().outcome(), Some(Outcome::Draw));
    assert_eq!(last.session().board().to_string(), "X|O|X\n-+-+-\nO|X|X\n-+-+-\nO|X|O");
    assert_eq!(
        last.stat_updates(),
        &vec![
            StatUpdate::new("alice".into(), PlayerResult::Draw),
            StatUpdate::new("bob".into(), PlayerResult::Draw),
        ]
    );
}

#[test]
fn test_finished_game_is_immutable() {
    let mut engine = GameEngine::from_seed(8);
    let reports = play_peer_game(
        &mut engine,
        &[
            Position::TopLeft,
            Position::MiddleLeft,
            Position::TopCenter,
            Position::Center,
            Position::TopRight,
        ],
    );
    let finished = reports.last().unwrap().session().clone();

    let (after, reason) = rejected(
        engine
            .apply_move(finished.clone(), "bob", Position::BottomRight, Mark::O)
            .unwrap(),
    );
    assert_eq!(reason, MoveRejection::GameNotActive);
    assert_eq!(after, finished);
}

#[test]
fn test_scripted_easy_games_finish() {
    const PREFERENCE: [Position; 9] = [
        Position::Center,
        Position::TopLeft,
        Position::TopRight,
        Position::BottomLeft,
        Position::BottomRight,
        Position::TopCenter,
        Position::MiddleLeft,
        Position::MiddleRight,
        Position::BottomCenter,
    ];

    for seed in 0..20 {
        let mut engine = GameEngine::from_seed(seed);
        let mut session = engine.create_ai_game(format!("g{seed}"), "alice".into(), Difficulty::Easy);
        let mut last_updates = Vec::new();

        while session.status() == GameStatus::Active {
            let pos = PREFERENCE
                .into_iter()
                .find(|p| session.board().is_empty(*p))
                .expect("active game has a free cell");
            let report = applied(engine.apply_move(session, "alice", pos, Mark::X).unwrap());
            last_updates = report.stat_updates().clone();
            session = report.into_session();
            assert!(SessionInvariants::check_all(&session).is_ok());
        }

        assert_eq!(session.status(), GameStatus::Finished, "seed {seed}");
        assert!(session.moves().len() <= 9);
        assert!(session.outcome().is_some());

        let expected = match session.outcome() {
            Some(Outcome::Winner(Mark::X)) => PlayerResult::Win,
            Some(Outcome::Winner(Mark::O)) => PlayerResult::Loss,
            _ => PlayerResult::Draw,
        };
        assert_eq!(last_updates, vec![StatUpdate::new("alice".into(), expected)]);
    }
}

#[test]
fn test_hard_ai_never_loses_to_scripted_player() {
    for seed in 0..5 {
        let mut engine = GameEngine::from_seed(seed);
        let mut session = engine.create_ai_game("g".into(), "alice".into(), Difficulty::Hard);

        while session.status() == GameStatus::Active {
            let pos = Position::ALL
                .into_iter()
                .rev()
                .find(|p| session.board().is_empty(*p))
                .expect("free cell");
            session = applied(engine.apply_move(session, "alice", pos, Mark::X).unwrap())
                .into_session();
        }

        assert_ne!(session.outcome(), Some(Outcome::Winner(Mark::X)));
    }
}

#[test]
fn test_top_row_script_against_easy_finishes() {
    const SCRIPT: [Position; 3] = [Position::TopLeft, Position::TopCenter, Position::TopRight];

    for seed in 0..20 {
        let mut engine = GameEngine::from_seed(seed);
        let mut session = engine.create_ai_game(format!("g{seed}"), "alice".into(), Difficulty::Easy);

        // The script first, then the first free cell once it runs out.
        let mut script = SCRIPT.into_iter();
        while session.status() == GameStatus::Active {
            let pos = script
                .by_ref()
                .find(|p| session.board().is_empty(*p))
                .or_else(|| Position::ALL.into_iter().find(|p| session.board().is_empty(*p)))
                .expect("active game has a free cell");
            session = applied(engine.apply_move(session, "alice", pos, Mark::X).unwrap())
                .into_session();
        }

        assert_eq!(session.status(), GameStatus::Finished, "seed {seed}");
        assert!(session.outcome().is_some());
        assert!(session.moves().len() <= 9);
        assert_eq!(session.moves()[0].position(), &Position::TopLeft);
    }
}
