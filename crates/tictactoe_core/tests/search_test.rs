//! Tests for optimal play on hand-picked positions.

use tictactoe_core::search::score_moves;
use tictactoe_core::{
    Board, Difficulty, Mark, MovePolicy, Outcome, Position, best_move, best_move_for, play_out,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::span;

fn board(s: &str) -> Board {
    s.parse().expect("valid board")
}

#[test]
fn test_takes_immediate_win() {
    assert_eq!(best_move(&board("OO_/XX_/___")), Ok(Position::TopRight));
}

#[test]
fn test_blocks_immediate_threat() {
    assert_eq!(best_move(&board("XX_/_O_/___")), Ok(Position::TopRight));
}

#[test]
fn test_prefers_the_quicker_win() {
    // (0,1), (0,2) and (2,1) also win, but only after X replies.
    let b = board("O__/XOX/X__");
    assert_eq!(best_move(&b), Ok(Position::BottomRight));

    let scores = score_moves(&b);
    let immediate = scores
        .iter()
        .find(|(pos, _)| *pos == Position::BottomRight)
        .map(|(_, s)| *s);
    assert_eq!(immediate, Some(10));
}

#[test]
fn test_delays_a_forced_loss() {
    // X threatens the left column; every reply still loses, but blocking
    // pushes the loss further out.
    let b = board("XO_/X__/___");
    assert_eq!(best_move(&b), Ok(Position::BottomLeft));

    let scores = score_moves(&b);
    let block = scores
        .iter()
        .find(|(pos, _)| *pos == Position::BottomLeft)
        .map(|(_, s)| *s);
    assert_eq!(block, Some(-7));
    assert!(
        scores
            .iter()
            .filter(|(pos, _)| *pos != Position::BottomLeft)
            .all(|(_, s)| *s == -9)
    );
}

#[test]
fn test_search_for_x_blocks_o() {
    let b = board("OO_/X__/X__");
    assert_eq!(best_move_for(&b, Mark::X), Ok(Position::TopRight));
}

#[test]
fn test_hard_self_play_always_draws() {
    let policy = MovePolicy::default();
    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let game = play_out(&policy, Difficulty::Hard, Difficulty::Hard, &mut rng)
            .expect("play-out completes");
        assert_eq!(*game.outcome(), Outcome::Draw, "seed {seed}");
    }
}

/// Counts spans opened while installed as the thread's subscriber.
struct SpanCounter {
    opened: Arc<AtomicU64>,
}

impl tracing::Subscriber for SpanCounter {
    fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
        span::Id::from_u64(self.opened.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn record(&self, _: &span::Id, _: &span::Record<'_>) {}

    fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}

    fn event(&self, _: &tracing::Event<'_>) {}

    fn enter(&self, _: &span::Id) {}

    fn exit(&self, _: &span::Id) {}
}

#[test]
fn test_search_opens_spans_only_at_entry_points() {
    let opened = Arc::new(AtomicU64::new(0));
    let counter = SpanCounter {
        opened: Arc::clone(&opened),
    };

    let pos = tracing::subscriber::with_default(counter, || best_move(&Board::new()));
    assert_eq!(pos, Ok(Position::TopLeft));
    assert!(opened.load(Ordering::SeqCst) <= 4, "{opened:?}");
}
