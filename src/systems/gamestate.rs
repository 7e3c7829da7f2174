//! State machine transitions: Init -> Running -> GameOver.

use log::info;

use crate::events::bus::EventPublisher;
use crate::events::gameevent::GameEvent;
use crate::resources::gamesession::{GameSession, GameStates, SharedSession};

/// Seconds left before play starts, zero outside Init.
pub fn countdown_remaining(session: &GameSession, countdown: f64, now: f64) -> f64 {
    match session.state {
        GameStates::Init => (countdown - (now - session.start_time)).max(0.0),
        _ => 0.0,
    }
}

/// Enter Running once the countdown has elapsed. Publishes `GameStart`.
pub fn countdown_system(
    session: &SharedSession,
    countdown: f64,
    now: f64,
    publisher: &EventPublisher,
) -> bool {
    let started = session.with(|s| {
        if s.state == GameStates::Init && now - s.start_time >= countdown {
            s.state = GameStates::Running;
            true
        } else {
            false
        }
    });
    if started {
        info!("[gamestate] Init -> Running at t={:.2}", now);
        publisher.publish(GameEvent::GameStart);
    }
    started
}

/// Enter GameOver when a running game has no health left or the health rule
/// has latched `game_over`.
///
/// The `GameOver` event itself comes from the health rule; this only moves
/// the state machine.
pub fn game_over_system(session: &SharedSession) -> bool {
    let (ended, score) = session.with(|s| {
        if s.state == GameStates::Running && (s.game_over || s.health <= 0.0) {
            s.state = GameStates::GameOver;
            (true, s.score)
        } else {
            (false, s.score)
        }
    });
    if ended {
        info!("[gamestate] Running -> GameOver, final score {}", score);
    }
    ended
}

/// Condition helper for the tick: only Running simulates.
pub fn state_is_running(session: &SharedSession) -> bool {
    matches!(session.state(), GameStates::Running)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::bus::EventBus;

    fn session() -> SharedSession {
        SharedSession::new(GameSession::new(100.0, 2.0))
    }

    #[test]
    fn test_countdown_transition() {
        let bus = EventBus::new();
        let session = session();

        assert!(!countdown_system(&session, 3.0, 4.9, &bus.publisher()));
        assert_eq!(session.state(), GameStates::Init);
        assert!((countdown_remaining(&session.snapshot(), 3.0, 4.0) - 1.0).abs() < 1e-9);

        assert!(countdown_system(&session, 3.0, 5.0, &bus.publisher()));
        assert!(state_is_running(&session));
        assert_eq!(bus.pending(), 1);

        // Only once.
        assert!(!countdown_system(&session, 3.0, 9.0, &bus.publisher()));
        assert_eq!(countdown_remaining(&session.snapshot(), 3.0, 9.0), 0.0);
    }

    #[test]
    fn test_game_over_only_from_running() {
        let session = session();
        session.with(|s| s.health = 0.0);
        assert!(!game_over_system(&session));
        assert_eq!(session.state(), GameStates::Init);

        session.with(|s| s.state = GameStates::Running);
        assert!(game_over_system(&session));
        assert_eq!(session.state(), GameStates::GameOver);
        assert!(!game_over_system(&session));
    }

    #[test]
    fn test_latched_game_over_ends_play_even_with_health() {
        let session = session();
        session.with(|s| {
            s.state = GameStates::Running;
            s.game_over = true;
            s.health = 50.0;
        });
        assert!(game_over_system(&session));
        assert_eq!(session.state(), GameStates::GameOver);
    }
}
