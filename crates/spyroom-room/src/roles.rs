//! Role assignment: one spy, everyone else shares the location.

use rand::Rng;
use spyroom_protocol::{Role, ServerEvent};
use spyroom_transport::ConnectionId;

use crate::{Effect, Player};

/// Draws the spy's index uniformly from `0..player_count`.
///
/// Returns `None` for an empty room.
pub fn draw_spy<R: Rng>(player_count: usize, rng: &mut R) -> Option<usize> {
    (player_count > 0).then(|| rng.random_range(0..player_count))
}

/// The `gameStarted` payload for one player.
pub fn role_event(is_spy: bool, word: &str) -> ServerEvent {
    if is_spy {
        ServerEvent::GameStarted {
            role: Role::Spy,
            word: None,
        }
    } else {
        ServerEvent::GameStarted {
            role: Role::Player,
            word: Some(word.to_string()),
        }
    }
}

/// One `gameStarted` unicast per player, in join order.
pub fn deal(players: &[Player], spy: ConnectionId, word: &str) -> Vec<Effect> {
    players
        .iter()
        .map(|p| Effect::to_connection(p.connection, role_event(p.connection == spy, word)))
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_draw_spy_empty_room() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(draw_spy(0, &mut rng), None);
    }

    #[test]
    fn test_draw_spy_single_player_is_always_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(draw_spy(1, &mut rng), Some(0));
        }
    }

    #[test]
    fn test_draw_spy_same_seed_same_result() {
        let a = draw_spy(7, &mut StdRng::seed_from_u64(99));
        let b = draw_spy(7, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_draw_spy_is_roughly_uniform() {
        const PLAYERS: usize = 5;
        const TRIALS: usize = 50_000;
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts = [0usize; PLAYERS];
        for _ in 0..TRIALS {
            counts[draw_spy(PLAYERS, &mut rng).unwrap()] += 1;
        }
        // Expected 10_000 each; allow 5% either way.
        for (index, count) in counts.iter().enumerate() {
            assert!(
                (9_500..=10_500).contains(count),
                "index {index} drawn {count} times: {counts:?}"
            );
        }
    }

    #[test]
    fn test_role_event_payloads() {
        assert_eq!(
            role_event(true, "Телефон"),
            ServerEvent::GameStarted {
                role: Role::Spy,
                word: None
            }
        );
        assert_eq!(
            role_event(false, "Телефон"),
            ServerEvent::GameStarted {
                role: Role::Player,
                word: Some("Телефон".into())
            }
        );
    }
}
