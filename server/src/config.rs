//! Server settings resolved from the command line and the room-size prompt.

use log::warn;
use shared::{COUNTDOWN_FROM, MAX_PLAYERS, MIN_PLAYERS, TICK_RATE};
use std::io::{self, BufRead, Write};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on, `host:port`.
    pub address: String,
    pub tick_duration: Duration,
    /// Players required before the countdown starts.
    pub max_players: usize,
    pub countdown_from: u32,
    pub countdown_step: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:5555".to_string(),
            tick_duration: tick_duration(TICK_RATE),
            max_players: MIN_PLAYERS,
            countdown_from: COUNTDOWN_FROM,
            countdown_step: Duration::from_secs(1),
        }
    }
}

/// Interval between ticks for `tick_rate` updates per second.
pub fn tick_duration(tick_rate: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(tick_rate.max(1)))
}

/// Clamps a requested room size into the supported range.
pub fn clamp_room_size(requested: usize) -> usize {
    requested.clamp(MIN_PLAYERS, MAX_PLAYERS)
}

/// Parses an answer to the room-size prompt. Anything that is not a number
/// falls back to the minimum room size.
pub fn room_size_from_input(input: &str) -> usize {
    match input.trim().parse::<i64>() {
        Ok(n) => clamp_room_size(n.max(0) as usize),
        Err(_) => {
            warn!("Invalid input {:?}. Using {} players.", input.trim(), MIN_PLAYERS);
            MIN_PLAYERS
        }
    }
}

/// Asks the operator for the room size on `output` and reads one line from `input`.
pub fn prompt_room_size<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<usize> {
    write!(output, "Enter number of players ({}-{}): ", MIN_PLAYERS, MAX_PLAYERS)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(room_size_from_input(&line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_size_parsing() {
        assert_eq!(room_size_from_input("3\n"), 3);
        assert_eq!(room_size_from_input(" 4 "), 4);
        assert_eq!(room_size_from_input("2"), 2);
    }

    #[test]
    fn test_room_size_is_clamped() {
        assert_eq!(room_size_from_input("1"), 2);
        assert_eq!(room_size_from_input("0"), 2);
        assert_eq!(room_size_from_input("-5"), 2);
        assert_eq!(room_size_from_input("9"), 4);
    }

    #[test]
    fn test_invalid_room_size_defaults_to_two() {
        assert_eq!(room_size_from_input("four"), 2);
        assert_eq!(room_size_from_input(""), 2);
        assert_eq!(room_size_from_input("2.5"), 2);
    }

    #[test]
    fn test_prompt_reads_one_line() {
        let mut output = Vec::new();
        let size = prompt_room_size("3\nignored\n".as_bytes(), &mut output).unwrap();

        assert_eq!(size, 3);
        assert_eq!(String::from_utf8(output).unwrap(), "Enter number of players (2-4): ");
    }

    #[test]
    fn test_tick_duration() {
        assert_eq!(tick_duration(10), Duration::from_millis(100));
        assert_eq!(tick_duration(0), Duration::from_secs(1));
    }

    #[test]
    fn test_defaults_match_reference_room() {
        let config = ServerConfig::default();
        assert_eq!(config.address, "0.0.0.0:5555");
        assert_eq!(config.max_players, 2);
        assert_eq!(config.countdown_from, 3);
        assert_eq!(config.tick_duration, Duration::from_millis(100));
    }
}
