use thiserror::Error;

/// Why a connection was not admitted to the room.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinError {
    #[error("room is full ({capacity} players)")]
    RoomFull { capacity: usize },
    #[error("game already in progress")]
    GameInProgress,
}

/// Failures reading or writing frames on one connection.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("connection closed")]
    ConnectionClosed,
    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed packet: {0}")]
    Decode(#[from] bincode::Error),
}

/// Broken simulation invariants. These end the game loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("no free cell left to place food")]
    BoardFull,
}

/// Errors that stop the server process.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("game loop task failed: {0}")]
    GameLoop(#[from] tokio::task::JoinError),
}
