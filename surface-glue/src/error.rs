use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlueError {
    #[error("Unknown motion action code: {0:#x}")]
    UnknownMotionAction(u32),

    #[error("Unknown key action code: {0:#x}")]
    UnknownKeyAction(u32),

    #[error("Failed to spawn consumer thread")]
    ThreadSpawn(#[from] std::io::Error),

    #[error("A consumer thread is already running for this queue")]
    ConsumerRunning,
}

pub type Result<T> = std::result::Result<T, GlueError>;
