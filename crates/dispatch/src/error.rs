use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The dispatcher has been stopped; the event was not accepted.
    #[error("dispatcher stopped")]
    Stopped,
}

pub type Result<T> = std::result::Result<T, Error>;
