// Module naming follows project convention (FIFO = bounded first-in first-out channel)
#[allow(non_snake_case)]
pub mod FIFO;

#[allow(non_snake_case)]
pub mod Core;

#[allow(non_snake_case)]
pub mod Debug {
    pub mod StructDebug;
}

pub mod error;

pub use error::{Error, Result, TryWriteError, WriteError};
