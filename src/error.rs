use crate::client::RpcError;
use crate::encoding::CodecError;
use thiserror::Error;

/// Everything a single dispatched command can fail with. All variants are
/// rendered as one line to the operator; none of them end the session.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("undefined command: {0}")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0}")]
    Codec(#[from] CodecError),
    #[error("{0}")]
    Rpc(#[from] RpcError),
}
