use ethereum_types::Address;
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Every trap the opcode core can raise. Call-class handlers convert a child's
/// trap into a `0` push rather than letting it propagate to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvmError {
    #[error("out of gas")]
    OutOfGas,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("stack overflow")]
    StackOverflow,
    #[error("invalid jump destination")]
    InvalidJump,
    #[error("invalid opcode 0x{0:02x}")]
    InvalidOpcode(u8),
    #[error("call stack limit exceeded")]
    StackLimitExceeded,
    #[error("internal error: {0}")]
    Internal(String),
}

/// A trap annotated with the location it occurred at, for diagnostics only.
/// It carries no information the executor needs to decide what to roll back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trap {
    pub error: EvmError,
    pub location: String,
}

impl Trap {
    pub fn new(error: EvmError, code: &[u8], address: Address, pc: usize) -> Self {
        let digest = Keccak256::digest(code);
        let location = format!("{}/{:#x}:{}", hex::encode(digest), address, pc);
        Trap { error, location }
    }
}

impl std::fmt::Display for Trap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.error, self.location)
    }
}

impl std::error::Error for Trap {}
