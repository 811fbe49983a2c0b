//! Opcode execution core of an Ethereum Virtual Machine: per-instruction
//! semantics, gas accounting, the bounded stack and zero-extended memory
//! model, and the call orchestrator that builds and folds back child call
//! frames. The enclosing transaction executor, the persistent state backend,
//! block-header sourcing, precompiles, and RLP/transaction encoding are all
//! external collaborators reached through the traits in `state` and
//! `runner`.

pub mod block;
pub mod common;
pub mod convert;
pub mod error;
pub mod fee_schedule;
pub mod frame;
pub mod gas;
pub mod host;
pub mod log;
pub mod memory;
pub mod opcodes;
pub mod runner;
pub mod stack;
pub mod state;
pub mod word;

pub use block::BlockContext;
pub use error::{EvmError, Trap};
pub use fee_schedule::FeeSchedule;
pub use frame::{Frame, FrameInit};
pub use gas::GasMeter;
pub use log::LogEntry;
pub use memory::Memory;
pub use runner::{CallConfig, ChildFrameRunner, ChildResult};
pub use stack::Stack;
pub use state::{AccountInfo, StateManager};
