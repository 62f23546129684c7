//! Working memory for agents.
//!
//! The environment pushes the current trial's fields into the agent's
//! buffer; the agent's `learn` reads them back. The buffer is single-trial
//! scratch space: every push replaces its whole contents.

mod buffer;

pub use buffer::MemoryBuffer;
