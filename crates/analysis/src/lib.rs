//! Analysis backend for lexd.
//!
//! - [`engine`] -- the gateway trait the admission layer calls into, plus
//!   the built-in lexical implementation.
//! - [`pool`] -- the admission controller: a bounded worker pool with a
//!   FIFO waiting queue and a hard per-job execution deadline.

pub mod engine;
pub mod pool;
