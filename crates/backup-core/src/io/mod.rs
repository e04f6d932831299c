//! I/O layers for the archive output stream.
//!
//! This module provides the writers the archive pipeline stacks on top of
//! each other, and the [`StreamLayer`] trait that fixes their teardown order.

pub mod counting;
pub mod fanout;
pub mod layer;

pub use counting::CountingWriter;
pub use fanout::FanOut;
pub use layer::StreamLayer;
pub use layer::close_chain;
