//! Byte-stream boundary: circular queues and flow-control state.

pub mod queues;
pub mod ring;

pub use queues::StreamQueues;
pub use ring::ByteRing;
