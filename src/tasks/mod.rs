//! Embassy tasks module
//!
//! All bus I/O happens on the worker task; interrupt and timer contexts
//! only post events into its queue.

pub mod control;
pub mod serial;
pub mod watchdog;
pub mod worker;

pub use serial::{inbound_pump_task, outbound_pump_task};
pub use watchdog::{health_watchdog_task, tx_watchdog_task};
pub use worker::{irq_task, worker_task, Event, SharedLink};
