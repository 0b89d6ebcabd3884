//! Application layer: the order worker, the processor that owns it and the
//! operator control surface.

pub mod control;
pub mod processor;
pub mod worker;

pub use processor::{OrderProcessor, WorkerEvents};
pub use worker::{OrderWorker, WorkerEvent, WorkerJob, WorkerSettings};
