//! Turning trace operations into writeback batches.
//!
//! This module provides:
//! - The [`traits::Module`] contract every indexed store namespace implements
//! - The store modules themselves, one per namespace
//! - A registry that keeps modules in registration order
//! - The [`Processor`] that routes operations and flushes at block boundaries
//!
//! # Architecture
//!
//! ```text
//! TraceOperation ──► Processor ──► Module::process ──► module caches
//!                        │
//!                        └─ height changes ──► Module::flush_cache ──► Vec<WritebackOp>
//! ```

pub mod engine;
pub mod error;
pub mod modules;
pub mod registry;
pub mod traits;

pub use engine::Processor;
