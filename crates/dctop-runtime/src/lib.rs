//! # dctop-runtime
//!
//! The container-runtime capability seam and the data model it serves.
//!
//! The dashboard core never talks to a daemon directly; it consumes the
//! [`client::ContainerRuntime`] trait and works on value-type
//! [`collection::ContainerCollection`] snapshots. This crate also houses
//! the pure stats arithmetic ([`stats`]) and a deterministic
//! [`sample::SampleRuntime`] used for demo mode and tests.

pub mod client;
pub mod collection;
pub mod record;
pub mod sample;
pub mod stats;
