//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (blockchain RPC, HTTP services, file I/O). Each
//! sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `chain`: In-process chain and EVM contracts via alloy-rs
//! - `http`: Metadata documents and IPFS pinning via reqwest
//! - `persistence`: JSON state snapshots and JSONL event log

pub mod chain;
pub mod http;
pub mod persistence;
