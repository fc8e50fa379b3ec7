//! Respin Core
//!
//! Core types shared by the Respin services.
//!
//! This crate contains:
//! - Domain types: typed views of the cluster resources Respin reads and writes
//!   (Shipwright Builds and BuildRuns, Knative Services)
//! - DTOs: the inbound webhook payload
//! - Duration codec for the Go-style `timeout` fields used by those resources

pub mod domain;
pub mod dto;
pub mod duration;
