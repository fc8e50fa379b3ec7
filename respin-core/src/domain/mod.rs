//! Core domain types
//!
//! Typed views of the cluster-resident resources. Only the fields the rebuild flow
//! reads or writes are modelled; everything else is carried along in a flattened
//! remainder so that objects survive a read-modify-write cycle untouched.

pub mod build;
pub mod build_run;
pub mod meta;
pub mod service;
