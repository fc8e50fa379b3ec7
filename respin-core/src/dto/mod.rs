//! Data Transfer Objects
//!
//! Payloads received from outside the cluster.

pub mod event;
