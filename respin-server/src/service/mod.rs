//! Service layer
//!
//! Business logic of the rebuild flow. Services only talk to the cluster through the
//! repository traits and read time through [`crate::clock::Clock`].
//!
//! - `matcher`: finds the build or standalone build run for a pushed repository
//! - `locator`: finds the Knative service deployed from an image
//! - `timeout`: resolves how long to wait for a build run
//! - `waiter`: polls a build run to a terminal state
//! - `nudge`: forces a new Knative revision
//! - `rebuild`: ties the steps together

pub mod locator;
pub mod matcher;
pub mod nudge;
pub mod rebuild;
pub mod timeout;
pub mod waiter;
