//! # oscfade-types
//!
//! Shared type definitions for oscfade: the parameter classes a console
//! exposes, the identities of individual faders, and the validated fade
//! command the ingress side hands to the fade engine.
//!
//! Nothing in here touches the network.

mod command;
mod param;

pub use command::{CommandError, FadeArg, FadeCommand, MAX_FADE_SECS};
pub use param::{ParamId, ParameterClass};
