//! # oscfade-core
//!
//! Fade engine for an OSC mixing console. Takes "fade this fader to this
//! value over this long" commands and turns them into a 60 Hz stream of
//! absolute fader sets, while mirroring the console's fader values from the
//! replies it sends back.
//!
//! ## Module Overview
//!
//! - [`store`]: `ParameterStore`, lock-free mirrored fader values
//! - [`console`]: `Console` trait, `OscConsole` (rosc over UDP), `TestConsole`
//! - [`listener`]: `ResponseListener`, folds `/<class>/<n>/mix/fader` replies into the store
//! - [`fade`]: `run_fade` / `spawn_fade`, the tick-quantized ramp
//! - [`handler`]: `FadeController`, validate → query → wait → fade → record
//! - [`dispatch`]: address-pattern `Dispatcher` and the UDP receive loop
//! - [`bridge`]: `Bridge`, both ingress loops wired together
//! - [`config`]: TOML configuration (embedded defaults + user override)

pub mod bridge;
pub mod config;
pub mod console;
pub mod dispatch;
pub mod fade;
pub mod handler;
pub mod listener;
pub mod store;

pub use bridge::{parse_console_ip, Bridge, StartupError};
pub use config::Config;
pub use console::{Console, ConsoleError, ConsoleResult, OscConsole, SentMessage, TestConsole};
pub use fade::{run_fade, spawn_fade, FadePlan, FadeReport};
pub use handler::{FadeController, FadeError};
pub use listener::ResponseListener;
pub use store::ParameterStore;
