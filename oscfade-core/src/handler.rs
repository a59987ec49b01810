//! Command handler: validate a fade command, learn the fader's current value,
//! then launch a fade from there.
//!
//! The "learn" step is a blind wait. The handler queries the console, sleeps
//! for `query_delay` so the reply can land in the store via the response
//! listener, and then trusts whatever the store holds.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, error, warn};
use rosc::{OscMessage, OscType};

use oscfade_types::{CommandError, FadeArg, FadeCommand, ParameterClass};

use crate::console::{Console, ConsoleError};
use crate::fade::{spawn_fade, FadePlan, FadeReport, DEFAULT_TICK_RATE};
use crate::store::ParameterStore;

/// How long to wait for the console to answer a query.
pub const DEFAULT_QUERY_DELAY: Duration = Duration::from_millis(250);

/// Why a fade command did not start a fade.
#[derive(Debug)]
pub enum FadeError {
    Invalid(CommandError),
    Query(ConsoleError),
    Spawn(io::Error),
}

impl From<CommandError> for FadeError {
    fn from(e: CommandError) -> Self {
        Self::Invalid(e)
    }
}

impl fmt::Display for FadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(e) => write!(f, "invalid command: {}", e),
            Self::Query(e) => write!(f, "failed sending fader query: {}", e),
            Self::Spawn(e) => write!(f, "failed starting fade: {}", e),
        }
    }
}

impl std::error::Error for FadeError {}

/// Decode the `[id, target, duration]` arguments of a fade command.
///
/// Only the first three arguments are looked at. Anything other than an
/// int or float in those positions rejects the command.
pub fn decode_args(args: &[OscType]) -> Result<Vec<FadeArg>, CommandError> {
    args.iter()
        .take(3)
        .enumerate()
        .map(|(pos, arg)| match arg {
            OscType::Int(v) => Ok(FadeArg::Int(*v)),
            OscType::Float(v) => Ok(FadeArg::Float(*v)),
            _ => Err(CommandError::UnsupportedArgument(pos)),
        })
        .collect()
}

/// Turns validated fade commands into running fades.
#[derive(Clone)]
pub struct FadeController {
    console: Arc<dyn Console>,
    store: Arc<ParameterStore>,
    query_delay: Duration,
    tick_rate: u32,
}

impl FadeController {
    pub fn new(console: Arc<dyn Console>, store: Arc<ParameterStore>) -> Self {
        Self {
            console,
            store,
            query_delay: DEFAULT_QUERY_DELAY,
            tick_rate: DEFAULT_TICK_RATE,
        }
    }

    pub fn with_query_delay(mut self, query_delay: Duration) -> Self {
        self.query_delay = query_delay;
        self
    }

    pub fn with_tick_rate(mut self, tick_rate: u32) -> Self {
        self.tick_rate = tick_rate.max(1);
        self
    }

    /// Handle one inbound `/fade/<class>` message. Failures are logged and
    /// the command is dropped; the sender never hears back.
    pub fn handle_message(&self, class: ParameterClass, msg: &OscMessage) {
        let result = decode_args(&msg.args)
            .and_then(|args| FadeCommand::validate(class, &args))
            .map_err(FadeError::from)
            .and_then(|cmd| self.execute(cmd));

        match result {
            // Fades are detached; nothing waits on them.
            Ok(_fade) => {}
            Err(FadeError::Invalid(e)) => {
                warn!(target: "command", "ignoring {} {:?}: {}", msg.addr, msg.args, e)
            }
            Err(e) => error!(target: "command", "{} {:?}: {}", msg.addr, msg.args, e),
        }
    }

    /// Query, wait, fade, and record the target.
    ///
    /// Blocks the calling thread for the query delay. The returned handle may
    /// be dropped to detach the fade.
    pub fn execute(&self, cmd: FadeCommand) -> Result<JoinHandle<FadeReport>, FadeError> {
        let address = cmd.id().address();

        self.console.query(&address).map_err(FadeError::Query)?;
        debug!(target: "command", "queried {}, waiting {:?}", address, self.query_delay);

        std::thread::sleep(self.query_delay);

        let plan = FadePlan {
            address,
            start: self.store.get(cmd.id()),
            target: cmd.target(),
            duration: cmd.duration(),
        };
        let handle = spawn_fade(Arc::clone(&self.console), plan, self.tick_rate)
            .map_err(FadeError::Spawn)?;

        // Optimistic: the fade is assumed to land.
        self.store.set(cmd.id(), cmd.target());

        Ok(handle)
    }
}
