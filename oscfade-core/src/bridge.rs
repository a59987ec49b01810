//! Wiring: two ingress loops around one store and one console.
//!
//! - **Response ingress** listens on the socket queries and sets are sent
//!   from. Every message goes to the response listener (`"*"` route).
//! - **Command ingress** listens for `/fade/channel`, `/fade/aux` and
//!   `/fade/bus` and runs each command on its own thread.

use std::fmt;
use std::io;
use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, info};
use rosc::OscMessage;

use oscfade_types::ParameterClass;

use crate::config::Config;
use crate::console::OscConsole;
use crate::dispatch::{serve, Delivery, Dispatcher};
use crate::handler::FadeController;
use crate::listener::ResponseListener;
use crate::store::ParameterStore;

/// Failures that stop the bridge from coming up.
#[derive(Debug)]
pub enum StartupError {
    InvalidConsoleAddress(String),
    Bind { addr: String, source: io::Error },
    Spawn(io::Error),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConsoleAddress(s) => write!(f, "invalid console IP address: {:?}", s),
            Self::Bind { addr, source } => write!(f, "failed binding {}: {}", addr, source),
            Self::Spawn(e) => write!(f, "failed starting receive loop: {}", e),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind { source, .. } => Some(source),
            Self::Spawn(e) => Some(e),
            Self::InvalidConsoleAddress(_) => None,
        }
    }
}

pub fn parse_console_ip(s: &str) -> Result<IpAddr, StartupError> {
    s.trim()
        .parse()
        .map_err(|_| StartupError::InvalidConsoleAddress(s.to_string()))
}

fn bind_error(addr: &str) -> impl FnOnce(io::Error) -> StartupError + '_ {
    move |source| StartupError::Bind {
        addr: addr.to_string(),
        source,
    }
}

/// A running bridge. The response loop is already listening; `run` starts
/// taking commands.
pub struct Bridge {
    console: Arc<OscConsole>,
    store: Arc<ParameterStore>,
    controller: FadeController,
    command_socket: UdpSocket,
    _response_loop: JoinHandle<io::Error>,
}

impl Bridge {
    /// Bind both sockets, then start the response loop. A bind failure
    /// leaves no thread behind.
    pub fn start(config: &Config, console_ip: IpAddr) -> Result<Self, StartupError> {
        let store = Arc::new(ParameterStore::new());
        let console_addr = SocketAddr::new(console_ip, config.console_port());

        let response_bind = format!("{}:{}", config.bind_host(), config.response_port());
        let console = OscConsole::bind(response_bind.as_str(), console_addr)
            .map_err(bind_error(&response_bind))?;
        let recv_socket = console
            .try_clone_socket()
            .map_err(bind_error(&response_bind))?;
        let console = Arc::new(console);

        let command_bind = format!("{}:{}", config.bind_host(), config.command_port());
        let command_socket =
            UdpSocket::bind(command_bind.as_str()).map_err(bind_error(&command_bind))?;

        let listener = ResponseListener::new(Arc::clone(&store));
        let mut responses = Dispatcher::new("responses", Delivery::Inline);
        responses.add_handler("*", move |msg: &OscMessage| {
            listener.handle(msg);
        });
        let response_loop = thread::Builder::new()
            .name("responses".to_string())
            .spawn(move || {
                let e = serve(recv_socket, responses);
                error!(target: "dispatch", "response loop stopped: {}", e);
                e
            })
            .map_err(StartupError::Spawn)?;
        info!("Talking to console at {} from {}", console_addr, response_bind);
        info!("Listening for fade commands on {}", command_bind);

        let controller = FadeController::new(console.clone(), Arc::clone(&store))
            .with_query_delay(config.query_delay())
            .with_tick_rate(config.tick_rate());

        Ok(Self {
            console,
            store,
            controller,
            command_socket,
            _response_loop: response_loop,
        })
    }

    pub fn command_addr(&self) -> io::Result<SocketAddr> {
        self.command_socket.local_addr()
    }

    /// Local address of the query/response socket.
    pub fn response_addr(&self) -> io::Result<SocketAddr> {
        self.console.local_addr()
    }

    pub fn store(&self) -> Arc<ParameterStore> {
        Arc::clone(&self.store)
    }

    fn command_dispatcher(&self) -> Dispatcher {
        let mut commands = Dispatcher::new("commands", Delivery::Spawned);
        for class in ParameterClass::ALL {
            let controller = self.controller.clone();
            commands.add_handler(class.command_address(), move |msg: &OscMessage| {
                controller.handle_message(class, msg)
            });
        }
        commands
    }

    /// Serve fade commands on the current thread. Only returns if the command
    /// socket fails.
    pub fn run(self) -> io::Error {
        let commands = self.command_dispatcher();
        serve(self.command_socket, commands)
    }
}
