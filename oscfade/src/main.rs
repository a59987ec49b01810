mod args;

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::process;

use simplelog::{
    ColorChoice, CombinedLogger, Config as LogConfig, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

use oscfade_core::{parse_console_ip, Bridge, Config};

use args::{CliArgs, USAGE};

fn log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("oscfade")
        .join("oscfade.log")
}

fn open_log_file() -> Option<File> {
    let path = log_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(&path).ok()
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_level,
        LogConfig::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(file) = open_log_file() {
        loggers.push(WriteLogger::new(log_level, LogConfig::default(), file));
    }

    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    log::info!("oscfade starting (log level: {:?})", log_level);
}

fn main() {
    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            process::exit(1);
        }
    };
    if args.help {
        println!("{}", USAGE);
        return;
    }

    init_logging(args.verbose);

    let console_ip = match parse_console_ip(&args.console_ip) {
        Ok(ip) => ip,
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    };

    let config = match &args.config_path {
        Some(path) => Config::load_from(Some(path.as_path())),
        None => Config::load(),
    };

    let bridge = match Bridge::start(&config, console_ip) {
        Ok(bridge) => bridge,
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    };

    let e = bridge.run();
    log::error!("command loop stopped: {}", e);
    process::exit(1);
}
