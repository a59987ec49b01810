use std::path::PathBuf;

pub const USAGE: &str = "usage: oscfade <console-ip> [--config <path>] [-v|--verbose]";

#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub console_ip: String,
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
    pub help: bool,
}

impl CliArgs {
    /// Parse arguments after the program name.
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, String> {
        let mut parsed = CliArgs::default();
        let mut console_ip = None;
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-v" | "--verbose" => parsed.verbose = true,
                "-h" | "--help" => parsed.help = true,
                "--config" => {
                    let path = args.next().ok_or("--config needs a path")?;
                    parsed.config_path = Some(PathBuf::from(path));
                }
                flag if flag.starts_with('-') => return Err(format!("unknown option {}", flag)),
                _ if console_ip.is_none() => console_ip = Some(arg.clone()),
                _ => return Err(format!("unexpected argument {}", arg)),
            }
        }

        if parsed.help {
            return Ok(parsed);
        }
        parsed.console_ip = console_ip.ok_or("missing console IP address")?;
        Ok(parsed)
    }
}
