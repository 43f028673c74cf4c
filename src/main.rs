use anyhow::Context;
use clap::Parser;
use csftp::{Flow, FtpBuilder, LocalDirectory, Session, StdConsole, UserCommand, DEFAULT_PORT};
use env_logger::{Builder, Env};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

const PROMPT: &str = "csftp> ";

#[derive(Debug, Parser)]
#[command(name = "csftp", version, about = "Minimal interactive FTP client")]
struct Args {
    /// Address of the FTP server
    server_address: String,

    /// Control port of the FTP server
    #[arg(default_value_t = DEFAULT_PORT)]
    server_port: u16,

    /// Give up on connects and reads after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Connect to the server itself when PASV announces a private address
    #[arg(long)]
    pasv_nat_workaround: bool,

    /// Directory retrieved files are written to, under the last component of their remote name
    #[arg(long, value_name = "DIR", default_value = ".")]
    download_dir: PathBuf,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Log to stderr so the transcript on stdout stays clean
    Builder::from_env(Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    let stream = FtpBuilder::new(args.server_address.as_str())
        .port(args.server_port)
        .timeout(args.timeout.map(Duration::from_secs))
        .passive_nat_workaround(args.pasv_nat_workaround)
        .console(StdConsole)
        .connect()
        .with_context(|| {
            format!(
                "could not connect to {}:{}",
                args.server_address, args.server_port
            )
        })?;

    let mut session = Session::new(stream, LocalDirectory::new(&args.download_dir));
    Ok(run(&mut session))
}

/// Read and execute commands until `quit`, end of input, or loss of the server
fn run(session: &mut Session) -> ExitCode {
    let mut input = std::io::stdin().lock();
    loop {
        print!("{PROMPT}");
        if let Err(err) = std::io::stdout().flush() {
            log::warn!("Could not flush prompt: {err}");
        }

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => {
                session.quit();
                return ExitCode::SUCCESS;
            }
            Ok(_) => {}
            Err(err) => {
                eprintln!("Could not read command: {err}");
                session.quit();
                return ExitCode::FAILURE;
            }
        }

        let Some(command) = UserCommand::parse(&line) else {
            continue;
        };

        match session.execute(&command) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => return ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{err}");
                if !session.is_open() {
                    return ExitCode::FAILURE;
                }
            }
        }
    }
}
