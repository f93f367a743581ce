pub mod data;
#[cfg(feature = "http")]
mod data_http;
mod data_mock;
mod error;
mod terminal;
pub mod util;

pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::util;
    pub use cfg_if::cfg_if;
    pub use log::{debug, error, info, trace, warn};
    pub use serde::Deserialize;
    pub use std::fs::create_dir_all;
    pub use std::path::{Path, PathBuf};
    pub use std::time::Duration;
}

use async_std::task;
use attempt_session::{Attempt, Lockdown, SessionConfig, SessionController, SessionState, TestId};
use clap::{Args, Parser};
use data::{DataSource, HttpConfig};
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};
use prelude::*;
use std::process::exit;
use std::sync::{Arc, Mutex};

#[derive(serde_with::DeserializeFromStr, Debug, Clone, Copy)]
struct LogLevel(log::LevelFilter);

impl std::str::FromStr for LogLevel {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "error" | "Error" => Self(log::LevelFilter::Error),
            "warn" | "Warn" => Self(log::LevelFilter::Warn),
            "info" | "Info" => Self(log::LevelFilter::Info),
            "debug" | "Debug" => Self(log::LevelFilter::Debug),
            "trace" | "Trace" => Self(log::LevelFilter::Trace),
            _ => return Err(Error::BadLogLevel(s.to_string())),
        })
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        l.0
    }
}

#[derive(Debug, Default, Args, Deserialize)]
struct Flags {
    #[clap(long, arg_enum)]
    data_source: Option<DataSource>,
    /// Dump the log onto stderr.
    #[clap(long)]
    #[serde(default)]
    stderr: Option<bool>,
    /// Log level.
    #[clap(long)]
    log_level: Option<LogLevel>,
    /// Runtime dir.
    #[clap(long)]
    run_dir: Option<PathBuf>,
}

#[derive(Debug, Parser)]
struct Cli {
    /// The test to attempt.
    test_id: String,
    /// Client base directory.
    #[clap(parse(from_os_str))]
    base: PathBuf,
    /// Override config file
    #[clap(long, parse(from_os_str))]
    etc: Option<PathBuf>,

    #[clap(flatten)]
    cfg: Flags,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    config: Flags,
    #[serde(default)]
    attempt: SessionConfig,
    #[serde(default)]
    http: HttpConfig,
}

impl ConfigFile {
    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = util::load_file(path)?;
        toml::from_str(&content).map_err(Error::TOMLParseError)
    }
}

fn init_log(cli: &Cli, etc: &ConfigFile) -> Result<()> {
    let log_level = cli
        .cfg
        .log_level
        .or(etc.config.log_level)
        .map_or_else(|| log::LevelFilter::Info, LogLevel::into);

    let use_stderr = cli.cfg.stderr.or(etc.config.stderr).unwrap_or(false);

    // The terminal is the attempt's screen, so only errors go there unless
    // asked otherwise.
    let stderr_level = if use_stderr {
        log_level
    } else {
        log::LevelFilter::Error
    };

    let console_fmt = "{h({d(%Y-%m-%d %H:%M:%S)(utc)} - {l}: {m}{n})}";
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(console_fmt)))
        .build();

    let text_fmt = "{d(%Y-%m-%d %H:%M:%S)(utc)} - {l}: {m}{n}";
    let log_file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(text_fmt)))
        .append(false)
        .build("attempt.log")
        .map_err(Error::IOError)?;

    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(stderr_level)))
                .build("stderr", Box::new(stderr)),
        )
        .appender(Appender::builder().build("file", Box::new(log_file)))
        .build(
            Root::builder()
                .appenders(["stderr", "file"])
                .build(log_level),
        )
        .map_err(|e| Error::LogInitError(e.to_string()))?;
    log4rs::init_config(config).map_err(|e| Error::LogInitError(e.to_string()))?;
    Ok(())
}

async fn conduct(cli: &Cli, etc: &ConfigFile) -> Result<SessionState> {
    let source = cli.cfg.data_source.or(etc.config.data_source);
    let source = match source {
        Some(s) => s,
        None => return Err(Error::BadCommand("data source is not specified".to_owned())),
    };
    let opened = data::open(source, &cli.test_id, &etc.http)?;

    let toaster = Arc::new(terminal::Toaster::new());
    let host = Arc::new(terminal::TerminalHost::new());
    let controller = SessionController::new(
        TestId::new(&cli.test_id),
        &etc.attempt,
        opened.collaborators,
        toaster.clone(),
    );
    info!("session {} for test {}", controller.id(), cli.test_id);
    let lockdown = Arc::new(Lockdown::new(host.clone(), toaster));
    let attempt = Attempt::new(controller, lockdown, etc.attempt.tick);

    let snapshot = Arc::new(Mutex::new(terminal::Snapshot::default()));
    // Detached: it may still be waiting on stdin when the attempt ends.
    task::spawn(terminal::read_commands(
        attempt.sender(),
        host,
        snapshot.clone(),
    ));

    let mut screen = terminal::Screen::new(snapshot);
    let report = attempt.run(&mut screen).await?;

    if let Some(backend) = &opened.mock {
        data_mock::dump(&cli.test_id, backend)?;
    }
    match &report.submission {
        Some(s) => info!(
            "submitted {} responses started at {}",
            s.responses.len(),
            s.started_at
        ),
        None => warn!("attempt left without submitting"),
    }
    Ok(report.state)
}

#[async_std::main]
async fn main() {
    let cli = Cli::parse();

    let etc_path = cli
        .etc
        .clone()
        .unwrap_or_else(|| cli.base.join("etc/attempt.toml"));
    let etc = match ConfigFile::load(&etc_path) {
        Ok(etc) => etc,
        Err(e) => {
            eprintln!("config file {} is broken: {}", etc_path.display(), e);
            exit(1);
        }
    };

    // Change to working directory.
    let wd = cli.cfg.run_dir.as_ref().or(etc.config.run_dir.as_ref());
    if let Some(d) = wd {
        if let Err(e) = create_dir_all(d).and_then(|_| std::env::set_current_dir(d)) {
            eprintln!("cannot change to {}: {}", d.display(), e);
            exit(1);
        }
    }

    if let Err(e) = init_log(&cli, &etc) {
        eprintln!("{}", e);
        exit(1);
    }

    match conduct(&cli, &etc).await {
        Ok(SessionState::Terminated) => {}
        Ok(state) => {
            info!("attempt ended in state {:?}", state);
            exit(2);
        }
        Err(e) => {
            error!("error: {}", e);
            exit(1);
        }
    }
}
