use std::env;
use std::error::Error;
use std::fmt;
use std::process;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use slog::Logger;
use structopt::StructOpt;

use crate::logging::{AppLogger, Config as LogConfig, Level};

pub mod prelude;

pub type MainResult = Result<(), Box<dyn Error + Send + Sync>>;

#[derive(Debug)]
pub struct AppError {
    code: i32,
    error: Box<dyn Error + Send + Sync>,
}

impl AppError {
    pub fn new<E>(code: i32, error: E) -> AppError
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        AppError {
            code,
            error: error.into(),
        }
    }

    pub fn code(&self) -> i32 {
        self.code
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.error.source()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (code: {})", self.error, self.code)
    }
}

/// Handed to the main function of an application.
#[derive(Debug)]
pub struct Context {
    pub logger: Logger,
    pub accessid: String,
    pub accesstime: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub exit_on_finish: bool,
    pub logging: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            exit_on_finish: false,
            logging: LogConfig::default(),
        }
    }
}

pub struct App {
    config: Config,
    main_fn: Option<Box<dyn FnOnce(Context) -> MainResult + Send + 'static>>,
    logger: Option<AppLogger>,
}

impl App {
    pub fn new() -> Self {
        App::from_config(Config::default())
    }

    pub fn from_config<C: Into<Config>>(config: C) -> Self {
        App {
            config: config.into(),
            main_fn: None,
            logger: None,
        }
    }

    pub fn main<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Context) -> MainResult + Send + 'static,
    {
        self.main_fn = Some(Box::new(f));
        self
    }

    /// Runs the main function and returns the exit code, exiting the process instead when
    /// `exit_on_finish` is set.
    pub fn run(mut self) -> i32 {
        let code = match self.initialize() {
            Ok(context) => self.exec(context),
            Err(code) => code,
        };
        self.finalize();
        if self.config.exit_on_finish {
            process::exit(code);
        }
        code
    }

    fn initialize(&mut self) -> Result<Context, i32> {
        if self.main_fn.is_none() {
            eprintln!("`main` must be called before running");
            return Err(1);
        }
        // the async logger spawns threads internally
        match AppLogger::new(self.config.logging.clone()) {
            Ok(logger) => {
                let context = Context {
                    logger: logger.create(),
                    accessid: logger.accessid().to_string(),
                    accesstime: *logger.accesstime(),
                };
                self.logger = Some(logger);
                Ok(context)
            }
            Err(e) => {
                eprintln!("{}", e);
                Err(1)
            }
        }
    }

    fn exec(&mut self, context: Context) -> i32 {
        let logger = match self.logger {
            Some(ref logger) => logger.create(),
            None => return 1,
        };
        debug!(logger, "args: {}", env::args().collect::<Vec<String>>().join(" "));
        debug!(logger, "{:?}", self.config);
        info!(logger, "*** [START] ***");
        let result = match self.main_fn.take() {
            Some(main_fn) => main_fn(context).map_err(|e| AppError::new(1, e)),
            None => Err(AppError::new(1, "no main function")),
        };
        let code = match result {
            Ok(()) => 0,
            Err(e) => {
                error!(logger, "{}", e);
                128 + e.code()
            }
        };
        info!(logger, "application finished (code: {})", code);
        info!(logger, "*** [DONE] ***");
        code
    }

    fn finalize(&mut self) {
        self.main_fn = None;
        self.logger = None;
        thread::sleep(Duration::from_millis(1));
    }
}

impl Default for App {
    fn default() -> Self {
        App::new()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("App").field("config", &self.config).finish()
    }
}

#[macro_export]
macro_rules! main {
    (|$args:ident: $sopt:ty, $ctx:ident: Context| $body:block; @$field:ident) => {
        fn main() {
            let $args = <$sopt as $crate::app::prelude::StructOpt>::from_args();
            $crate::app::App::from_config($args.$field.clone())
                .main(move |$ctx: $crate::app::Context| $body)
                .run();
        }
    };
    (|$args:ident: $sopt:ty, $ctx:ident: Context| $body:block) => {
        $crate::main!(|$args: $sopt, $ctx: Context| $body; @common);
    };
    (|$args:ident: $sopt:ty, $ctx:ident: Context| $body:expr) => {
        $crate::main!(|$args: $sopt, $ctx: Context| { $body });
    };
}

/// Flags shared by every command-line tool of the crate.
#[derive(StructOpt, Debug, Clone)]
pub struct CommonArgs {
    /// Activate debug mode
    #[structopt(short = "d", long = "debug")]
    pub debug: bool,

    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    pub verbose: u8,

    /// Directory for log files; nothing is written to a file when omitted
    #[structopt(long = "logdir")]
    pub logdir: Option<String>,
}

impl From<CommonArgs> for Config {
    fn from(args: CommonArgs) -> Config {
        let mut logging = LogConfig::default();
        logging.verbosity = match (args.debug, args.verbose) {
            (_, v) if v >= 2 => Level::Trace,
            (true, _) | (_, 1) => Level::Debug,
            _ => Level::Warning,
        };
        if let Some(logdir) = args.logdir {
            logging.level = if args.debug {
                Level::Trace
            } else {
                Level::Info
            };
            logging.logdir = logdir;
            logging.mkdir = true;
        }
        Config {
            exit_on_finish: true,
            logging,
        }
    }
}
