use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chrono::prelude::*;
use slog::{Discard, Logger};
use uuid::Uuid;

use super::{create_logger_with_kv_and_time, Config, Error};

/// Length of the access id attached to every record of a run.
const ACCESSID_LEN: usize = 8;

/// Logger of one command-line run.
///
/// Records carry an `accessid` derived from the start time, so the lines of concurrent runs
/// sharing a log file can be told apart. Dropping the logger writes the closing record.
#[derive(Debug)]
pub struct AppLogger {
    inner: Logger,
    accessid: String,
    accesstime: DateTime<Local>,
    filepath: Option<PathBuf>,
}

impl AppLogger {
    pub fn new<C: Into<Config>>(config: C) -> Result<Self, Error> {
        let accesstime = Local::now();
        let accessid = derive_accessid(&accesstime);
        let (inner, filepath) = create_logger_with_kv_and_time(
            config,
            o!("accessid" => accessid.clone()),
            &accesstime,
        )?;
        info!(inner, "run started";
              "accesstime" => accesstime.to_rfc3339(),
              "logfile" => filepath.as_ref().map(|p| p.display().to_string()));
        Ok(AppLogger {
            inner,
            accessid,
            accesstime,
            filepath,
        })
    }

    pub fn accessid(&self) -> &str {
        &self.accessid
    }

    pub fn accesstime(&self) -> &DateTime<Local> {
        &self.accesstime
    }

    /// A child logger for the application body.
    pub fn create(&self) -> Logger {
        self.inner.new(o!())
    }
}

impl Drop for AppLogger {
    fn drop(&mut self) {
        let elapsed = Local::now().signed_duration_since(self.accesstime);
        info!(self.inner, "run finished"; "elapsed_ms" => elapsed.num_milliseconds());
        // the async drain flushes when its last handle goes away
        self.inner = Logger::root(Discard, o!());
        if let Some(ref path) = self.filepath {
            thread::sleep(Duration::from_millis(1));
            let result = OpenOptions::new()
                .append(true)
                .open(path)
                .and_then(|mut file| writeln!(file).and_then(|()| file.flush()));
            if let Err(e) = result {
                eprintln!("unable to terminate the log file {}: {}", path.display(), e);
            }
        }
    }
}

fn derive_accessid<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut id = Uuid::new_v5(&Uuid::NAMESPACE_OID, time.to_rfc3339().as_bytes())
        .simple()
        .to_string();
    id.truncate(ACCESSID_LEN);
    id
}
