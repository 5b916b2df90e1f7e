extern crate semgraph;

use std::fs;

use semgraph::logging::{self, AppLogger, Config, Error, Level};

fn file_config(dir: &std::path::Path) -> Config {
    Config {
        level: Level::Info,
        verbosity: Level::Off,
        logdir: dir.to_string_lossy().into_owned(),
        filename: "run.log".to_string(),
        filemode: 'n',
        ..Config::default()
    }
}

#[test]
fn test_app_logger_writes_a_tagged_file() {
    let dir = tempfile::tempdir().unwrap();

    let logger = AppLogger::new(file_config(dir.path())).unwrap();
    let accessid = logger.accessid().to_string();
    assert_eq!(accessid.len(), 8);
    slog::info!(logger.create(), "decoded"; "sentences" => 3);
    drop(logger);

    let content = fs::read_to_string(dir.path().join("run-0.log")).unwrap();
    assert!(content.contains("run started"), "{}", content);
    assert!(content.contains("decoded"), "{}", content);
    assert!(content.contains("run finished"), "{}", content);
    assert!(content.contains(&accessid), "{}", content);

    // numbered mode never reuses a file
    drop(AppLogger::new(file_config(dir.path())).unwrap());
    assert!(dir.path().join("run-1.log").exists());
}

#[test]
fn test_file_logging_options() {
    let dir = tempfile::tempdir().unwrap();

    let config = Config {
        filemode: 'x',
        ..file_config(dir.path())
    };
    match logging::create_logger(config) {
        Err(Error::InvalidOption('x')) => {}
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }

    let config = Config {
        logdir: dir.path().join("missing").to_string_lossy().into_owned(),
        ..file_config(dir.path())
    };
    assert!(logging::create_logger(config).is_err());

    let config = Config {
        logdir: dir.path().join("created").to_string_lossy().into_owned(),
        mkdir: true,
        ..file_config(dir.path())
    };
    assert!(logging::create_logger(config).is_ok());
    assert!(dir.path().join("created").join("run-0.log").exists());

    // nothing touches the disk while file logging is off
    let config = Config {
        level: Level::Off,
        logdir: dir.path().join("unused").to_string_lossy().into_owned(),
        ..file_config(dir.path())
    };
    assert!(logging::create_logger(config).is_ok());
    assert!(!dir.path().join("unused").exists());
}
