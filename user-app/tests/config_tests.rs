// tests/config_tests.rs

use log::{Level, LevelFilter, Log, Record};
use std::{fs, io::Write, path::Path};
use tempfile::{NamedTempFile, tempdir};
use tester::{
    config::{ConfigError, load, loader::parse, model::LoggingConfig},
    logging::build_dispatch,
};

#[test]
fn missing_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let cfg = load(&dir.path().join("absent.toml")).unwrap();

    assert!(!cfg.logging.enable);
    assert_eq!(cfg.logging.level, "INFO");
    assert_eq!(cfg.device.name, "s33drax");
    assert_eq!(cfg.device.capacity, 1024);
    assert_eq!(cfg.device.path(), Path::new("/dev/s33drax"));
}

#[test]
fn shipped_config_parses() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tester.toml");
    let cfg = load(&path).expect("tester.toml should load");
    assert_eq!(cfg.device.driver_config(), s33drax::DriverConfig::default());
}

#[test]
fn file_values_override_defaults() {
    let mut tmp = NamedTempFile::new().unwrap();
    writeln!(
        tmp,
        r#"
[logging]
enable = true
file = "x.log"
level = "debug"

[device]
name = "scratch"
capacity = 64
"#
    )
    .unwrap();

    let cfg = load(tmp.path()).unwrap();
    assert!(cfg.logging.enable);
    assert_eq!(cfg.logging.file.as_deref(), Some("x.log"));
    assert_eq!(cfg.logging.level_filter().unwrap(), LevelFilter::Debug);
    assert_eq!(cfg.device.path(), Path::new("/dev/scratch"));
    assert_eq!(cfg.device.capacity, 64);
}

#[test]
fn partial_tables_fall_back_per_field() {
    let cfg = parse("[device]\ncapacity = 16\n").unwrap();
    assert_eq!(cfg.device.name, "s33drax");
    assert_eq!(cfg.device.capacity, 16);
    assert_eq!(cfg.logging.level, "INFO");
}

#[test]
fn bad_values_are_rejected() {
    assert!(matches!(
        parse("[logging]\nlevel = \"loud\"\n"),
        Err(ConfigError::InvalidLevel(l)) if l == "loud"
    ));
    assert!(matches!(parse("[device]\ncapacity = 0\n"), Err(ConfigError::ZeroCapacity)));
    assert!(matches!(parse("[device]\nname = \"a/b\"\n"), Err(ConfigError::InvalidName(_))));
    assert!(matches!(parse("[device]\nname = \"\"\n"), Err(ConfigError::InvalidName(_))));
    assert!(matches!(parse("[device\n"), Err(ConfigError::Toml(_))));
}

#[test]
fn log_file_receives_formatted_records() {
    let dir = tempdir().unwrap();
    let cfg = LoggingConfig { enable: true, file: Some("t.log".into()), level: "debug".into() };

    let (level, logger) = build_dispatch(dir.path(), &cfg).unwrap().into_log();
    assert_eq!(level, LevelFilter::Debug);

    logger.log(
        &Record::builder()
            .args(format_args!("s33drax: opened device"))
            .level(Level::Info)
            .target("s33drax::open")
            .build(),
    );
    logger.flush();

    let text = fs::read_to_string(dir.path().join("t.log")).unwrap();
    assert!(text.contains("[INFO ][s33drax::open][pid="), "bad prefix: {text}");
    assert!(text.contains("s33drax: opened device"), "missing message: {text}");
}
