// src/main.rs

//! Console tester for the s33drax device.
//!
//! 1. Load configuration & set up logging
//! 2. Load the driver on an in-process host
//! 3. Open the device node and run the read/write menu
//! 4. Close the session and unload the driver

use anyhow::{Context, Result};
use s33drax::{InMemoryHost, Module};
use std::{
    io,
    path::{Path, PathBuf},
};
use tester::{config, logging::setup_logging, menu::run_menu};

const DEFAULT_CONFIG: &str = "tester.toml";

/// Directory that contains the running executable.
fn exe_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot determine exe path")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("executable must live in some directory")
}

fn main() -> Result<()> {
    // 1 ─ Context
    let exe_dir = exe_dir()?;
    let cfg_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| exe_dir.join(DEFAULT_CONFIG));
    let cfg = config::load(&cfg_path).with_context(|| format!("config {}", cfg_path.display()))?;

    // 2 ─ Logging
    setup_logging(&exe_dir, &cfg.logging).context("logging setup failed")?;
    log::info!("Tester bootstrap initiated");

    // 3 ─ Driver
    let module = Module::load(InMemoryHost::new(), &cfg.device.driver_config())
        .context("driver failed to load")?;

    // 4 ─ Menu
    let path = cfg.device.path();
    let session = module
        .open(&path)
        .with_context(|| format!("cannot open {}", path.display()))?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    run_menu(&session, &mut input, &mut output).context("terminal I/O failed")?;

    // 5 ─ Shutdown
    session.close();
    drop(module);
    log::info!("Tester stopped cleanly");
    Ok(())
}
