// src/menu.rs

//! Interactive read/write loop against an open device session.
//!
//! Mirrors what a person at a terminal would do with `/dev/s33drax`:
//! pick `r` to dump the buffer, `w` to store one line, `q` to leave.
//! Input and output are generic so the loop can be driven from tests.

use s33drax::{DeviceSession, Signals, UserBuffer};
use std::io::{self, BufRead, Write};

pub const READ: char = 'r';
pub const WRITE: char = 'w';
pub const QUIT: char = 'q';

/// One menu choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Read,
    Write,
    Quit,
}

impl MenuOption {
    /// First non-blank character of `line`, case-insensitive.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim_start().chars().next()?.to_ascii_lowercase() {
            READ => Some(MenuOption::Read),
            WRITE => Some(MenuOption::Write),
            QUIT => Some(MenuOption::Quit),
            _ => None,
        }
    }
}

/// Text up to the first NUL, the way a C string would print.
pub fn printable(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// `line` without its line terminator, cut to `capacity - 1` bytes and
/// NUL-padded to exactly `capacity`.
pub fn write_frame(line: &str, capacity: usize) -> Vec<u8> {
    let text = line.trim_end_matches(['\r', '\n']).as_bytes();
    let keep = text.len().min(capacity.saturating_sub(1));
    let mut frame = vec![0u8; capacity];
    frame[..keep].copy_from_slice(&text[..keep]);
    frame
}

fn print_menu<W: Write>(out: &mut W) -> io::Result<()> {
    write!(
        out,
        "DEVICE OPTIONS:\n\n- Read({READ})\n- Write({WRITE})\n- Quit({QUIT})\n"
    )?;
    out.flush()
}

/// Read one line; `None` on end of input.
fn next_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    match input.read_line(&mut line)? {
        0 => Ok(None),
        _ => Ok(Some(line)),
    }
}

/// Ask until a valid option is entered. End of input counts as quit.
fn get_option<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<MenuOption> {
    loop {
        print_menu(out)?;
        let Some(line) = next_line(input)? else { return Ok(MenuOption::Quit) };
        if let Some(opt) = MenuOption::parse(&line) {
            return Ok(opt);
        }
    }
}

fn do_read<W: Write>(session: &DeviceSession<'_>, out: &mut W) -> io::Result<()> {
    let capacity = session.device().capacity();
    let mut buf = UserBuffer::zeroed(capacity);
    match session.read(&mut buf, capacity) {
        Ok(0) => {}
        Ok(missing) => log::warn!("read left {missing} byte(s) uncopied"),
        Err(e) => {
            writeln!(out, "read failed: {e}")?;
            return Ok(());
        }
    }
    writeln!(out, "device: {}", printable(buf.as_bytes()))
}

fn do_write<R: BufRead, W: Write>(
    session: &DeviceSession<'_>,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool> {
    write!(out, "Enter data: ")?;
    out.flush()?;
    let Some(line) = next_line(input)? else { return Ok(false) };

    let capacity = session.device().capacity();
    let frame = write_frame(&line, capacity);
    if let Err(e) = session.write(&frame[..], capacity, &Signals::none()) {
        writeln!(out, "write failed: {e}")?;
    }
    Ok(true)
}

/// Run the menu until the user quits or input ends.
pub fn run_menu<R: BufRead, W: Write>(
    session: &DeviceSession<'_>,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    loop {
        match get_option(input, out)? {
            MenuOption::Read => do_read(session, out)?,
            MenuOption::Write => {
                if !do_write(session, input, out)? {
                    break;
                }
            }
            MenuOption::Quit => break,
        }
    }
    log::info!("menu closed");
    Ok(())
}
