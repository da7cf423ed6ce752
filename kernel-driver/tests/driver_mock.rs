//! User-mode exercise of the driver entry points.
//!
//! The device is loaded on an `InMemoryHost` and driven the way a process
//! would drive `/dev/s33drax`: open, read, write, close.

use s33drax::{
    DriverConfig, InMemoryHost, Module, OpenError, Signals, TransferError, UserBuffer, WriteError,
};
use shared::{BUF_LENGTH, DEVICE_PATH};

fn loaded() -> Module<InMemoryHost> {
    Module::load(InMemoryHost::new(), &DriverConfig::default()).expect("load")
}

fn read_all(m: &Module<InMemoryHost>) -> Vec<u8> {
    let s = m.open(DEVICE_PATH).unwrap();
    let mut out = UserBuffer::zeroed(BUF_LENGTH);
    assert_eq!(s.read(&mut out, BUF_LENGTH), Ok(0));
    s.close();
    out.into_bytes()
}

#[test]
fn fresh_device_reads_zeroes() {
    let m = loaded();
    assert_eq!(read_all(&m), vec![0u8; BUF_LENGTH]);
}

#[test]
fn write_then_read_round_trips() {
    let m = loaded();
    let s = m.open(DEVICE_PATH).unwrap();
    let payload: Vec<u8> = (0..BUF_LENGTH).map(|i| (i % 251) as u8).collect();

    s.write(&payload[..], payload.len(), &Signals::none()).unwrap();
    s.close();

    assert_eq!(read_all(&m), payload);
}

#[test]
fn short_write_leaves_the_tail_alone() {
    let m = loaded();
    let s = m.open(DEVICE_PATH).unwrap();

    s.write(&[b'#'; BUF_LENGTH][..], BUF_LENGTH, &Signals::none()).unwrap();
    s.write(&b"short"[..], 5, &Signals::none()).unwrap();

    let got = read_all(&m);
    assert_eq!(&got[..5], b"short");
    assert!(got[5..].iter().all(|b| *b == b'#'), "write must not zero-fill");
}

#[test]
fn oversized_write_is_clamped_to_capacity() {
    let m = loaded();
    let s = m.open(DEVICE_PATH).unwrap();
    let mut big = vec![b'a'; BUF_LENGTH];
    big.extend_from_slice(&[b'b'; 100]);

    s.write(&big[..], big.len(), &Signals::none()).unwrap();

    assert_eq!(read_all(&m), vec![b'a'; BUF_LENGTH]);
}

#[test]
fn oversized_read_is_clamped_to_capacity() {
    let m = loaded();
    let s = m.open(DEVICE_PATH).unwrap();
    let mut out = UserBuffer::zeroed(BUF_LENGTH * 2);
    assert_eq!(s.read(&mut out, BUF_LENGTH * 2), Ok(0));
}

#[test]
fn read_into_short_buffer_reports_bytes_not_copied() {
    let m = loaded();
    let s = m.open(DEVICE_PATH).unwrap();
    let mut out = UserBuffer::zeroed(BUF_LENGTH).with_mapped(1000);

    assert_eq!(s.read(&mut out, BUF_LENGTH), Ok(24));
}

#[test]
fn read_into_unmapped_buffer_faults() {
    let m = loaded();
    let s = m.open(DEVICE_PATH).unwrap();
    let mut out = UserBuffer::zeroed(16).with_mapped(0);

    assert_eq!(
        s.read(&mut out, 16),
        Err(TransferError { requested: 16, not_copied: 16 })
    );
}

#[test]
fn write_from_bad_range_faults_and_keeps_prefix() {
    let m = loaded();
    let s = m.open(DEVICE_PATH).unwrap();
    let src = UserBuffer::from_bytes(vec![b'z'; 64]).with_mapped(10);

    let err = s.write(&src, 64, &Signals::none()).unwrap_err();
    assert_eq!(err, WriteError::Fault(TransferError { requested: 64, not_copied: 54 }));

    let got = read_all(&m);
    assert_eq!(&got[..10], &[b'z'; 10]);
    assert!(got[10..].iter().all(|b| *b == 0));
}

#[test]
fn many_sessions_share_one_buffer() {
    let m = loaded();
    let a = m.open(DEVICE_PATH).unwrap();
    let b = m.open(DEVICE_PATH).unwrap();

    a.write(&b"from a"[..], 6, &Signals::none()).unwrap();
    let mut out = UserBuffer::zeroed(6);
    assert_eq!(b.read(&mut out, 6), Ok(0));
    assert_eq!(out.as_bytes(), b"from a");

    a.close();
    b.close();
}

#[test]
fn open_requires_the_published_node() {
    let m = loaded();
    assert_eq!(
        m.open("/dev/nope").unwrap_err(),
        OpenError::NoDevice("/dev/nope".into())
    );
}

#[test]
fn custom_capacity_is_honoured() {
    let cfg = DriverConfig { name: "tiny".into(), capacity: 4 };
    let m = Module::load(InMemoryHost::new(), &cfg).unwrap();
    let s = m.open("/dev/tiny").unwrap();

    s.write(&b"abcdef"[..], 6, &Signals::none()).unwrap();
    let mut out = [0u8; 8];
    assert_eq!(s.read(&mut out[..], 8), Ok(0));
    assert_eq!(&out, b"abcd\0\0\0\0");
}
