use std::io::{self, ErrorKind, Read};
use bin_stream::{DecodeError, Decoder, Endian, Pipe, Pull, ReadSource, Source};
use quickcheck_macros::quickcheck;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wraps a source, recording the size of every request.
struct Recording<S> {
    inner: S,
    requests: Vec<usize>,
}

impl<S: Source> Source for Recording<S> {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Pull> {
        self.requests.push(buf.len());
        self.inner.pull(buf)
    }
}

#[test]
fn test_underflow_is_recoverable() {
    init_logger();
    let pipe = Pipe::new();
    let mut decoder = Decoder::new(pipe.clone(), Endian::Little);

    assert!(decoder.read_u16_prefixed_string().unwrap_err().is_underflow());
    pipe.push(&[0x03, 0x00]); // 3 chars
    assert!(decoder.read_u16_prefixed_string().unwrap_err().is_underflow());
    pipe.push(&[0x61]); // a
    assert!(decoder.read_u16_prefixed_string().unwrap_err().is_underflow());
    pipe.push(&[0x62, 0x63]); // b c
    assert_eq!(decoder.read_u16_prefixed_string().unwrap(), "abc");
    assert_eq!(decoder.available(), 0);
}

#[test]
fn test_failed_ensure_is_idempotent() {
    init_logger();
    let pipe = Pipe::new();
    pipe.push(&[1, 2, 3]);
    let mut decoder = Decoder::new(pipe.clone(), Endian::Big);

    let first = decoder.ensure_available(5).unwrap_err();
    assert_eq!(decoder.available(), 3);
    let second = decoder.ensure_available(5).unwrap_err();
    assert_eq!(decoder.available(), 3);
    assert!(matches!(first, DecodeError::BufferUnderflow { requested: 5, available: 3 }));
    assert!(matches!(second, DecodeError::BufferUnderflow { requested: 5, available: 3 }));

    pipe.push(&[4, 5]);
    decoder.ensure_available(5).unwrap();
    assert_eq!(decoder.retained(), [1, 2, 3, 4, 5]);
}

#[test]
fn test_source_is_never_over_read() {
    let pipe = Pipe::new();
    pipe.push(&[0, 1, 0, 0, 0, 2, 0xAA, 0xBB, 0xCC]);
    let recording = Recording { inner: pipe.clone(), requests: Vec::new() };
    let mut decoder = Decoder::new(recording, Endian::Big);

    assert_eq!(decoder.read_u16().unwrap(), 1);
    assert_eq!(pipe.len(), 7);
    assert_eq!(decoder.read_u32_prefixed_string().unwrap(), b"\xAA\xBB".as_slice());
    assert_eq!(pipe.len(), 1);
    // enough retained already: no request at all
    decoder.ensure_available(0).unwrap();
    assert_eq!(decoder.source().requests, [2, 4, 2]);
}

#[test]
fn test_underflow_pulls_only_the_deficit() {
    let pipe = Pipe::new();
    pipe.push(&[1]);
    let recording = Recording { inner: pipe.clone(), requests: Vec::new() };
    let mut decoder = Decoder::new(recording, Endian::Big);

    assert!(decoder.read_u64().unwrap_err().is_underflow());
    pipe.push(&[2, 3]);
    assert!(decoder.read_u64().unwrap_err().is_underflow());
    pipe.push(&[4, 5, 6, 7, 8, 9]);
    assert_eq!(decoder.read_u64().unwrap(), 0x0102_0304_0506_0708);
    assert_eq!(decoder.source().requests, [8, 7, 5]);
    assert_eq!(pipe.len(), 1);
}

#[test]
fn test_null_terminated_string_survives_underflow() {
    init_logger();
    let pipe = Pipe::new();
    let mut decoder = Decoder::new(pipe.clone(), Endian::Little);

    pipe.push(b"hel");
    assert!(decoder.read_null_terminated_string().unwrap_err().is_underflow());
    assert_eq!(decoder.retained(), b"hel");
    pipe.push(b"lo\0wor");
    assert_eq!(decoder.read_null_terminated_string().unwrap(), "hello");
    // scanning stops right at the terminator
    assert_eq!(decoder.available(), 0);
    assert_eq!(pipe.len(), 3);
}

#[test]
fn test_end_of_stream_never_hangs() {
    let pipe = Pipe::new();
    pipe.push(&[0x05, b'a']);
    pipe.close();
    let mut decoder = Decoder::new(pipe, Endian::Little);
    for _ in 0..3 {
        assert!(decoder.read_u8_prefixed_string().unwrap_err().is_underflow());
        assert!(decoder.read_null_terminated_string().unwrap_err().is_underflow());
    }
    assert_eq!(decoder.read_remaining_string().unwrap(), "\x05a");
}

#[test]
fn test_read_source() {
    let input: &[u8] = b"\x00\x02hi\x00\x00\x00\x2A";
    let mut decoder = Decoder::new(ReadSource::new(input), Endian::Big);
    assert_eq!(decoder.read_u16_prefixed_string().unwrap(), "hi");
    assert_eq!(decoder.read_u32().unwrap(), 42);
    assert!(decoder.read_u8().unwrap_err().is_underflow());
    assert!(decoder.source().get_ref().is_empty());
}

/// Delivers two bytes, then fails.
struct Broken(bool);

impl Read for Broken {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if std::mem::replace(&mut self.0, true) {
            return Err(io::Error::new(ErrorKind::ConnectionReset, "peer went away"));
        }
        buf[..2].copy_from_slice(&[0xBE, 0xEF]);
        Ok(2)
    }
}

#[test]
fn test_source_failure_is_not_underflow() {
    let mut decoder = Decoder::new(ReadSource::new(Broken(false)), Endian::Big);
    assert!(decoder.read_u32().unwrap_err().is_underflow());
    let err = decoder.read_u32().unwrap_err();
    assert!(!err.is_underflow());
    assert!(matches!(&err, DecodeError::SourceFailure(e) if e.kind() == ErrorKind::ConnectionReset));
    // what arrived before the failure is still there
    assert_eq!(decoder.read_u16().unwrap(), 0xBEEF);
}

#[test]
fn test_into_parts_returns_leftovers() {
    let pipe = Pipe::new();
    pipe.push(&[1, 2, 3]);
    let mut decoder = Decoder::new(pipe, Endian::Big);
    assert!(decoder.read_u32().unwrap_err().is_underflow());
    assert_eq!(decoder.read_u8().unwrap(), 1);
    let (pipe, rest) = decoder.into_parts();
    assert_eq!(rest, [2, 3]);
    assert!(pipe.is_empty());
}

#[test]
fn test_producer_thread() {
    init_logger();
    let pipe = Pipe::new();
    let producer = {
        let pipe = pipe.clone();
        std::thread::spawn(move || {
            let mut message = vec![0, 0, 0, 26];
            message.extend(b'a'..=b'z');
            for chunk in message.chunks(3) {
                pipe.push(chunk);
                std::thread::yield_now();
            }
            pipe.close();
        })
    };
    let mut decoder = Decoder::new(pipe, Endian::Big);
    let string = loop {
        match decoder.read_u32_prefixed_string() {
            Ok(string) => break string,
            Err(err) if err.is_underflow() => std::thread::yield_now(),
            Err(err) => panic!("unexpected error: {err}"),
        }
    };
    producer.join().unwrap();
    assert_eq!(string, "abcdefghijklmnopqrstuvwxyz");
}

/// Feed `input` in chunks whose sizes are taken from `splits` (all at once if empty), retrying
/// on every underflow.
fn decode_chunked(input: &[u8], splits: &[usize]) -> Vec<Vec<u8>> {
    let pipe = Pipe::new();
    let mut decoder = Decoder::new(pipe.clone(), Endian::Little);
    let mut strings = Vec::new();
    let mut rest = input;
    let mut splits = splits.iter().cycle();
    loop {
        match decoder.read_u16_prefixed_string() {
            Ok(string) => strings.push(string.into()),
            Err(err) if err.is_underflow() && !rest.is_empty() => {
                let size = splits.next().map_or(rest.len(), |s| 1 + s % rest.len());
                let (chunk, tail) = rest.split_at(size);
                pipe.push(chunk);
                rest = tail;
            }
            Err(err) if err.is_underflow() => return strings,
            Err(err) => panic!("unexpected error: {err}"),
        }
    }
}

#[quickcheck]
fn chunked_delivery_matches_whole(strings: Vec<Vec<u8>>, splits: Vec<usize>) -> bool {
    let mut input = Vec::new();
    for string in &strings {
        let len = string.len().min(usize::from(u16::MAX));
        input.extend(u16::try_from(len).unwrap().to_le_bytes());
        input.extend(&string[..len]);
    }
    let expected: Vec<Vec<u8>> = strings.into_iter()
        .map(|s| s.into_iter().take(usize::from(u16::MAX)).collect())
        .collect();
    let whole = decode_chunked(&input, &[]);
    whole == expected && decode_chunked(&input, &splits) == expected
}
