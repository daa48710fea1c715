//! Byte sources feeding a [`Decoder`](crate::Decoder), and decoding errors.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Outcome of a single [`Source::pull`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Pull {
    /// Number of bytes written to the front of the buffer.
    pub len: usize,
    /// The source has reached its end: a closed [`Pipe`] stays closed, a reader returned `Ok(0)`.
    ///
    /// Advisory only. A decoder still reports a shortfall as
    /// [`BufferUnderflow`](DecodeError::BufferUnderflow), and pulls again on the next read.
    pub end_of_stream: bool,
}

impl Pull {
    /// Some bytes were delivered, and more may follow.
    pub fn partial(len: usize) -> Self { Pull { len, end_of_stream: false } }
    /// Some (possibly zero) bytes were delivered, and then the stream ended.
    pub fn end(len: usize) -> Self { Pull { len, end_of_stream: true } }
}

/// Pull-based supplier of raw bytes.
///
/// A source may hand out fewer bytes than asked for, including none at all, without that being
/// an error; a decoder treats such a shortfall as "not enough data yet". Only genuine failures
/// of the underlying device should be reported as [`io::Error`]s.
pub trait Source {
    /// Fill the front of `buf` with at most `buf.len()` bytes.
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Pull>;
}

impl<S: Source + ?Sized> Source for &mut S {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Pull> { S::pull(self, buf) }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Pull> { S::pull(self, buf) }
}

/// A source that has nothing to give. Backs decoders built over in-memory bytes.
#[derive(Default, Debug, Copy, Clone)]
pub struct Exhausted;

impl Source for Exhausted {
    fn pull(&mut self, _buf: &mut [u8]) -> io::Result<Pull> { Ok(Pull::end(0)) }
}

/// Adapter turning any [`Read`] into a [`Source`].
///
/// - `Ok(0)` for a non-empty buffer is reported as end-of-stream.
/// - [`ErrorKind::WouldBlock`] is reported as zero bytes, stream still open.
/// - [`ErrorKind::Interrupted`] is retried.
/// - Any other error is passed on.
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: R,
}

impl<R: Read> ReadSource<R> {
    /// Wrap a reader.
    pub fn new(reader: R) -> Self { ReadSource { reader } }
    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R { &self.reader }
    /// Get a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R { &mut self.reader }
    /// Unwrap the underlying reader.
    pub fn into_inner(self) -> R { self.reader }
}

impl<R: Read> Source for ReadSource<R> {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Pull> {
        if buf.is_empty() { return Ok(Pull::partial(0)); }
        loop {
            match self.reader.read(buf) {
                Ok(0) => return Ok(Pull::end(0)),
                Ok(n) => return Ok(Pull::partial(n)),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(Pull::partial(0)),
                Err(err) => return Err(err),
            }
        }
    }
}

#[derive(Default, Debug)]
struct PipeState {
    data: VecDeque<u8>,
    closed: bool,
}

/// In-memory FIFO of bytes, shared between producers and a decoder.
///
/// Clones share the same queue: keep one handle to [`push`](Pipe::push) into, and hand another
/// to a [`Decoder`](crate::Decoder). The pipe reports end-of-stream only after it has been
/// [`close`](Pipe::close)d and drained.
/// ```
/// # use bin_stream::{Pipe, Source};
/// let mut pipe = Pipe::new();
/// pipe.push(b"abc");
/// let mut buf = [0; 2];
/// let pull = pipe.pull(&mut buf).unwrap();
/// assert_eq!((pull.len, pull.end_of_stream, &buf), (2, false, b"ab"));
/// ```
#[derive(Default, Debug, Clone)]
pub struct Pipe {
    state: Arc<Mutex<PipeState>>,
}

impl Pipe {
    /// Create an empty, open pipe.
    pub fn new() -> Self { Pipe::default() }

    fn lock(&self) -> MutexGuard<'_, PipeState> {
        // the state is a plain queue, still consistent after a panicking producer
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append bytes at the tail of the pipe.
    pub fn push(&self, bytes: &[u8]) { self.lock().data.extend(bytes) }
    /// Mark the pipe as closed: no more bytes will be pushed.
    pub fn close(&self) { self.lock().closed = true }
    /// Whether [`close`](Pipe::close) has been called.
    pub fn is_closed(&self) -> bool { self.lock().closed }
    /// Number of bytes pushed but not yet pulled.
    pub fn len(&self) -> usize { self.lock().data.len() }
    /// Whether every pushed byte has been pulled.
    pub fn is_empty(&self) -> bool { self.lock().data.is_empty() }
}

impl Source for Pipe {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Pull> {
        let mut state = self.lock();
        let len = buf.len().min(state.data.len());
        for (dst, src) in buf.iter_mut().zip(state.data.drain(..len)) { *dst = src; }
        let end_of_stream = state.closed && state.data.is_empty();
        Ok(Pull { len, end_of_stream })
    }
}

/// Decoding errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The source could not currently supply enough bytes. Retry once more data arrived.
    #[error("buffer underflow: {requested} bytes requested, only {available} available")]
    BufferUnderflow {
        /// Number of bytes the read needed in the retained buffer.
        requested: usize,
        /// Number of bytes retained after pulling from the source.
        available: usize,
    },
    /// A length prefix exceeds the limit configured with
    /// [`length_limit`](crate::DecoderBuilder::length_limit).
    #[error("length prefix {length} exceeds the limit of {limit} bytes")]
    LengthLimitExceeded {
        /// Length read from the prefix.
        length: u64,
        /// Configured limit.
        limit: usize,
    },
    /// The source failed. Not retryable.
    #[error("source failure: {0}")]
    SourceFailure(#[from] io::Error),
}

impl DecodeError {
    /// Whether this is a [`BufferUnderflow`](DecodeError::BufferUnderflow), i.e. whether the same
    /// read is worth retrying after more bytes arrive.
    pub fn is_underflow(&self) -> bool { matches!(self, DecodeError::BufferUnderflow { .. }) }
}
