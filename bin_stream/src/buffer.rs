//! The retained buffer: bytes pulled from a source but not yet consumed.

use std::io;
use crate::stream::{Pull, Source};

/// Consumed bytes at the head are only reclaimed once they make up at least this much.
const COMPACT_THRESHOLD: usize = 4096;

/// FIFO of bytes, backed by an owned `Vec` and a head offset.
///
/// Bytes are appended at the tail by [`fill_from`](Retained::fill_from) and removed from the
/// head by [`consume`](Retained::consume) or [`take`](Retained::take). The storage in front of
/// the head is reclaimed lazily, right before the next fill.
#[derive(Default, Debug, Clone)]
pub(crate) struct Retained {
    data: Vec<u8>,
    head: usize,
}

impl Retained {
    pub fn with_capacity(capacity: usize) -> Self {
        Retained { data: Vec::with_capacity(capacity), head: 0 }
    }

    pub fn from_vec(data: Vec<u8>) -> Self { Retained { data, head: 0 } }

    pub fn len(&self) -> usize { self.data.len() - self.head }

    pub fn as_slice(&self) -> &[u8] { &self.data[self.head..] }

    /// Drop `n` bytes from the head.
    ///
    /// # Panics
    /// If fewer than `n` bytes are retained.
    pub fn consume(&mut self, n: usize) {
        assert!(n <= self.len(), "consuming {n} bytes out of {}", self.len());
        self.head += n;
        if self.head == self.data.len() {
            self.data.clear();
            self.head = 0;
        }
    }

    /// Remove `n` bytes from the head, returning them as an independent copy.
    pub fn take(&mut self, n: usize) -> Vec<u8> {
        let bytes = self.as_slice()[..n].to_vec();
        self.consume(n);
        bytes
    }

    /// Remove and return everything retained.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.data.drain(..self.head);
        self.data
    }

    fn compact(&mut self) {
        if self.head >= COMPACT_THRESHOLD && self.head * 2 >= self.data.len() {
            self.data.drain(..self.head);
            self.head = 0;
        }
    }

    /// Let `source` append at most `max` bytes at the tail.
    ///
    /// Storage is grown by `max` before the pull and shrunk back to what was actually
    /// delivered afterwards, including when the source fails.
    pub fn fill_from<S: Source + ?Sized>(&mut self, source: &mut S, max: usize) -> io::Result<Pull> {
        self.compact();
        let tail = self.data.len();
        self.data.resize(tail + max, 0);
        let result = source.pull(&mut self.data[tail..]);
        let delivered = match &result {
            // a misbehaving source cannot make us keep bytes it did not write
            Ok(pull) => pull.len.min(max),
            Err(_) => 0,
        };
        self.data.truncate(tail + delivered);
        result.map(|pull| Pull { len: delivered, ..pull })
    }
}
