//! Command stream: packed commands queued for the controller, and the transport boundary.
//!
//! The codec only ever produces complete commands. [CommandStream] collects them and
//! [CommandStream::chunks] splits the result into pieces a [Transport] can take,
//! never cutting a command in two.

use log::{debug, warn};

use crate::{
    bits::read_u32_le, codec::Codec, command::Command, errors::WriteError, memory, value::Value,
};

/// Byte-addressable access to the controller's memory space.
pub trait Transport {
    type Error;

    /// Writes `bytes` starting at `address`.
    fn write(&mut self, address: u32, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Reads `length` bytes starting at `address`.
    fn read(&mut self, address: u32, length: usize) -> Result<Vec<u8>, Self::Error>;
}

/// Packed commands waiting to be sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandStream {
    bytes: Vec<u8>,
    /// End offset of every command in `bytes`.
    ends: Vec<usize>,
}

impl CommandStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Packs `command` and appends it. On error the stream is unchanged.
    pub fn push(&mut self, command: &Command, args: &[Value]) -> Result<(), WriteError> {
        command.pack_into(args, &mut self.bytes)?;
        self.ends.push(self.bytes.len());
        Ok(())
    }

    /// Appends one already packed command.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.bytes.extend_from_slice(bytes);
        self.ends.push(self.bytes.len());
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn command_count(&self) -> usize {
        self.ends.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.ends.clear();
    }

    /// Splits the stream into slices of at most `max` bytes, each made of whole commands.
    ///
    /// A single command longer than `max` is yielded on its own.
    pub fn chunks(&self, max: usize) -> Chunks<'_> {
        Chunks {
            stream: self,
            max,
            start: 0,
            next: 0,
        }
    }

    /// Writes every chunk to the bulk command port [memory::REG_CMDB_WRITE].
    ///
    /// Chunks never exceed what an empty FIFO holds, whatever `max` says. Returns the
    /// number of chunks written.
    pub fn send<T: Transport>(&self, transport: &mut T, max: usize) -> Result<usize, T::Error> {
        let max = max.min(memory::CMDB_SPACE_IDLE as usize);
        let mut count = 0;
        for chunk in self.chunks(max) {
            transport.write(memory::REG_CMDB_WRITE, chunk)?;
            count += 1;
        }

        debug!(
            "sent {} commands ({} bytes) in {count} chunks",
            self.command_count(),
            self.len()
        );
        Ok(count)
    }
}

/// Reads the free space of the command FIFO from [memory::REG_CMDB_SPACE].
pub fn fifo_space<T: Transport>(transport: &mut T) -> Result<u32, T::Error> {
    let bytes = transport.read(memory::REG_CMDB_SPACE, 4)?;
    Ok(read_u32_le(&bytes, 0).unwrap_or_default() & (memory::CMDFIFO_SIZE - 1))
}

/// Polls [fifo_space] until the coprocessor has drained the FIFO.
///
/// Returns `false` if it is still busy after `polls` reads.
pub fn wait_idle<T: Transport>(transport: &mut T, polls: usize) -> Result<bool, T::Error> {
    for _ in 0..polls {
        if fifo_space(transport)? == memory::CMDB_SPACE_IDLE {
            return Ok(true);
        }
    }

    debug!("command FIFO still busy after {polls} polls");
    Ok(false)
}

/// Iterator returned by [CommandStream::chunks].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    stream: &'a CommandStream,
    max: usize,
    /// Byte offset where the next chunk starts.
    start: usize,
    /// Index into `ends` of the first command not yet yielded.
    next: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let ends = &self.stream.ends;
        let first = *ends.get(self.next)?;

        let mut end = first;
        self.next += 1;
        if end - self.start > self.max {
            warn!(
                "command of {} bytes exceeds the chunk size of {}",
                end - self.start,
                self.max
            );
        } else {
            while let Some(&candidate) = ends.get(self.next) {
                if candidate - self.start > self.max {
                    break;
                }
                end = candidate;
                self.next += 1;
            }
        }

        let chunk = &self.stream.bytes[self.start..end];
        self.start = end;
        Some(chunk)
    }
}
