//! RIFF/BW64/RF64 chunk writing.
//!
//! The writer emits the outer `RIFF....WAVE` header first, reserves a
//! zeroed placeholder chunk sized for a `ds64` payload when the format is
//! 64-bit capable, then streams chunks behind it. `finish` patches the
//! placeholder sizes; a file whose payloads all fit in 32 bits stays a
//! plain `RIFF` (the placeholder remains an inert `JUNK` chunk readers
//! skip), while an oversized one is promoted in place to `BW64`/`RF64`
//! with the authoritative sizes in `ds64`.

use std::io::{Seek, SeekFrom, Write};

use tracing::{debug, trace};

use crate::{ContainerError, ContainerResult, FormatInfo, DS64_TABLE_CAPACITY};

/// Pack a four-character code the RIFF way: `b[0] | b[1]<<8 | b[2]<<16 | b[3]<<24`.
pub const fn four_cc(id: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*id)
}

/// `ds64` fixed header: bw64 size + data size + dummy (u64 each) + table length (u32).
const DS64_HEADER_LEN: u32 = 28;

/// One `ds64` table entry: chunk id (u32) + 64-bit size.
const DS64_TABLE_ENTRY_LEN: u32 = 12;

/// Container flavour to produce.
///
/// `Bw64` and `Rf64` are 64-bit capable: the promotion only happens when a
/// size actually overflows, so small files come out as plain `RIFF` either
/// way. `Riff` reserves nothing and fails with `Overflow` instead of
/// promoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiffFormat {
    Riff,
    Bw64,
    Rf64,
}

impl RiffFormat {
    fn is_64_capable(self) -> bool {
        matches!(self, RiffFormat::Bw64 | RiffFormat::Rf64)
    }

    fn promoted_id(self) -> [u8; 4] {
        match self {
            RiffFormat::Rf64 => *b"RF64",
            _ => *b"BW64",
        }
    }
}

struct ChunkRecord {
    id: [u8; 4],
    size: u64,
}

struct DataState {
    header_position: u64,
    bytes: u64,
    open: bool,
}

/// Streaming RIFF-family writer over any seekable sink.
pub struct RiffWriter<W: Write + Seek> {
    sink: W,
    format: RiffFormat,
    position: u64,
    chunks: Vec<ChunkRecord>,
    ds64_position: Option<u64>,
    data: Option<DataState>,
    finished: bool,
}

impl<W: Write + Seek> RiffWriter<W> {
    /// Write the outer header (and the `ds64` placeholder in 64-capable
    /// modes) and return the writer positioned for its first chunk.
    pub fn new(mut sink: W, format: RiffFormat) -> ContainerResult<Self> {
        sink.write_all(b"RIFF")?;
        sink.write_all(&0u32.to_le_bytes())?;
        sink.write_all(b"WAVE")?;
        let mut position = 12u64;

        let ds64_position = if format.is_64_capable() {
            let placeholder_len = DS64_HEADER_LEN + DS64_TABLE_CAPACITY * DS64_TABLE_ENTRY_LEN;
            sink.write_all(b"JUNK")?;
            sink.write_all(&placeholder_len.to_le_bytes())?;
            sink.write_all(&vec![0u8; placeholder_len as usize])?;
            let header_position = position;
            position += 8 + placeholder_len as u64;
            Some(header_position)
        } else {
            None
        };

        Ok(Self {
            sink,
            format,
            position,
            chunks: Vec::new(),
            ds64_position,
            data: None,
            finished: false,
        })
    }

    fn check_writable(&self) -> ContainerResult<()> {
        if self.finished {
            return Err(ContainerError::InvalidState(
                "writer already finished".into(),
            ));
        }
        Ok(())
    }

    /// Close the streamed data chunk so another chunk can follow it.
    fn close_data(&mut self) -> ContainerResult<()> {
        if let Some(data) = self.data.as_mut() {
            if data.open {
                if data.bytes % 2 == 1 {
                    self.sink.write_all(&[0u8])?;
                    self.position += 1;
                }
                data.open = false;
            }
        }
        Ok(())
    }

    /// Write a complete chunk: header, payload, and the pad byte RIFF
    /// requires after odd-length payloads.
    pub fn write_chunk(&mut self, id: [u8; 4], payload: &[u8]) -> ContainerResult<()> {
        self.check_writable()?;
        if &id == b"data" {
            return Err(ContainerError::InvalidState(
                "the data chunk is streamed through begin_data".into(),
            ));
        }
        self.close_data()?;

        let size = payload.len() as u64;
        let size_field = if size <= u32::MAX as u64 {
            size as u32
        } else if self.format.is_64_capable() {
            u32::MAX
        } else {
            return Err(ContainerError::Overflow(format!(
                "chunk {:?} exceeds 32-bit size",
                String::from_utf8_lossy(&id)
            )));
        };

        trace!(id = %String::from_utf8_lossy(&id), size, "Writing chunk");

        self.chunks.push(ChunkRecord { id, size });

        self.sink.write_all(&id)?;
        self.sink.write_all(&size_field.to_le_bytes())?;
        self.sink.write_all(payload)?;
        self.position += 8 + size;
        if size % 2 == 1 {
            self.sink.write_all(&[0u8])?;
            self.position += 1;
        }
        Ok(())
    }

    /// Encode and write the `fmt ` chunk.
    pub fn write_fmt(&mut self, format: &FormatInfo) -> ContainerResult<()> {
        let payload = format.encode()?;
        self.write_chunk(*b"fmt ", &payload)
    }

    /// Open the `data` chunk. Sample bytes are streamed with `write_data`;
    /// the size field is patched on finish.
    pub fn begin_data(&mut self) -> ContainerResult<()> {
        self.check_writable()?;
        if self.data.is_some() {
            return Err(ContainerError::InvalidState(
                "data chunk already begun".into(),
            ));
        }

        self.sink.write_all(b"data")?;
        self.sink.write_all(&0u32.to_le_bytes())?;
        self.data = Some(DataState {
            header_position: self.position,
            bytes: 0,
            open: true,
        });
        self.position += 8;
        Ok(())
    }

    /// Append raw sample bytes to the open `data` chunk.
    pub fn write_data(&mut self, bytes: &[u8]) -> ContainerResult<()> {
        self.check_writable()?;
        let data = self.data.as_mut().ok_or_else(|| {
            ContainerError::InvalidState("data chunk not begun".into())
        })?;
        if !data.open {
            return Err(ContainerError::InvalidState(
                "data chunk already closed".into(),
            ));
        }

        self.sink.write_all(bytes)?;
        data.bytes = data.bytes.checked_add(bytes.len() as u64).ok_or_else(|| {
            ContainerError::Overflow("data chunk size exceeds u64".into())
        })?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    fn patch(&mut self, position: u64, bytes: &[u8]) -> ContainerResult<()> {
        self.sink.seek(SeekFrom::Start(position))?;
        self.sink.write_all(bytes)?;
        self.sink.seek(SeekFrom::Start(self.position))?;
        Ok(())
    }

    /// Patch all placeholder sizes and seal the container.
    pub fn finish(&mut self) -> ContainerResult<()> {
        self.check_writable()?;
        if self.data.is_none() {
            return Err(ContainerError::InvalidState(
                "finish called before the data chunk was begun".into(),
            ));
        }
        self.close_data()?;

        let riff_size = self.position - 8;
        let data_bytes = self.data.as_ref().map(|d| d.bytes).unwrap_or(0);
        let data_header = self.data.as_ref().map(|d| d.header_position).unwrap_or(0);

        let oversized: Vec<(u32, u64)> = self
            .chunks
            .iter()
            .filter(|c| c.size > u32::MAX as u64)
            .map(|c| (four_cc(&c.id), c.size))
            .collect();

        let needs_64 =
            riff_size > u32::MAX as u64 || data_bytes > u32::MAX as u64 || !oversized.is_empty();

        if !needs_64 {
            self.patch(4, &(riff_size as u32).to_le_bytes())?;
            self.patch(data_header + 4, &(data_bytes as u32).to_le_bytes())?;
        } else {
            if !self.format.is_64_capable() {
                return Err(ContainerError::Overflow(
                    "payload exceeds 32-bit sizes in RIFF mode".into(),
                ));
            }
            if oversized.len() as u32 > DS64_TABLE_CAPACITY {
                return Err(ContainerError::Overflow(format!(
                    "{} oversized chunks exceed the reserved ds64 table",
                    oversized.len()
                )));
            }
            let ds64_position = self.ds64_position.ok_or_else(|| {
                ContainerError::InvalidState("64-bit promotion without a placeholder".into())
            })?;

            let promoted_id = self.format.promoted_id();
            self.patch(0, &promoted_id)?;
            self.patch(4, &u32::MAX.to_le_bytes())?;
            self.patch(data_header + 4, &u32::MAX.to_le_bytes())?;

            let mut ds64 = Vec::with_capacity(8 + DS64_HEADER_LEN as usize);
            ds64.extend_from_slice(b"ds64");
            let placeholder_len = DS64_HEADER_LEN + DS64_TABLE_CAPACITY * DS64_TABLE_ENTRY_LEN;
            ds64.extend_from_slice(&placeholder_len.to_le_bytes());
            ds64.extend_from_slice(&riff_size.to_le_bytes());
            ds64.extend_from_slice(&data_bytes.to_le_bytes());
            ds64.extend_from_slice(&0u64.to_le_bytes()); // dummy
            ds64.extend_from_slice(&(oversized.len() as u32).to_le_bytes());
            for (id, size) in &oversized {
                ds64.extend_from_slice(&id.to_le_bytes());
                ds64.extend_from_slice(&size.to_le_bytes());
            }
            self.patch(ds64_position, &ds64)?;
        }

        self.sink.flush()?;
        self.finished = true;

        debug!(
            riff_size,
            data_bytes,
            promoted = needs_64,
            "Container finished"
        );
        Ok(())
    }

    /// Consume the writer and return the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}
