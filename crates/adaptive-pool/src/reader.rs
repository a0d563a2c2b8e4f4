//! Buffering of byte streams into pooled buffers
//!
//! [`ReaderBufferer`] reads a whole [`Read`] into a `Vec<u8>` taken from an
//! [`AdaptivePool`] and hands it out as a [`BufferedReader`]. Dropping or
//! closing the reader zeroes the buffer and releases it back to the pool.

use std::io::{self, BufRead, Cursor, Read, Seek, SeekFrom};

use crate::config::{AdaptivePoolConfig, NormalConfig};
use crate::error::{PoolError, PoolResult};
use crate::pool::{AdaptivePool, NormalVec};
use crate::stats::StatsSnapshot;

/// Buffers readers into pooled memory.
///
/// # Example
/// ```
/// use std::io::Read;
///
/// use nebula_adaptive_pool::ReaderBufferer;
///
/// let bufferer = ReaderBufferer::new(512, 2.0, 500.0)?;
///
/// let mut reader = bufferer.reader(&b"hello world"[..])?;
/// assert_eq!(reader.len(), 11);
///
/// let mut text = String::new();
/// reader.read_to_string(&mut text).unwrap();
/// assert_eq!(text, "hello world");
///
/// drop(reader); // buffer goes back to the pool
/// assert_eq!(bufferer.stats().mean, 11.0);
/// # Ok::<(), nebula_adaptive_pool::PoolError>(())
/// ```
#[derive(Debug)]
pub struct ReaderBufferer {
    pool: AdaptivePool<Vec<u8>, NormalVec<u8>>,
}

impl ReaderBufferer {
    /// Create a bufferer whose new buffers have at least `min_size` bytes of
    /// capacity, keeping buffers within `threshold` standard deviations of
    /// the mean length. See [`OnlineStats::set_max_n`](crate::OnlineStats::set_max_n)
    /// for `adaptation_window`.
    pub fn new(min_size: usize, threshold: f64, adaptation_window: f64) -> PoolResult<Self> {
        Self::with_config(
            NormalConfig::new(threshold).with_min_size(min_size),
            AdaptivePoolConfig::default().with_adaptation_window(adaptation_window),
        )
    }

    /// Create a bufferer from full configurations
    pub fn with_config(policy: NormalConfig, config: AdaptivePoolConfig) -> PoolResult<Self> {
        Ok(Self {
            pool: AdaptivePool::with_config(NormalVec::with_config(policy)?, config)?,
        })
    }

    /// Statistics of the internal pool
    pub fn stats(&self) -> StatsSnapshot {
        self.pool.stats()
    }

    /// Read `reader` to the end into a pooled buffer.
    ///
    /// On failure the partially filled buffer goes back to the pool and the
    /// error reports how many bytes were read.
    pub fn reader<R: Read>(&self, mut reader: R) -> PoolResult<BufferedReader<'_>> {
        let mut buf = self.pool.acquire();
        buf.clear();

        match reader.read_to_end(&mut buf) {
            Ok(_) => Ok(BufferedReader {
                cursor: Some(Cursor::new(buf)),
                owner: self,
            }),
            Err(source) => {
                let bytes_read = buf.len();
                self.put(buf);
                Err(PoolError::read_failed(bytes_read, source))
            },
        }
    }

    fn put(&self, mut buf: Vec<u8>) {
        if buf.capacity() > 0 {
            buf.fill(0);
            self.pool.release(buf);
        }
    }
}

/// Read-only view of buffered data.
///
/// Implements [`Read`], [`BufRead`] and [`Seek`]. Dropping it, or calling
/// [`close`](Self::close), returns the buffer to the pool; afterwards it
/// behaves as an empty reader. Not safe for concurrent use.
#[derive(Debug)]
pub struct BufferedReader<'a> {
    cursor: Option<Cursor<Vec<u8>>>,
    owner: &'a ReaderBufferer,
}

impl BufferedReader<'_> {
    /// Number of unread bytes
    pub fn len(&self) -> usize {
        self.cursor.as_ref().map_or(0, |cursor| {
            let len = cursor.get_ref().len() as u64;
            len.saturating_sub(cursor.position()) as usize
        })
    }

    /// Whether all bytes have been read
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the buffer has been released
    pub fn is_closed(&self) -> bool {
        self.cursor.is_none()
    }

    /// Release the buffer back to the pool. Idempotent.
    pub fn close(&mut self) {
        if let Some(cursor) = self.cursor.take() {
            self.owner.put(cursor.into_inner());
        }
    }

    /// Take ownership of the whole buffer, read or not. It will not go back
    /// to the pool. Empty if already closed.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.cursor
            .take()
            .map(Cursor::into_inner)
            .unwrap_or_default()
    }
}

impl Read for BufferedReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.cursor.as_mut() {
            Some(cursor) => cursor.read(buf),
            None => Ok(0),
        }
    }
}

impl BufRead for BufferedReader<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self.cursor.as_mut() {
            Some(cursor) => cursor.fill_buf(),
            None => Ok(&[]),
        }
    }

    fn consume(&mut self, amt: usize) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.consume(amt);
        }
    }
}

impl Seek for BufferedReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        if let Some(cursor) = self.cursor.as_mut() {
            return cursor.seek(pos);
        }
        match pos {
            SeekFrom::Current(offset) | SeekFrom::End(offset) if offset < 0 => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "BufferedReader::seek: negative position",
            )),
            _ => Ok(0),
        }
    }
}

impl Drop for BufferedReader<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
