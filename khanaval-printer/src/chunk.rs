//! Sequential chunked writes
//!
//! BLE characteristics and USB endpoints have small receive buffers, so
//! payloads go out in fixed-size chunks with a pause between them. A chunk
//! is never started before the previous write has resolved.

use std::future::Future;
use std::time::Duration;

use crate::error::{PrintError, PrintResult};
use tracing::debug;

/// Chunk size and inter-chunk delay for one transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub chunk_size: usize,
    pub delay: Duration,
}

impl ChunkPlan {
    /// BLE default: 512-byte writes, 100ms apart
    pub const BLUETOOTH: ChunkPlan = ChunkPlan {
        chunk_size: 512,
        delay: Duration::from_millis(100),
    };

    /// USB full-speed default: 64-byte writes, 50ms apart
    pub const USB: ChunkPlan = ChunkPlan {
        chunk_size: 64,
        delay: Duration::from_millis(50),
    };

    pub fn new(chunk_size: usize, delay: Duration) -> Self {
        Self { chunk_size, delay }
    }

    /// Number of writes needed for `len` bytes
    pub fn chunk_count(&self, len: usize) -> usize {
        len.div_ceil(self.chunk_size.max(1))
    }
}

/// Write `data` through `write` one chunk at a time
///
/// Returns the number of chunks written. The first failing chunk aborts
/// the transfer; later chunks are not attempted.
pub async fn write_chunked<'a, F, Fut>(
    data: &'a [u8],
    plan: ChunkPlan,
    mut write: F,
) -> PrintResult<usize>
where
    F: FnMut(&'a [u8]) -> Fut,
    Fut: Future<Output = PrintResult<()>>,
{
    if plan.chunk_size == 0 {
        return Err(PrintError::InvalidConfig("chunk size must be positive".to_string()));
    }

    let total = plan.chunk_count(data.len());
    for (idx, chunk) in data.chunks(plan.chunk_size).enumerate() {
        if idx > 0 && !plan.delay.is_zero() {
            tokio::time::sleep(plan.delay).await;
        }
        debug!(chunk = idx + 1, total, bytes = chunk.len(), "writing chunk");
        write(chunk).await?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_chunk_count() {
        assert_eq!(ChunkPlan::BLUETOOTH.chunk_count(0), 0);
        assert_eq!(ChunkPlan::BLUETOOTH.chunk_count(512), 1);
        assert_eq!(ChunkPlan::BLUETOOTH.chunk_count(513), 2);
        assert_eq!(ChunkPlan::USB.chunk_count(1000), 16);
    }

    #[tokio::test]
    async fn test_writes_are_sequential() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let data = vec![7u8; 130];
        let plan = ChunkPlan::new(64, Duration::ZERO);

        let mut next = 0;
        let written = write_chunked(&data, plan, |chunk| {
            let events = events.clone();
            let idx = next;
            next += 1;
            let len = chunk.len();
            async move {
                events.lock().unwrap().push(format!("start {idx}"));
                tokio::task::yield_now().await;
                events.lock().unwrap().push(format!("end {idx} {len}"));
                Ok(())
            }
        })
        .await
        .unwrap();

        assert_eq!(written, 3);
        assert_eq!(
            *events.lock().unwrap(),
            vec!["start 0", "end 0 64", "start 1", "end 1 64", "start 2", "end 2 2"]
        );
    }

    #[tokio::test]
    async fn test_first_error_aborts() {
        let data = vec![0u8; 300];
        let mut calls = 0;
        let result = write_chunked(&data, ChunkPlan::new(100, Duration::ZERO), |_| {
            calls += 1;
            let n = calls;
            async move {
                if n == 2 {
                    Err(PrintError::Write("rejected".to_string()))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(matches!(result, Err(PrintError::Write(_))));
        assert_eq!(calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_chunks_only() {
        let start = tokio::time::Instant::now();
        let data = vec![0u8; 3 * 512];
        write_chunked(&data, ChunkPlan::BLUETOOTH, |_| async { Ok(()) })
            .await
            .unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(300));
    }
}
