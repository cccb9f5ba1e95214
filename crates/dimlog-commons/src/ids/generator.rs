// Commit sequence generator
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::errors::DimLogError;
use crate::ids::CommitSeq;

/// Snowflake-based generator producing strictly increasing commit sequences
///
/// Format (64 bits):
/// - 41 bits: timestamp in milliseconds since custom epoch
/// - 10 bits: machine/worker ID
/// - 12 bits: sequence number
///
/// Every value returned is strictly greater than the previous one, which is
/// what makes the change log's append-order invariant hold.
pub struct CommitSeqGenerator {
    /// Machine/worker ID (0-1023)
    worker_id: u16,

    /// State protected by mutex
    state: Mutex<GeneratorState>,
}

struct GeneratorState {
    /// Last timestamp used
    last_timestamp: u64,

    /// Sequence number (0-4095)
    sequence: u16,
}

impl CommitSeqGenerator {
    /// Maximum worker ID
    pub const MAX_WORKER_ID: u16 = 1023;

    /// Maximum sequence number
    const MAX_SEQUENCE: u16 = 4095;

    /// Create a new generator
    pub fn new(worker_id: u16) -> Self {
        assert!(
            worker_id <= Self::MAX_WORKER_ID,
            "worker_id must be <= {}",
            Self::MAX_WORKER_ID
        );

        Self {
            worker_id,
            state: Mutex::new(GeneratorState {
                last_timestamp: 0,
                sequence: 0,
            }),
        }
    }

    /// Generate the next commit sequence
    pub fn next_seq(&self) -> Result<CommitSeq, DimLogError> {
        let mut state = self.state.lock().unwrap();

        let mut timestamp = self.current_timestamp()?;

        // Handle clock going backwards
        if timestamp < state.last_timestamp {
            return Err(DimLogError::ClockMovedBackwards {
                millis: state.last_timestamp - timestamp,
            });
        }

        if timestamp == state.last_timestamp {
            // Same millisecond - increment sequence
            state.sequence = (state.sequence + 1) & Self::MAX_SEQUENCE;

            if state.sequence == 0 {
                // Sequence overflow - wait for next millisecond
                timestamp = self.wait_next_millis(state.last_timestamp)?;
            }
        } else {
            // New millisecond - reset sequence
            state.sequence = 0;
        }

        state.last_timestamp = timestamp;

        let id = ((timestamp - CommitSeq::EPOCH) << 22)
            | ((self.worker_id as u64) << 12)
            | (state.sequence as u64);

        Ok(CommitSeq::new(id as i64))
    }

    /// Get current timestamp in milliseconds
    fn current_timestamp(&self) -> Result<u64, DimLogError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .map_err(|e| DimLogError::Other(format!("Failed to get current timestamp: {}", e)))
    }

    /// Wait until next millisecond
    fn wait_next_millis(&self, last_timestamp: u64) -> Result<u64, DimLogError> {
        let mut timestamp = self.current_timestamp()?;
        while timestamp <= last_timestamp {
            timestamp = self.current_timestamp()?;
        }
        Ok(timestamp)
    }
}

impl Default for CommitSeqGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}
