//! Sync-state classification
//!
//! The only business rule in the checker: a node reporting a sync that
//! started more than [`TOLERANCE_BLOCKS`] below the reference head is still
//! catching up; within the band it is treated as caught up with a stale
//! starting marker.

use crate::constants::sync::TOLERANCE_BLOCKS;
use crate::errors::ClassificationError;
use crate::hex::parse_hex_quantity;
use crate::types::{RawSyncStatus, SyncVerdict};

/// Verdict plus the decode error that forced `Unknown`, if any
#[derive(Debug)]
pub struct Classification {
    pub verdict: SyncVerdict,
    pub error: Option<ClassificationError>,
}

impl Classification {
    fn verdict(verdict: SyncVerdict) -> Self {
        Self {
            verdict,
            error: None,
        }
    }
}

pub fn classify(raw: &RawSyncStatus, reference_block: i64) -> Classification {
    match raw {
        RawSyncStatus::NotSyncing => Classification::verdict(SyncVerdict::Synced),
        RawSyncStatus::Syncing { starting_block } => match parse_hex_quantity(starting_block) {
            Ok(starting) if reference_block.saturating_sub(starting) > TOLERANCE_BLOCKS => {
                Classification::verdict(SyncVerdict::Syncing)
            }
            Ok(_) => Classification::verdict(SyncVerdict::Synced),
            Err(source) => Classification {
                verdict: SyncVerdict::Unknown,
                error: Some(ClassificationError::InvalidStartingBlock {
                    value: starting_block.clone(),
                    source,
                }),
            },
        },
        RawSyncStatus::Unrecognized => Classification::verdict(SyncVerdict::Unknown),
    }
}
