use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::model::{BookingRequest, BookingResultCode};

/// The on-disk state: an ordered list of booking requests. Matches the JSON
/// the tool has always used, so existing state files keep loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymBookerState {
    pub requests: Vec<BookingRequest>,
}

/// Load/persist access to the state file. The whole file is rewritten on
/// every mutation, via a temp file in the same directory plus a rename so a
/// crash mid-write never corrupts the previous state.
pub struct RequestStore {
    path: PathBuf,
}

impl RequestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<GymBookerState, StoreError> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn persist(&self, state: &GymBookerState) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, state)?;
        file.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    /// Record one outcome and persist in the same step, so a recorded result
    /// is always on disk before the next request is considered.
    pub fn record_result(
        &self,
        state: &mut GymBookerState,
        index: usize,
        code: BookingResultCode,
    ) -> Result<(), StoreError> {
        if let Some(request) = state.requests.get_mut(index) {
            request.result_code = Some(code);
        }
        self.persist(state)
    }
}
