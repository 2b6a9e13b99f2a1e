//! Store abstraction the maintenance run loads from and saves to.

use crate::error::Result;
use ecole_engine::SchoolSnapshot;

/// Where a snapshot lives between runs.
///
/// Callers serialize access themselves (see [`super::StoreLock`]); a store
/// does not guard against concurrent writers.
pub trait DatasetStore {
    /// Read the full snapshot.
    fn load(&self) -> Result<SchoolSnapshot>;

    /// Replace the stored snapshot.
    fn save(&self, snapshot: &SchoolSnapshot) -> Result<()>;

    /// Keep a copy of the current contents before they are replaced.
    fn backup(&self) -> Result<()> {
        Ok(())
    }
}
