//! Default configuration values

use super::types::{FormConfig, StorageConfig, ValidationConfig};
use crate::{
    schema::DEFAULT_ID_PREFIX,
    session::{DEFAULT_ANSWER_REQUIRED_MESSAGE, DEFAULT_REQUIRED_MESSAGE},
    snapshot::DEFAULT_STORAGE_KEY,
};

pub(super) const DEFAULT_SNAPSHOT_TTL_SECS: u32 = 600;
pub(super) const DEFAULT_ANSWER_DEBOUNCE_MS: u32 = 50;
pub(super) const DEFAULT_SNAPSHOT_DIR: &str = ".quizform/snapshots";
pub(super) const DEFAULT_OUTBOX_DIR: &str = ".quizform/outbox";

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            snapshot_ttl_secs: DEFAULT_SNAPSHOT_TTL_SECS,
            answer_debounce_ms: DEFAULT_ANSWER_DEBOUNCE_MS,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_message: DEFAULT_REQUIRED_MESSAGE.to_string(),
            answer_required_message: DEFAULT_ANSWER_REQUIRED_MESSAGE.to_string(),
            contact_text_ascii_only: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: DEFAULT_SNAPSHOT_DIR.to_string(),
            outbox_dir: DEFAULT_OUTBOX_DIR.to_string(),
        }
    }
}
