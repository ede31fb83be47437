use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    pub typing_debounce_ms: u64,
    pub allow_attachments: bool,
    pub max_text_bytes: usize,
    pub max_filename_len: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            typing_debounce_ms: 1000,
            allow_attachments: true,
            max_text_bytes: 64 * 1024,
            max_filename_len: 255,
        }
    }
}
