use crate::error::{QueueError, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub capacity: usize,
    /// 仅用于日志字段；缺省时为匿名队列
    pub name: Option<String>,
}

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            name: None,
        }
    }
}

impl QueueConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| QueueError::Config(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| QueueError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }
}

// 容量校验放在 BoundedQueue::from_config，配置本身只负责读取。
