//! 统一错误类型：最小化枚举，手写 Display，不引入错误派生宏。
use std::{error::Error as StdError, fmt};

#[derive(Debug)]
pub enum QueueError {
    ZeroCapacity,                      // 容量必须为正
    AllocFailed { capacity: usize },   // 存储预留失败，未获取任何所有权
    Config(String),                    // 配置读取/解析失败
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::ZeroCapacity => write!(f, "queue capacity must be greater than zero"),
            QueueError::AllocFailed { capacity } => {
                write!(f, "failed to allocate storage for {capacity} slots")
            }
            QueueError::Config(s) => write!(f, "invalid queue config: {s}"),
        }
    }
}
impl StdError for QueueError {}

pub type Result<T = ()> = std::result::Result<T, QueueError>;

/// Item handed back by [`push`](crate::queue::BoundedQueue::push) when the queue
/// has been shut down before the item could be admitted.
#[derive(PartialEq, Eq)]
pub struct Rejected<T>(pub T);

impl<T> Rejected<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

// 不打印载荷：队列不解释条目内容
impl<T> fmt::Debug for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rejected(..)")
    }
}
impl<T> fmt::Display for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue is shut down; item not admitted")
    }
}
impl<T> StdError for Rejected<T> {}
