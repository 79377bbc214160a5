//! 有界阻塞 FIFO 队列：单锁 + 两个条件变量（not_full / not_empty）的管程实现。
//!
//! - 入队在满时阻塞，出队在空时阻塞；所有等待均循环检查谓词。
//! - `shutdown()` 单调且幂等：广播唤醒全部等待者，此后拒绝新入队，
//!   已入队条目继续按序交付，取尽后出队立即返回空哨兵。
use crate::config::QueueConfig;
use crate::error::{QueueError, Rejected, Result};
use parking_lot::{Condvar, Mutex};
use smallvec::SmallVec;
use std::fmt;
use std::num::NonZeroUsize;

// 环形存储：tail 隐式为 (head + count) % capacity
struct Ring<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    count: usize,
    shutdown: bool,
}

impl<T> Ring<T> {
    // 容量只在这里落地，此后唯一来源是 slots.len()
    fn with_capacity(capacity: NonZeroUsize) -> Result<Self> {
        let capacity = capacity.get();
        let mut slots: Vec<Option<T>> = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| QueueError::AllocFailed { capacity })?;
        slots.resize_with(capacity, || None);
        Ok(Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            count: 0,
            shutdown: false,
        })
    }

    fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    fn put(&mut self, item: T) {
        let tail = (self.head + self.count) % self.slots.len();
        debug_assert!(self.slots[tail].is_none());
        self.slots[tail] = Some(item);
        self.count += 1;
    }

    fn take(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.count -= 1;
        item
    }
}

pub struct BoundedQueue<T> {
    name: Option<String>,
    ring: Mutex<Ring<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BoundedQueue<T> {
    /// Allocates storage for exactly `capacity` slots.
    ///
    /// Fails with [`QueueError::ZeroCapacity`] for a zero capacity and with
    /// [`QueueError::AllocFailed`] when the storage cannot be reserved.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::build(capacity, None)
    }

    pub fn with_name(capacity: usize, name: impl Into<String>) -> Result<Self> {
        Self::build(capacity, Some(name.into()))
    }

    pub fn from_config(cfg: &QueueConfig) -> Result<Self> {
        Self::build(cfg.capacity, cfg.name.clone())
    }

    fn build(capacity: usize, name: Option<String>) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(QueueError::ZeroCapacity)?;
        let ring = Ring::with_capacity(capacity)?;
        let q = Self {
            name,
            ring: Mutex::new(ring),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        };
        tracing::debug!(queue = %q.label(), capacity = capacity.get(), "bounded queue created");
        Ok(q)
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("anon")
    }

    /// Blocks while the queue is full, then admits `item`.
    ///
    /// Once the queue is shut down the item is handed back in [`Rejected`],
    /// including when the caller was already blocked waiting for room.
    pub fn push(&self, item: T) -> std::result::Result<(), Rejected<T>> {
        let mut ring = self.ring.lock();
        while ring.is_full() && !ring.shutdown {
            tracing::trace!(queue = %self.label(), "enqueue waiting: queue full");
            self.not_full.wait(&mut ring);
        }
        if ring.shutdown {
            return Err(Rejected(item));
        }
        ring.put(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Same protocol as [`push`](Self::push); a shutdown rejection drops the item.
    pub fn enqueue(&self, item: T) {
        if let Err(rejected) = self.push(item) {
            // 锁已释放，条目在锁外析构
            tracing::debug!(queue = %self.label(), "enqueue after shutdown; item dropped");
            drop(rejected);
        }
    }

    /// Blocks while the queue is empty and still active.
    ///
    /// Returns `None` only once the queue is shut down and fully drained.
    pub fn dequeue(&self) -> Option<T> {
        let mut ring = self.ring.lock();
        while ring.count == 0 && !ring.shutdown {
            tracing::trace!(queue = %self.label(), "dequeue waiting: queue empty");
            self.not_empty.wait(&mut ring);
        }
        let item = ring.take()?;
        self.not_full.notify_one();
        Some(item)
    }

    /// Waits like [`dequeue`](Self::dequeue), then removes up to `max` items in
    /// one lock acquisition. An empty result means shut down and drained
    /// (or `max == 0`).
    pub fn dequeue_up_to(&self, max: usize) -> SmallVec<[T; 8]> {
        let mut out = SmallVec::new();
        if max == 0 {
            return out;
        }
        let mut ring = self.ring.lock();
        while ring.count == 0 && !ring.shutdown {
            tracing::trace!(queue = %self.label(), "dequeue waiting: queue empty");
            self.not_empty.wait(&mut ring);
        }
        while out.len() < max {
            match ring.take() {
                Some(item) => out.push(item),
                None => break,
            }
        }
        // 每腾出一个槽位唤醒一个生产者；无人等待时提前结束
        for _ in 0..out.len() {
            if !self.not_full.notify_one() {
                break;
            }
        }
        out
    }

    pub fn shutdown(&self) {
        let first = {
            let mut ring = self.ring.lock();
            let first = !ring.shutdown;
            ring.shutdown = true;
            // 必须广播：单播可能唤醒错误一侧的等待者
            self.not_empty.notify_all();
            self.not_full.notify_all();
            first
        };
        tracing::info!(queue = %self.label(), first, "shutdown requested");
    }

    pub fn is_empty(&self) -> bool {
        self.ring.lock().count == 0
    }

    pub fn is_shutdown(&self) -> bool {
        self.ring.lock().shutdown
    }

    pub fn len(&self) -> usize {
        self.ring.lock().count
    }

    pub fn capacity(&self) -> usize {
        self.ring.lock().slots.len()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("BoundedQueue");
        d.field("name", &self.label());
        // 同线程持锁时不能再阻塞加锁
        match self.ring.try_lock() {
            Some(ring) => d
                .field("capacity", &ring.slots.len())
                .field("len", &ring.count)
                .field("shutdown", &ring.shutdown),
            None => d.field("state", &"<locked>"),
        };
        d.finish()
    }
}

impl<T> Drop for BoundedQueue<T> {
    fn drop(&mut self) {
        let left = self.ring.get_mut().count;
        if left > 0 {
            tracing::debug!(queue = %self.label(), left, "queue dropped with buffered items");
        }
    }
}
