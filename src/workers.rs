use crate::queue::BoundedQueue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

// 生产者/消费者线程组：围绕同一个共享队列启停，停机完全依赖队列 shutdown。
pub struct WorkerGroup<T: Send + 'static> {
    queue: Arc<BoundedQueue<T>>,
    producers: Vec<Worker>,
    consumers: Vec<Worker>,
    live_consumers: Arc<AtomicUsize>,
}

struct Worker {
    name: String,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl<T: Send + 'static> WorkerGroup<T> {
    pub fn new(queue: Arc<BoundedQueue<T>>) -> Self {
        Self {
            queue,
            producers: Vec::new(),
            consumers: Vec::new(),
            live_consumers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn queue(&self) -> &Arc<BoundedQueue<T>> {
        &self.queue
    }

    /// 生产者闭包拿到队列引用，自行决定入队节奏；返回即视为该生产者结束。
    pub fn spawn_producer<F>(&mut self, name: impl Into<String>, f: F) -> std::io::Result<()>
    where
        F: FnOnce(&BoundedQueue<T>) -> anyhow::Result<()> + Send + 'static,
    {
        let name = name.into();
        let q = self.queue.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || f(q.as_ref()))?;
        self.producers.push(Worker { name, handle });
        Ok(())
    }

    /// 消费者逐条处理，直到收到空哨兵（已停机且取尽）或处理函数出错。
    pub fn spawn_consumer<F>(&mut self, name: impl Into<String>, mut f: F) -> std::io::Result<()>
    where
        F: FnMut(T) -> anyhow::Result<()> + Send + 'static,
    {
        let name = name.into();
        let q = self.queue.clone();
        let live = self.live_consumers.clone();
        // 计数在 spawn 前递增，避免与其他消费者退出竞争
        self.live_consumers.fetch_add(1, Ordering::AcqRel);
        let spawned = thread::Builder::new().name(name.clone()).spawn(move || {
            let _guard = ConsumerGuard {
                queue: q.clone(),
                live,
            };
            while let Some(item) = q.dequeue() {
                f(item)?;
            }
            Ok(())
        });
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.live_consumers.fetch_sub(1, Ordering::AcqRel);
                return Err(e);
            }
        };
        self.consumers.push(Worker { name, handle });
        Ok(())
    }

    /// 立即停机：关闭队列并回收全部线程。返回失败（出错或 panic）的线程数。
    pub fn stop(mut self) -> usize {
        self.queue.shutdown();
        let mut failed = join_all(&mut self.producers, "producer");
        failed += join_all(&mut self.consumers, "consumer");
        failed
    }

    /// 自然结束：先等全部生产者返回，再关闭队列让消费者取尽已入队条目。
    /// 最后一个消费者提前退出时队列已被关闭，阻塞的生产者会被拒绝而返回。
    pub fn join(mut self) -> usize {
        let mut failed = join_all(&mut self.producers, "producer");
        self.queue.shutdown();
        failed += join_all(&mut self.consumers, "consumer");
        failed
    }
}

// 消费者线程退出（正常、出错或 panic）时递减计数；最后一个离开且队列仍开放，
// 说明已无人取数，关闭队列以免生产者永久阻塞在满队列上。
struct ConsumerGuard<T> {
    queue: Arc<BoundedQueue<T>>,
    live: Arc<AtomicUsize>,
}

impl<T> Drop for ConsumerGuard<T> {
    fn drop(&mut self) {
        if self.live.fetch_sub(1, Ordering::AcqRel) == 1 && !self.queue.is_shutdown() {
            tracing::warn!("last consumer exited before shutdown; shutting queue down");
            self.queue.shutdown();
        }
    }
}

fn join_all(workers: &mut Vec<Worker>, role: &'static str) -> usize {
    let mut failed = 0;
    for w in workers.drain(..) {
        match w.handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                failed += 1;
                tracing::error!(worker = %w.name, role, error = %e, "worker exited with error");
            }
            Err(_) => {
                failed += 1;
                tracing::error!(worker = %w.name, role, "worker panicked");
            }
        }
    }
    failed
}

// 未显式 stop/join 时也不留游离线程
impl<T: Send + 'static> Drop for WorkerGroup<T> {
    fn drop(&mut self) {
        if self.producers.is_empty() && self.consumers.is_empty() {
            return;
        }
        self.queue.shutdown();
        join_all(&mut self.producers, "producer");
        join_all(&mut self.consumers, "consumer");
    }
}
