//! 生产者/消费者示例：两个生产者写入小容量队列，两个消费者累加，结束后校验总和。
//!
//! 运行：`RUST_LOG=mmg_bounded=debug cargo run --example producer_consumer`

use mmg_bounded::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static SUM: AtomicU64 = AtomicU64::new(0);

fn main() -> anyhow::Result<()> {
    mmg_bounded::trace::init_tracing();

    let cfg = QueueConfig::from_json_str(r#"{ "capacity": 4, "name": "demo" }"#)?;
    let queue = Arc::new(BoundedQueue::<u64>::from_config(&cfg)?);
    let mut group = WorkerGroup::new(queue);

    for p in 0..2u64 {
        group.spawn_producer(format!("producer-{p}"), move |q| {
            for i in 1..=100 {
                q.push(p * 1000 + i)
                    .map_err(|_| anyhow::anyhow!("queue closed early"))?;
            }
            Ok(())
        })?;
    }
    for c in 0..2 {
        group.spawn_consumer(format!("consumer-{c}"), |v| {
            SUM.fetch_add(v, Ordering::Relaxed);
            Ok(())
        })?;
    }

    let failed = group.join();
    let expected: u64 = (0..2u64).map(|p| (1..=100).map(|i| p * 1000 + i).sum::<u64>()).sum();
    tracing::info!(sum = SUM.load(Ordering::Relaxed), expected, failed, "done");
    anyhow::ensure!(failed == 0, "{failed} workers failed");
    Ok(())
}
