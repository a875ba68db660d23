//! 限速门（固定间隔）
//!
//! 原实现把 sleep 循环埋在业务代码里；这里抽成独立可注入的抽象，
//! 分发器/遍历器只管在每次请求前调用 `wait`，执行策略（串行或
//! 有界并发）的变更不触碰分类逻辑。
use std::time::{Duration, Instant};

/// 固定间隔门：两次放行之间至少间隔 `interval`；首次放行不等待
#[derive(Debug)]
pub struct IntervalGate {
    interval: Duration,
    next_ready: Option<Instant>,
}

impl IntervalGate {
    /// 搜索端点的基线间隔（避免二级限流）
    pub const SEARCH_BASELINE: Duration = Duration::from_millis(1500);
    /// 提交遍历的基线间隔
    pub const COMMIT_BASELINE: Duration = Duration::from_millis(200);

    pub fn new(interval: Duration) -> Self {
        IntervalGate { interval, next_ready: None }
    }

    /// 测试与离线场景用的零间隔门
    pub fn unpaced() -> Self {
        IntervalGate::new(Duration::ZERO)
    }

    /// 阻塞直到距上次放行至少 `interval`，然后记录本次放行时刻
    pub fn wait(&mut self) {
        if let Some(ready) = self.next_ready {
            let now = Instant::now();
            if ready > now {
                std::thread::sleep(ready - now);
            }
        }
        self.next_ready = Some(Instant::now() + self.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_pass_is_immediate() {
        let mut gate = IntervalGate::new(Duration::from_millis(50));
        let start = Instant::now();
        gate.wait();
        assert!(start.elapsed() < Duration::from_millis(20));
    }

    #[test]
    fn spacing_is_enforced() {
        let mut gate = IntervalGate::new(Duration::from_millis(20));
        let start = Instant::now();
        gate.wait();
        gate.wait();
        gate.wait();
        // 三次放行至少覆盖两个完整间隔
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn unpaced_gate_never_sleeps() {
        let mut gate = IntervalGate::unpaced();
        let start = Instant::now();
        for _ in 0..100 {
            gate.wait();
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
