use serde::{Deserialize, Serialize};

/// 输入防抖
///
/// 时间由调用方以毫秒传入，页面上使用 `Date.now()`。
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval_ms: u64,
    /// (待发出的查询, 可以发出的时间)
    pending: Option<(String, u64)>,
}

impl Debouncer {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            pending: None,
        }
    }

    /// 记录一次按键输入，重新开始计时
    pub fn input(&mut self, text: &str, now_ms: u64) {
        let deadline = now_ms.saturating_add(self.interval_ms);
        self.pending = Some((text.to_string(), deadline));
    }

    /// 距离最后一次输入已超过间隔时取出待发出的查询
    pub fn poll(&mut self, now_ms: u64) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now_ms => self.pending.take().map(|(text, _)| text),
            _ => None,
        }
    }

    /// 回车：跳过防抖立即发出，同时丢弃尚未发出的输入
    pub fn enter(&mut self, text: &str) -> String {
        self.pending = None;
        text.to_string()
    }

    /// 待发出查询的截止时间
    pub fn deadline(&self) -> Option<u64> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// 查询票据，按发出顺序递增
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryTicket(pub u32);

/// 查询序号器 - 只有最近一次发出的查询结果可以被渲染
#[derive(Debug, Default, Clone)]
pub struct QuerySequencer {
    latest: u32,
}

impl QuerySequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 发出一次新查询，之前的票据全部失效
    pub fn issue(&mut self) -> QueryTicket {
        self.latest = self.latest.wrapping_add(1);
        QueryTicket(self.latest)
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        ticket.0 == self.latest
    }

    /// 票据仍然有效时返回结果，否则丢弃
    pub fn accept<T>(&self, ticket: QueryTicket, result: T) -> Option<T> {
        self.is_current(ticket).then_some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debounce_waits_for_quiet_period() {
        let mut debouncer = Debouncer::new(300);
        debouncer.input("r", 0);
        debouncer.input("ru", 100);
        assert_eq!(debouncer.poll(399), None);
        assert_eq!(debouncer.poll(400).as_deref(), Some("ru"));
        assert_eq!(debouncer.poll(1000), None);
    }

    #[test]
    fn enter_bypasses_and_cancels_pending() {
        let mut debouncer = Debouncer::new(300);
        debouncer.input("rus", 0);
        assert_eq!(debouncer.enter("rust"), "rust");
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.poll(10_000), None);
    }

    #[test]
    fn only_latest_ticket_is_current() {
        let mut sequencer = QuerySequencer::new();
        let slow = sequencer.issue();
        let fast = sequencer.issue();

        assert_eq!(sequencer.accept(fast, "new"), Some("new"));
        assert_eq!(sequencer.accept(slow, "stale"), None);
        assert!(!sequencer.is_current(slow));
    }
}
