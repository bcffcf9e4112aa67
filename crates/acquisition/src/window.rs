//! 最近 tick 耗时窗口 (用于状态日志)

use ringbuf::{traits::*, HeapRb};

/// 固定容量的 tick 耗时窗口，满时覆盖最旧值
pub struct TickWindow {
    durations_ms: HeapRb<f64>,
}

impl std::fmt::Debug for TickWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickWindow")
            .field("len", &self.durations_ms.occupied_len())
            .finish()
    }
}

impl TickWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            durations_ms: HeapRb::new(capacity.max(1)),
        }
    }

    #[inline]
    pub fn push(&mut self, duration_ms: f64) {
        self.durations_ms.push_overwrite(duration_ms);
    }

    pub fn len(&self) -> usize {
        self.durations_ms.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations_ms.is_empty()
    }

    pub fn mean(&self) -> Option<f64> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        Some(self.durations_ms.iter().sum::<f64>() / n as f64)
    }

    pub fn max(&self) -> Option<f64> {
        self.durations_ms.iter().copied().reduce(f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_overwrites_oldest() {
        let mut window = TickWindow::new(3);
        assert!(window.mean().is_none());
        for v in [100.0, 1.0, 2.0, 3.0] {
            window.push(v);
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.mean(), Some(2.0));
        assert_eq!(window.max(), Some(3.0));
    }
}
