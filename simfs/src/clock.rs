//! 时间戳来源

use core::sync::atomic::{AtomicU64, Ordering};

pub trait Clock: Send + Sync {
    /// 单调不减的时间戳，单位秒
    fn now(&self) -> u64;
}

/// 每次读取前进一拍的计数器，用于测试和没有墙上时钟的环境
#[derive(Debug, Default)]
pub struct TickClock(AtomicU64);

impl TickClock {
    pub const fn starting_at(tick: u64) -> Self {
        Self(AtomicU64::new(tick))
    }
}

impl Clock for TickClock {
    fn now(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// UNIX 时间
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, TickClock};

    #[test]
    fn ticks_advance() {
        let clock = TickClock::starting_at(10);
        assert_eq!(clock.now(), 10);
        assert_eq!(clock.now(), 11);
    }
}
