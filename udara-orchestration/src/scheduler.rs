//! Scheduler de ciclos em taxa fixa
//!
//! Os ciclos são ancorados no relógio monotônico do nó. Um ciclo atrasado
//! roda assim que possível; ciclos inteiros perdidos não são recuperados em
//! rajada, apenas contados.

use std::time::Duration;
use udara_core::clock::Clock;
use udara_core::traits::Timestamp;

use crate::error::{OrchestrationError, OrchestrationResult};

/// Menor intervalo aceito entre ciclos (ms)
pub const MIN_INTERVAL_MS: u64 = 100;

/// Scheduler de ciclos
#[derive(Debug, Clone)]
pub struct CycleScheduler {
    interval_ms: u64,
    next_due: Option<Timestamp>,
    tick_count: u64,
    missed_ticks: u64,
    total_execution_time: Duration,
    min_execution_time: Option<Duration>,
    max_execution_time: Option<Duration>,
}

impl CycleScheduler {
    /// Cria scheduler com o intervalo dado
    pub fn new(interval_ms: u64) -> OrchestrationResult<Self> {
        if interval_ms < MIN_INTERVAL_MS {
            return Err(OrchestrationError::InvalidConfiguration(format!(
                "cycle interval {interval_ms}ms is below the {MIN_INTERVAL_MS}ms minimum"
            )));
        }

        Ok(Self {
            interval_ms,
            next_due: None,
            tick_count: 0,
            missed_ticks: 0,
            total_execution_time: Duration::ZERO,
            min_execution_time: None,
            max_execution_time: None,
        })
    }

    /// Retorna intervalo alvo entre ciclos
    pub fn target_interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// O próximo ciclo já está vencido? O primeiro sempre está.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.next_due.is_none_or(|due| now >= due)
    }

    /// Tempo até o próximo ciclo
    pub fn time_until_next(&self, now: Timestamp) -> Duration {
        match self.next_due {
            Some(due) if due > now => Duration::from_millis(due - now),
            _ => Duration::ZERO,
        }
    }

    /// Consome o ciclo vencido, se houver
    pub fn poll(&mut self, now: Timestamp) -> Option<TickInfo> {
        if !self.is_due(now) {
            return None;
        }

        let on_time = match self.next_due {
            None => {
                self.next_due = Some(now + self.interval_ms);
                true
            }
            Some(due) => {
                let late_by = now - due;
                let missed = late_by / self.interval_ms;
                if missed > 0 {
                    self.missed_ticks += missed;
                    tracing::warn!(missed, late_by_ms = late_by, "cycles missed");
                    self.next_due = Some(now + self.interval_ms);
                } else {
                    self.next_due = Some(due + self.interval_ms);
                }
                missed == 0
            }
        };

        self.tick_count += 1;
        Some(TickInfo {
            tick_number: self.tick_count,
            at: now,
            on_time,
        })
    }

    /// Aguarda até o próximo ciclo (dormindo a thread)
    pub fn wait_for_next_tick(&mut self, clock: &dyn Clock) -> TickInfo {
        loop {
            let now = clock.now_ms();
            if let Some(tick) = self.poll(now) {
                return tick;
            }
            std::thread::sleep(self.time_until_next(now));
        }
    }

    /// Registra tempo de execução de um ciclo
    pub fn record_execution_time(&mut self, duration: Duration) {
        self.total_execution_time += duration;

        if self.min_execution_time.is_none_or(|min| duration < min) {
            self.min_execution_time = Some(duration);
        }

        if self.max_execution_time.is_none_or(|max| duration > max) {
            self.max_execution_time = Some(duration);
        }
    }

    /// Retorna estatísticas do scheduler
    pub fn stats(&self) -> SchedulerStats {
        let avg_execution_time = if self.tick_count > 0 {
            self.total_execution_time / self.tick_count as u32
        } else {
            Duration::ZERO
        };

        SchedulerStats {
            tick_count: self.tick_count,
            missed_ticks: self.missed_ticks,
            interval_ms: self.interval_ms,
            avg_execution_time,
            min_execution_time: self.min_execution_time.unwrap_or(Duration::ZERO),
            max_execution_time: self.max_execution_time.unwrap_or(Duration::ZERO),
        }
    }

    /// Reseta estatísticas
    pub fn reset(&mut self) {
        self.next_due = None;
        self.tick_count = 0;
        self.missed_ticks = 0;
        self.total_execution_time = Duration::ZERO;
        self.min_execution_time = None;
        self.max_execution_time = None;
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn missed_ticks(&self) -> u64 {
        self.missed_ticks
    }
}

/// Informações sobre um ciclo liberado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInfo {
    /// Número do ciclo (1-based)
    pub tick_number: u64,
    /// Instante em que foi liberado
    pub at: Timestamp,
    /// Se nenhum ciclo foi perdido antes dele
    pub on_time: bool,
}

/// Estatísticas do scheduler
#[derive(Debug, Clone)]
pub struct SchedulerStats {
    pub tick_count: u64,
    pub missed_ticks: u64,
    pub interval_ms: u64,
    pub avg_execution_time: Duration,
    pub min_execution_time: Duration,
    pub max_execution_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use udara_core::clock::ManualClock;

    #[test]
    fn test_interval_validation() {
        assert!(CycleScheduler::new(50).is_err());
        let scheduler = CycleScheduler::new(2000).unwrap();
        assert_eq!(scheduler.target_interval(), Duration::from_millis(2000));
    }

    #[test]
    fn test_first_tick_is_immediate() {
        let mut scheduler = CycleScheduler::new(1000).unwrap();
        let tick = scheduler.poll(5).unwrap();
        assert_eq!(tick.tick_number, 1);
        assert!(tick.on_time);
        assert!(scheduler.poll(5).is_none());
    }

    #[test]
    fn test_fixed_rate_gating() {
        let mut scheduler = CycleScheduler::new(1000).unwrap();
        scheduler.poll(0).unwrap();

        assert!(scheduler.poll(999).is_none());
        assert_eq!(scheduler.time_until_next(400), Duration::from_millis(600));

        // Atraso pequeno não desloca a grade
        let tick = scheduler.poll(1150).unwrap();
        assert!(tick.on_time);
        assert!(scheduler.poll(1999).is_none());
        assert!(scheduler.poll(2000).is_some());
    }

    #[test]
    fn test_missed_ticks_are_counted_not_replayed() {
        let mut scheduler = CycleScheduler::new(1000).unwrap();
        scheduler.poll(0).unwrap();

        let tick = scheduler.poll(4500).unwrap();
        assert!(!tick.on_time);
        assert_eq!(scheduler.missed_ticks(), 3);
        assert!(scheduler.poll(4600).is_none());
        assert!(scheduler.poll(5500).is_some());
        assert_eq!(scheduler.tick_count(), 3);
    }

    #[test]
    fn test_wait_with_manual_clock() {
        let clock = ManualClock::new(0);
        let mut scheduler = CycleScheduler::new(100).unwrap();

        let first = scheduler.wait_for_next_tick(&clock);
        assert_eq!(first.at, 0);

        clock.advance(100);
        let second = scheduler.wait_for_next_tick(&clock);
        assert_eq!(second.tick_number, 2);
        assert_eq!(second.at, 100);
    }

    #[test]
    fn test_execution_time_recording() {
        let mut scheduler = CycleScheduler::new(1000).unwrap();

        scheduler.record_execution_time(Duration::from_millis(5));
        scheduler.record_execution_time(Duration::from_millis(10));
        scheduler.record_execution_time(Duration::from_millis(3));

        let stats = scheduler.stats();
        assert_eq!(stats.min_execution_time, Duration::from_millis(3));
        assert_eq!(stats.max_execution_time, Duration::from_millis(10));
    }

    #[test]
    fn test_scheduler_reset() {
        let mut scheduler = CycleScheduler::new(1000).unwrap();
        scheduler.poll(0).unwrap();
        scheduler.reset();
        assert_eq!(scheduler.tick_count(), 0);
        assert!(scheduler.is_due(1));
    }
}
