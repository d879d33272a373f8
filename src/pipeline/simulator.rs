use std::time::{Duration, Instant};
use rand::Rng;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use crate::errors::CiphertraceError;
use crate::models::ToolKind;
use super::events::ScanEvent;
use super::phase::PhaseDefinition;
use tracing::debug;

/// How long each simulated phase takes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseDelay {
    Fixed(Duration),
    /// Uniformly random between the bounds, inclusive.
    Jitter { min: Duration, max: Duration },
}

impl PhaseDelay {
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        if min_ms >= max_ms {
            Self::Fixed(Duration::from_millis(min_ms))
        } else {
            Self::Jitter {
                min: Duration::from_millis(min_ms),
                max: Duration::from_millis(max_ms),
            }
        }
    }

    fn sample(&self) -> Duration {
        match *self {
            Self::Fixed(d) => d,
            Self::Jitter { min, max } => rand::thread_rng().gen_range(min..=max),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub phases_completed: usize,
    pub elapsed_ms: u64,
}

/// Walks a tool's phases on a timer, spreading progress 0-100 evenly across
/// them. No work happens in a phase; it only takes time.
#[derive(Debug, Clone)]
pub struct PhaseSimulator {
    delay: PhaseDelay,
    ticks_per_phase: u32,
}

impl PhaseSimulator {
    pub fn new(delay: PhaseDelay) -> Self {
        Self { delay, ticks_per_phase: 4 }
    }

    /// Simulator that completes immediately, for tests and batch use.
    pub fn instant() -> Self {
        Self::new(PhaseDelay::Fixed(Duration::ZERO))
    }

    #[cfg(test)]
    fn with_ticks_per_phase(mut self, ticks: u32) -> Self {
        self.ticks_per_phase = ticks.max(1);
        self
    }

    /// Run every phase in order. Returns `Cancelled` as soon as the token
    /// fires; no event is emitted after that point.
    pub async fn run(
        &self,
        tool: ToolKind,
        phases: &[PhaseDefinition],
        cancel: &CancellationToken,
        events: Option<&UnboundedSender<ScanEvent>>,
    ) -> Result<SimulationReport, CiphertraceError> {
        let emit = |event: ScanEvent| {
            if let Some(tx) = events {
                let _ = tx.send(event);
            }
        };

        let started = Instant::now();
        let ticks = self.ticks_per_phase as usize;
        let total_ticks = phases.len() * ticks;
        let mut done_ticks = 0usize;

        if phases.is_empty() {
            emit(ScanEvent::Progress { tool, percent: 100 });
        }

        for (index, phase) in phases.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(cancelled(tool, phase));
            }
            emit(ScanEvent::PhaseStarted { tool, index, name: phase.name.to_string() });

            let tick = self.delay.sample() / self.ticks_per_phase;
            for _ in 0..ticks {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(cancelled(tool, phase)),
                    _ = tokio::time::sleep(tick) => {}
                }
                done_ticks += 1;
                let percent = (done_ticks * 100 / total_ticks) as u8;
                emit(ScanEvent::Progress { tool, percent });
            }

            debug!(tool = %tool, phase = phase.name, "Phase complete");
            emit(ScanEvent::PhaseCompleted { tool, index, name: phase.name.to_string() });
        }

        Ok(SimulationReport {
            phases_completed: phases.len(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
}

fn cancelled(tool: ToolKind, phase: &PhaseDefinition) -> CiphertraceError {
    CiphertraceError::Cancelled(format!("{} stopped during {}", tool.display_name(), phase.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::phase::EMAIL_PHASES;
    use tokio::sync::mpsc;

    fn drain(rx: &mut mpsc::UnboundedReceiver<ScanEvent>) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        while let Ok(e) = rx.try_recv() {
            events.push(e);
        }
        events
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_ends_at_100() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sim = PhaseSimulator::instant();
        let report = sim.run(ToolKind::EmailChecker, EMAIL_PHASES, &CancellationToken::new(), Some(&tx))
            .await
            .unwrap();
        assert_eq!(report.phases_completed, EMAIL_PHASES.len());

        let percents: Vec<u8> = drain(&mut rx).into_iter()
            .filter_map(|e| match e {
                ScanEvent::Progress { percent, .. } => Some(percent),
                _ => None,
            })
            .collect();
        assert_eq!(percents.len(), EMAIL_PHASES.len() * 4);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*percents.last().unwrap(), 100);
    }

    #[tokio::test]
    async fn test_every_phase_reports_completion_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        PhaseSimulator::instant().with_ticks_per_phase(1)
            .run(ToolKind::EmailChecker, EMAIL_PHASES, &CancellationToken::new(), Some(&tx))
            .await
            .unwrap();

        let completed: Vec<String> = drain(&mut rx).into_iter()
            .filter_map(|e| match e {
                ScanEvent::PhaseCompleted { name, .. } => Some(name),
                _ => None,
            })
            .collect();
        let expected: Vec<String> = EMAIL_PHASES.iter().map(|p| p.name.to_string()).collect();
        assert_eq!(completed, expected);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let err = PhaseSimulator::instant()
            .run(ToolKind::EmailChecker, EMAIL_PHASES, &token, Some(&tx))
            .await
            .unwrap_err();
        assert!(matches!(err, CiphertraceError::Cancelled(_)));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_run_stops_events() {
        let token = CancellationToken::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sim = PhaseSimulator::new(PhaseDelay::Fixed(Duration::from_millis(200)));

        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });

        let err = sim.run(ToolKind::EmailChecker, EMAIL_PHASES, &token, Some(&tx)).await.unwrap_err();
        assert!(matches!(err, CiphertraceError::Cancelled(_)));

        let events = drain(&mut rx);
        assert!(!events.iter().any(|e| matches!(e, ScanEvent::PhaseCompleted { .. })));
        // Nothing more arrives after cancellation.
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_no_phases_reports_full_progress() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let report = PhaseSimulator::instant()
            .run(ToolKind::CallTracer, &[], &CancellationToken::new(), Some(&tx))
            .await
            .unwrap();
        assert_eq!(report.phases_completed, 0);
        assert_eq!(drain(&mut rx), vec![ScanEvent::Progress { tool: ToolKind::CallTracer, percent: 100 }]);
    }

    #[test]
    fn test_delay_from_millis() {
        assert_eq!(PhaseDelay::from_millis(300, 300), PhaseDelay::Fixed(Duration::from_millis(300)));
        assert!(matches!(PhaseDelay::from_millis(100, 400), PhaseDelay::Jitter { .. }));
        let jitter = PhaseDelay::from_millis(100, 400);
        for _ in 0..20 {
            let d = jitter.sample();
            assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(400));
        }
    }
}
