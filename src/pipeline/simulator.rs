// Execution timing capability
//
// Scenario executions report a duration sample and a bounded success-rate
// delta. Production code runs the simulated implementation below; a real
// runner measures actual work behind the same interface, and tests use the
// fixed double.

use crate::db::schema::ScenarioRecord;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Outcome of one scenario run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionOutcome {
    /// Wall-clock duration of the run
    pub duration: Duration,
    /// Bounded adjustment applied to the scenario success rate
    pub success_delta: f64,
}

#[async_trait]
pub trait ExecutionSimulator: Send + Sync {
    async fn run(&self, scenario: &ScenarioRecord) -> ExecutionOutcome;
}

/// Simulated runner: a short delay, a duration sample between 1 and 11
/// seconds and a drift within [-1, +1] percentage points.
#[derive(Debug, Clone)]
pub struct SimulatedExecution {
    pub delay: Duration,
}

impl SimulatedExecution {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ExecutionSimulator for SimulatedExecution {
    async fn run(&self, scenario: &ScenarioRecord) -> ExecutionOutcome {
        tracing::debug!("Simulating execution for scenario {}", scenario.id);
        tokio::time::sleep(self.delay).await;

        let (seconds, delta) = {
            let mut rng = rand::thread_rng();
            (rng.gen_range(1.0..=11.0), rng.gen_range(-1.0..=1.0))
        };

        ExecutionOutcome {
            duration: Duration::from_secs_f64(seconds),
            success_delta: delta,
        }
    }
}

/// Deterministic double for tests
#[derive(Debug, Clone, Copy)]
pub struct FixedExecution {
    pub seconds: f64,
    pub success_delta: f64,
}

#[async_trait]
impl ExecutionSimulator for FixedExecution {
    async fn run(&self, _scenario: &ScenarioRecord) -> ExecutionOutcome {
        ExecutionOutcome {
            duration: Duration::from_secs_f64(self.seconds),
            success_delta: self.success_delta,
        }
    }
}
