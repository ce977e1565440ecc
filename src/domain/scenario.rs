// Scenario state machine and execution statistics

use crate::db::schema::ScenarioStatus;
use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};

/// Smoothing factor for the execution-time moving average
const EMA_ALPHA: f64 = 0.2;

/// Statistics written back after one execution
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionStats {
    pub execution_count: i64,
    pub success_rate: f64,
    pub avg_execution_time: f64,
    pub last_execution: DateTime<Utc>,
}

/// Fold one execution sample into the scenario statistics.
///
/// The count increments by exactly one, the average execution time is an
/// exponential moving average seeded by the first sample, and the success
/// rate is clamped to [0, 100] on both ends.
pub fn fold_execution(
    execution_count: i64,
    success_rate: f64,
    avg_execution_time: f64,
    sample_seconds: f64,
    success_delta: f64,
    now: DateTime<Utc>,
) -> ExecutionStats {
    let avg = if execution_count == 0 || avg_execution_time <= 0.0 {
        sample_seconds
    } else {
        (1.0 - EMA_ALPHA) * avg_execution_time + EMA_ALPHA * sample_seconds
    };

    ExecutionStats {
        execution_count: execution_count + 1,
        success_rate: (success_rate + success_delta).clamp(0.0, 100.0),
        avg_execution_time: avg,
        last_execution: now,
    }
}

/// Status after a toggle. Only active and paused scenarios can be toggled;
/// pending and error scenarios are rejected so a toggle never masks a state
/// the operator has to resolve first.
pub fn toggled(status: &str) -> Result<ScenarioStatus> {
    match ScenarioStatus::parse(status) {
        Some(ScenarioStatus::Active) => Ok(ScenarioStatus::Paused),
        Some(ScenarioStatus::Paused) => Ok(ScenarioStatus::Active),
        Some(other) => Err(AppError::Conflict(format!(
            "Cannot toggle a scenario in status '{}'",
            other.as_str()
        ))),
        None => Err(AppError::Internal(format!("Unknown scenario status: {}", status))),
    }
}
