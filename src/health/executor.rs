use super::errors::CheckError;
use super::models::{CheckOutcome, CheckReport, CheckStatus};
use super::registry::CheckDefinition;
use chrono::Utc;
use tokio::time::{timeout, Instant};

/// Runs one check under its timeout and normalizes the outcome.
///
/// The check is spawned as a detached task. When the timeout wins the task is
/// abandoned, not aborted, and may keep running in the background.
#[tracing::instrument(name = "Execute health check", skip(definition), fields(critical = definition.critical))]
pub async fn execute_check(name: &str, definition: &CheckDefinition) -> CheckReport {
    let start = Instant::now();

    let check = definition.check.clone();
    let task = tokio::spawn(async move { check.check().await });

    let result = match timeout(definition.timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => {
            tracing::error!(error = %join_err, "Health check task failed");
            Err(CheckError::execution("Check execution failed"))
        }
        Err(_) => Err(CheckError::Timeout {
            timeout: definition.timeout,
        }),
    };
    let duration_ms = start.elapsed().as_millis() as u64;

    build_report(name, definition, result, duration_ms)
}

fn build_report(
    name: &str,
    definition: &CheckDefinition,
    result: Result<CheckOutcome, CheckError>,
    duration_ms: u64,
) -> CheckReport {
    let (status, details, error) = match result {
        Ok(outcome) => (outcome.status, Some(outcome.into_report_details()), None),
        Err(err) => {
            tracing::error!(
                check = %name,
                error = %err,
                kind = err.kind(),
                duration_ms,
                critical = definition.critical,
                "Health check failed"
            );
            (CheckStatus::Unhealthy, None, Some(err.to_string()))
        }
    };

    CheckReport {
        name: name.to_string(),
        status,
        description: definition.description.clone(),
        details,
        error,
        duration_ms,
        timestamp: Utc::now(),
        critical: definition.critical,
    }
}
