use std::time::Instant;
use tracing::info;

/// Emits one line at every module boundary: handler entry/exit, service
/// calls, repository calls, and external work (filesystem, VACUUM).
/// Format: [trace_id] [caller→callee] operation [stage] duration
#[derive(Clone, Default)]
pub struct BoundaryLogger;

impl BoundaryLogger {
    pub fn new() -> Self {
        Self
    }

    pub fn api_entry(&self, trace_id: &str, method: &str, path: &str, params: &str) {
        info!(
            trace_id = %trace_id,
            method = %method,
            path = %path,
            stage = "ENTRY",
            "[{}] [API] {} {} [ENTRY] {}",
            trace_id, method, path, params
        );
    }

    pub fn api_exit(&self, trace_id: &str, method: &str, path: &str, duration_ms: f64, status: u16) {
        info!(
            trace_id = %trace_id,
            method = %method,
            path = %path,
            stage = "DONE",
            duration_ms = %duration_ms,
            status = %status,
            "[{}] [API] {} {} [DONE] {:.2}ms status={}",
            trace_id, method, path, duration_ms, status
        );
    }

    pub fn service_entry<T: std::fmt::Debug>(
        &self,
        trace_id: &str,
        service: &str,
        method: &str,
        params: &T,
    ) {
        info!(
            trace_id = %trace_id,
            service = %service,
            method = %method,
            stage = "ENTRY",
            params = ?params,
            "[{}] [API→{}] {} [ENTRY] params={:?}",
            trace_id, service, method, params
        );
    }

    pub fn service_exit(&self, trace_id: &str, service: &str, method: &str, duration_ms: f64) {
        info!(
            trace_id = %trace_id,
            service = %service,
            method = %method,
            stage = "DONE",
            duration_ms = %duration_ms,
            "[{}] [API→{}] {} [DONE] {:.2}ms",
            trace_id, service, method, duration_ms
        );
    }

    pub fn repo_call(&self, trace_id: &str, from: &str, repo: &str, method: &str) {
        info!(
            trace_id = %trace_id,
            from = %from,
            repo = %repo,
            method = %method,
            stage = "CALL",
            "[{}] [{}→{}] {} [CALL]",
            trace_id, from, repo, method
        );
    }

    pub fn repo_done(&self, trace_id: &str, from: &str, repo: &str, method: &str, duration_ms: f64) {
        info!(
            trace_id = %trace_id,
            from = %from,
            repo = %repo,
            method = %method,
            stage = "DONE",
            duration_ms = %duration_ms,
            "[{}] [{}→{}] {} [DONE] {:.2}ms",
            trace_id, from, repo, method, duration_ms
        );
    }

    pub fn external_call(&self, trace_id: &str, from: &str, system: &str, operation: &str) {
        info!(
            trace_id = %trace_id,
            from = %from,
            system = %system,
            operation = %operation,
            stage = "EXT",
            "[{}] [{}→{}] {} [EXT]",
            trace_id, from, system, operation
        );
    }

    pub fn external_done(
        &self,
        trace_id: &str,
        from: &str,
        system: &str,
        operation: &str,
        duration_ms: f64,
    ) {
        info!(
            trace_id = %trace_id,
            from = %from,
            system = %system,
            operation = %operation,
            stage = "DONE",
            duration_ms = %duration_ms,
            "[{}] [{}→{}] {} [DONE] {:.2}ms",
            trace_id, from, system, operation, duration_ms
        );
    }
}

/// Wall-clock timer for boundary duration fields.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}
