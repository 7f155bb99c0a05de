mod trace_id;

pub use trace_id::TraceIdLayer;
