/// Tracing target for connection state and telemetry events.
pub const T_MONITOR: &str = "truelink::monitor";
