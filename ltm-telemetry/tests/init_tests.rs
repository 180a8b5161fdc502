//! Global subscriber installation runs once per process.

use ltm_telemetry::{LogFormat, TelemetryConfig, TraceId, info, init_telemetry, init_with_config};

#[tokio::test]
async fn repeated_initialization_is_a_no_op() {
    init_with_config(TelemetryConfig::new("init-tests").with_format(LogFormat::Json)).unwrap();
    init_telemetry("init-tests").unwrap();

    TraceId::from("init-trace".to_string())
        .scope(async {
            info!("event emitted inside a trace scope");
        })
        .await;
}
