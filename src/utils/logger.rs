use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const KNOWN_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// 將 LOG_LEVEL 正規化，無法辨識的值退回 info
pub fn normalize_level(level: &str) -> &'static str {
    let lowered = level.trim().to_ascii_lowercase();
    let lowered = match lowered.as_str() {
        "warning" => "warn",
        "critical" => "error",
        other => other,
    };
    KNOWN_LEVELS
        .iter()
        .find(|known| **known == lowered)
        .copied()
        .unwrap_or("info")
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("turn_notifier={}", normalize_level(level))))
}

pub fn init_cli_logger(level: &str) {
    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_json_logger(level: &str) {
    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(), // 給集中式日誌收集使用
        )
        .init();
}
