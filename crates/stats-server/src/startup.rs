//! Server startup utilities.

use stats_config::AppConfig;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!("github-readme-stats server v{}", env!("CARGO_PKG_VERSION"));
}

/// Prints server startup information.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    for line in startup_lines(config) {
        info!("{}", line);
    }
    info!("{}", separator);
}

/// The startup summary, one entry per log line.
fn startup_lines(config: &AppConfig) -> Vec<String> {
    let server = &config.server;
    let cache = config
        .cache
        .url()
        .unwrap_or_else(|| "not configured".to_string());

    vec![
        format!("Listening: http://{}", server.listen_addr()),
        format!("Health:    http://{}:{}/health", server.host, server.port),
        format!("Ready:     http://{}:{}/ready", server.host, server.port),
        format!("Cache:     {}", cache),
        format!("Shutdown:  {}s deadline", config.shutdown.deadline_secs),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_lines_with_cache() {
        let mut config = AppConfig::default();
        config.cache.host = Some("redis".to_string());

        let lines = startup_lines(&config);
        assert_eq!(
            lines,
            vec![
                "Listening: http://0.0.0.0:9000",
                "Health:    http://0.0.0.0:9000/health",
                "Ready:     http://0.0.0.0:9000/ready",
                "Cache:     redis://redis:6379",
                "Shutdown:  10s deadline",
            ]
        );
    }

    #[test]
    fn test_startup_lines_without_cache() {
        let mut config = AppConfig::default();
        config.server.port = 8080;
        config.shutdown.deadline_secs = 3;

        let lines = startup_lines(&config);
        assert_eq!(lines[0], "Listening: http://0.0.0.0:8080");
        assert_eq!(lines[3], "Cache:     not configured");
        assert_eq!(lines[4], "Shutdown:  3s deadline");
    }

    #[test]
    fn test_blank_cache_host_is_not_configured() {
        let mut config = AppConfig::default();
        config.cache.host = Some("  ".to_string());
        assert!(startup_lines(&config).contains(&"Cache:     not configured".to_string()));
    }
}
