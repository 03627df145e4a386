//! `toolstream doctor` — Diagnose config and backend health.

use toolstream_client::HttpTransport;
use toolstream_config::AppConfig;
use toolstream_core::transport::Transport;

pub async fn run() -> anyhow::Result<()> {
    println!("Toolstream Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    // Check config
    let config_path = AppConfig::config_dir().join("config.toml");
    let config = match AppConfig::load() {
        Ok(config) => {
            if config_path.exists() {
                println!("  [ok] Config file valid");
            } else {
                println!("  [ok] No config file — using defaults");
            }
            Some(config)
        }
        Err(e) => {
            println!("  [!!] Config file invalid: {e}");
            issues += 1;
            None
        }
    };

    // Check backend reachability
    if let Some(config) = config {
        match HttpTransport::with_timeout(
            &config.server_url,
            std::time::Duration::from_secs(5),
        ) {
            Ok(transport) => match transport.health_check().await {
                Ok(true) => println!("  [ok] Backend reachable at {}", config.server_url),
                Ok(false) => {
                    println!("  [!!] Backend at {} responded unhealthy", config.server_url);
                    issues += 1;
                }
                Err(e) => {
                    println!("  [!!] Backend unreachable: {e}");
                    issues += 1;
                }
            },
            Err(e) => {
                println!("  [!!] Could not build HTTP client: {e}");
                issues += 1;
            }
        }
    }

    // Check capabilities
    let registry = toolstream_capabilities::default_registry();
    let count = registry.definitions().len();
    if count > 0 {
        println!("  [ok] {count} capabilities registered");
    } else {
        println!("  [!!] No capabilities registered");
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
