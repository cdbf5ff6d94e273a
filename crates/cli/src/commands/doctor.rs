//! `reelbot doctor`: diagnose configuration and backend reachability.

use reelbot_config::AppConfig;
use reelbot_tools::{Catalog, TmdbCatalog};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 ReelBot Doctor");
    println!("=================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found at {}", config_path.display());
    } else {
        println!("  ℹ️  No config file, using defaults and environment");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!();
            println!("  ⚠️  1 issue found. Fix the config before checking backends.");
            return Ok(());
        }
    };

    if config.default_provider_ready() {
        println!("  ✅ Completion key configured ({})", config.default_provider);
    } else {
        println!("  ❌ No completion API key (set GROQ_API_KEY or api_key in config.toml)");
        issues += 1;
    }

    if config.has_catalog_key() {
        println!("  ✅ TMDB key configured");
    } else {
        println!("  ❌ No TMDB key (set TMDB_API_KEY)");
        issues += 1;
    }

    let router = reelbot_providers::router::build_from_config(&config);
    println!("  ℹ️  Providers configured: {}", router.list().join(", "));
    match router.require_default() {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => {
                println!("  ✅ Provider '{}' reachable", provider.name());
                if let Ok(models) = provider.list_models().await {
                    if models.iter().any(|m| *m == config.default_model) {
                        println!("  ✅ Model '{}' available", config.default_model);
                    } else if !models.is_empty() {
                        println!(
                            "  ⚠️  Model '{}' not listed by '{}'",
                            config.default_model,
                            provider.name()
                        );
                        issues += 1;
                    }
                }
            }
            Ok(false) => {
                println!("  ❌ Provider '{}' did not answer the health check", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    if config.has_catalog_key() {
        let catalog = TmdbCatalog::from_config(&config.catalog);
        match catalog.search_movies("Inception").await {
            Ok(_) => println!("  ✅ TMDB reachable at {}", config.catalog.base_url),
            Err(e) => {
                println!("  ❌ TMDB lookup failed: {e}");
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
