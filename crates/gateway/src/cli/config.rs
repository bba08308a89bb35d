use guru_domain::config::{Config, ConfigSeverity};

/// Validate the config and print any issues. Returns `false` when at least
/// one issue is an error.
pub fn validate(config: &Config, config_path: &str) -> bool {
    report_missing_env(config);

    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }
    println!("\n{error_count} error(s), {warning_count} warning(s) in {config_path}");

    error_count == 0
}

/// Secrets are only resolved at startup; flag the obvious gaps here.
fn report_missing_env(config: &Config) {
    let vars = [Some(&config.backend.key_env), config.llm.provider.auth.env.as_ref()]
        .into_iter()
        .chain([config.backend.url.is_none().then_some(&config.backend.url_env)])
        .flatten();

    for var in vars {
        if std::env::var(var).map(|v| v.trim().is_empty()).unwrap_or(true) {
            println!("note: environment variable {var} is not set");
        }
    }
}

/// Resolved config (defaults filled in) as TOML.
pub fn render(config: &Config) -> anyhow::Result<String> {
    toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("serializing config: {e}"))
}

pub fn show(config: &Config) -> anyhow::Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_renders_and_reparses() {
        let rendered = render(&Config::default()).unwrap();
        assert!(rendered.contains("[llm.reply]"));
        let back: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(back.sessions.max_history, 6);
    }

    #[test]
    fn invalid_config_fails_validation() {
        let mut cfg = Config::default();
        cfg.server.port = 0;
        assert!(!validate(&cfg, "test.toml"));
    }
}
