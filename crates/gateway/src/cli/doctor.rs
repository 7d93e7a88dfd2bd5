use hc_domain::config::{Config, ConfigSeverity};

/// Validate a config's checks without starting the scheduler. Prints
/// every issue found and returns an error if any is `Error`-severity.
pub fn run(config: &Config, config_path: &str) -> anyhow::Result<()> {
    println!("loaded config from {config_path}");
    println!("checks: {}", config.checks.len());

    let issues = config.validate();
    if issues.is_empty() {
        println!("no issues found");
        return Ok(());
    }

    let mut has_error = false;
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => println!("warning: {issue}"),
            ConfigSeverity::Error => {
                has_error = true;
                println!("error: {issue}");
            }
        }
    }

    if has_error {
        anyhow::bail!("config has {} error(s)", issues.iter().filter(|i| i.severity == ConfigSeverity::Error).count());
    }
    Ok(())
}
