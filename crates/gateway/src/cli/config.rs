use hc_domain::config::{Config, ConfigSeverity};

/// Parse the config and report any issues, exiting non-zero on error.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    let issues = config.validate();
    if issues.is_empty() {
        println!("config is valid");
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
        anyhow::bail!("config is invalid");
    }
    Ok(())
}

/// Dump the resolved configuration, with defaults filled in, as TOML.
pub fn show(config: &Config) -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(config)?;
    print!("{rendered}");
    Ok(())
}
