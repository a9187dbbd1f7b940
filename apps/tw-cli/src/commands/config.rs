// config.rs — Print the effective configuration.

use tw_run::GovernanceConfig;

pub fn execute(config: &GovernanceConfig) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
