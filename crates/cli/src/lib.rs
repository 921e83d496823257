//! docmyfiles — command-line README generator.
//!
//! Scans a project directory, packs the files into token-bounded chat
//! requests, and asks an OpenAI-compatible model to write the README.

pub mod confirm;
pub mod ingest;
pub mod orchestrator;
pub mod scan;

use dmf_domain::config::Config;

/// Load the configuration from an explicit path, the `DMF_CONFIG` env
/// var, or `docmyfiles.toml` in the working directory. Only the
/// implicit paths may be absent (falling back to defaults); a path the
/// user named with `--config` must exist. Returns the parsed
/// [`Config`] and the path that was used.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<(Config, String)> {
    let config_path = match explicit {
        Some(path) => path.to_string(),
        None => std::env::var("DMF_CONFIG").unwrap_or_else(|_| "docmyfiles.toml".into()),
    };

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else if explicit.is_some() {
        anyhow::bail!("config file not found: {config_path}");
    } else {
        Config::default()
    };

    Ok((config, config_path))
}
