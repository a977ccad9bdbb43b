use std::path::{Path, PathBuf};

use forge_audit::input::{read_repository_names, read_tokens};
use forge_audit::{ClientPool, Pacer, ProviderConfig, ProviderKind};

use crate::GlobalArgs;
use crate::config::Config;

/// Settings resolved from CLI flags over the config file.
#[derive(Debug, Clone)]
pub(crate) struct Resolved {
    pub(crate) provider: ProviderKind,
    pub(crate) base_url: Option<String>,
    pub(crate) pacing_ms: u64,
    pub(crate) include_forks: bool,
}

impl Resolved {
    pub(crate) fn new(args: &GlobalArgs, config: &Config) -> Self {
        let base_url = args
            .base_url
            .clone()
            .or_else(|| config.forge.base_url.clone());
        let provider = args
            .provider
            .or(config.forge.provider)
            .unwrap_or_else(|| ProviderKind::infer(base_url.as_deref()));

        Self {
            provider,
            base_url,
            pacing_ms: args.pacing_ms.unwrap_or(config.export.pacing_ms),
            include_forks: args.forks || config.export.include_forks,
        }
    }
}

fn read_token_file(path: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    read_tokens(path)
        .map_err(|e| format!("Failed to read tokens from {}: {}", path.display(), e).into())
}

/// Collect tokens from flags, falling back to the config file.
pub(crate) fn resolve_tokens(
    args: &GlobalArgs,
    config: &Config,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut tokens = args.token.clone();
    if let Some(ref path) = args.tokens_file {
        tokens.extend(read_token_file(path)?);
    }

    if tokens.is_empty() {
        tokens.extend(config.forge.token.iter().cloned());
        if let Some(ref path) = config.forge.tokens_file {
            tokens.extend(read_token_file(path)?);
        }
    }

    if tokens.is_empty() {
        return Err("No tokens given. Pass --token, --tokens-file, or set FORGE_AUDIT_FORGE__TOKEN."
            .into());
    }

    Ok(tokens)
}

/// Collect `owner/name` entries from `--repo` flags and the `--list` file.
pub(crate) fn resolve_repository_names(
    repos: &[String],
    list: Option<&PathBuf>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut names = repos.to_vec();
    if let Some(path) = list {
        let listed = read_repository_names(path).map_err(|e| {
            format!("Failed to read repository list {}: {}", path.display(), e)
        })?;
        names.extend(listed);
    }

    if names.is_empty() {
        return Err("No repositories given. Pass --repo owner/name or --list <file>.".into());
    }

    Ok(names)
}

/// Build the credential pool for the resolved provider.
pub(crate) async fn open_pool(
    resolved: &Resolved,
    tokens: &[String],
) -> Result<ClientPool, Box<dyn std::error::Error>> {
    let pacer = Pacer::from_millis(resolved.pacing_ms);
    let factory = ProviderConfig::new(resolved.provider, resolved.base_url.clone(), pacer.clone())?;

    tracing::info!(
        provider = %resolved.provider,
        tokens = tokens.len(),
        "Building credential pool"
    );

    Ok(ClientPool::build(&factory, tokens, pacer).await?)
}

/// Last four characters of a token, for display.
pub(crate) fn mask_token(token: &str) -> String {
    let tail: String = token
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("…{tail}")
}
