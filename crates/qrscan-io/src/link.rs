use std::process::Stdio;

use tokio::process::Command;
use url::Url;

/// Schemes handed to the platform opener; anything else could launch local programs
const OPENABLE_SCHEMES: &[&str] = &["http", "https", "mailto"];

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("not an absolute URL")]
    NotALink,

    #[error("refusing to open {0}: link")]
    UnsupportedScheme(String),

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Hands a link to whatever opens links on this machine
#[async_trait::async_trait]
pub trait LinkOpener: Send + Sync {
    async fn open(&self, url: &str) -> Result<(), LinkError>;
}

/// Platform opener run as a detached process
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

#[async_trait::async_trait]
impl LinkOpener for SystemOpener {
    async fn open(&self, url: &str) -> Result<(), LinkError> {
        let url = openable(url)?;

        let (program, args) = opener_invocation(&url);
        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| LinkError::Launch { program, source })?;

        tracing::info!("Opened {} link with {}", url.scheme(), program);

        // Reap the opener without tying the caller to its lifetime
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    tracing::warn!("{} exited with {}", program, status);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Failed to wait for {}: {}", program, e),
            }
        });

        Ok(())
    }
}

/// Parse a scanned payload into a URL the opener may receive
pub fn openable(raw: &str) -> Result<Url, LinkError> {
    let url = Url::parse(raw.trim()).map_err(|_| LinkError::NotALink)?;
    if !OPENABLE_SCHEMES.contains(&url.scheme()) {
        return Err(LinkError::UnsupportedScheme(url.scheme().to_owned()));
    }
    Ok(url)
}

/// Program and arguments that open `url` in the default handler on this OS
pub fn opener_invocation(url: &Url) -> (&'static str, Vec<String>) {
    invocation_for(std::env::consts::OS, url)
}

/// The URL is always one argv entry in its serialized form, never parsed by a shell
fn invocation_for(os: &str, url: &Url) -> (&'static str, Vec<String>) {
    match os {
        "windows" => (
            "rundll32",
            vec!["url.dll,FileProtocolHandler".into(), url.as_str().into()],
        ),
        "macos" => ("open", vec![url.as_str().into()]),
        _ => ("xdg-open", vec![url.as_str().into()]),
    }
}
