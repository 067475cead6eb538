use super::{SourceLocation, parse_document, resilient_http};
use crate::Result;
use crate::hierarchy::Document;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err, bail};

/// Loads AF exports from URLs or local files.
#[derive(Debug, Clone)]
pub struct SourceProvider {
    client: reqwest::Client,
    timeout: Duration,
    save_to: Option<Utf8PathBuf>,
}

impl SourceProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .build()
            .into_app_err("unable to create HTTP client")?;

        Ok(Self {
            client,
            timeout,
            save_to: None,
        })
    }

    /// Also write the fetched document text to `path`.
    #[must_use]
    pub fn save_to(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.save_to = Some(path.into());
        self
    }

    /// Read the document text from `location`.
    pub async fn fetch(&self, location: &SourceLocation) -> Result<String> {
        let text = match location {
            SourceLocation::Url(url) => {
                log::info!("downloading AF export from {url}");
                let resp = resilient_http::resilient_get(&self.client, url.as_str(), self.timeout).await?;

                if !resp.status().is_success() {
                    bail!("unable to download AF export from {url}: HTTP {}", resp.status());
                }

                resp.text()
                    .await
                    .into_app_err_with(|| format!("unable to read AF export body from {url}"))?
            }

            SourceLocation::Path(path) => {
                log::info!("reading AF export from '{path}'");
                std::fs::read_to_string(path).into_app_err_with(|| format!("unable to read AF export '{path}'"))?
            }
        };

        log::debug!("loaded {} bytes from {location}", text.len());

        if let Some(path) = &self.save_to {
            save_text(path, &text)?;
        }

        Ok(text)
    }

    /// Fetch and parse the document at `location`.
    pub async fn load(&self, location: &SourceLocation) -> Result<Document> {
        let text = self.fetch(location).await?;
        parse_document(&text).map_err(|e| app_err!("unable to parse AF export from {location}: {e}"))
    }
}

fn save_text(path: &Utf8Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).into_app_err_with(|| format!("creating directory '{parent}'"))?;
    }

    std::fs::write(path, text).into_app_err_with(|| format!("saving AF export to '{path}'"))?;
    log::info!("saved AF export to '{path}'");
    Ok(())
}
