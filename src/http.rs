//! HTTP plumbing shared by every resolver and the downloader.
//!
//! All outbound requests go through one [`Http`] value constructed by the
//! composition root, so the optional proxy is plain configuration rather
//! than process-global state.

use std::path::Path;

use reqwest::{Client, ClientBuilder};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::error::Error;

/// Optional proxy addresses forwarded to the transport layer.
///
/// When a field is unset, requests for that scheme go out directly.
#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl ProxyConfig {
    fn apply(&self, mut builder: ClientBuilder) -> Result<ClientBuilder, Error> {
        if let Some(url) = &self.http {
            builder = builder.proxy(reqwest::Proxy::http(url)?);
        }
        if let Some(url) = &self.https {
            builder = builder.proxy(reqwest::Proxy::https(url)?);
        }
        Ok(builder)
    }
}

/// Thin client wrapper for the vendor endpoints this crate consumes.
#[derive(Debug, Clone)]
pub struct Http {
    client: Client,
    // Driver archives are historically served from endpoints with broken
    // certificate chains behind corporate proxies; downloads skip
    // certificate verification, metadata requests do not.
    download_client: Client,
}

impl Http {
    pub fn new(proxy: &ProxyConfig) -> Result<Self, Error> {
        let client = proxy.apply(Client::builder())?.build()?;
        let download_client = proxy
            .apply(Client::builder().danger_accept_invalid_certs(true))?
            .build()?;
        Ok(Self {
            client,
            download_client,
        })
    }

    /// GETs `url` and returns the response body as text.
    pub async fn get_text(&self, url: &str) -> Result<String, Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// GETs `url`, following redirects, and returns the final resolved URL.
    pub async fn get_final_url(&self, url: &str) -> Result<String, Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.url().to_string())
    }

    /// Downloads `url` and writes the raw body to `dest`, creating parent
    /// directories as needed.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<(), Error> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Error::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let response = self
            .download_client
            .get(url)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;

        let mut file = File::create(dest).await.map_err(|e| Error::Io {
            path: dest.to_path_buf(),
            source: e,
        })?;
        file.write_all(&body).await.map_err(|e| Error::Io {
            path: dest.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }
}
