use crate::stac_operations::{self, SearchParams};
use anyhow::Result;
use bytes::Bytes;
use serde::Deserialize;
use stac::ItemCollection;
use url::Url;

/// A time-limited download link issued by the data provider.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SignedHref {
    pub href: Url,
    #[serde(rename = "msft:expiry")]
    pub expiry: Option<String>,
}

pub trait Provider {
    async fn search(self: &Self, params: &SearchParams) -> Result<ItemCollection>;

    async fn sign(self: &Self, href: &str) -> Result<SignedHref>;

    async fn fetch(self: &Self, url: &Url) -> Result<Bytes>;
}

pub struct PlanetaryComputer {
    client: reqwest::Client,
    stac_api: String,
    sign_api: String,
}

impl PlanetaryComputer {
    pub fn new(client: reqwest::Client, stac_api: &str, sign_api: &str) -> Self {
        Self {
            client,
            stac_api: stac_api.to_string(),
            sign_api: sign_api.to_string(),
        }
    }
}

impl Provider for PlanetaryComputer {
    async fn search(self: &Self, params: &SearchParams) -> Result<ItemCollection> {
        stac_operations::search(&self.client, &self.stac_api, params).await
    }

    async fn sign(self: &Self, href: &str) -> Result<SignedHref> {
        let signed: SignedHref = self
            .client
            .get(&self.sign_api)
            .query(&[("href", href)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(signed)
    }

    async fn fetch(self: &Self, url: &Url) -> Result<Bytes> {
        let bytes = self
            .client
            .get(url.as_str())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes)
    }
}
