//! Forecast providers: where per-category statistical forecasts come from.
//!
//! A provider never fails. Transport errors, error statuses (the service
//! answers 400 "Insufficient data" below 24 transactions) and undecodable
//! bodies all surface as [`Forecast::Unavailable`], which the composer
//! treats as "use the historical average".

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use futures_util::future::join_all;
use hushold_core::{ExternalForecast, Forecast, MonthKey};
use reqwest::Url;
use reqwest::header::AUTHORIZATION;
use tokio::runtime::RuntimeFlavor;
use tracing::{debug, warn};

/// Forecast per category name.
pub type ForecastSet = BTreeMap<String, Forecast>;

pub trait ForecastProvider {
    /// Forecast for `category` starting after `reference`. The returned
    /// horizon may be shorter or longer than `horizon`.
    fn fetch(&self, category: &str, reference: MonthKey, horizon: u32) -> Forecast;
}

/// Provider that never has a forecast. Projections built with it use the
/// historical average for every future month.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoForecast;

impl ForecastProvider for NoForecast {
    fn fetch(&self, _category: &str, _reference: MonthKey, _horizon: u32) -> Forecast {
        Forecast::Unavailable
    }
}

/// Ask `provider` for each category in turn.
pub fn collect_forecasts<P>(
    provider: &P,
    categories: &[&str],
    reference: MonthKey,
    horizon: u32,
) -> ForecastSet
where
    P: ForecastProvider + ?Sized,
{
    categories
        .iter()
        .map(|c| (c.to_string(), provider.fetch(c, reference, horizon)))
        .collect()
}

/// HTTP client for the forecasting service:
/// `GET {base_url}/projections/{category}` returning `{"projected": [...]}`.
#[derive(Debug, Clone)]
pub struct HttpForecastProvider {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpForecastProvider {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid forecast url: {base_url}"))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build forecast http client")?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn endpoint(&self, category: &str, horizon: u32) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("forecast url cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .push("projections")
            .push(category.trim());
        url.query_pairs_mut()
            .append_pair("horizon", &horizon.to_string());
        Ok(url)
    }

    async fn request(&self, category: &str, horizon: u32) -> Result<ExternalForecast> {
        let url = self.endpoint(category, horizon)?;
        let mut req = self.client.get(url.clone());
        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let resp = req.send().await.with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("forecast service error: {status} {txt}");
        }

        resp.json().await.context("parse forecast response")
    }

    /// Fetch one category, degrading any failure to `Unavailable`.
    pub async fn fetch_async(&self, category: &str, horizon: u32) -> Forecast {
        match self.request(category, horizon).await {
            Ok(external) => {
                debug!(category, points = external.projected.len(), "forecast received");
                Forecast::from(external)
            }
            Err(e) => {
                warn!(category, error = %e, "forecast unavailable, using historical average");
                Forecast::Unavailable
            }
        }
    }

    /// Fetch all categories concurrently. Requests are independent; one
    /// failing only affects its own category.
    pub async fn fetch_many(&self, categories: &[&str], horizon: u32) -> ForecastSet {
        let results = join_all(categories.iter().map(|c| self.fetch_async(c, horizon))).await;
        categories
            .iter()
            .map(|c| c.to_string())
            .zip(results)
            .collect()
    }
}

impl ForecastProvider for HttpForecastProvider {
    fn fetch(&self, category: &str, _reference: MonthKey, horizon: u32) -> Forecast {
        // A nested block_on panics, and block_in_place only works on the
        // multi-thread runtime.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.fetch_async(category, horizon)))
            }
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(|| self.fetch_on_own_runtime(category, horizon))
                    .join()
                    .unwrap_or_else(|_| {
                        warn!(category, "forecast fetch thread panicked");
                        Forecast::Unavailable
                    })
            }),
            Err(_) => self.fetch_on_own_runtime(category, horizon),
        }
    }
}

impl HttpForecastProvider {
    fn fetch_on_own_runtime(&self, category: &str, horizon: u32) -> Forecast {
        match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt.block_on(self.fetch_async(category, horizon)),
            Err(e) => {
                warn!(category, error = %e, "cannot start runtime for forecast fetch");
                Forecast::Unavailable
            }
        }
    }
}
