use reqwest::header::{HeaderMap, LINK};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Walks a GitHub list endpoint by following `Link: rel="next"` URLs.
pub struct Paginator<'a> {
    client: &'a Client,
    per_page: u32,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a Client, per_page: u32) -> Self {
        Self { client, per_page }
    }

    pub async fn collect<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let separator = if url.contains('?') { '&' } else { '?' };
        let mut next = Some(format!("{}{}per_page={}", url, separator, self.per_page));
        let mut items = Vec::new();
        let mut pages = 0;

        while let Some(page_url) = next.take() {
            pages += 1;
            tracing::debug!("Fetching page {}: {}", pages, page_url);

            let response = self.client.get(&page_url).send().await?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::GitHubApi(format!(
                    "Failed to fetch page {} ({}): {} - {}",
                    pages, page_url, status, body
                )));
            }

            next = next_link(response.headers());
            let page: Vec<T> = response.json().await?;
            items.extend(page);
        }

        tracing::debug!("Collected {} item(s) over {} page(s)", items.len(), pages);
        Ok(items)
    }
}

/// Extracts the `rel="next"` target from a `Link` header.
fn next_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;

    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|p| p.trim().replace(' ', "") == "rel=\"next\"");
        if !is_next {
            return None;
        }
        let target = target.trim();
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(String::from)
    })
}
