//! Twitter API v2 client
//!
//! Implements [`Upstream`] over HTTP. Maps HTTP 404 to
//! `AppError::NotFound` and everything else that fails to a
//! transient upstream error.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

use super::{PostsPage, RawPost, Upstream};
use crate::config::UpstreamConfig;
use crate::data::{Account, Media};
use crate::error::AppError;
use crate::metrics::{UPSTREAM_REQUEST_DURATION_SECONDS, UPSTREAM_REQUESTS_TOTAL};

/// Twitter API v2 client with bearer token authentication
pub struct TwitterApi {
    http: reqwest::Client,
    base_url: Url,
    bearer_token: String,
}

impl TwitterApi {
    /// Create a new client from configuration
    ///
    /// The request timeout bounds every page fetch so a slow upstream
    /// cannot hang a feed request indefinitely.
    pub fn new(config: &UpstreamConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("Birdfeed/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Config(format!("upstream.base_url is invalid: {e}")))?;

        Ok(Self {
            http,
            base_url,
            bearer_token: config.bearer_token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Config(format!("upstream.base_url cannot join {path}: {e}")))
    }

    /// Issue one GET request and decode the JSON body
    async fn get_json<T>(
        &self,
        endpoint_name: &str,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, AppError>
    where
        T: serde::de::DeserializeOwned,
    {
        let timer = UPSTREAM_REQUEST_DURATION_SECONDS
            .with_label_values(&[endpoint_name])
            .start_timer();
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.bearer_token)
            .query(query)
            .send()
            .await;
        timer.observe_duration();

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&[endpoint_name, "transport_error"])
                    .inc();
                return Err(error.into());
            }
        };

        let status = response.status();
        UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&[endpoint_name, status.as_str()])
            .inc();

        match status {
            status if status.is_success() => Ok(response.json::<T>().await?),
            StatusCode::NOT_FOUND => Err(AppError::NotFound),
            status => Err(AppError::Upstream(format!(
                "upstream returned {status} for {endpoint_name}"
            ))),
        }
    }
}

#[async_trait]
impl Upstream for TwitterApi {
    async fn lookup_account_by_id(&self, id: u64) -> Result<Account, AppError> {
        let url = self.endpoint(&format!("/2/users/{id}"))?;
        let envelope: UserEnvelope = self
            .get_json("users_by_id", url, &user_fields_query())
            .await?;
        envelope.into_account()
    }

    async fn lookup_account_by_handle(&self, handle: &str) -> Result<Account, AppError> {
        let url = self.endpoint(&format!("/2/users/by/username/{handle}"))?;
        let envelope: UserEnvelope = self
            .get_json("users_by_handle", url, &user_fields_query())
            .await?;
        envelope.into_account()
    }

    async fn fetch_posts_page<'a>(
        &self,
        account_id: u64,
        since_id: Option<u64>,
        cursor: Option<&'a str>,
        not_older_than: DateTime<Utc>,
        page_size: u32,
    ) -> Result<PostsPage, AppError> {
        let url = self.endpoint(&format!("/2/users/{account_id}/tweets"))?;

        let mut query: Vec<(&str, String)> = vec![
            ("max_results", page_size.to_string()),
            (
                "start_time",
                not_older_than.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            (
                "expansions",
                "author_id,attachments.media_keys".to_string(),
            ),
            ("media.fields", "url,preview_image_url".to_string()),
            ("tweet.fields", "created_at,author_id,attachments".to_string()),
        ];
        if let Some(since_id) = since_id {
            query.push(("since_id", since_id.to_string()));
        }
        if let Some(cursor) = cursor {
            query.push(("pagination_token", cursor.to_string()));
        }

        let envelope: TweetsEnvelope = self.get_json("user_tweets", url, &query).await?;
        envelope.into_page()
    }
}

fn user_fields_query() -> [(&'static str, String); 1] {
    [("user.fields", "name,username".to_string())]
}

fn parse_id(raw: &str, what: &str) -> Result<u64, AppError> {
    raw.parse::<u64>()
        .map_err(|_| AppError::Upstream(format!("upstream returned non-numeric {what}: {raw:?}")))
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    data: Option<UserData>,
}

impl UserEnvelope {
    /// The v2 API reports a missing user as a 200 with no `data`.
    fn into_account(self) -> Result<Account, AppError> {
        self.data.ok_or(AppError::NotFound)?.into_account()
    }
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    name: String,
    username: String,
}

impl UserData {
    fn into_account(self) -> Result<Account, AppError> {
        Ok(Account {
            id: parse_id(&self.id, "user id")?,
            handle: self.username,
            display_name: self.name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TweetsEnvelope {
    data: Option<Vec<TweetData>>,
    #[serde(default)]
    includes: Includes,
    #[serde(default)]
    meta: Meta,
}

impl TweetsEnvelope {
    fn into_page(self) -> Result<PostsPage, AppError> {
        let mut included_accounts = HashMap::new();
        for user in self.includes.users {
            let account = user.into_account()?;
            included_accounts.insert(account.id, account);
        }

        // Photos carry `url`; videos and GIFs only expose a preview
        // image. Entries with neither are left out of the included
        // set, which the sync engine reports as an expansion miss.
        let mut included_media = HashMap::new();
        for media in self.includes.media {
            if let Some(url) = media.url.or(media.preview_image_url) {
                included_media.insert(media.media_key, Media { url });
            }
        }

        let mut posts = Vec::new();
        for tweet in self.data.unwrap_or_default() {
            posts.push(RawPost {
                id: parse_id(&tweet.id, "tweet id")?,
                author_id: parse_id(&tweet.author_id, "author id")?,
                text: tweet.text,
                created_at: tweet.created_at,
                media_keys: tweet.attachments.media_keys,
            });
        }

        Ok(PostsPage {
            posts,
            included_accounts,
            included_media,
            next_cursor: self.meta.next_token,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
    text: String,
    created_at: DateTime<Utc>,
    author_id: String,
    #[serde(default)]
    attachments: Attachments,
}

#[derive(Debug, Default, Deserialize)]
struct Attachments {
    #[serde(default)]
    media_keys: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<UserData>,
    #[serde(default)]
    media: Vec<MediaData>,
}

#[derive(Debug, Deserialize)]
struct MediaData {
    media_key: String,
    url: Option<String>,
    preview_image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    next_token: Option<String>,
}
