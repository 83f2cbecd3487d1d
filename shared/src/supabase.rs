//! [`StudioStore`] over the hosted database's REST interface (PostgREST).

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    config::SupabaseConfig,
    store::{StudioStore, CATEGORIES_TABLE, HERO_SLIDES_TABLE, PROJECTS_TABLE},
    slugify, Category, HeroSlide, HeroSlideDraft, NewCategory, Project, ProjectDraft, ProjectPatch,
    Result, StudioError,
};

const PROJECT_SELECT: &str = "*,categories(id,name,slug)";

#[derive(Debug, Deserialize)]
struct OrderRow {
    display_order: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

#[derive(Serialize)]
struct HeroSlideInsert<'a> {
    #[serde(flatten)]
    draft: &'a HeroSlideDraft,
    display_order: i64,
}

#[derive(Serialize)]
struct DisplayOrderUpdate {
    display_order: i64,
}

/// Maps a failed response onto the error taxonomy.
///
/// Auth failures are reported as such; other client errors are the store
/// refusing the request; everything else counts as the store being down.
pub fn classify_response_error(status: StatusCode, body: &str) -> StudioError {
    let parsed: PostgrestError = serde_json::from_str(body).unwrap_or_default();
    let message = [parsed.message, parsed.details, parsed.hint]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    let message = if message.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {message}")
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StudioError::AuthRequired,
        status if status.is_client_error() => StudioError::ValidationRejected(message),
        _ => StudioError::StoreUnavailable(message),
    }
}

/// [`StudioStore`] backed by the hosted REST interface.
pub struct SupabaseStore {
    config: SupabaseConfig,
    client: reqwest::Client,
    access_token: RwLock<Option<String>>,
}

impl SupabaseStore {
    /// Builds the store with its HTTP client; requests use the anon key.
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        let client = config.http_client()?;
        Ok(Self {
            config,
            client,
            access_token: RwLock::new(None),
        })
    }

    /// Reads [`SupabaseConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    /// Sends writes as the signed-in user; `None` falls back to the anon key.
    pub fn set_access_token(&self, token: Option<String>) {
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let bearer = self
            .access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| self.config.anon_key.clone());
        self.client
            .request(method, format!("{}/rest/v1/{table}", self.config.url))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }

    fn returning(builder: RequestBuilder) -> RequestBuilder {
        builder.header("Prefer", "return=representation")
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder
            .send()
            .await
            .map_err(|err| StudioError::StoreUnavailable(format!("request failed: {err}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| StudioError::StoreUnavailable(format!("failed to read body: {err}")))?;
        if !status.is_success() {
            return Err(classify_response_error(status, &body));
        }
        serde_json::from_str(&body)
            .map_err(|err| StudioError::StoreUnavailable(format!("undecodable response: {err}")))
    }

    async fn fetch_one<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let rows: Vec<T> = self.fetch(builder).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StudioError::StoreUnavailable("write returned no row".to_string()))
    }

    /// Runs a PATCH/DELETE filtered by id and reports an unmatched id.
    async fn mutate_by_id(
        &self,
        builder: RequestBuilder,
        entity: &'static str,
        id: &str,
    ) -> Result<()> {
        let builder = Self::returning(builder)
            .query(&[("id", format!("eq.{id}")), ("select", "id".to_string())]);
        let rows: Vec<serde_json::Value> = self.fetch(builder).await?;
        if rows.is_empty() {
            return Err(StudioError::not_found(entity, id));
        }
        Ok(())
    }

    async fn max_display_order(&self, table: &str) -> Result<Option<i64>> {
        let rows: Vec<OrderRow> = self
            .fetch(self.request(Method::GET, table).query(&[
                ("select", "display_order"),
                ("order", "display_order.desc.nullslast"),
                ("limit", "1"),
            ]))
            .await?;
        Ok(rows.into_iter().next().and_then(|row| row.display_order))
    }
}

#[async_trait]
impl StudioStore for SupabaseStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.fetch(
            self.request(Method::GET, CATEGORIES_TABLE)
                .query(&[("select", "*"), ("order", "name.asc")]),
        )
        .await
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let rows: Vec<Category> = self
            .fetch(self.request(Method::GET, CATEGORIES_TABLE).query(&[
                ("select", "*".to_string()),
                ("slug", format!("eq.{}", slugify(name))),
                ("limit", "1".to_string()),
            ]))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_category(&self, category: &NewCategory) -> Result<Category> {
        self.fetch_one(Self::returning(
            self.request(Method::POST, CATEGORIES_TABLE).json(category),
        ))
        .await
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.fetch(
            self.request(Method::GET, PROJECTS_TABLE)
                .query(&[("select", PROJECT_SELECT), ("order", "display_order.asc")]),
        )
        .await
    }

    async fn find_project_by_title(&self, title: &str) -> Result<Option<Project>> {
        let rows: Vec<Project> = self
            .fetch(self.request(Method::GET, PROJECTS_TABLE).query(&[
                ("select", PROJECT_SELECT.to_string()),
                ("title", format!("eq.{title}")),
                ("limit", "1".to_string()),
            ]))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn max_project_display_order(&self) -> Result<Option<i64>> {
        self.max_display_order(PROJECTS_TABLE).await
    }

    async fn insert_project(&self, draft: &ProjectDraft) -> Result<Project> {
        self.fetch_one(Self::returning(
            self.request(Method::POST, PROJECTS_TABLE)
                .query(&[("select", PROJECT_SELECT)])
                .json(draft),
        ))
        .await
    }

    async fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.mutate_by_id(
            self.request(Method::PATCH, PROJECTS_TABLE).json(patch),
            "project",
            id,
        )
        .await
    }

    async fn delete_project(&self, id: &str) -> Result<()> {
        self.mutate_by_id(self.request(Method::DELETE, PROJECTS_TABLE), "project", id)
            .await
    }

    async fn list_hero_slides(&self) -> Result<Vec<HeroSlide>> {
        self.fetch(
            self.request(Method::GET, HERO_SLIDES_TABLE)
                .query(&[("select", "*"), ("order", "display_order.asc")]),
        )
        .await
    }

    async fn max_hero_slide_display_order(&self) -> Result<Option<i64>> {
        self.max_display_order(HERO_SLIDES_TABLE).await
    }

    async fn insert_hero_slide(
        &self,
        draft: &HeroSlideDraft,
        display_order: i64,
    ) -> Result<HeroSlide> {
        self.fetch_one(Self::returning(
            self.request(Method::POST, HERO_SLIDES_TABLE)
                .json(&HeroSlideInsert {
                    draft,
                    display_order,
                }),
        ))
        .await
    }

    async fn delete_hero_slide(&self, id: &str) -> Result<()> {
        self.mutate_by_id(self.request(Method::DELETE, HERO_SLIDES_TABLE), "hero slide", id)
            .await
    }

    async fn update_hero_slide_order(&self, id: &str, display_order: i64) -> Result<()> {
        self.mutate_by_id(
            self.request(Method::PATCH, HERO_SLIDES_TABLE)
                .json(&DisplayOrderUpdate {
                    display_order,
                }),
            "hero slide",
            id,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::classify_response_error;
    use crate::StudioError;

    #[test]
    fn constraint_violation_is_validation_rejected() {
        let body = r#"{"code":"23502","message":"null value in column \"title\"","details":null,"hint":null}"#;
        let err = classify_response_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            err,
            StudioError::ValidationRejected(
                "HTTP 400 Bad Request: null value in column \"title\"".to_string()
            )
        );
    }

    #[test]
    fn auth_statuses_require_session() {
        assert_eq!(
            classify_response_error(StatusCode::UNAUTHORIZED, ""),
            StudioError::AuthRequired
        );
        assert_eq!(classify_response_error(StatusCode::FORBIDDEN, "{}"), StudioError::AuthRequired);
    }

    #[test]
    fn server_errors_are_store_unavailable() {
        let err = classify_response_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err, StudioError::StoreUnavailable("HTTP 502 Bad Gateway".to_string()));
    }
}
