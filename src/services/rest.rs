use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::{BackendError, MatchStore, ProfileSource, QuotaGate};
use crate::models::{Match, Profile, QuotaVerdict};

/// REST document-store backend
///
/// Implements all three store ports against the hosted document API:
/// - Fetching the session user's profile and the candidate pool
/// - Reading and persisting mutual matches
/// - Reading and consuming the daily accept quota
pub struct RestBackend {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    session_user_id: String,
    client: Client,
    collections: RestCollections,
}

/// Collection IDs in the document backend
#[derive(Debug, Clone)]
pub struct RestCollections {
    pub profiles: String,
    pub matches: String,
    pub quotas: String,
}

impl RestBackend {
    /// Create a new backend client bound to one session user
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        session_user_id: String,
        collections: RestCollections,
    ) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            session_user_id,
            client,
            collections,
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    async fn get_documents(
        &self,
        collection: &str,
        queries: Option<&[String]>,
    ) -> Result<Vec<Value>, BackendError> {
        let mut url = self.collection_url(collection);
        if let Some(queries) = queries {
            let queries_json = serde_json::to_string(queries)
                .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
            url = format!("{}?query={}", url, urlencoding::encode(&queries_json));
        }

        tracing::debug!("Fetching documents from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Backend-Key", &self.api_key)
            .header("X-Backend-Project", &self.project_id)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(BackendError::ApiError(format!(
                "Failed to fetch documents from {}: {}",
                collection,
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        json.get("documents")
            .and_then(|d| d.as_array())
            .cloned()
            .ok_or_else(|| BackendError::InvalidResponse("Missing documents array".into()))
    }

    /// Fetch the first document matching a userId equality query
    async fn get_user_document(
        &self,
        collection: &str,
        user_id: &str,
    ) -> Result<Option<Value>, BackendError> {
        let queries = vec![format!("equal(\"userId\", \"{}\")", user_id)];
        let documents = self.get_documents(collection, Some(queries.as_slice())).await?;
        Ok(documents.into_iter().next())
    }
}

#[async_trait]
impl ProfileSource for RestBackend {
    async fn current_profile(&self) -> Result<Option<Profile>, BackendError> {
        tracing::debug!("Fetching profile for user: {}", self.session_user_id);

        let doc = self
            .get_user_document(&self.collections.profiles, &self.session_user_id)
            .await?;

        let Some(doc) = doc else {
            return Ok(None);
        };

        let data = doc.get("data").unwrap_or(&doc);
        serde_json::from_value(data.clone())
            .map(Some)
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse profile: {}", e)))
    }

    async fn all_profiles(&self) -> Result<Vec<Profile>, BackendError> {
        let documents = self.get_documents(&self.collections.profiles, None).await?;
        let total = documents.len();

        // Decode leniently: one malformed document must not fail the pool
        let profiles: Vec<Profile> = documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                serde_json::from_value(data.clone()).ok()
            })
            .collect();

        tracing::debug!("Fetched {} profiles ({} documents)", profiles.len(), total);

        Ok(profiles)
    }
}

#[async_trait]
impl MatchStore for RestBackend {
    async fn matches(&self) -> Result<Vec<Match>, BackendError> {
        let documents = self.get_documents(&self.collections.matches, None).await?;

        let matches: Vec<Match> = documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                serde_json::from_value(data.clone()).ok()
            })
            .collect();

        tracing::debug!("Fetched {} matches", matches.len());

        Ok(matches)
    }

    async fn add_match(&self, m: &Match) -> Result<(), BackendError> {
        let url = self.collection_url(&self.collections.matches);

        let mut payload = serde_json::to_value(m)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("$id".to_string(), Value::String(m.id.clone()));
        }

        let response = self
            .client
            .post(&url)
            .header("X-Backend-Key", &self.api_key)
            .header("X-Backend-Project", &self.project_id)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::ApiError(format!(
                "Failed to persist match: {}",
                response.status()
            )));
        }

        tracing::debug!("Persisted match: {} <-> {}", m.user_id, m.matched_user_id);

        Ok(())
    }
}

#[async_trait]
impl QuotaGate for RestBackend {
    async fn can_accept_now(&self) -> Result<QuotaVerdict, BackendError> {
        let doc = self
            .get_user_document(&self.collections.quotas, &self.session_user_id)
            .await?;

        let Some(doc) = doc else {
            // No quota document yet means the user has never accepted today
            return Ok(QuotaVerdict::allow());
        };

        let data = doc.get("data").unwrap_or(&doc);
        let remaining = data
            .get("remainingToday")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| BackendError::InvalidResponse("Missing remainingToday".into()))?;

        if remaining > 0 {
            Ok(QuotaVerdict::allow())
        } else {
            let tier = data
                .get("tier")
                .and_then(|v| v.as_str())
                .unwrap_or("free");
            Ok(QuotaVerdict::block(format!(
                "Daily like limit reached for the {} tier",
                tier
            )))
        }
    }

    async fn consume_one(&self) -> Result<(), BackendError> {
        let url = format!(
            "{}/{}/consume",
            self.collection_url(&self.collections.quotas),
            self.session_user_id
        );

        let response = self
            .client
            .post(&url)
            .header("X-Backend-Key", &self.api_key)
            .header("X-Backend-Project", &self.project_id)
            .json(&serde_json::json!({ "userId": self.session_user_id, "units": 1 }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::ApiError(format!(
                "Failed to consume quota unit: {}",
                response.status()
            )));
        }

        tracing::debug!("Consumed one quota unit for {}", self.session_user_id);

        Ok(())
    }
}
