//! Card CRUD, generation and bulk creation.
//!
//! [`CardsApi`] is the backend seam: [`HttpCardsApi`] talks to the REST
//! backend, [`super::MockCardsApi`] keeps everything in memory.
//! [`CardService`] sits on top, validates input before anything leaves the
//! process, and normalizes outcomes into [`ServiceResponse`]s.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use super::ServiceResponse;
use crate::error::ServiceError;
use crate::http::{ApiClient, UNNAMED_RESOURCE};
use crate::model::{Card, CardPatch, SimpleCard};

pub const MISSING_FIELDS: &str = "Title and content are required";
pub const BLANK_FIELD: &str = "Title and content cannot be blank";
pub const EMPTY_BATCH: &str = "Select at least one card to create";
pub const EMPTY_PROMPT: &str = "The transcript is empty";

/// Backend operations on cards.
#[async_trait]
pub trait CardsApi: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn list_cards(&self) -> Result<Vec<Card>, ServiceError>;

    async fn get_card(&self, id: &str) -> Result<Card, ServiceError>;

    async fn create_card(&self, card: &SimpleCard) -> Result<Card, ServiceError>;

    async fn update_card(&self, id: &str, patch: &CardPatch) -> Result<Card, ServiceError>;

    async fn delete_card(&self, id: &str) -> Result<(), ServiceError>;

    /// Turn free text into candidate cards, in generation order
    async fn generate_cards(&self, prompt: &str) -> Result<Vec<SimpleCard>, ServiceError>;

    /// All-or-nothing insert of several cards
    async fn create_multiple_cards(&self, cards: &[SimpleCard]) -> Result<Vec<Card>, ServiceError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    #[serde(rename = "userPrompt")]
    user_prompt: &'a str,
}

/// REST implementation of [`CardsApi`].
#[derive(Debug, Clone)]
pub struct HttpCardsApi {
    client: ApiClient,
    delete_route: String,
}

impl HttpCardsApi {
    /// `delete_route` must contain an `{id}` placeholder
    pub fn new(client: ApiClient, delete_route: impl Into<String>) -> Self {
        Self {
            client,
            delete_route: delete_route.into(),
        }
    }

    fn delete_path(&self, id: &str) -> String {
        self.delete_route.replace("{id}", id)
    }
}

fn require_card(data: Option<Card>) -> Result<Card, ServiceError> {
    data.ok_or_else(|| ServiceError::Decode("response carried no card".to_string()))
}

/// Card routes answer a bare 404 for unknown ids
fn card_error(err: ServiceError) -> ServiceError {
    match err {
        ServiceError::NotFound(what) if what == UNNAMED_RESOURCE => {
            ServiceError::NotFound("Card".to_string())
        }
        other => other,
    }
}

/// Bulk create either reports every submitted card or fails
fn require_all(submitted: usize, created: Option<Vec<Card>>) -> Result<Vec<Card>, ServiceError> {
    let created = created.ok_or_else(|| {
        ServiceError::Decode("bulk create response carried no cards".to_string())
    })?;
    if created.len() != submitted {
        return Err(ServiceError::Decode(format!(
            "bulk create reported {} of {} cards",
            created.len(),
            submitted
        )));
    }
    Ok(created)
}

#[async_trait]
impl CardsApi for HttpCardsApi {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn list_cards(&self) -> Result<Vec<Card>, ServiceError> {
        let response = self.client.get::<Vec<Card>>("/cards/list").await?;
        Ok(response.data.unwrap_or_default())
    }

    async fn get_card(&self, id: &str) -> Result<Card, ServiceError> {
        let response = self
            .client
            .get::<Card>(&format!("/cards/by_id/{id}"))
            .await
            .map_err(card_error)?;
        response
            .data
            .ok_or_else(|| ServiceError::NotFound("Card".to_string()))
    }

    async fn create_card(&self, card: &SimpleCard) -> Result<Card, ServiceError> {
        let response = self.client.post::<_, Card>("/cards/create", card).await?;
        require_card(response.data)
    }

    async fn update_card(&self, id: &str, patch: &CardPatch) -> Result<Card, ServiceError> {
        let response = self
            .client
            .patch::<_, Card>(&format!("/cards/update/{id}"), patch)
            .await
            .map_err(card_error)?;
        require_card(response.data)
    }

    async fn delete_card(&self, id: &str) -> Result<(), ServiceError> {
        self.client
            .delete::<serde_json::Value>(&self.delete_path(id))
            .await
            .map_err(card_error)?;
        Ok(())
    }

    async fn generate_cards(&self, prompt: &str) -> Result<Vec<SimpleCard>, ServiceError> {
        let response = self
            .client
            .post::<_, Vec<SimpleCard>>(
                "/cards/generate_multiple_cards",
                &GenerateRequest { user_prompt: prompt },
            )
            .await?;
        Ok(response.data.unwrap_or_default())
    }

    async fn create_multiple_cards(&self, cards: &[SimpleCard]) -> Result<Vec<Card>, ServiceError> {
        let response = self
            .client
            .post::<_, Vec<Card>>("/cards/create_multiple_cards", cards)
            .await?;
        require_all(cards.len(), response.data)
    }
}

/// Validating, normalizing front for a [`CardsApi`].
#[derive(Clone)]
pub struct CardService {
    api: Arc<dyn CardsApi>,
}

impl CardService {
    pub fn new(api: Arc<dyn CardsApi>) -> Self {
        Self { api }
    }

    pub fn backend_name(&self) -> &'static str {
        self.api.name()
    }

    pub async fn list_cards(&self) -> ServiceResponse<Vec<Card>> {
        ServiceResponse::from_result(self.api.list_cards().await, "Failed to fetch cards")
    }

    pub async fn get_card(&self, id: &str) -> ServiceResponse<Card> {
        ServiceResponse::from_result(self.api.get_card(id).await, "Failed to fetch card")
    }

    pub async fn create_card(&self, card: SimpleCard) -> ServiceResponse<Card> {
        if !card.is_complete() {
            return ServiceResponse::failure(MISSING_FIELDS);
        }
        let card = SimpleCard::new(card.title.trim(), card.content.trim(), card.status);
        ServiceResponse::from_result(self.api.create_card(&card).await, "Failed to create card")
    }

    pub async fn update_card(&self, id: &str, patch: CardPatch) -> ServiceResponse<Card> {
        let blank = |field: &Option<String>| field.as_deref().is_some_and(|v| v.trim().is_empty());
        if blank(&patch.title) || blank(&patch.content) {
            return ServiceResponse::failure(BLANK_FIELD);
        }
        if patch.is_empty() {
            // Nothing to send; report the current server copy
            return self.get_card(id).await;
        }
        ServiceResponse::from_result(
            self.api.update_card(id, &patch).await,
            "Failed to update card",
        )
    }

    pub async fn delete_card(&self, id: &str) -> ServiceResponse<()> {
        ServiceResponse::from_result(self.api.delete_card(id).await, "Failed to delete card")
    }

    pub async fn generate_cards(&self, prompt: &str) -> ServiceResponse<Vec<SimpleCard>> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return ServiceResponse::failure(EMPTY_PROMPT);
        }
        ServiceResponse::from_result(
            self.api.generate_cards(prompt).await,
            "Failed to generate cards",
        )
    }

    pub async fn create_multiple_cards(&self, cards: Vec<SimpleCard>) -> ServiceResponse<Vec<Card>> {
        if cards.is_empty() {
            return ServiceResponse::failure(EMPTY_BATCH);
        }
        if !cards.iter().all(SimpleCard::is_complete) {
            return ServiceResponse::failure(MISSING_FIELDS);
        }
        let result = self
            .api
            .create_multiple_cards(&cards)
            .await
            .and_then(|created| require_all(cards.len(), Some(created)));
        ServiceResponse::from_result(result, "Failed to create cards")
    }
}
