//! In-memory backend with a fixed simulated network delay.
//!
//! Used by `voicecards --mock` and by tests. Every call counts as one request
//! so tests can assert that validation failures never reached the backend.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use super::cards::CardsApi;
use crate::error::ServiceError;
use crate::model::{Card, CardPatch, CardStatus, SimpleCard};

/// Simulated round-trip for mock mode
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(800);

pub const MOCK_USER_ID: &str = "user-1";

/// Words taken from a sentence to title a generated card
const TITLE_WORDS: usize = 6;

pub struct MockCardsApi {
    cards: Mutex<Vec<Card>>,
    delay: Duration,
    requests: AtomicUsize,
    offline: AtomicBool,
}

impl MockCardsApi {
    /// Empty backend, no delay
    pub fn empty() -> Self {
        Self {
            cards: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            requests: AtomicUsize::new(0),
            offline: AtomicBool::new(false),
        }
    }

    /// Backend pre-filled with demo cards
    pub fn seeded() -> Self {
        let mut api = Self::empty();
        *api.cards.get_mut() = demo_cards();
        api
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make every following call fail as if the server were down
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Calls that reached this backend
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.cards.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cards.lock().await.is_empty()
    }

    async fn round_trip(&self) -> Result<(), ServiceError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(ServiceError::Backend {
                status: 503,
                message: "mock backend offline".to_string(),
            });
        }
        Ok(())
    }

    fn materialize(card: &SimpleCard) -> Card {
        let now = Utc::now();
        Card {
            id: uuid::Uuid::new_v4().to_string(),
            title: card.title.clone(),
            content: card.content.clone(),
            status: card.status,
            created_at: now,
            updated_at: now,
            user_id: MOCK_USER_ID.to_string(),
        }
    }
}

#[async_trait]
impl CardsApi for MockCardsApi {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_cards(&self) -> Result<Vec<Card>, ServiceError> {
        self.round_trip().await?;
        Ok(self.cards.lock().await.clone())
    }

    async fn get_card(&self, id: &str) -> Result<Card, ServiceError> {
        self.round_trip().await?;
        self.cards
            .lock()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound("Card".to_string()))
    }

    async fn create_card(&self, card: &SimpleCard) -> Result<Card, ServiceError> {
        self.round_trip().await?;
        let created = Self::materialize(card);
        self.cards.lock().await.insert(0, created.clone());
        Ok(created)
    }

    async fn update_card(&self, id: &str, patch: &CardPatch) -> Result<Card, ServiceError> {
        self.round_trip().await?;
        let mut cards = self.cards.lock().await;
        let card = cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ServiceError::NotFound("Card".to_string()))?;
        patch.apply_to(card);
        card.updated_at = Utc::now().max(card.created_at);
        Ok(card.clone())
    }

    async fn delete_card(&self, id: &str) -> Result<(), ServiceError> {
        self.round_trip().await?;
        let mut cards = self.cards.lock().await;
        let before = cards.len();
        cards.retain(|c| c.id != id);
        if cards.len() == before {
            return Err(ServiceError::NotFound("Card".to_string()));
        }
        Ok(())
    }

    async fn generate_cards(&self, prompt: &str) -> Result<Vec<SimpleCard>, ServiceError> {
        self.round_trip().await?;
        Ok(split_into_candidates(prompt))
    }

    async fn create_multiple_cards(&self, cards: &[SimpleCard]) -> Result<Vec<Card>, ServiceError> {
        self.round_trip().await?;
        let created: Vec<Card> = cards.iter().map(Self::materialize).collect();
        let mut stored = self.cards.lock().await;
        for card in created.iter().rev() {
            stored.insert(0, card.clone());
        }
        Ok(created)
    }
}

/// One candidate per sentence or line of the prompt
pub fn split_into_candidates(prompt: &str) -> Vec<SimpleCard> {
    prompt
        .split(['.', '!', '?', '\n', ';'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .map(|sentence| {
            let words: Vec<&str> = sentence.split_whitespace().collect();
            let mut title = words
                .iter()
                .take(TITLE_WORDS)
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            if words.len() > TITLE_WORDS {
                title.push('…');
            }
            SimpleCard::new(title, sentence, CardStatus::Undone)
        })
        .collect()
}

fn demo_cards() -> Vec<Card> {
    let base = Utc
        .with_ymd_and_hms(2024, 1, 15, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let entries = [
        (
            "Set up authentication",
            "Login with JWT and email validation.",
            CardStatus::Done,
        ),
        (
            "Dashboard design",
            "Responsive layout for the main dashboard.",
            CardStatus::Doing,
        ),
        (
            "API integration",
            "Connect the client to the REST backend.",
            CardStatus::Undone,
        ),
        (
            "Unit tests",
            "Cover the services and the recording workflow.",
            CardStatus::Undone,
        ),
        (
            "Documentation",
            "Document the API and the main flows.",
            CardStatus::Doing,
        ),
    ];

    entries
        .iter()
        .enumerate()
        .map(|(i, (title, content, status))| {
            let created_at = base + ChronoDuration::days(i as i64);
            Card {
                id: format!("card-{}", i + 1),
                title: title.to_string(),
                content: content.to_string(),
                status: *status,
                created_at,
                updated_at: created_at,
                user_id: MOCK_USER_ID.to_string(),
            }
        })
        .collect()
}
