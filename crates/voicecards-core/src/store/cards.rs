use crate::model::{Card, CardPatch, SimpleCard};
use crate::services::{CardService, ServiceResponse};

/// The dashboard's card list.
#[derive(Clone)]
pub struct CardStore {
    service: CardService,
    cards: Vec<Card>,
}

impl CardStore {
    pub fn new(service: CardService) -> Self {
        Self {
            service,
            cards: Vec::new(),
        }
    }

    pub fn service(&self) -> &CardService {
        &self.service
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Replace the local list with the server's
    pub async fn refresh(&mut self) -> ServiceResponse<Vec<Card>> {
        let response = self.service.list_cards().await;
        if let Some(cards) = response.data.as_ref() {
            self.cards = cards.clone();
        }
        response
    }

    pub async fn add(&mut self, card: SimpleCard) -> ServiceResponse<Card> {
        let response = self.service.create_card(card).await;
        if let Some(created) = response.data.as_ref() {
            self.cards.insert(0, created.clone());
        }
        response
    }

    pub async fn update(&mut self, id: &str, patch: CardPatch) -> ServiceResponse<Card> {
        let response = self.service.update_card(id, patch).await;
        if let Some(updated) = response.data.as_ref() {
            match self.cards.iter_mut().find(|c| c.id == updated.id) {
                Some(slot) => *slot = updated.clone(),
                None => self.cards.insert(0, updated.clone()),
            }
        }
        response
    }

    pub async fn remove(&mut self, id: &str) -> ServiceResponse<()> {
        let response = self.service.delete_card(id).await;
        if response.success {
            self.cards.retain(|c| c.id != id);
        }
        response
    }

    /// Bulk create; new cards go to the top in the order given
    pub async fn add_many(&mut self, cards: Vec<SimpleCard>) -> ServiceResponse<Vec<Card>> {
        let response = self.service.create_multiple_cards(cards).await;
        if let Some(created) = response.data.as_ref() {
            self.prepend(created);
        }
        response
    }

    /// Put cards created elsewhere (the recording workflow) at the top
    pub fn prepend(&mut self, created: &[Card]) {
        self.cards.splice(0..0, created.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CardStatus;
    use crate::services::MockCardsApi;
    use std::sync::Arc;

    fn store(api: MockCardsApi) -> (Arc<MockCardsApi>, CardStore) {
        let api = Arc::new(api);
        (api.clone(), CardStore::new(CardService::new(api)))
    }

    #[tokio::test]
    async fn test_refresh_then_add_prepends() {
        let (_, mut store) = store(MockCardsApi::seeded());
        let listed = store.refresh().await.into_result().unwrap();
        assert_eq!(store.cards().len(), listed.len());

        let created = store
            .add(SimpleCard::new("New", "Body", CardStatus::Doing))
            .await
            .into_result()
            .unwrap();
        assert_eq!(store.cards()[0].id, created.id);
        assert_eq!(store.cards().len(), listed.len() + 1);
    }

    #[tokio::test]
    async fn test_invalid_add_leaves_list_untouched() {
        let (api, mut store) = store(MockCardsApi::empty());
        let response = store.add(SimpleCard::new(" ", "Body", CardStatus::Undone)).await;
        assert!(!response.success);
        assert!(store.cards().is_empty());
        assert_eq!(api.request_count(), 0);
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let (_, mut store) = store(MockCardsApi::seeded());
        store.refresh().await;
        let id = store.cards()[1].id.clone();

        let patch = CardPatch {
            status: Some(CardStatus::Done),
            ..CardPatch::default()
        };
        store.update(&id, patch).await.into_result().unwrap();
        assert_eq!(store.cards()[1].id, id);
        assert_eq!(store.cards()[1].status, CardStatus::Done);
    }

    #[tokio::test]
    async fn test_remove_missing_card_keeps_list() {
        let (_, mut store) = store(MockCardsApi::seeded());
        store.refresh().await;
        let before = store.cards().len();

        let response = store.remove("nope").await;
        assert_eq!(response.error.as_deref(), Some("Card not found"));
        assert_eq!(store.cards().len(), before);

        let id = store.cards()[0].id.clone();
        assert!(store.remove(&id).await.success);
        assert!(store.get(&id).is_none());
    }

    #[tokio::test]
    async fn test_add_many_prepends_in_order() {
        let (_, mut store) = store(MockCardsApi::seeded());
        store.refresh().await;

        let batch = vec![
            SimpleCard::new("A", "a", CardStatus::Undone),
            SimpleCard::new("B", "b", CardStatus::Undone),
        ];
        let created = store.add_many(batch).await.into_result().unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(store.cards()[0].title, "A");
        assert_eq!(store.cards()[1].title, "B");
    }
}
