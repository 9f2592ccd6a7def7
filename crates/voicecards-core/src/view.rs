//! Presentation helpers shared by every front end.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::model::{Card, CardPatch, CardStatus, SimpleCard};
use crate::services::cards::MISSING_FIELDS;

/// Dashboard filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Done,
    Doing,
    Undone,
}

impl StatusFilter {
    pub fn matches(&self, card: &Card) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Done => card.status == CardStatus::Done,
            StatusFilter::Doing => card.status == CardStatus::Doing,
            StatusFilter::Undone => card.status == CardStatus::Undone,
        }
    }
}

impl From<CardStatus> for StatusFilter {
    fn from(status: CardStatus) -> Self {
        match status {
            CardStatus::Done => StatusFilter::Done,
            CardStatus::Doing => StatusFilter::Doing,
            CardStatus::Undone => StatusFilter::Undone,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<CardStatus>()
            .map(StatusFilter::from)
            .map_err(|_| format!("Unknown filter: {s}. Available: all, undone, doing, done"))
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusFilter::All => "all",
            StatusFilter::Done => "done",
            StatusFilter::Doing => "doing",
            StatusFilter::Undone => "undone",
        })
    }
}

pub fn filter_cards(cards: &[Card], filter: StatusFilter) -> Vec<&Card> {
    cards.iter().filter(|c| filter.matches(c)).collect()
}

/// Per-status totals for the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub done: usize,
    pub doing: usize,
    pub undone: usize,
}

impl StatusCounts {
    pub fn from_cards(cards: &[Card]) -> Self {
        cards.iter().fold(Self::default(), |mut counts, card| {
            counts.total += 1;
            match card.status {
                CardStatus::Done => counts.done += 1,
                CardStatus::Doing => counts.doing += 1,
                CardStatus::Undone => counts.undone += 1,
            }
            counts
        })
    }

    pub fn get(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.total,
            StatusFilter::Done => self.done,
            StatusFilter::Doing => self.doing,
            StatusFilter::Undone => self.undone,
        }
    }
}

/// The create/edit card form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardDraft {
    pub title: String,
    pub content: String,
    pub status: CardStatus,
}

impl CardDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>, status: CardStatus) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            status,
        }
    }

    /// Pre-fill the form from an existing card
    pub fn from_card(card: &Card) -> Self {
        Self::new(card.title.clone(), card.content.clone(), card.status)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() || self.content.trim().is_empty() {
            return Err(MISSING_FIELDS.to_string());
        }
        Ok(())
    }

    pub fn into_simple(self) -> Result<SimpleCard, String> {
        self.validate()?;
        Ok(SimpleCard::new(self.title.trim(), self.content.trim(), self.status))
    }

    /// Only the fields that differ from `original`
    pub fn into_patch(self, original: &Card) -> Result<CardPatch, String> {
        self.validate()?;
        let title = self.title.trim();
        let content = self.content.trim();
        Ok(CardPatch {
            title: (title != original.title).then(|| title.to_string()),
            content: (content != original.content).then(|| content.to_string()),
            status: (self.status != original.status).then_some(self.status),
        })
    }
}

/// Recording counter as `MM:SS`
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Label of the confirm button in the results step
pub fn selection_summary(count: usize) -> String {
    if count == 1 {
        "Create 1 card".to_string()
    } else {
        format!("Create {count} cards")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card(id: &str, status: CardStatus) -> Card {
        let now = Utc::now();
        Card {
            id: id.to_string(),
            title: format!("Title {id}"),
            content: "Body".to_string(),
            status,
            created_at: now,
            updated_at: now,
            user_id: "u1".to_string(),
        }
    }

    #[test]
    fn test_filter_and_counts() {
        let cards = vec![
            card("1", CardStatus::Done),
            card("2", CardStatus::Undone),
            card("3", CardStatus::Undone),
            card("4", CardStatus::Doing),
        ];
        let counts = StatusCounts::from_cards(&cards);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.get(StatusFilter::Undone), 2);

        for filter in [StatusFilter::All, StatusFilter::Done, StatusFilter::Doing, StatusFilter::Undone] {
            assert_eq!(filter_cards(&cards, filter).len(), counts.get(filter));
        }
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!("pending".parse::<StatusFilter>(), Ok(StatusFilter::Undone));
        assert!("later".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_draft_validation() {
        let draft = CardDraft::new("  ", "Body", CardStatus::Undone);
        assert_eq!(draft.into_simple(), Err(MISSING_FIELDS.to_string()));

        let simple = CardDraft::new(" Title ", " Body ", CardStatus::Doing)
            .into_simple()
            .unwrap();
        assert_eq!(simple.title, "Title");
        assert_eq!(simple.content, "Body");
    }

    #[test]
    fn test_draft_patch_has_only_changes() {
        let original = card("1", CardStatus::Undone);
        let mut draft = CardDraft::from_card(&original);
        draft.status = CardStatus::Done;

        let patch = draft.into_patch(&original).unwrap();
        assert_eq!(patch.title, None);
        assert_eq!(patch.content, None);
        assert_eq!(patch.status, Some(CardStatus::Done));
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(75), "01:15");
        assert_eq!(format_elapsed(3600), "60:00");
    }

    #[test]
    fn test_selection_summary() {
        assert_eq!(selection_summary(1), "Create 1 card");
        assert_eq!(selection_summary(3), "Create 3 cards");
    }
}
