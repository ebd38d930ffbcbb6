use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Equation,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCard {
    pub id: u32,
    pub kind: CardKind,
    pub content: String,
    pub value: u32,
    pub table: u32,
    pub is_flipped: bool,
    pub is_matched: bool,
}

impl MemoryCard {
    pub fn new(id: u32, kind: CardKind, content: String, value: u32, table: u32) -> Self {
        Self {
            id,
            kind,
            content,
            value,
            table,
            is_flipped: false,
            is_matched: false,
        }
    }

    pub fn is_face_up(&self) -> bool {
        self.is_flipped || self.is_matched
    }
}

/// Card as shown to the client: face-down cards hide their content.
#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub id: u32,
    pub face_up: bool,
    pub is_matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<CardKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl From<&MemoryCard> for CardView {
    fn from(card: &MemoryCard) -> Self {
        let face_up = card.is_face_up();
        Self {
            id: card.id,
            face_up,
            is_matched: card.is_matched,
            kind: face_up.then_some(card.kind),
            content: face_up.then(|| card.content.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FlipCardRequest {
    pub card_id: u32,
}

/// Outcome of flipping one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum FlipOutcome {
    /// Card was already face up.
    Ignored,
    /// First card of a move is now face up.
    FirstCard { card_id: u32 },
    /// Second card completed a move.
    Move {
        first: u32,
        second: u32,
        matched: bool,
        points_awarded: u32,
        /// Both cards revealed on this move, so the client can show them
        /// before they turn back over.
        revealed: Vec<RevealedCard>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealedCard {
    pub id: u32,
    pub content: String,
}
