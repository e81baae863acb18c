//! Spread kinds and the text shown alongside a draw.

use crate::deck::Card;
use crate::layout::Template;

/// Position names of the Celtic Cross, in draw order.
pub const CELTIC_POSITIONS: [&str; 10] = [
    "Present Situation (1)",
    "Influences or Challenges (2)",
    "Distant Past (3)",
    "Recent Past (4)",
    "Best Outcome (5)",
    "Immediate Future (6)",
    "Advice (7)",
    "Environment (8)",
    "Hopes or Fears (9)",
    "Potential Outcome (10)",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpreadKind {
    One,
    Three,
    CelticCross,
}

impl SpreadKind {
    pub const ALL: [SpreadKind; 3] = [SpreadKind::One, SpreadKind::Three, SpreadKind::CelticCross];

    pub fn card_count(self) -> usize {
        self.template().card_count()
    }

    pub fn template(self) -> Template {
        match self {
            SpreadKind::One => Template::One,
            SpreadKind::Three => Template::Three,
            SpreadKind::CelticCross => Template::Celtic,
        }
    }

    /// Label of the button that draws this spread.
    pub fn label(self) -> &'static str {
        match self {
            SpreadKind::One => "Draw One Card",
            SpreadKind::Three => "Draw Three Cards",
            SpreadKind::CelticCross => "Draw Celtic Cross",
        }
    }

    /// Parse a command-line spread name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "one" | "1" => Some(SpreadKind::One),
            "three" | "3" => Some(SpreadKind::Three),
            "celtic" | "celtic-cross" | "10" => Some(SpreadKind::CelticCross),
            _ => None,
        }
    }
}

/// A drawn spread.
#[derive(Clone, Debug)]
pub struct Spread {
    pub kind: SpreadKind,
    pub cards: Vec<Card>,
}

impl Spread {
    pub fn new(kind: SpreadKind, cards: Vec<Card>) -> Self {
        debug_assert_eq!(cards.len(), kind.card_count());
        Self { kind, cards }
    }

    /// Card names with their meanings, one block per card.
    pub fn meanings_text(&self) -> String {
        match self.kind {
            SpreadKind::One => self
                .cards
                .first()
                .map(|c| format!("Card:\n{} - {}\n", c.name, c.meaning))
                .unwrap_or_default(),
            SpreadKind::Three => self
                .cards
                .iter()
                .enumerate()
                .map(|(i, c)| format!("Card {}:\n{} - {}\n", i + 1, c.name, c.meaning))
                .collect::<Vec<_>>()
                .join("\n"),
            SpreadKind::CelticCross => CELTIC_POSITIONS
                .iter()
                .zip(&self.cards)
                .map(|(position, c)| format!("{position}:\n{} - {}\n", c.name, c.meaning))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Text appended to the panel once a reading arrives.
pub fn reading_text(reading: &str) -> String {
    format!("\nTarot Reading:\n{reading}")
}
