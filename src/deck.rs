//! Card dataset and secure sampling.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::info;

use crate::error::{Result, TarotError};

/// One card of the deck.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Card {
    pub name: String,
    pub meaning: String,
    /// Image path, resolved against the dataset directory on load.
    pub image: PathBuf,
}

/// The full, immutable deck.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
    root: PathBuf,
}

impl Deck {
    pub fn new(cards: Vec<Card>, root: PathBuf) -> Self {
        Self { cards, root }
    }

    /// Read a JSON array of `{name, meaning, image}` records.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|source| TarotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cards: Vec<Card> = serde_json::from_str(&data).map_err(|source| TarotError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if cards.is_empty() {
            return Err(TarotError::EmptyDeck(path.to_path_buf()));
        }

        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        for card in &mut cards {
            if card.image.is_relative() {
                card.image = root.join(&card.image);
            }
        }

        info!("Loaded {} cards from {}", cards.len(), path.display());
        Ok(Self { cards, root })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Image shown before the first draw.
    pub fn card_back(&self) -> PathBuf {
        self.root.join("back.gif")
    }

    /// Draw `count` distinct cards in random order.
    pub fn draw<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<Vec<Card>> {
        if count > self.cards.len() {
            return Err(TarotError::DeckTooSmall {
                requested: count,
                available: self.cards.len(),
            });
        }
        let mut shuffled = self.cards.clone();
        shuffled.shuffle(rng);
        shuffled.truncate(count);
        Ok(shuffled)
    }

    /// Draw with a generator seeded from the operating system.
    pub fn draw_secure(&self, count: usize) -> Result<Vec<Card>> {
        let mut rng = StdRng::from_os_rng();
        self.draw(count, &mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn deck(size: usize) -> Deck {
        let cards = (0..size)
            .map(|i| Card {
                name: format!("Card {i}"),
                meaning: format!("Meaning {i}"),
                image: PathBuf::from(format!("{i}.jpg")),
            })
            .collect();
        Deck::new(cards, PathBuf::new())
    }

    #[test]
    fn draws_are_distinct() {
        let deck = deck(78);
        let mut rng = StdRng::seed_from_u64(7);
        for count in [1, 3, 10] {
            for _ in 0..50 {
                let drawn = deck.draw(count, &mut rng).unwrap();
                assert_eq!(drawn.len(), count);
                let names: HashSet<_> = drawn.iter().map(|c| &c.name).collect();
                assert_eq!(names.len(), count);
            }
        }
    }

    #[test]
    fn whole_deck_can_be_drawn() {
        let deck = deck(10);
        let drawn = deck.draw_secure(10).unwrap();
        let names: HashSet<_> = drawn.iter().map(|c| c.name.clone()).collect();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn oversized_draw_is_rejected() {
        let deck = deck(2);
        let err = deck.draw_secure(3).unwrap_err();
        assert!(matches!(err, TarotError::DeckTooSmall { requested: 3, available: 2 }));
    }

    #[test]
    fn load_resolves_images_against_dataset_dir() {
        let dir = std::env::temp_dir().join(format!("tarot-deck-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("deck.json");
        std::fs::write(
            &path,
            r#"[{"name": "The Fool", "meaning": "Beginnings", "image": "cards/fool.jpg"}]"#,
        )
        .unwrap();

        let deck = Deck::load(&path).unwrap();
        assert_eq!(deck.len(), 1);
        assert_eq!(deck.cards()[0].image, dir.join("cards/fool.jpg"));
        assert_eq!(deck.card_back(), dir.join("back.gif"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let dir = std::env::temp_dir().join(format!("tarot-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("deck.json");
        std::fs::write(&path, "[]").unwrap();

        assert!(matches!(Deck::load(&path), Err(TarotError::EmptyDeck(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn bundled_deck_has_78_cards() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/deck.json");
        let deck = Deck::load(&path).unwrap();
        assert_eq!(deck.len(), 78);
    }
}
