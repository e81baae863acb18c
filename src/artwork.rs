//! Card artwork: decoding, quarter turns and downscaling into layout slots.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::{debug, warn};

use crate::deck::Card;
use crate::error::{Result, TarotError};
use crate::layout::{CardSize, CardSlot, SpreadLayout, Template};

/// A card image resampled to its slot, ready to blit.
pub struct PlacedCard {
    pub image: RgbaImage,
    pub x: f32,
    pub y: f32,
}

/// Decoded images of the cards on the table, in spread order.
pub struct Artwork {
    images: Vec<Option<RgbaImage>>,
    native: Option<CardSize>,
}

pub fn decode(path: &Path) -> Result<RgbaImage> {
    image::open(path)
        .map(|img| img.into_rgba8())
        .map_err(|source| TarotError::Image {
            path: path.to_path_buf(),
            source,
        })
}

/// Resample a card with Lanczos3 to exactly the slot size.
pub fn scale_into(image: &RgbaImage, slot: &CardSlot) -> RgbaImage {
    imageops::resize(image, slot.w, slot.h, FilterType::Lanczos3)
}

/// Native size of the first card whose image header can be read.
pub fn probe_size(cards: &[Card]) -> Option<CardSize> {
    cards.iter().find_map(|card| {
        image::image_dimensions(&card.image)
            .map(|(w, h)| CardSize::new(w, h))
            .ok()
    })
}

/// Turns are counter-clockwise.
fn turn(image: RgbaImage, degrees: u16) -> RgbaImage {
    match degrees % 360 {
        90 => imageops::rotate270(&image),
        180 => imageops::rotate180(&image),
        270 => imageops::rotate90(&image),
        _ => image,
    }
}

impl Artwork {
    /// Load the images of a drawn spread. Cards whose image cannot be
    /// decoded stay empty and are skipped when the table is drawn.
    pub fn load(cards: &[Card], template: Template) -> Self {
        let mut native = None;
        let images = cards
            .iter()
            .zip(template.slots())
            .map(|(card, slot)| match decode(&card.image) {
                Ok(image) => {
                    native.get_or_insert(CardSize::new(image.width(), image.height()));
                    Some(turn(image, slot.rotation_degrees))
                }
                Err(e) => {
                    warn!("Skipping {}: {}", card.name, e);
                    None
                }
            })
            .collect();
        Self { images, native }
    }

    /// The card back shown before the first draw.
    pub fn placeholder(path: &Path) -> Option<Self> {
        match decode(path) {
            Ok(image) => Some(Self {
                native: Some(CardSize::new(image.width(), image.height())),
                images: vec![Some(image)],
            }),
            Err(e) => {
                debug!("No placeholder: {}", e);
                None
            }
        }
    }

    /// Unrotated size of the first decodable card.
    pub fn native_size(&self) -> Option<CardSize> {
        self.native
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Scale every available card into its slot.
    pub fn place(&self, layout: &SpreadLayout) -> Vec<PlacedCard> {
        self.images
            .iter()
            .zip(&layout.slots)
            .filter_map(|(image, slot)| {
                let image = image.as_ref()?;
                Some(PlacedCard {
                    image: scale_into(image, slot),
                    x: slot.x,
                    y: slot.y,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use image::Rgba;
    use std::path::PathBuf;

    fn fixture_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tarot-art-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn card_at(dir: &Path, name: &str, size: Option<(u32, u32)>) -> Card {
        let image = dir.join(format!("{name}.png"));
        if let Some((w, h)) = size {
            RgbaImage::from_pixel(w, h, Rgba([200, 10, 10, 255])).save(&image).unwrap();
        }
        Card {
            name: name.to_string(),
            meaning: String::new(),
            image,
        }
    }

    #[test]
    fn celtic_second_card_is_turned() {
        let dir = fixture_dir("turn");
        let cards: Vec<Card> = (0..10).map(|i| card_at(&dir, &format!("c{i}"), Some((40, 70)))).collect();

        let art = Artwork::load(&cards, Template::Celtic);
        assert_eq!(art.native_size(), Some(CardSize::new(40, 70)));
        assert_eq!(art.images[0].as_ref().unwrap().dimensions(), (40, 70));
        assert_eq!(art.images[1].as_ref().unwrap().dimensions(), (70, 40));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn placed_cards_match_their_slots() {
        let dir = fixture_dir("place");
        let cards: Vec<Card> = (0..3).map(|i| card_at(&dir, &format!("c{i}"), Some((200, 350)))).collect();

        let art = Artwork::load(&cards, Template::Three);
        let layout = compute_layout(Template::Three, art.native_size().unwrap(), 400, 600).unwrap();
        let placed = art.place(&layout);

        assert_eq!(placed.len(), 3);
        for (card, slot) in placed.iter().zip(&layout.slots) {
            assert_eq!(card.image.dimensions(), (slot.w, slot.h));
            assert_eq!((card.x, card.y), (slot.x, slot.y));
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_images_are_skipped() {
        let dir = fixture_dir("missing");
        let cards = vec![
            card_at(&dir, "gone", None),
            card_at(&dir, "here", Some((20, 30))),
            card_at(&dir, "also-here", Some((20, 30))),
        ];

        let art = Artwork::load(&cards, Template::Three);
        assert_eq!(art.len(), 3);
        assert_eq!(art.native_size(), Some(CardSize::new(20, 30)));

        let layout = compute_layout(Template::Three, CardSize::new(20, 30), 500, 500).unwrap();
        assert_eq!(art.place(&layout).len(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn scale_into_matches_turned_slot() {
        let image = RgbaImage::from_pixel(70, 40, Rgba([5, 5, 5, 255]));
        let slot = CardSlot { x: 3.0, y: 4.0, w: 35, h: 20, quarter_turn: true };
        assert_eq!(scale_into(&image, &slot).dimensions(), (35, 20));
    }

    #[test]
    fn missing_placeholder_is_none() {
        assert!(Artwork::placeholder(Path::new("/nonexistent/back.gif")).is_none());
    }
}
