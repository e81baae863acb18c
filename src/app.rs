//! Table state
//!
//! Owns the deck, the current spread and the panel, and repaints the frame
//! from scratch on every resize or draw. Runs on the event-loop thread; the
//! only cross-thread traffic is readings coming back through a [`Courier`].

use std::sync::Arc;

use tracing::{debug, info, warn};
use winit::event_loop::EventLoopProxy;

use crate::artwork::{Artwork, PlacedCard};
use crate::deck::Deck;
use crate::frame::Frame;
use crate::input;
use crate::layout::{compute_layout, CardSize, Template};
use crate::oracle::{spawn_reading, Oracle};
use crate::panel::{Panel, PanelAction};
use crate::spread::{reading_text, Spread, SpreadKind};
use crate::theme;

/// Events posted back to the event loop from worker threads.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Reading(String),
}

/// Hands an [`AppEvent`] to the event-loop thread.
pub trait Courier: Clone + Send + 'static {
    fn deliver(&self, event: AppEvent);
}

impl Courier for EventLoopProxy<AppEvent> {
    fn deliver(&self, event: AppEvent) {
        if self.send_event(event).is_err() {
            debug!("Event loop closed before the reading arrived");
        }
    }
}

const FALLBACK_WINDOW: (u32, u32) = (1280, 800);

/// Window size that fits the three-card row at native size beside the panel.
pub fn initial_window_size(card: Option<CardSize>) -> (u32, u32) {
    match card {
        Some(CardSize { width, height }) => (
            30 + 3 * width + 2 * 25 + 30 + theme::WINDOW_EXTRA_WIDTH,
            height + theme::WINDOW_EXTRA_HEIGHT,
        ),
        None => FALLBACK_WINDOW,
    }
}

pub struct Table<C: Courier> {
    deck: Deck,
    oracle: Option<Arc<dyn Oracle>>,
    courier: C,

    spread: Option<Spread>,
    artwork: Option<Artwork>,
    placeholder: Option<Artwork>,
    placed: Vec<PlacedCard>,

    panel: Panel,
    frame: Frame,
    running: bool,
}

impl<C: Courier> Table<C> {
    pub fn new(deck: Deck, oracle: Option<Arc<dyn Oracle>>, courier: C, width: u32, height: u32) -> Self {
        let placeholder = Artwork::placeholder(&deck.card_back());
        let mut table = Self {
            deck,
            oracle,
            courier,
            spread: None,
            artwork: None,
            placeholder,
            placed: Vec::new(),
            panel: Panel::new(),
            frame: Frame::new(width.max(1), height.max(1)),
            running: true,
        };
        table.relayout();
        table
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn spread(&self) -> Option<&Spread> {
        self.spread.as_ref()
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    /// Draw a fresh spread, show its meanings and ask for a reading.
    pub fn draw(&mut self, kind: SpreadKind) {
        let cards = match self.deck.draw_secure(kind.card_count()) {
            Ok(cards) => cards,
            Err(e) => {
                warn!("Cannot draw {}: {}", kind.label(), e);
                return;
            }
        };
        info!("Drew {}: {}", kind.label(), cards.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", "));

        let spread = Spread::new(kind, cards);
        self.panel.set_text(spread.meanings_text());
        self.artwork = Some(Artwork::load(&spread.cards, kind.template()));

        if let Some(oracle) = &self.oracle {
            let courier = self.courier.clone();
            spawn_reading(
                Arc::clone(oracle),
                spread.cards.clone(),
                self.panel.query.text.clone(),
                move |reading| courier.deliver(AppEvent::Reading(reading)),
            );
        }

        self.spread = Some(spread);
        self.relayout();
    }

    /// Readings are appended even when a newer draw replaced their spread.
    pub fn on_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Reading(reading) => self.panel.append_text(&reading_text(&reading)),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.frame.resize(width.max(1), height.max(1));
        self.relayout();
    }

    pub fn handle_event(&mut self, event: input::Event) {
        match self.panel.handle_event(&event, self.frame.width(), self.frame.height()) {
            PanelAction::Draw(kind) => self.draw(kind),
            PanelAction::Quit => self.running = false,
            PanelAction::None => {}
        }
    }

    /// Recompute card slots for the current canvas and resample the artwork.
    fn relayout(&mut self) {
        let (art, template) = match (&self.artwork, &self.spread) {
            (Some(art), Some(spread)) => (art, spread.kind.template()),
            _ => match &self.placeholder {
                Some(art) => (art, Template::One),
                None => {
                    self.placed.clear();
                    return;
                }
            },
        };

        let canvas_w = self.frame.width() as i32 - theme::PANEL_WIDTH as i32;
        let canvas_h = self.frame.height() as i32;

        self.placed = art
            .native_size()
            .and_then(|native| compute_layout(template, native, canvas_w, canvas_h))
            .map(|layout| art.place(&layout))
            .unwrap_or_default();
    }

    /// Repaint the whole window.
    pub fn redraw(&mut self) -> &Frame {
        self.frame.clear(theme::TABLE);
        for card in &self.placed {
            self.frame.blit(&card.image, card.x, card.y);
        }
        self.panel.draw(&mut self.frame);
        &self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Card;
    use crate::input::{Event, Key, MouseButton};
    use crate::panel::PanelRegions;
    use glam::Vec2;
    use image::{Rgba, RgbaImage};
    use std::path::{Path, PathBuf};
    use std::sync::mpsc;
    use std::time::Duration;

    impl Courier for mpsc::Sender<AppEvent> {
        fn deliver(&self, event: AppEvent) {
            self.send(event).unwrap();
        }
    }

    struct Echo;

    impl Oracle for Echo {
        fn interpret(&self, cards: &[Card], query: &str) -> Option<String> {
            Some(format!("{} cards for '{}'", cards.len(), query))
        }
    }

    fn fixture_deck(tag: &str, with_back: bool) -> (Deck, PathBuf) {
        let dir = std::env::temp_dir().join(format!("tarot-app-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let cards = (0..12)
            .map(|i| {
                let image = dir.join(format!("card{i}.png"));
                RgbaImage::from_pixel(20, 35, Rgba([30, 200, 30, 255])).save(&image).unwrap();
                Card {
                    name: format!("Card {i}"),
                    meaning: format!("Meaning {i}"),
                    image,
                }
            })
            .collect();
        if with_back {
            RgbaImage::from_pixel(20, 35, Rgba([0, 0, 200, 255])).save(dir.join("back.gif")).unwrap();
        }
        (Deck::new(cards, dir.clone()), dir)
    }

    fn cleanup(dir: &Path) {
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn window_size_fits_three_cards_and_panel() {
        assert_eq!(initial_window_size(Some(CardSize::new(200, 350))), (990, 525));
        assert_eq!(initial_window_size(None), (1280, 800));
    }

    #[test]
    fn placeholder_is_shown_before_the_first_draw() {
        let (deck, dir) = fixture_deck("placeholder", true);
        let (tx, _rx) = mpsc::channel();
        let mut table = Table::new(deck, None, tx, 600, 400);

        assert!(table.spread().is_none());
        assert_eq!(table.placed.len(), 1);
        let (x, y) = (table.placed[0].x as u32 + 2, table.placed[0].y as u32 + 2);
        let [r, _, b, _] = table.redraw().pixel(x, y);
        assert!(b > 150 && r < 60);

        cleanup(&dir);
    }

    #[test]
    fn clicking_a_button_draws_and_requests_a_reading() {
        let (deck, dir) = fixture_deck("draw", false);
        let (tx, rx) = mpsc::channel();
        let mut table = Table::new(deck, Some(Arc::new(Echo)), tx, 900, 600);
        assert!(table.placed.is_empty());

        let regions = PanelRegions::new(900, 600);
        let b = regions.buttons[1];
        table.handle_event(Event::Pointer {
            position: Vec2::new(b.x + 5.0, b.y + 5.0),
            button: Some(MouseButton::Left),
            pressed: true,
        });

        let spread = table.spread().unwrap();
        assert_eq!(spread.kind, SpreadKind::Three);
        assert_eq!(table.placed.len(), 3);
        assert!(table.panel().text().starts_with("Card 1:\n"));

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event, AppEvent::Reading("3 cards for ''".to_string()));
        table.on_app_event(event);
        assert!(table.panel().text().ends_with("\nTarot Reading:\n3 cards for ''"));

        cleanup(&dir);
    }

    #[test]
    fn query_travels_with_the_draw() {
        let (deck, dir) = fixture_deck("query", false);
        let (tx, rx) = mpsc::channel();
        let mut table = Table::new(deck, Some(Arc::new(Echo)), tx, 900, 600);

        let entry = PanelRegions::new(900, 600).entry;
        table.handle_event(Event::Pointer {
            position: Vec2::new(entry.x + 3.0, entry.y + 3.0),
            button: Some(MouseButton::Left),
            pressed: true,
        });
        for ch in "career".chars() {
            table.handle_event(Event::Text(ch));
        }
        table.draw(SpreadKind::CelticCross);

        assert_eq!(table.placed.len(), 10);
        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event, AppEvent::Reading("10 cards for 'career'".to_string()));

        cleanup(&dir);
    }

    #[test]
    fn resizing_relays_out_and_collapsed_canvas_hides_cards() {
        let (deck, dir) = fixture_deck("resize", false);
        let (tx, _rx) = mpsc::channel();
        let mut table = Table::new(deck, None, tx, 900, 600);
        table.draw(SpreadKind::One);
        assert_eq!(table.placed.len(), 1);

        table.resize(theme::PANEL_WIDTH, 600);
        assert!(table.placed.is_empty());

        table.resize(1200, 700);
        assert_eq!(table.placed.len(), 1);
        assert_eq!(table.redraw().width(), 1200);

        cleanup(&dir);
    }

    #[test]
    fn escape_stops_the_table() {
        let (deck, dir) = fixture_deck("escape", false);
        let (tx, _rx) = mpsc::channel();
        let mut table = Table::new(deck, None, tx, 900, 600);
        table.handle_event(Event::Key { key: Key::Escape, pressed: true });
        assert!(!table.is_running());
        cleanup(&dir);
    }
}
