//! Side panel: query entry, read-only reading text and the draw buttons.

use glam::Vec2;

use crate::frame::{self, Frame};
use crate::input::{Event, Key, MouseButton};
use crate::spread::SpreadKind;
use crate::theme;

/// A rectangle in window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }
}

/// Single-line text entry with a cursor.
pub struct TextInputState {
    pub text: String,
    pub cursor: usize,
    pub placeholder: String,
    pub focused: bool,
}

impl TextInputState {
    pub fn new(placeholder: &str) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            placeholder: placeholder.to_string(),
            focused: false,
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.text[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.text.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.text[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.len() {
            self.cursor = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }
}

/// What the app should do after the panel saw an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelAction {
    None,
    Draw(SpreadKind),
    Quit,
}

/// Where each part of the panel sits for a given window size.
#[derive(Clone, Debug)]
pub struct PanelRegions {
    pub panel: Rect,
    pub label: Vec2,
    pub entry: Rect,
    pub text: Rect,
    pub buttons: [Rect; 3],
}

impl PanelRegions {
    pub fn new(window_w: u32, window_h: u32) -> Self {
        let pad = theme::PANEL_PADDING;
        let width = theme::PANEL_WIDTH as f32;
        let x = window_w as f32 - width;
        let h = window_h as f32;

        let label = Vec2::new(x + pad, pad);
        let entry = Rect::new(x + pad, pad + theme::LINE_HEIGHT + 4.0, width - pad * 2.0, theme::ENTRY_HEIGHT);

        let button_x = x + (width - theme::BUTTON_WIDTH) / 2.0;
        let stride = theme::BUTTON_HEIGHT + theme::BUTTON_GAP;
        let first_button_y = h - pad - 3.0 * stride + theme::BUTTON_GAP;
        let buttons = [0.0, 1.0, 2.0].map(|i| {
            Rect::new(button_x, first_button_y + i * stride, theme::BUTTON_WIDTH, theme::BUTTON_HEIGHT)
        });

        let text_top = entry.y + entry.h + pad;
        let text = Rect::new(x + pad, text_top, width - pad * 2.0, (first_button_y - pad - text_top).max(0.0));

        Self {
            panel: Rect::new(x, 0.0, width, h),
            label,
            entry,
            text,
            buttons,
        }
    }
}

pub struct Panel {
    pub query: TextInputState,
    text: String,
    scroll: f32,
    hovered: Option<usize>,
    pointer: Vec2,
}

impl Panel {
    pub fn new() -> Self {
        Self {
            query: TextInputState::new("Ask the cards..."),
            text: String::new(),
            scroll: 0.0,
            hovered: None,
            pointer: Vec2::new(-1.0, -1.0),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the reading text and scroll back to the top.
    pub fn set_text(&mut self, text: String) {
        self.text = text;
        self.scroll = 0.0;
    }

    pub fn append_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    fn max_scroll(&self, area: &Rect) -> f32 {
        let lines = frame::wrap(&self.text, area.w - 8.0, theme::FONT_SIZE_BODY).len();
        (lines as f32 * theme::LINE_HEIGHT + 8.0 - area.h).max(0.0)
    }

    pub fn handle_event(&mut self, event: &Event, window_w: u32, window_h: u32) -> PanelAction {
        let regions = PanelRegions::new(window_w, window_h);

        match event {
            Event::Pointer { position, button, pressed } => {
                self.pointer = *position;
                self.hovered = regions.buttons.iter().position(|b| b.contains(*position));
                if *button == Some(MouseButton::Left) && *pressed {
                    self.query.focused = regions.entry.contains(*position);
                    if let Some(i) = self.hovered {
                        return PanelAction::Draw(SpreadKind::ALL[i]);
                    }
                }
            }
            Event::Scroll { delta } if regions.text.contains(self.pointer) => {
                self.scroll = (self.scroll - delta.y).clamp(0.0, self.max_scroll(&regions.text));
            }
            Event::Text(ch) if self.query.focused && !ch.is_control() => {
                self.query.insert_char(*ch);
            }
            Event::Key { key, pressed: true } => match key {
                Key::Escape if self.query.focused => self.query.focused = false,
                Key::Escape => return PanelAction::Quit,
                _ if !self.query.focused => {}
                Key::Backspace => self.query.backspace(),
                Key::Delete => self.query.delete(),
                Key::Left => self.query.move_left(),
                Key::Right => self.query.move_right(),
                Key::Home => self.query.home(),
                Key::End => self.query.end(),
                Key::Enter | Key::Tab => self.query.focused = false,
                Key::Unknown => {}
            },
            _ => {}
        }
        PanelAction::None
    }

    pub fn draw(&self, frame: &mut Frame) {
        let regions = PanelRegions::new(frame.width(), frame.height());
        let size = theme::FONT_SIZE_BODY;
        let p = regions.panel;

        frame.fill_rect(p.x, p.y, p.w, p.h, theme::PANEL, 0.0);
        frame.fill_rect(p.x, p.y, 1.0, p.h, theme::BORDER, 0.0);

        frame.draw_text("Enter your query:", regions.label.x, regions.label.y, size, theme::TEXT_SECONDARY);
        self.draw_entry(frame, &regions.entry);
        self.draw_reading(frame, &regions.text);

        for (i, (rect, kind)) in regions.buttons.iter().zip(SpreadKind::ALL).enumerate() {
            let bg = if self.hovered == Some(i) { theme::BUTTON_HOVER } else { theme::BUTTON };
            frame.fill_rect(rect.x, rect.y, rect.w, rect.h, bg, theme::RADIUS);
            let label_w = frame::measure(kind.label(), size);
            frame.draw_text(
                kind.label(),
                rect.x + (rect.w - label_w) / 2.0,
                rect.y + (rect.h - 7.0) / 2.0,
                size,
                theme::TEXT_PRIMARY,
            );
        }
    }

    fn draw_entry(&self, frame: &mut Frame, entry: &Rect) {
        let size = theme::FONT_SIZE_BODY;
        frame.fill_rect(entry.x, entry.y, entry.w, entry.h, theme::FIELD, 0.0);
        let border = if self.query.focused { theme::ACCENT_GOLD } else { theme::BORDER };
        frame.stroke_rect(entry.x, entry.y, entry.w, entry.h, border);

        let text_x = entry.x + 5.0;
        let text_y = entry.y + (entry.h - 7.0) / 2.0;
        let room = entry.w - 10.0;

        if self.query.text.is_empty() {
            if !self.query.focused {
                frame.draw_text(&self.query.placeholder, text_x, text_y, size, theme::TEXT_MUTED);
            }
            if self.query.focused {
                frame.fill_rect(text_x, text_y - 1.0, 1.0, 9.0, theme::ACCENT_GOLD, 0.0);
            }
            return;
        }

        // Keep the cursor visible by showing the tail that fits.
        let before = &self.query.text[..self.query.cursor];
        let mut start = 0;
        while frame::measure(&before[start..], size) > room {
            start += before[start..].chars().next().map_or(1, char::len_utf8);
        }
        let visible: String = self.query.text[start..]
            .chars()
            .take((room / frame::measure("m", size)) as usize)
            .collect();
        frame.draw_text(&visible, text_x, text_y, size, theme::TEXT_PRIMARY);

        if self.query.focused {
            let cursor_x = text_x + frame::measure(&before[start..], size);
            frame.fill_rect(cursor_x, text_y - 1.0, 1.0, 9.0, theme::ACCENT_GOLD, 0.0);
        }
    }

    fn draw_reading(&self, frame: &mut Frame, area: &Rect) {
        if area.h <= 0.0 {
            return;
        }
        frame.fill_rect(area.x, area.y, area.w, area.h, theme::FIELD, 0.0);
        frame.stroke_rect(area.x, area.y, area.w, area.h, theme::BORDER);

        let lines = frame::wrap(&self.text, area.w - 8.0, theme::FONT_SIZE_BODY);
        let top = area.y + 4.0;
        let bottom = area.y + area.h - theme::LINE_HEIGHT;
        for (i, line) in lines.iter().enumerate() {
            let y = top + i as f32 * theme::LINE_HEIGHT - self.scroll;
            if y < top || y > bottom {
                continue;
            }
            frame.draw_text(line, area.x + 4.0, y, theme::FONT_SIZE_BODY, theme::TEXT_PRIMARY);
        }

        let content = lines.len() as f32 * theme::LINE_HEIGHT + 8.0;
        if content > area.h {
            let thumb_h = (area.h * area.h / content).max(12.0);
            let thumb_y = area.y + (area.h - thumb_h) * (self.scroll / (content - area.h));
            frame.fill_rect(area.x + area.w - 4.0, thumb_y, 3.0, thumb_h, theme::SCROLL_THUMB, 1.0);
        }
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}
