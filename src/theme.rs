//! Table theme: dark felt with a gold accent.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

// Background
pub const TABLE: Color = Color::rgb(0x14, 0x1A, 0x1F);
pub const PANEL: Color = Color::rgb(0x1C, 0x21, 0x28);
pub const FIELD: Color = Color::rgb(0x0D, 0x11, 0x17);
pub const BORDER: Color = Color::rgb(0x30, 0x36, 0x3D);

// Text
pub const TEXT_PRIMARY: Color = Color::rgb(0xE6, 0xED, 0xF3);
pub const TEXT_SECONDARY: Color = Color::rgb(0x8B, 0x94, 0x9E);
pub const TEXT_MUTED: Color = Color::rgb(0x48, 0x4F, 0x58);

// Accents
pub const ACCENT_GOLD: Color = Color::rgb(0xD2, 0x99, 0x22);
pub const BUTTON: Color = Color::rgb(0x26, 0x2C, 0x34);
pub const BUTTON_HOVER: Color = Color::rgb(0x33, 0x3B, 0x45);
pub const SCROLL_THUMB: Color = Color::rgba(0x8B, 0x94, 0x9E, 0x80);

// Font sizes (bitmap font: 10.0 draws 6 × 10 px cells)
pub const FONT_SIZE_BODY: f32 = 10.0;
pub const LINE_HEIGHT: f32 = 12.0;

// Panel layout
pub const PANEL_WIDTH: u32 = 245;
pub const PANEL_PADDING: f32 = 10.0;
pub const ENTRY_HEIGHT: f32 = 22.0;
pub const BUTTON_WIDTH: f32 = 170.0;
pub const BUTTON_HEIGHT: f32 = 26.0;
pub const BUTTON_GAP: f32 = 6.0;
pub const RADIUS: f32 = 4.0;

// Window sizing around the three-card row
pub const WINDOW_EXTRA_WIDTH: u32 = 280;
pub const WINDOW_EXTRA_HEIGHT: u32 = 175;
