//! Layout engine: fits a fixed card arrangement into the canvas.
//!
//! Every template is described at native card scale. On each resize the
//! whole arrangement is shrunk by one uniform factor and recentered. The
//! relative offsets and rotations never change.

/// Unscaled pixel size of a card image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardSize {
    pub width: u32,
    pub height: u32,
}

impl CardSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// The three spread arrangements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Template {
    One,
    Three,
    Celtic,
}

/// Which block of the arrangement a card belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Group {
    Row,
    Cross,
    /// The column of four cards right of the cross.
    Staff,
}

/// Placement of one card at unit scale.
///
/// `unit_x` counts column pitches from the left edge of the arrangement,
/// `unit_y` counts row pitches from the vertically centered top line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotDescriptor {
    pub unit_x: f32,
    pub unit_y: f32,
    pub rotation_degrees: u16,
    pub group: Group,
}

impl SlotDescriptor {
    const fn row(column: f32) -> Self {
        Self { unit_x: column, unit_y: 0.0, rotation_degrees: 0, group: Group::Row }
    }

    const fn cross(column: f32, row: f32, rotation_degrees: u16) -> Self {
        Self { unit_x: column, unit_y: row, rotation_degrees, group: Group::Cross }
    }

    const fn staff(row: f32) -> Self {
        Self { unit_x: 3.0, unit_y: row, rotation_degrees: 0, group: Group::Staff }
    }

    fn quarter_turn(&self) -> bool {
        self.rotation_degrees % 180 == 90
    }
}

/// Spacing and padding constants of a template, in native pixels.
///
/// Left and right padding differ so the card shadows sit balanced.
#[derive(Clone, Copy, Debug)]
struct Metrics {
    columns: u32,
    rows: u32,
    padding_left: f32,
    padding_right: f32,
    column_gap: f32,
    cross_extra: f32,
    row_gap: f32,
    staff_offset: f32,
    staff_pitch: f32,
}

const ONE_METRICS: Metrics = Metrics {
    columns: 1,
    rows: 1,
    padding_left: 32.0,
    padding_right: 22.0,
    column_gap: 0.0,
    cross_extra: 0.0,
    row_gap: 0.0,
    staff_offset: 0.0,
    staff_pitch: 0.0,
};

const THREE_METRICS: Metrics = Metrics {
    columns: 3,
    column_gap: 25.0,
    ..ONE_METRICS
};

const CELTIC_METRICS: Metrics = Metrics {
    columns: 4,
    rows: 4,
    padding_left: 55.0,
    padding_right: 35.0,
    column_gap: 125.0,
    cross_extra: 60.0,
    row_gap: 20.0,
    staff_offset: 30.0,
    staff_pitch: -24.0,
};

const ONE_SLOTS: [SlotDescriptor; 1] = [SlotDescriptor::row(0.0)];

const THREE_SLOTS: [SlotDescriptor; 3] = [
    SlotDescriptor::row(0.0),
    SlotDescriptor::row(1.0),
    SlotDescriptor::row(2.0),
];

// Card 7 sits lowest in the staff, card 10 highest.
const CELTIC_SLOTS: [SlotDescriptor; 10] = [
    SlotDescriptor::cross(1.0, 0.0, 0),
    SlotDescriptor::cross(1.0, 0.0, 90),
    SlotDescriptor::cross(1.0, 1.0, 0),
    SlotDescriptor::cross(0.0, 0.0, 0),
    SlotDescriptor::cross(1.0, -1.0, 0),
    SlotDescriptor::cross(2.0, 0.0, 0),
    SlotDescriptor::staff(1.5),
    SlotDescriptor::staff(0.5),
    SlotDescriptor::staff(-0.5),
    SlotDescriptor::staff(-1.5),
];

impl Template {
    pub fn card_count(self) -> usize {
        self.slots().len()
    }

    pub fn slots(self) -> &'static [SlotDescriptor] {
        match self {
            Template::One => &ONE_SLOTS,
            Template::Three => &THREE_SLOTS,
            Template::Celtic => &CELTIC_SLOTS,
        }
    }

    fn metrics(self) -> Metrics {
        match self {
            Template::One => ONE_METRICS,
            Template::Three => THREE_METRICS,
            Template::Celtic => CELTIC_METRICS,
        }
    }
}

impl Metrics {
    fn scaled(&self, s: f32) -> Metrics {
        Metrics {
            padding_left: self.padding_left * s,
            padding_right: self.padding_right * s,
            column_gap: self.column_gap * s,
            cross_extra: self.cross_extra * s,
            row_gap: self.row_gap * s,
            staff_offset: self.staff_offset * s,
            staff_pitch: self.staff_pitch * s,
            ..*self
        }
    }

    fn footprint_width(&self, card_w: f32) -> f32 {
        let cols = self.columns as f32;
        cols * card_w
            + (cols - 1.0) * (self.column_gap + self.cross_extra)
            + self.staff_offset
            + self.padding_left
            + self.padding_right
    }

    fn footprint_height(&self, card_h: f32) -> f32 {
        let rows = self.rows as f32;
        rows * card_h + (rows - 1.0) * self.staff_pitch
    }
}

/// A positioned card, in canvas pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct CardSlot {
    pub x: f32,
    pub y: f32,
    pub w: u32,
    pub h: u32,
    /// The card image is turned 90° and `w`/`h` are already swapped.
    pub quarter_turn: bool,
}

/// Result of fitting a template into the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct SpreadLayout {
    pub scale: f32,
    pub slots: Vec<CardSlot>,
}

/// Uniform shrink factor for a template, never above 1.0.
pub fn fit_scale(template: Template, card: CardSize, viewport_w: f32, viewport_h: f32) -> f32 {
    let m = template.metrics();
    let fit_x = viewport_w / m.footprint_width(card.width as f32);
    let fit_y = viewport_h / m.footprint_height(card.height as f32);
    let scale = fit_x.min(fit_y).min(1.0);
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

fn scaled_dimension(native: u32, scale: f32) -> u32 {
    (native as f32 * scale).round().max(1.0) as u32
}

/// Compute card slots for a template inside a `viewport_w` × `viewport_h`
/// canvas. Returns `None` while the canvas has no area.
pub fn compute_layout(
    template: Template,
    card: CardSize,
    viewport_w: i32,
    viewport_h: i32,
) -> Option<SpreadLayout> {
    if viewport_w <= 0 || viewport_h <= 0 {
        return None;
    }
    let vw = viewport_w as f32;
    let vh = viewport_h as f32;

    let scale = fit_scale(template, card, vw, vh);
    let m = template.metrics().scaled(scale);

    let w = scaled_dimension(card.width, scale);
    let h = scaled_dimension(card.height, scale);
    let (wf, hf) = (w as f32, h as f32);

    let left = (vw - m.footprint_width(wf)) / 2.0 + m.padding_left;
    let top = vh / 2.0 - hf / 2.0;
    let column_pitch = wf + m.column_gap + m.cross_extra;

    let slots = template
        .slots()
        .iter()
        .map(|d| {
            let (row_pitch, extra_x) = match d.group {
                Group::Staff => (hf + m.staff_pitch, m.staff_offset),
                Group::Row | Group::Cross => (hf + m.row_gap, 0.0),
            };
            let cell_x = left + d.unit_x * column_pitch + extra_x;
            let cell_y = top + d.unit_y * row_pitch;

            if d.quarter_turn() {
                // Turned about its own center, so it stays centered on the
                // card it overlaps.
                CardSlot {
                    x: cell_x + (wf - hf) / 2.0,
                    y: cell_y + (hf - wf) / 2.0,
                    w: h,
                    h: w,
                    quarter_turn: true,
                }
            } else {
                CardSlot { x: cell_x, y: cell_y, w, h, quarter_turn: false }
            }
        })
        .collect();

    Some(SpreadLayout { scale, slots })
}
