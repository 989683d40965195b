use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use ratatui::Frame;

use super::theme::ColorScheme;
use super::view::SliceStatus;
use crate::model::{KeywordCount, Slice};

pub const MAX_WORDS: usize = 20;
pub const BASE_SIZE: f64 = 10.0;
pub const SIZE_SCALE: f64 = 14.0;
pub const MAX_ATTEMPTS: usize = 300;
/// Blank columns kept between neighbouring words.
const PADDING: u16 = 1;

/// Glyph size for a keyword; logarithmic so one dominant word cannot crowd
/// out the rest.
pub fn font_size(count: u64) -> f64 {
    BASE_SIZE + SIZE_SCALE * (1.0 + count as f64).ln()
}

/// A terminal cannot change font size, so size picks an emphasis tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Emphasis {
    Small,
    Medium,
    Large,
    Huge,
}

impl Emphasis {
    pub fn for_size(size: f64) -> Self {
        match size {
            s if s < 20.0 => Emphasis::Small,
            s if s < 30.0 => Emphasis::Medium,
            s if s < 40.0 => Emphasis::Large,
            _ => Emphasis::Huge,
        }
    }

    /// Rendered text; the largest tier is letter-spaced to take more room.
    pub fn shape(self, word: &str) -> String {
        match self {
            Emphasis::Small | Emphasis::Medium => word.to_string(),
            Emphasis::Large => word.to_uppercase(),
            Emphasis::Huge => {
                let upper = word.to_uppercase();
                let mut spaced = String::with_capacity(upper.len() * 2);
                for (i, c) in upper.chars().enumerate() {
                    if i > 0 {
                        spaced.push(' ');
                    }
                    spaced.push(c);
                }
                spaced
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SizedWord {
    pub keyword: String,
    pub count: u64,
    pub size: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedWord {
    pub keyword: String,
    pub count: u64,
    pub text: String,
    pub emphasis: Emphasis,
    /// Offsets within the cloud area.
    pub x: u16,
    pub y: u16,
    pub width: u16,
}

impl PlacedWord {
    fn overlaps(&self, x: u16, y: u16, width: u16) -> bool {
        self.y == y && x < self.x + self.width + PADDING && self.x < x + width + PADDING
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        y == self.y && x >= self.x && x < self.x + self.width
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CloudLayout {
    pub placed: Vec<PlacedWord>,
    /// Words with no free spot inside the area; silently left out.
    pub dropped: usize,
}

impl CloudLayout {
    pub fn word_at(&self, x: u16, y: u16) -> Option<&PlacedWord> {
        self.placed.iter().find(|w| w.contains(x, y))
    }
}

#[derive(Clone, Debug, Default)]
pub struct KeywordCloud {
    pub cycle: u64,
    pub status: SliceStatus,
    pub words: Vec<SizedWord>,
}

impl KeywordCloud {
    pub fn render(&self, cycle: u64, slice: &Slice<Vec<KeywordCount>>) -> KeywordCloud {
        let words = slice
            .value()
            .map(|ranked| {
                ranked
                    .iter()
                    .take(MAX_WORDS)
                    .map(|k| SizedWord {
                        keyword: k.keyword.clone(),
                        count: k.count,
                        size: font_size(k.count),
                    })
                    .collect()
            })
            .unwrap_or_default();

        KeywordCloud { cycle, status: SliceStatus::of(slice), words }
    }

    /// Place words largest-first on an outward spiral from the centre.
    /// Deterministic for a given word list and area.
    pub fn layout(&self, width: u16, height: u16) -> CloudLayout {
        let mut order: Vec<&SizedWord> = self.words.iter().collect();
        order.sort_by(|a, b| b.size.total_cmp(&a.size));

        let mut layout = CloudLayout::default();
        let cx = width as f64 / 2.0;
        let cy = height as f64 / 2.0;

        for word in order {
            let emphasis = Emphasis::for_size(word.size);
            let text = emphasis.shape(&word.keyword);
            let w = Span::raw(text.as_str()).width() as u16;

            let spot = (w <= width && height > 0)
                .then(|| {
                    (0..MAX_ATTEMPTS).find_map(|step| {
                        let t = step as f64 * 0.35;
                        // cells are tall, so spread twice as far sideways
                        let x = cx + 2.0 * 0.5 * t * t.cos() - w as f64 / 2.0;
                        let y = cy + 0.5 * t * t.sin();
                        if x < 0.0 || y < 0.0 {
                            return None;
                        }
                        let (x, y) = (x.round() as u16, y.floor() as u16);
                        let fits = x.saturating_add(w) <= width && y < height;
                        let free = !layout.placed.iter().any(|p| p.overlaps(x, y, w));
                        (fits && free).then_some((x, y))
                    })
                })
                .flatten();

            match spot {
                Some((x, y)) => layout.placed.push(PlacedWord {
                    keyword: word.keyword.clone(),
                    count: word.count,
                    text,
                    emphasis,
                    x,
                    y,
                    width: w,
                }),
                None => layout.dropped += 1,
            }
        }
        layout
    }
}

struct CloudView<'a> {
    layout: &'a CloudLayout,
    colors: &'a ColorScheme,
}

impl Widget for CloudView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let n = self.layout.placed.len().max(1);
        for (idx, word) in self.layout.placed.iter().enumerate() {
            let color = self.colors.palette[idx * self.colors.palette.len() / n];
            let style = match word.emphasis {
                Emphasis::Small => Style::default().fg(color).add_modifier(Modifier::DIM),
                Emphasis::Medium => Style::default().fg(color),
                Emphasis::Large | Emphasis::Huge => {
                    Style::default().fg(color).add_modifier(Modifier::BOLD)
                }
            };
            buf.set_string(area.x + word.x, area.y + word.y, &word.text, style);
        }
    }
}

/// Draws the cloud and returns the inner area used for placement.
pub fn draw(frame: &mut Frame, area: Rect, cloud: &KeywordCloud, colors: &ColorScheme) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Top Keywords{} ", cloud.status.title_suffix()))
        .border_style(Style::default().fg(colors.border_focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if cloud.words.is_empty() {
        let msg = Paragraph::new(Span::styled(
            cloud.status.placeholder(),
            Style::default().fg(colors.text_disabled),
        ));
        frame.render_widget(msg, inner);
        return inner;
    }

    let layout = cloud.layout(inner.width, inner.height);
    frame.render_widget(CloudView { layout: &layout, colors }, inner);
    inner
}
