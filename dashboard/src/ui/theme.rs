use ratatui::style::Color;

#[derive(Clone, Copy, Debug)]
pub struct ColorScheme {
    // Text
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_disabled: Color,

    // Borders
    pub border_focused: Color,
    pub border_normal: Color,

    // Table
    pub table_header: Color,
    pub row_selected_bg: Color,

    // Accents
    pub accent: Color,
    pub accent_id: Color,

    // Rating stars
    pub star_active: Color,
    pub star_idle: Color,

    // Sentiment categories
    pub positive: Color,
    pub neutral: Color,
    pub negative: Color,

    // Status (semantic)
    pub status_ok: Color,
    pub status_error: Color,

    // Wedges and cloud words
    pub palette: [Color; 8],

    // Misc
    pub help_separator: Color,
}

impl ColorScheme {
    pub fn dark() -> Self {
        Self {
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_disabled: Color::DarkGray,
            border_focused: Color::LightBlue,
            border_normal: Color::DarkGray,
            table_header: Color::Yellow,
            row_selected_bg: Color::DarkGray,
            accent: Color::LightBlue,
            accent_id: Color::LightYellow,
            star_active: Color::Rgb(255, 200, 40),
            star_idle: Color::Rgb(70, 70, 80),
            positive: Color::LightGreen,
            neutral: Color::Rgb(150, 160, 180),
            negative: Color::LightRed,
            status_ok: Color::Green,
            status_error: Color::Red,
            palette: [
                Color::Rgb(255, 179, 71),
                Color::Rgb(119, 221, 119),
                Color::Rgb(132, 182, 244),
                Color::Rgb(253, 253, 150),
                Color::Rgb(255, 105, 97),
                Color::Rgb(203, 153, 201),
                Color::Rgb(119, 190, 200),
                Color::Rgb(207, 207, 196),
            ],
            help_separator: Color::Rgb(60, 60, 60),
        }
    }

    pub fn light() -> Self {
        Self {
            text_primary: Color::Black,
            text_secondary: Color::DarkGray,
            text_disabled: Color::Gray,
            border_focused: Color::Blue,
            border_normal: Color::Gray,
            table_header: Color::Rgb(140, 100, 0),
            row_selected_bg: Color::Rgb(210, 220, 235),
            accent: Color::Blue,
            accent_id: Color::Rgb(160, 110, 0),
            star_active: Color::Rgb(210, 140, 0),
            star_idle: Color::Rgb(200, 200, 205),
            positive: Color::Rgb(0, 130, 60),
            neutral: Color::Rgb(100, 110, 130),
            negative: Color::Rgb(200, 30, 30),
            status_ok: Color::Rgb(0, 140, 50),
            status_error: Color::Rgb(200, 30, 30),
            palette: [
                Color::Rgb(200, 110, 0),
                Color::Rgb(30, 140, 60),
                Color::Rgb(40, 90, 190),
                Color::Rgb(150, 130, 0),
                Color::Rgb(190, 40, 40),
                Color::Rgb(130, 60, 140),
                Color::Rgb(0, 120, 140),
                Color::Rgb(100, 100, 90),
            ],
            help_separator: Color::Rgb(180, 180, 180),
        }
    }

    /// Color for a sentiment label as the backend spells it.
    pub fn sentiment(&self, label: &str) -> Color {
        match label.to_ascii_lowercase().as_str() {
            "positive" => self.positive,
            "negative" => self.negative,
            "neutral" => self.neutral,
            _ => self.text_secondary,
        }
    }
}
