use colored::Color;

pub const PRIMARY: Color = Color::TrueColor {
    r: 120,
    g: 200,
    b: 255,
};
pub const ACCENT: Color = Color::TrueColor {
    r: 255,
    g: 190,
    b: 90,
};
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor {
    r: 220,
    g: 220,
    b: 220,
};

pub const IPV4_ADDR: Color = Color::TrueColor {
    r: 130,
    g: 220,
    b: 160,
};
pub const PORT: Color = Color::TrueColor {
    r: 200,
    g: 160,
    b: 255,
};

pub const STATUS_OK: Color = Color::Green;
pub const STATUS_WARN: Color = Color::Yellow;
pub const STATUS_BAD: Color = Color::Red;
pub const STATUS_UNKNOWN: Color = Color::BrightBlack;
