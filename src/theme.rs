//! Named colour palettes for the terminal UI.

use ratatui::style::Color;

pub const DEFAULT_THEME: &str = "dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub text: Color,
    /// Headings, figures and the WPM line.
    pub primary: Color,
    pub success: Color,
    pub error: Color,
    pub caret: Color,
    /// Untyped text, labels and axes.
    pub muted: Color,
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

pub const THEMES: [Theme; 8] = [
    Theme {
        name: "dark",
        text: rgb(0xe5e7eb),
        primary: rgb(0x60a5fa),
        success: rgb(0x22c55e),
        error: rgb(0xef4444),
        caret: rgb(0x3b82f6),
        muted: rgb(0x6b7280),
    },
    Theme {
        name: "nord_light",
        text: rgb(0x1f2937),
        primary: rgb(0x2563eb),
        success: rgb(0x16a34a),
        error: rgb(0xdc2626),
        caret: rgb(0x2563eb),
        muted: rgb(0x9ca3af),
    },
    Theme {
        name: "dino",
        text: rgb(0xdcfce7),
        primary: rgb(0x86efac),
        success: rgb(0x86efac),
        error: rgb(0xfca5a5),
        caret: rgb(0x86efac),
        muted: rgb(0x15803d),
    },
    Theme {
        name: "magic_girl",
        text: rgb(0x581c87),
        primary: rgb(0x9333ea),
        success: rgb(0x16a34a),
        error: rgb(0xdc2626),
        caret: rgb(0xa855f7),
        muted: rgb(0xf472b6),
    },
    Theme {
        name: "milkshake",
        text: rgb(0x374151),
        primary: rgb(0xdb2777),
        success: rgb(0x16a34a),
        error: rgb(0xef4444),
        caret: rgb(0xec4899),
        muted: rgb(0x60a5fa),
    },
    Theme {
        name: "modern_ink",
        text: rgb(0xf3f4f6),
        primary: rgb(0x818cf8),
        success: rgb(0x4ade80),
        error: rgb(0xf87171),
        caret: rgb(0x818cf8),
        muted: rgb(0x6b7280),
    },
    Theme {
        name: "rose_pine_dawn",
        text: rgb(0x1f2937),
        primary: rgb(0xe11d48),
        success: rgb(0x16a34a),
        error: rgb(0xef4444),
        caret: rgb(0xf43f5e),
        muted: rgb(0xfda4af),
    },
    Theme {
        name: "soaring_skies",
        text: rgb(0x1e3a8a),
        primary: rgb(0x2563eb),
        success: rgb(0x16a34a),
        error: rgb(0xef4444),
        caret: rgb(0x3b82f6),
        muted: rgb(0x93c5fd),
    },
];

impl Theme {
    /// Unknown names get the dark palette.
    pub fn by_name(name: &str) -> Theme {
        THEMES
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .copied()
            .unwrap_or(THEMES[0])
    }

    pub fn next(&self) -> Theme {
        let idx = THEMES.iter().position(|t| t.name == self.name).unwrap_or(0);
        THEMES[(idx + 1) % THEMES.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        THEMES[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(Theme::by_name("milkshake").name, "milkshake");
        assert_eq!(Theme::by_name("Nord_Light").name, "nord_light");
    }

    #[test]
    fn unknown_name_falls_back_to_dark() {
        assert_eq!(Theme::by_name("ms_cupcakes"), Theme::default());
        assert_eq!(Theme::default().name, DEFAULT_THEME);
    }

    #[test]
    fn next_wraps_around() {
        let last = THEMES[THEMES.len() - 1];
        assert_eq!(last.next().name, "dark");
        assert_eq!(Theme::by_name("dark").next().name, "nord_light");
    }

    #[test]
    fn rgb_unpacks_channels() {
        assert_eq!(rgb(0x60a5fa), Color::Rgb(0x60, 0xa5, 0xfa));
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in THEMES.iter().enumerate() {
            assert!(THEMES.iter().skip(i + 1).all(|b| b.name != a.name));
        }
    }
}
