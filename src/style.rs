//! Caption style resolution.
//!
//! Raw user style input is never rejected: unusable values degrade to the
//! defaults below, and out-of-range sizes clamp to the supported bounds.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// Supported font size range for burned-in captions.
pub const MIN_FONT_SIZE: i64 = 16;
pub const MAX_FONT_SIZE: i64 = 48;
pub const DEFAULT_FONT_SIZE: u32 = 24;

/// Default caption color, conventional RGB hex.
pub const DEFAULT_FONT_COLOR: &str = "FFFFFF";

/// Style fields as they arrive on the wire; both optional.
///
/// `font_size` accepts a JSON number or a numeric string, since clients
/// send both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleInput {
    #[serde(default)]
    pub font_size: Option<Value>,
    #[serde(default)]
    pub font_color: Option<String>,
}

impl StyleInput {
    fn font_size_as_i64(&self) -> Option<i64> {
        match self.font_size.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Normalized caption rendering style, ready for the burn step.
///
/// Colors are stored in the blue-green-red hex order the subtitle renderer
/// expects, not the conventional RGB order of the wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleStyle {
    pub font_size: u32,
    pub font_color_bgr: String,
    pub outline_color_bgr: String,
    pub outline_width: u32,
    pub shadow_depth: u32,
}

impl SubtitleStyle {
    /// Resolve raw user input into a renderable style.
    ///
    /// Out-of-range sizes clamp to `[MIN_FONT_SIZE, MAX_FONT_SIZE]`;
    /// non-numeric or missing sizes fall back to [`DEFAULT_FONT_SIZE`].
    /// Anything that is not a 6-hex-digit color falls back to white.
    pub fn resolve(input: &StyleInput) -> Self {
        let font_size = match input.font_size_as_i64() {
            Some(size) => size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE) as u32,
            None => DEFAULT_FONT_SIZE,
        };

        let rgb = input
            .font_color
            .as_deref()
            .and_then(normalize_hex_color)
            .unwrap_or_else(|| DEFAULT_FONT_COLOR.to_string());

        SubtitleStyle {
            font_size,
            font_color_bgr: rgb_to_bgr(&rgb),
            outline_color_bgr: "000000".to_string(),
            outline_width: 2,
            shadow_depth: 1,
        }
    }

    /// Build the renderer's `force_style` override string.
    ///
    /// The `&H00..` color syntax is AABBGGRR with alpha 00 = fully opaque.
    pub fn force_style(&self) -> String {
        format!(
            "FontSize={},PrimaryColour=&H00{},OutlineColour=&H00{},BorderStyle=1,Outline={},Shadow={}",
            self.font_size,
            self.font_color_bgr,
            self.outline_color_bgr,
            self.outline_width,
            self.shadow_depth
        )
    }
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self::resolve(&StyleInput::default())
    }
}

/// Accept `#RRGGBB` or bare `RRGGBB`; returns the uppercase hex digits.
fn normalize_hex_color(raw: &str) -> Option<String> {
    let re = Regex::new(r"^#?([0-9A-Fa-f]{6})$").ok()?;
    let caps = re.captures(raw.trim())?;
    Some(caps.get(1)?.as_str().to_uppercase())
}

/// Reverse the byte triplet: RGB hex order to the renderer's BGR order.
pub fn rgb_to_bgr(rgb: &str) -> String {
    format!("{}{}{}", &rgb[4..6], &rgb[2..4], &rgb[0..2])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(size: Option<Value>, color: Option<&str>) -> StyleInput {
        StyleInput {
            font_size: size,
            font_color: color.map(str::to_string),
        }
    }

    #[test]
    fn test_defaults_when_unset() {
        let style = SubtitleStyle::resolve(&StyleInput::default());
        assert_eq!(style.font_size, 24);
        assert_eq!(style.font_color_bgr, "FFFFFF");
        assert_eq!(style.outline_color_bgr, "000000");
        assert_eq!(style.outline_width, 2);
        assert_eq!(style.shadow_depth, 1);
    }

    #[test]
    fn test_font_size_clamps_to_bounds() {
        assert_eq!(SubtitleStyle::resolve(&input(Some(Value::from(60)), None)).font_size, 48);
        assert_eq!(SubtitleStyle::resolve(&input(Some(Value::from(4)), None)).font_size, 16);
        assert_eq!(SubtitleStyle::resolve(&input(Some(Value::from(-2)), None)).font_size, 16);
        assert_eq!(SubtitleStyle::resolve(&input(Some(Value::from(32)), None)).font_size, 32);
    }

    #[test]
    fn test_font_size_accepts_numeric_strings() {
        assert_eq!(
            SubtitleStyle::resolve(&input(Some(Value::from("30")), None)).font_size,
            30
        );
        assert_eq!(
            SubtitleStyle::resolve(&input(Some(Value::from("big")), None)).font_size,
            24
        );
    }

    #[test]
    fn test_color_converts_rgb_to_bgr() {
        let style = SubtitleStyle::resolve(&input(None, Some("#FF0000")));
        assert_eq!(style.font_color_bgr, "0000FF");

        let style = SubtitleStyle::resolve(&input(None, Some("11AABB")));
        assert_eq!(style.font_color_bgr, "BBAA11");
    }

    #[test]
    fn test_white_is_fixed_under_conversion() {
        let style = SubtitleStyle::resolve(&input(None, Some("#FFFFFF")));
        assert_eq!(style.font_color_bgr, "FFFFFF");
    }

    #[test]
    fn test_malformed_color_falls_back_to_white() {
        for bad in ["#FFF", "red", "12345G", "#1234567", ""] {
            let style = SubtitleStyle::resolve(&input(None, Some(bad)));
            assert_eq!(style.font_color_bgr, "FFFFFF", "input {:?}", bad);
        }
    }

    #[test]
    fn test_force_style_string() {
        let style = SubtitleStyle::resolve(&input(Some(Value::from(32)), Some("FF8800")));
        assert_eq!(
            style.force_style(),
            "FontSize=32,PrimaryColour=&H000088FF,OutlineColour=&H00000000,BorderStyle=1,Outline=2,Shadow=1"
        );
    }
}
