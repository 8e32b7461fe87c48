//! Palette and color string helpers shared by the chart builders.

pub const WASTE_COLORS: [&str; 5] = ["#eab308", "#f43f5e", "#10b981", "#3b82f6", "#a78bfa"];

/// Legend swatch for entries past the end of the palette
pub const LEGEND_FALLBACK_COLOR: &str = "#e5e7eb";

pub fn default_palette() -> Vec<String> {
    WASTE_COLORS.iter().map(|c| c.to_string()).collect()
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let digits = color.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// `#rrggbb` to `rgba(r,g,b,a)`
pub fn hex_a(hex: &str, alpha: f64) -> Option<String> {
    let (r, g, b) = parse_hex(hex)?;
    Some(format!("rgba({},{},{},{})", r, g, b, alpha))
}

struct RgbFunction<'a> {
    channels: [f64; 3],
    alpha: Option<&'a str>,
}

fn parse_rgb_function(color: &str) -> Option<RgbFunction<'_>> {
    let trimmed = color.trim();
    let lower = trimmed.to_ascii_lowercase();
    let (prefix_len, expected) = if lower.starts_with("rgba(") {
        (5, 4)
    } else if lower.starts_with("rgb(") {
        (4, 3)
    } else {
        return None;
    };

    let inner = trimmed.get(prefix_len..)?.strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != expected {
        return None;
    }

    let mut channels = [0.0; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        *slot = part.parse::<f64>().ok()?;
    }

    Some(RgbFunction {
        channels,
        alpha: parts.get(3).copied(),
    })
}

/// Darken a color by `percent` (0-100), keeping its notation.
///
/// Hex stays hex and `rgb()`/`rgba()` stay functional; any other notation
/// comes back untouched. Channels are floored after scaling and saturate at
/// the byte bounds.
pub fn darken_color(color: &str, percent: f64) -> String {
    let factor = 1.0 - percent / 100.0;
    let scale = |channel: f64| (channel * factor).floor() as u8;

    if color.trim().starts_with('#') {
        if let Some((r, g, b)) = parse_hex(color) {
            return format!(
                "#{:02x}{:02x}{:02x}",
                scale(f64::from(r)),
                scale(f64::from(g)),
                scale(f64::from(b))
            );
        }
    }

    if let Some(rgb) = parse_rgb_function(color) {
        let [r, g, b] = rgb.channels.map(scale);
        return match rgb.alpha {
            Some(alpha) => format!("rgba({}, {}, {}, {})", r, g, b, alpha),
            None => format!("rgb({}, {}, {})", r, g, b),
        };
    }

    color.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_a() {
        assert_eq!(hex_a("#7B61FF", 0.25).as_deref(), Some("rgba(123,97,255,0.25)"));
        assert_eq!(hex_a("ffa449", 1.0).as_deref(), Some("rgba(255,164,73,1)"));
        assert_eq!(hex_a("#fff", 0.5), None);
        assert_eq!(hex_a("#gg0000", 0.5), None);
    }

    #[test]
    fn test_darken_hex_stays_hex() {
        let darker = darken_color("#ff0000", 50.0);
        assert_eq!(darker, "#7f0000");
        assert_eq!(darker.len(), 7);
        assert!(darker.starts_with('#'));

        assert_eq!(darken_color("#10b981", 0.0), "#10b981");
        assert_eq!(darken_color("#ffffff", 100.0), "#000000");
    }

    #[test]
    fn test_darken_rgb_stays_rgb() {
        assert_eq!(darken_color("rgb(255,0,0)", 50.0), "rgb(127, 0, 0)");
        assert_eq!(darken_color("rgba(200, 100, 50, 0.4)", 10.0), "rgba(180, 90, 45, 0.4)");
    }

    #[test]
    fn test_darken_other_notation_unchanged() {
        assert_eq!(darken_color("hsl(120, 50%, 50%)", 20.0), "hsl(120, 50%, 50%)");
        assert_eq!(darken_color("tomato", 20.0), "tomato");
        assert_eq!(darken_color("#abc", 20.0), "#abc");
        assert_eq!(darken_color("rgb(1,2)", 20.0), "rgb(1,2)");
    }

    #[test]
    fn test_default_palette() {
        let palette = default_palette();
        assert_eq!(palette.len(), 5);
        assert_eq!(palette[0], "#eab308");
    }
}
