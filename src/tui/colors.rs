use ratatui::style::Color;

pub fn color_for_category(category: &str) -> Color {
    match category.to_lowercase().as_str() {
        "electronics" => Color::LightBlue,
        "jewelery" | "jewelry" => Color::Yellow,
        "men's clothing" => Color::Cyan,
        "women's clothing" => Color::Magenta,
        _ => Color::Gray,
    }
}

pub fn icon_for_category(category: &str) -> &'static str {
    match category.to_lowercase().as_str() {
        "electronics" => "\u{1F50C}", // electric plug
        "jewelery" | "jewelry" => "\u{1F48D}", // ring
        "men's clothing" => "\u{1F455}", // t-shirt
        "women's clothing" => "\u{1F457}", // dress
        _ => "\u{1F4E6}", // package
    }
}

/// Five-star bar for a 0..=5 rating, rounded to the nearest star
pub fn rating_stars(rate: f64) -> String {
    let filled = rate.clamp(0.0, 5.0).round() as usize;
    let mut stars = "\u{2605}".repeat(filled);
    stars.push_str(&"\u{2606}".repeat(5 - filled));
    stars
}

pub const SEARCH_ICON: &str = "\u{1F50D}";
pub const CLEAR_ICON: &str = "\u{2715}";
pub const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub const HEADER_BG: Color = Color::Rgb(0, 95, 135);
pub const HIGHLIGHT_BG: Color = Color::Rgb(60, 60, 80);
pub const ALT_ROW_BG: Color = Color::Rgb(25, 25, 35);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_round_and_clamp() {
        assert_eq!(rating_stars(3.9), "\u{2605}\u{2605}\u{2605}\u{2605}\u{2606}");
        assert_eq!(rating_stars(0.2), "\u{2606}".repeat(5));
        assert_eq!(rating_stars(7.0), "\u{2605}".repeat(5));
    }

    #[test]
    fn categories_are_case_insensitive() {
        assert_eq!(color_for_category("Electronics"), Color::LightBlue);
        assert_eq!(icon_for_category("JEWELERY"), icon_for_category("jewelry"));
        assert_eq!(color_for_category("garden"), Color::Gray);
    }
}
