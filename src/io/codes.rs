//! Translation of descriptive rp5 codes into numbers.
//!
//! rp5 exports describe cloud cover and cloud base height in words, e.g.
//! `"100%."`, `"70 – 80%."`, `"2500 or more, or no clouds."`. We map each
//! description to the mean of the numbers it mentions, and `"no clouds"` to 0.
//! Descriptions without a usable number (e.g. sky obscured by fog) are missing.

/// rp5 fields carrying numeric information in descriptive text.
pub const RP5_NUMERIC_CODE_FIELDS: [&str; 3] = ["N", "Nh", "H"];

pub fn translate_code(text: &str) -> Option<f64> {
    let numbers = extract_numbers(text);
    if !numbers.is_empty() {
        return Some(numbers.iter().sum::<f64>() / numbers.len() as f64);
    }
    if text.to_ascii_lowercase().contains("no clouds") {
        return Some(0.0);
    }
    None
}

fn extract_numbers(text: &str) -> Vec<f64> {
    let mut out = Vec::new();
    let mut current = String::new();
    for ch in text.chars().chain(std::iter::once(' ')) {
        if ch.is_ascii_digit() || (ch == '.' && !current.is_empty() && !current.contains('.')) {
            current.push(ch);
        } else if !current.is_empty() {
            // A trailing '.' is sentence punctuation, not a decimal point.
            if let Ok(v) = current.trim_end_matches('.').parse::<f64>() {
                out.push(v);
            }
            current.clear();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_cover_descriptions() {
        assert_eq!(translate_code("100%."), Some(100.0));
        assert_eq!(translate_code("70 – 80%."), Some(75.0));
        assert_eq!(translate_code("no clouds"), Some(0.0));
        assert_eq!(translate_code("Sky obscured by fog and/or other meteorological phenomena."), None);
    }

    #[test]
    fn cloud_base_descriptions() {
        assert_eq!(translate_code("2500 or more, or no clouds."), Some(2500.0));
        assert_eq!(translate_code("600-1000"), Some(800.0));
        assert_eq!(translate_code("1.5"), Some(1.5));
    }
}
