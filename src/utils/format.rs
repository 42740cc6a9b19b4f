/// Format an optional string for display, using an em-dash placeholder like
/// the detail pages do
pub fn format_optional(value: &Option<String>) -> String {
    match value.as_deref() {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => "—".to_string(),
    }
}

/// Format a vision confidence score in [0, 1] as a percentage
pub fn format_confidence(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v * 100.0),
        None => "—".to_string(),
    }
}

/// Format a latitude/longitude component to 6 decimal places
pub fn format_coord(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.6}", v),
        None => "—".to_string(),
    }
}

/// Format an ISO date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        // Fall back to the YYYY-MM-DD prefix
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(&Some("14 Elm St".to_string())), "14 Elm St");
        assert_eq!(format_optional(&Some("   ".to_string())), "—");
        assert_eq!(format_optional(&None), "—");
    }

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(Some(0.923)), "92.3%");
        assert_eq!(format_confidence(Some(1.0)), "100.0%");
        assert_eq!(format_confidence(None), "—");
    }

    #[test]
    fn test_format_coord() {
        assert_eq!(format_coord(Some(12.9716)), "12.971600");
        assert_eq!(format_coord(None), "—");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-06-01T09:30:00Z"), "Jun 01, 2025");
        assert_eq!(format_date("2025-06-01"), "2025-06-01");
        assert_eq!(format_date("junk"), "junk");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }
}
