/// Format a token count with a K/M/G/T unit suffix.
///
/// One decimal below 100 units, none above ("1.2M", "340G").
pub fn format_count(n: u64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "G"), (1e6, "M"), (1e3, "K")];
    let n = n as f64;
    for (threshold, suffix) in UNITS {
        if n >= threshold {
            let value = n / threshold;
            return if value < 100.0 {
                format!("{:.1}{}", value, suffix)
            } else {
                format!("{:.0}{}", value, suffix)
            };
        }
    }
    format!("{}", n as u64)
}

/// Format a dollar amount with precision scaled to its magnitude.
pub fn format_cost(c: f64) -> String {
    if c == 0.0 {
        "$0".to_string()
    } else if c >= 100.0 {
        format!("${:.0}", c)
    } else if c >= 10.0 {
        format!("${:.1}", c)
    } else if c >= 1.0 {
        format!("${:.2}", c)
    } else if c >= 0.01 {
        format!("${:.3}", c)
    } else {
        format!("${:.4}", c)
    }
}

/// Collapse a model id to its family: the first two `-`-delimited tokens.
///
/// Display-only; never used as a pricing or aggregation key.
pub fn family_name(model: &str) -> String {
    let parts: Vec<&str> = model.split('-').collect();
    if parts.len() >= 2 {
        parts[..2].join("-")
    } else {
        model.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_count_plain_below_thousand() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
    }

    #[test]
    fn format_count_units() {
        assert_eq!(format_count(1_000), "1.0K");
        assert_eq!(format_count(1_234), "1.2K");
        assert_eq!(format_count(2_500_000), "2.5M");
        assert_eq!(format_count(3_400_000_000), "3.4G");
        assert_eq!(format_count(1_200_000_000_000), "1.2T");
    }

    #[test]
    fn format_count_drops_decimal_at_100_units() {
        assert_eq!(format_count(99_900), "99.9K");
        assert_eq!(format_count(150_000), "150K");
    }

    #[test]
    fn format_cost_tiers() {
        assert_eq!(format_cost(0.0), "$0");
        assert_eq!(format_cost(123.4), "$123");
        assert_eq!(format_cost(45.67), "$45.7");
        assert_eq!(format_cost(4.5678), "$4.57");
        assert_eq!(format_cost(0.1234), "$0.123");
        assert_eq!(format_cost(0.0008), "$0.0008");
    }

    #[test]
    fn family_name_keeps_two_tokens() {
        assert_eq!(family_name("claude-sonnet-4-5-20250929"), "claude-sonnet");
        assert_eq!(family_name("claude-haiku-3-5"), "claude-haiku");
    }

    #[test]
    fn family_name_passthrough_short_names() {
        assert_eq!(family_name("unknown"), "unknown");
        assert_eq!(family_name("gpt-5"), "gpt-5");
    }
}
