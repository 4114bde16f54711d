//! Terminal rendering of a match percentage

use colored::Colorize;

const BAR_WIDTH: usize = 40;

/// Two-segment bar (match vs remaining) followed by the percentage labels.
pub fn percentage_chart(percentage: u8, use_colors: bool) -> String {
    let percentage = percentage.min(100);
    let filled = (percentage as usize * BAR_WIDTH + 50) / 100;
    let matched = "█".repeat(filled);
    let remaining = "░".repeat(BAR_WIDTH - filled);

    let bar = if use_colors {
        format!("{}{}", matched.green(), remaining.red())
    } else {
        format!("{}{}", matched, remaining)
    };

    format!(
        "[{}] Match: {}% | Remaining: {}%",
        bar,
        percentage,
        100 - percentage
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_chart_proportions() {
        let chart = percentage_chart(50, false);
        assert_eq!(chart.matches('█').count(), 20);
        assert_eq!(chart.matches('░').count(), 20);
        assert!(chart.ends_with("Match: 50% | Remaining: 50%"));
    }

    #[test]
    fn test_chart_extremes() {
        assert_eq!(percentage_chart(0, false).matches('█').count(), 0);
        assert_eq!(percentage_chart(100, false).matches('░').count(), 0);
    }
}
