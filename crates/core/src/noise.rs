//! Suppression of operational status chatter (spinners, compaction notices,
//! interrupt hints, checkbox status lines) copied into chat exports.

use regex::Regex;
use std::sync::LazyLock;

/// Line-level noise patterns, evaluated in order, case-insensitive.
static NOISE_LINE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^✶\s*Compacting conversation",
        r"^✶\s*Churned for",
        r"^✶\s*Sautéed for",
        r"^✶\s*Brewed for",
        r"^✶\s*Worked for",
        r"^✶\s*Zigzagging",
        r"^\s*⎿\s*☐",
        r"^\s*⎿\s*☒",
        r"^ctrl\+c to interrupt",
        r"thinking\)$",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
    .collect()
});

/// Substrings that mark a short message as pure status output.
const NOISE_INDICATORS: &[&str] = &["Compacting conversation", "ctrl+c to interrupt", "⎿", "✶"];

/// Messages at or above this length are never treated as whole-message noise.
const NOISE_MESSAGE_MAX_CHARS: usize = 100;

/// Whether a single line is status chatter.
pub fn is_noise_line(line: &str) -> bool {
    NOISE_LINE_RES.iter().any(|re| re.is_match(line))
}

/// Drop every noise line, keeping the remaining lines in their original order.
pub fn filter_noise(text: &str) -> String {
    text.split('\n')
        .filter(|line| !is_noise_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether an entire (already line-filtered) message is status output.
pub fn is_noise_message(text: &str) -> bool {
    let text = text.trim();
    text.chars().count() < NOISE_MESSAGE_MAX_CHARS
        && NOISE_INDICATORS.iter().any(|ind| text.contains(ind))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "plain text",
        "✶ Compacting conversation...",
        "first\n✶ Churned for 2m 3s\nsecond",
        "  ⎿  ☐ write tests\n  ⎿  ☒ write code\nDone.",
        "CTRL+C to interrupt\nstill here",
        "running (esc to cancel, thinking)\nresult",
        "line one\r\nline two\n\n\nline three",
        "✶ Sautéed for 10s\n✶ SAUTÉED FOR 4s\nkept",
    ];

    #[test]
    fn test_filter_drops_noise_lines_in_order() {
        let text = "alpha\n✶ Brewed for 12s\nbeta\nctrl+c to interrupt\ngamma";
        assert_eq!(filter_noise(text), "alpha\nbeta\ngamma");
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        assert!(is_noise_line("✶ WORKED FOR 3m"));
        assert!(is_noise_line("Ctrl+C To Interrupt"));
        assert!(is_noise_line("… (12s · esc to interrupt · THINKING)"));
        assert!(!is_noise_line("I was thinking) about it later"));
    }

    #[test]
    fn test_filter_is_idempotent() {
        for sample in SAMPLES {
            let once = filter_noise(sample);
            assert_eq!(filter_noise(&once), once, "sample: {sample:?}");
        }
    }

    #[test]
    fn test_filtered_text_has_no_noise_lines() {
        for sample in SAMPLES {
            let filtered = filter_noise(sample);
            assert!(filtered.split('\n').all(|line| !is_noise_line(line)));
        }
    }

    #[test]
    fn test_noise_message() {
        assert!(is_noise_message("  ✶ done  "));
        assert!(is_noise_message("Compacting conversation"));
        assert!(!is_noise_message("A normal short reply."));

        // Long messages survive even when they contain an indicator.
        let long = format!("✶ {}", "x".repeat(120));
        assert!(!is_noise_message(&long));
    }
}
