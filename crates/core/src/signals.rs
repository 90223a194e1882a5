//! Heuristic extraction of file references and decision-like statements.
//!
//! Best effort: false positives and negatives are acceptable, but the output is
//! fully determined by the input text.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::MAX_DECISIONS;

/// The rule that produced a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalRule {
    /// Index into the path pattern families.
    Path(usize),
    /// Index into the decision markers.
    Decision(usize),
}

/// A piece of text extracted from the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub text: String,
    pub rule: SignalRule,
}

static PATH_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"[A-Za-z]:\\[^\s'"<>|]+"#, // drive-rooted
        r"/[\w\-./]+\.\w+",          // unix with extension
        r"src/[\w\-./]+",
        r"server/[\w\-./]+",
        r"docs/[\w\-./]+",
        r"lib/[\w\-./]+",
        r"app/[\w\-./]+",
        r"components/[\w\-./]+",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static DECISION_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:we|I) (?:decided|chose|will|should|need to)",
        r"(?:the|our) pattern",
        r"convention",
        r"architecture",
        r"migration",
        r"IMPORTANT",
        r"NOTE:",
        r"TODO:",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
    .collect()
});

fn is_real_path(candidate: &str) -> bool {
    candidate.chars().count() > 5 && !candidate.starts_with("//")
}

/// Extract path references with the first rule that matched each of them.
///
/// Deduplicated and returned in lexical order.
pub fn extract_path_signals(text: &str) -> Vec<Signal> {
    let mut found: BTreeMap<&str, usize> = BTreeMap::new();
    for (idx, re) in PATH_RES.iter().enumerate() {
        for m in re.find_iter(text) {
            found.entry(m.as_str()).or_insert(idx);
        }
    }
    found
        .into_iter()
        .filter(|(path, _)| is_real_path(path))
        .map(|(path, idx)| Signal {
            text: path.to_string(),
            rule: SignalRule::Path(idx),
        })
        .collect()
}

/// Extract the sorted, deduplicated set of path references.
pub fn extract_paths(text: &str) -> Vec<String> {
    extract_path_signals(text)
        .into_iter()
        .map(|s| s.text)
        .collect()
}

/// Extract decision-like lines in first-occurrence order, capped at
/// [`MAX_DECISIONS`].
pub fn extract_decision_signals(text: &str) -> Vec<Signal> {
    let mut decisions = Vec::new();
    for line in text.split('\n') {
        let line = line.trim();
        let len = line.chars().count();
        if len <= 20 || len >= 500 {
            continue;
        }
        if let Some(idx) = DECISION_RES.iter().position(|re| re.is_match(line)) {
            decisions.push(Signal {
                text: line.to_string(),
                rule: SignalRule::Decision(idx),
            });
            if decisions.len() == MAX_DECISIONS {
                break;
            }
        }
    }
    decisions
}

/// Extract decision-like lines as plain strings.
pub fn extract_decisions(text: &str) -> Vec<String> {
    extract_decision_signals(text)
        .into_iter()
        .map(|s| s.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_extract_paths_sorted_and_deduplicated() {
        let text = "Edited src/main.rs and src/main.rs again.\n\
                    See /etc/app/config.toml and docs/guide.md for details\n\
                    Windows: C:\\Users\\me\\project\\file.txt";
        let paths = extract_paths(text);

        assert!(paths.contains(&"src/main.rs".to_string()));
        assert!(paths.contains(&"/etc/app/config.toml".to_string()));
        assert!(paths.contains(&"docs/guide.md".to_string()));
        assert!(paths.contains(&"C:\\Users\\me\\project\\file.txt".to_string()));

        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);

        let unique: HashSet<_> = paths.iter().collect();
        assert_eq!(unique.len(), paths.len());
    }

    #[test]
    fn test_extract_paths_filters_short_and_protocol_relative() {
        let text = "a /a.b link //cdn.example.com/lib.js and http://host/x.js";
        let paths = extract_paths(text);
        for p in &paths {
            assert!(p.chars().count() > 5, "too short: {p}");
            assert!(!p.starts_with("//"), "protocol relative: {p}");
        }
        assert!(!paths.contains(&"/a.b".to_string()));
    }

    #[test]
    fn test_path_signal_keeps_first_rule() {
        // Matches both the unix family and the `src/` family.
        let signals = extract_path_signals("open /src/lib.rs now");
        let unix = signals
            .iter()
            .find(|s| s.text == "/src/lib.rs")
            .expect("unix path found");
        assert_eq!(unix.rule, SignalRule::Path(1));
    }

    #[test]
    fn test_extract_paths_is_deterministic() {
        let text = "lib/a.rs app/b.rs components/c.tsx server/d.py /x/y/z.json";
        assert_eq!(extract_paths(text), extract_paths(text));
    }

    #[test]
    fn test_extract_decisions() {
        let text = "short note: TODO: x\n\
                    We decided to keep the parser single-pass.\n\
                    Nothing interesting happens on this line at all.\n\
                    IMPORTANT: never write partial output files.";
        let decisions = extract_decisions(text);
        assert_eq!(
            decisions,
            vec![
                "We decided to keep the parser single-pass.".to_string(),
                "IMPORTANT: never write partial output files.".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_decisions_length_bounds() {
        let long = format!("we will {}", "x".repeat(600));
        assert!(extract_decisions(&long).is_empty());
        assert!(extract_decisions("we will do it").is_empty());
    }

    #[test]
    fn test_extract_decisions_capped() {
        let text = (0..50)
            .map(|i| format!("We should refactor module number {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let decisions = extract_decisions(&text);
        assert_eq!(decisions.len(), MAX_DECISIONS);
        assert_eq!(decisions[0], "We should refactor module number 0");
    }

    #[test]
    fn test_decision_signal_rule() {
        let signals = extract_decision_signals("The migration to v2 happens next week.");
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].rule, SignalRule::Decision(4));
    }
}
