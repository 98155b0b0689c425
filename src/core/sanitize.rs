use regex::Regex;
use std::sync::LazyLock;

/// Note text accepted verbatim by the notes prompt.
pub const PASSTHROUGH_SENTINEL: &str = "DIEEEEE";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

static ANSI_ESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[JKmsu]").unwrap());

static BARE_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[0-9;]*m").unwrap());

/// Prompt labels that older versions of the form sometimes captured into field values.
static PROMPT_LABEL_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"Study information for [^:]*:",
        r"Enter specific study goals for [^(]*\(press Enter for none\):",
        r"Work information for [^:]*:",
        r"Add another plan for .* \(y/n\):",
        r"Plan Name:",
        r"Plan Details \(e\.g\., hours, location\):",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

fn is_stripped(c: char) -> bool {
    matches!(c, ';' | '&' | '<' | '>' | '$' | '`' | '\\') || c <= '\u{1f}' || c == '\u{7f}'
}

/// Remove shell metacharacters and control codes from user input.
///
/// Pipes and quotes survive; the record codec escapes what it needs.
pub fn sanitize(text: &str) -> String {
    if text == PASSTHROUGH_SENTINEL {
        return text.to_string();
    }
    text.chars().filter(|c| !is_stripped(*c)).collect()
}

pub fn is_valid_email(text: &str) -> bool {
    !text.is_empty() && EMAIL_RE.is_match(text)
}

/// Strip terminal color codes and captured prompt labels from a legacy field.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out = ANSI_ESCAPE_RE.replace_all(text, "").into_owned();
    out = BARE_COLOR_RE.replace_all(&out, "").into_owned();
    for re in PROMPT_LABEL_RES.iter() {
        out = re.replace_all(&out, "").into_owned();
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_metacharacters() {
        assert_eq!(sanitize("rm -rf $HOME; echo `id` & <x>"), "rm -rf HOME echo id  x");
        assert_eq!(sanitize("back\\slash"), "backslash");
        assert_eq!(sanitize("tab\there\nnew\u{7f}"), "tabherenew");
    }

    #[test]
    fn sanitize_keeps_pipes_quotes_and_unicode() {
        assert_eq!(sanitize(r#"a|b "c" 'd' café, 9-5"#), r#"a|b "c" 'd' café, 9-5"#);
    }

    #[test]
    fn sanitize_is_idempotent() {
        for input in ["", "plain", "x;y&z", "DIEEEEE", "\u{1b}[0;31mred", "a\\\"b"] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn sentinel_passes_through() {
        assert_eq!(sanitize("DIEEEEE"), "DIEEEEE");
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b.c0m"));
    }

    #[test]
    fn clean_text_removes_color_codes() {
        assert_eq!(clean_text("\u{1b}[0;33m11:00-3:00\u{1b}[0m"), "11:00-3:00");
        assert_eq!(clean_text("[0;32mgreen[0m"), "green");
    }

    #[test]
    fn clean_text_removes_prompt_labels() {
        assert_eq!(clean_text("Study information for Monday: 11:00-3:00"), "11:00-3:00");
        assert_eq!(
            clean_text("Enter specific study goals for Wed (press Enter for none): Essay"),
            "Essay"
        );
        assert_eq!(clean_text("Plan Name: Gym"), "Gym");
        assert_eq!(clean_text("  "), "");
    }
}
