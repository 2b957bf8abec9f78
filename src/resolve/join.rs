//! Value joining rules shared by all sources.

/// Check if a value is empty or whitespace only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Append `piece` to `out`, putting `separator` only between two non-empty parts.
pub fn append_piece(out: &mut String, piece: &str, separator: &str) {
    if piece.is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push_str(separator);
    }
    out.push_str(piece);
}

/// Combine candidate values.
///
/// Blank candidates are skipped. With `use_first` the first non-blank
/// candidate is returned and the rest is never looked at; otherwise all
/// non-blank candidates are joined with `separator`.
pub fn collect_values<I, S>(candidates: I, use_first: bool, separator: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for candidate in candidates {
        let candidate = candidate.as_ref();
        if is_blank(candidate) {
            continue;
        }
        if use_first {
            return candidate.to_string();
        }
        append_piece(&mut out, candidate, separator);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_piece_skips_empty() {
        let mut out = String::new();
        append_piece(&mut out, "", "; ");
        append_piece(&mut out, "a", "; ");
        append_piece(&mut out, "", "; ");
        append_piece(&mut out, "b", "; ");
        assert_eq!(out, "a; b");
    }

    #[test]
    fn test_collect_join() {
        let values = ["one", "  ", "", "two", "three"];
        assert_eq!(collect_values(values, false, ", "), "one, two, three");
    }

    #[test]
    fn test_collect_use_first_skips_blank() {
        let values = ["", " ", "first", "second"];
        assert_eq!(collect_values(values, true, ", "), "first");
    }

    #[test]
    fn test_collect_use_first_is_lazy() {
        let mut seen = 0;
        let values = ["a", "b", "c"].into_iter().inspect(|_| seen += 1);
        assert_eq!(collect_values(values, true, " "), "a");
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_collect_nothing() {
        let values: [&str; 0] = [];
        assert_eq!(collect_values(values, false, " "), "");
        assert_eq!(collect_values(["  "], true, " "), "");
    }
}
