//! "Did you mean?" hints for unresolved event types and fields.

/// Levenshtein edit distance over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0usize; b_chars.len() + 1];

    for (i, a_ch) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = usize::from(a_ch != *b_ch);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

fn threshold(name_len: usize) -> usize {
    (name_len / 2).clamp(1, 3)
}

/// Closest candidate to `name`, compared case-insensitively. Ties keep the
/// first candidate.
pub fn closest<'a, I>(name: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let limit = threshold(name.chars().count());
    let lower = name.to_lowercase();

    candidates
        .into_iter()
        .map(|c| (c, edit_distance(&lower, &c.to_lowercase())))
        .filter(|(_, d)| *d <= limit)
        .fold(None::<(&'a str, usize)>, |best, (c, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((c, d)),
        })
        .map(|(c, _)| c)
}

/// `"; did you mean 'X'?"`, or an empty string.
pub fn did_you_mean<'a, I>(name: &str, candidates: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    closest(name, candidates)
        .map(|s| format!("; did you mean '{}'?", s))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("level", "level"), 0);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("level", "lvl"), 2);
    }

    #[test]
    fn test_closest_is_case_insensitive() {
        let names = ["LogEvent", "MyEvent"];
        assert_eq!(closest("logevent", names), Some("LogEvent"));
        assert_eq!(closest("LogEvnt", names), Some("LogEvent"));
    }

    #[test]
    fn test_no_suggestion_when_far() {
        assert_eq!(closest("Unknown", ["LogEvent", "MyEvent"]), None);
        assert_eq!(did_you_mean("Unknown", ["LogEvent"]), "");
    }

    #[test]
    fn test_did_you_mean_format() {
        assert_eq!(did_you_mean("Valu", ["Value"]), "; did you mean 'Value'?");
    }
}
