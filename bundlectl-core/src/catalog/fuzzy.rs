//! Approximate name matching for keyword search
//!
//! Both functions compare the lower-cased forms of their inputs,
//! character by character.

/// Edit distance (insert, delete, substitute at unit cost) between `a` and `b`
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    distance_table(&a, &b)
}

/// Similarity of `a` and `b` in `[0, 1]`
///
/// `(L - distance) / L` where `L` is the length of the longer string.
/// Two empty strings score `1.0`.
pub fn score(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    // The distance never exceeds the length of the longer string.
    let longer = a.len().max(b.len());
    if longer == 0 {
        return 1.0;
    }

    let distance = distance_table(&a, &b);
    (longer - distance) as f64 / longer as f64
}

fn distance_table(a: &[char], b: &[char]) -> usize {
    let width = b.len() + 1;
    let mut d = vec![0usize; (a.len() + 1) * width];

    for i in 0..=a.len() {
        d[i * width] = i;
    }
    for j in 0..=b.len() {
        d[j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let at = i * width + j;
            d[at] = if a[i - 1] == b[j - 1] {
                d[at - width - 1]
            } else {
                1 + d[at - width].min(d[at - 1]).min(d[at - width - 1])
            };
        }
    }

    d[a.len() * width + b.len()]
}

#[cfg(test)]
mod fuzzy_tests {
    use super::*;

    #[test]
    fn test_edit_distance_base_cases() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("", "falco"), 5);
        assert_eq!(edit_distance("rules", ""), 5);
    }

    #[test]
    fn test_edit_distance_classic() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("flaw", "lawn"), 2);
        assert_eq!(edit_distance("k8saudit", "k8saudit-eks"), 4);
        assert_eq!(edit_distance("abc", "xyz"), 3);
    }

    #[test]
    fn test_edit_distance_ignores_case() {
        assert_eq!(edit_distance("CloudTrail", "cloudtrail"), 0);
        assert_eq!(edit_distance("JSON", "json"), 0);
    }

    #[test]
    fn test_edit_distance_is_symmetric() {
        let pairs = [("okta", "github"), ("falco-rules", "rules"), ("dummy", "dummy_c")];
        for (a, b) in pairs {
            assert_eq!(edit_distance(a, b), edit_distance(b, a), "{a} vs {b}");
        }
    }

    #[test]
    fn test_score_bounds() {
        assert_eq!(score("abc", "abc"), 1.0);
        assert_eq!(score("", ""), 1.0);
        assert_eq!(score("abc", "xyz"), 0.0);
        assert_eq!(score("", "abc"), 0.0);
    }

    #[test]
    fn test_score_ratio() {
        // distance 1 over 5 characters
        assert_eq!(score("rule", "rules"), 0.8);
        assert_eq!(score("rule", "mule"), 0.75);
        assert_eq!(score("Rule", "rule"), 1.0);

        let s = score("k8saudit", "k8saudit-eks");
        assert!((s - 8.0 / 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_counts_characters() {
        assert_eq!(edit_distance("évènement", "evenement"), 2);
        let s = score("évènement", "evenement");
        assert!((s - 7.0 / 9.0).abs() < f64::EPSILON);
    }
}
