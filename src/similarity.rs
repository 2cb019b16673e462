//! Title similarity: sequence-matcher ratio plus a thresholded predicate.
//!
//! The ratio is `2*M / T`, where `M` is the total length of matching
//! contiguous runs found by greedy longest-common-substring matching over the
//! two strings and `T` is the combined length of both. This is the single
//! boolean decision primitive shared by dedup and clustering, so both
//! pipelines stay in agreement about what "same story" means.
//!
//! The predicate is not transitive: a~b and b~c does not imply a~c, so
//! results depend on processing order. Callers keep a fixed scan order.
//!
//! NOTE: This module is intentionally self-contained and zero-deps.

use std::collections::HashMap;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.70;

/// Longest matching block of `a[alo..ahi]` and `b[blo..bhi]`.
/// Returns `(i, j, size)`; ties resolve to the earliest `i`, then earliest `j`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &ch) in b.iter().enumerate().take(bhi).skip(blo) {
        b2j.entry(ch).or_default().push(j);
    }

    let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0usize);
    // j2len[j] = length of the longest run ending at a[i], b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for i in alo..ahi {
        let mut newj2len: HashMap<usize, usize> = HashMap::new();
        if let Some(js) = b2j.get(&a[i]) {
            for &j in js {
                let k = j
                    .checked_sub(1)
                    .and_then(|p| j2len.get(&p))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                newj2len.insert(j, k);
                if k > bestsize {
                    besti = i + 1 - k;
                    bestj = j + 1 - k;
                    bestsize = k;
                }
            }
        }
        j2len = newj2len;
    }

    (besti, bestj, bestsize)
}

/// Total length of all matching blocks (greedy: longest first, then recurse
/// into the regions left and right of it).
fn total_match_size(a: &[char], b: &[char]) -> usize {
    let mut total = 0usize;
    let mut queue: Vec<(usize, usize, usize, usize)> = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        if alo >= ahi || blo >= bhi {
            continue;
        }
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k > 0 {
            total += k;
            queue.push((alo, i, blo, j));
            queue.push((i + k, ahi, j + k, bhi));
        }
    }

    total
}

/// Similarity ratio in `[0.0, 1.0]`. Symmetric; two empty strings are 1.0.
///
/// Greedy block matching is order-sensitive, so the operands are put into a
/// canonical order (shorter first, ties lexicographic) before matching. That
/// makes `ratio(a, b) == ratio(b, a)` hold for all inputs.
pub fn ratio(a: &str, b: &str) -> f64 {
    let mut x: Vec<char> = a.chars().collect();
    let mut y: Vec<char> = b.chars().collect();
    let t = x.len() + y.len();
    if t == 0 {
        return 1.0;
    }
    if (y.len(), &y) < (x.len(), &x) {
        std::mem::swap(&mut x, &mut y);
    }
    let m = total_match_size(&x, &y);
    2.0 * m as f64 / t as f64
}

/// Thresholded, case-insensitive "same story" predicate.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    threshold: f64,
}

impl Matcher {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// True if the lower-cased ratio strictly exceeds the threshold.
    pub fn is_similar(&self, a: &str, b: &str) -> bool {
        ratio(&a.to_lowercase(), &b.to_lowercase()) > self.threshold
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert!((ratio("abcdef", "abcdef") - 1.0).abs() < 1e-9);
        assert!((ratio("", "") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn known_ratio_value() {
        // Blocks: "abcd" (4) out of T = 6 + 6 -> 2*4/12
        let r = ratio("abcdxy", "pqabcd");
        assert!((r - 8.0 / 12.0).abs() < 1e-9, "got {r}");
    }

    #[test]
    fn ratio_is_symmetric() {
        let pairs = [
            ("Govt cuts repo rate", "RBI slashes repo rate by 25bps"),
            ("short", "a much longer sentence entirely"),
            ("", "nonempty"),
            ("ααβγ", "αβγδ"),
        ];
        for (a, b) in pairs {
            assert!(
                (ratio(a, b) - ratio(b, a)).abs() < 1e-9,
                "asymmetric for {a:?} / {b:?}"
            );
        }
    }

    #[test]
    fn unbalanced_lengths_score_the_same_both_ways() {
        // Greedy matching over ("short", long) and (long, "short") finds
        // different blocks; the canonical operand order must hide that.
        let a = "short";
        let b = "a much longer sentence entirely";
        let r = ratio(a, b);
        assert!((r - ratio(b, a)).abs() < 1e-9);
        assert!((r - 4.0 / 36.0).abs() < 1e-9, "got {r}");
    }

    #[test]
    fn matcher_is_reflexive_for_nonempty() {
        let m = Matcher::default();
        assert!(m.is_similar("Supreme Court verdict", "Supreme Court verdict"));
        assert!(m.is_similar("a", "a"));
    }

    #[test]
    fn matcher_is_case_insensitive() {
        let m = Matcher::default();
        assert!(m.is_similar("RBI CUTS REPO RATE", "rbi cuts repo rate"));
    }

    #[test]
    fn near_duplicate_headlines_cross_threshold() {
        let m = Matcher::default();
        assert!(m.is_similar(
            "RBI cuts repo rate by 25 basis points",
            "RBI cuts repo rate by 25 bps today"
        ));
        assert!(!m.is_similar(
            "ISRO launches new navigation satellite",
            "Parliament passes constitutional amendment"
        ));
    }

    #[test]
    fn threshold_is_strict() {
        // ratio("ab", "abcd") = 2*2/6 = 0.666..; threshold 0.66 passes, 0.67 fails
        assert!(Matcher::new(0.66).is_similar("ab", "abcd"));
        assert!(!Matcher::new(0.67).is_similar("ab", "abcd"));
    }
}
