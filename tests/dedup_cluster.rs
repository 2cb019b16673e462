// tests/dedup_cluster.rs
mod common;

use common::article;
use news_digest_engine::cluster::cluster;
use news_digest_engine::dedup::{deduplicate, DEFAULT_SCAN_CAP};
use news_digest_engine::similarity::{ratio, Matcher};
use news_digest_engine::source_priority::PriorityTable;

#[test]
fn duplicate_story_keeps_the_trusted_source() {
    let articles = vec![
        article("RBI cuts repo rate by 25 basis points", "https://rbi.org.in/x"),
        article("RBI cuts repo rate by 25 bps today", "https://timesofindia.com/y"),
    ];
    // Precondition of the scenario: the two titles read as the same story.
    assert!(Matcher::default().is_similar(&articles[0].title, &articles[1].title));

    let out = deduplicate(
        articles,
        &PriorityTable::default_seed(),
        &Matcher::default(),
        DEFAULT_SCAN_CAP,
    );
    assert_eq!(out.kept.len(), 1);
    assert_eq!(out.kept[0].link, "https://rbi.org.in/x");
}

#[test]
fn dedup_output_has_no_residual_duplicates() {
    let titles = [
        "RBI cuts repo rate by 25 basis points",
        "RBI cuts repo rate by 25 bps today",
        "Monsoon arrives early over Kerala coast",
        "Early monsoon arrival over Kerala coast",
        "ISRO launches navigation satellite",
    ];
    let articles: Vec<_> = titles
        .iter()
        .enumerate()
        .map(|(i, t)| article(t, &format!("https://example.com/{i}")))
        .collect();

    let m = Matcher::default();
    let out = deduplicate(articles, &PriorityTable::default_seed(), &m, DEFAULT_SCAN_CAP);

    for (i, a) in out.kept.iter().enumerate() {
        for b in out.kept.iter().skip(i + 1) {
            assert!(
                !m.is_similar(&a.title, &b.title),
                "residual duplicates: {:?} / {:?}",
                a.title,
                b.title
            );
        }
    }
}

#[test]
fn truncation_drops_only_the_lowest_priority_tail() {
    // 160 official-source articles and 40 unknown-domain ones. After the
    // priority sort the cap must cut exclusively into the unknown tail.
    let mut articles = Vec::new();
    for i in 0..160 {
        articles.push(article(
            &format!("official release {i} on subject {i}"),
            &format!("https://pib.gov.in/release/{i}"),
        ));
    }
    for i in 0..40 {
        articles.push(article(
            &format!("unknown blog post {i} about thing {i}"),
            &format!("https://randomblog.example/{i}"),
        ));
    }

    let out = deduplicate(
        articles,
        &PriorityTable::default_seed(),
        &Matcher::default(),
        DEFAULT_SCAN_CAP,
    );
    assert_eq!(out.truncated, 50);
    assert!(out.kept.iter().all(|a| a.link.contains("pib.gov.in")));
}

#[test]
fn clustering_partitions_the_raw_batch_exactly() {
    let articles = vec![
        article("RBI cuts repo rate by 25 basis points", "https://rbi.org.in/1"),
        article("RBI cuts repo rate by 25 bps today", "https://timesofindia.com/2"),
        article("Monsoon arrives early over Kerala coast", "https://thehindu.com/3"),
        article("ISRO launches navigation satellite", "https://isro.gov.in/4"),
    ];
    let n = articles.len();

    let clusters = cluster(
        articles,
        &PriorityTable::default_seed(),
        &Matcher::default(),
    );
    let members: usize = clusters.iter().map(|c| c.members.len()).sum();
    assert_eq!(members, n);
    assert!(clusters.iter().all(|c| !c.members.is_empty()));
    assert_eq!(clusters.len(), 3);
}

#[test]
fn similarity_ratio_is_symmetric_over_sampled_pairs() {
    let samples = [
        "Govt cuts repo rate",
        "RBI slashes repo rate by 25bps",
        "",
        "नीति आयोग releases index",
        "a",
    ];
    for a in samples {
        for b in samples {
            assert!((ratio(a, b) - ratio(b, a)).abs() < 1e-9);
        }
    }
}
