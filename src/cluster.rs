// src/cluster.rs
//! Groups collected articles into story clusters by title similarity.
//!
//! Each cluster is represented by its first member: a new article is compared
//! against representatives only, never against later members. That keeps the
//! pass linear in cluster count and makes membership depend only on input
//! order, which is already fixed upstream (most-trusted-first).

use metrics::counter;

use crate::ingest::types::Article;
use crate::similarity::Matcher;
use crate::source_priority::PriorityTable;

/// A group of articles judged to be the same story.
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Members in arrival order; `members[0]` is the representative.
    pub members: Vec<Article>,
}

impl Cluster {
    pub fn representative(&self) -> &Article {
        &self.members[0]
    }
}

/// Partition articles into clusters. Every article lands in exactly one
/// cluster; clusters appear in the order their representatives arrived.
///
/// Input is stably sorted most-trusted-first, so a cluster's representative
/// is the highest-priority member present when the cluster was created. No
/// size cap is applied here.
pub fn cluster(
    articles: Vec<Article>,
    priorities: &PriorityTable,
    matcher: &Matcher,
) -> Vec<Cluster> {
    let total = articles.len();

    let mut sorted = articles;
    sorted.sort_by_key(|a| priorities.priority_for(&a.link));

    let mut clusters: Vec<Cluster> = Vec::new();
    for article in sorted {
        let slot = clusters
            .iter_mut()
            .find(|c| matcher.is_similar(&c.representative().title, &article.title));
        match slot {
            Some(c) => c.members.push(article),
            None => clusters.push(Cluster {
                members: vec![article],
            }),
        }
    }

    counter!("clusters_formed_total").increment(clusters.len() as u64);
    tracing::info!(
        target: "cluster",
        articles = total,
        clusters = clusters.len(),
        "clustering complete"
    );
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, link: &str) -> Article {
        Article {
            title: title.into(),
            link: link.into(),
            summary: String::new(),
            published: String::new(),
        }
    }

    fn table() -> PriorityTable {
        PriorityTable::default_seed()
    }

    #[test]
    fn partition_is_exact() {
        let input = vec![
            article("RBI cuts repo rate by 25 basis points", "https://a/1"),
            article("Monsoon arrives early over Kerala coast", "https://a/2"),
            article("RBI cuts repo rate by 25 bps today", "https://a/3"),
            article("ISRO launches navigation satellite", "https://a/4"),
        ];
        let clusters = cluster(input, &table(), &Matcher::default());

        assert_eq!(clusters.len(), 3);
        let member_count: usize = clusters.iter().map(|c| c.members.len()).sum();
        assert_eq!(member_count, 4);
        assert_eq!(clusters[0].members.len(), 2);
    }

    #[test]
    fn representative_is_highest_priority_member() {
        // The aggregator copy arrives first, but priority sort puts the
        // official source ahead before clusters form.
        let input = vec![
            article(
                "RBI cuts repo rate by 25 bps today",
                "https://timesofindia.indiatimes.com/rbi",
            ),
            article(
                "RBI cuts repo rate by 25 basis points",
                "https://www.rbi.org.in/press/123",
            ),
        ];
        let clusters = cluster(input, &table(), &Matcher::default());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 2);
        assert!(clusters[0].representative().link.contains("rbi.org.in"));
    }

    #[test]
    fn cluster_order_follows_representative_arrival() {
        let input = vec![
            article("first story about railway safety audit", "https://a/1"),
            article("second story about coastal shipping bill", "https://a/2"),
        ];
        let clusters = cluster(input, &table(), &Matcher::default());
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].representative().link, "https://a/1");
        assert_eq!(clusters[1].representative().link, "https://a/2");
    }

    #[test]
    fn later_member_never_pulls_in_its_own_neighbors() {
        // c is similar to b but not to a. With representative-only comparison
        // and a arriving first, b joins a's cluster while c starts a new one.
        let a = "abcdefghij";
        let b = "abcdefghijklmn";
        let c = "efghijklmnopqr";
        let m = Matcher::default();
        assert!(m.is_similar(a, b));
        assert!(m.is_similar(b, c));
        assert!(!m.is_similar(a, c));

        let clusters = cluster(
            vec![
                article(a, "https://a/1"),
                article(b, "https://a/2"),
                article(c, "https://a/3"),
            ],
            &table(),
            &m,
        );
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members.len(), 2);
        assert_eq!(clusters[1].representative().link, "https://a/3");
    }

    #[test]
    fn empty_input_yields_no_clusters() {
        assert!(cluster(Vec::new(), &table(), &Matcher::default()).is_empty());
    }
}
