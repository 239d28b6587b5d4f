//! Ordering of offline search hits.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use domains::SearchResult;

use super::matcher::{author_matches, TermPattern};

/// Score for a hit on the author's username or full name. Any identity
/// match outranks every body-only match.
pub(crate) const IDENTITY_WEIGHT: i64 = 1000;
/// Body score is this minus the character offset (Unicode scalar values)
/// of the first hit.
pub(crate) const CONTENT_WEIGHT: i64 = 100;

pub(crate) fn relevance_score(post: &SearchResult, pattern: &TermPattern) -> i64 {
    let identity = if author_matches(post, pattern) {
        IDENTITY_WEIGHT
    } else {
        0
    };
    let content = pattern
        .position(&post.body)
        .map(|offset| CONTENT_WEIGHT - i64::try_from(offset).unwrap_or(i64::MAX / 2))
        .unwrap_or(0);
    identity + content
}

/// Highest score first. Equal scores keep their cache order.
pub(crate) fn by_relevance(posts: Vec<SearchResult>, pattern: Option<&TermPattern>) -> Vec<SearchResult> {
    let Some(pattern) = pattern else {
        return posts;
    };

    let mut scored: Vec<(i64, SearchResult)> = posts
        .into_iter()
        .map(|post| (relevance_score(&post, pattern), post))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, post)| post).collect()
}

/// Newest `created_at` first; unparseable timestamps sort last.
pub(crate) fn by_date(posts: &mut [SearchResult]) {
    posts.sort_by(|a, b| newest_first(&a.created_at, &b.created_at));
}

fn newest_first(a: &str, b: &str) -> Ordering {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.cmp(a),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw).ok().or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::PostAuthor;

    fn post(id: &str, body: &str, username: &str, created_at: &str) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            body: body.to_string(),
            created_at: created_at.to_string(),
            users: PostAuthor {
                username: username.to_string(),
                ..PostAuthor::default()
            },
            ..SearchResult::default()
        }
    }

    fn ids(posts: &[SearchResult]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn identity_match_outranks_leading_body_match() {
        let pattern = TermPattern::new("maria").unwrap();
        let body_hit = post("body", "maria asked about custody", "jdoe", "");
        let user_hit = post("user", "question about custody", "maria_santos", "");

        assert_eq!(relevance_score(&body_hit, &pattern), 100);
        assert_eq!(relevance_score(&user_hit, &pattern), 1000);

        let ranked = by_relevance(vec![body_hit, user_hit], Some(&pattern));
        assert_eq!(ids(&ranked), ["user", "body"]);
    }

    #[test]
    fn earlier_body_matches_rank_higher_and_ties_keep_order() {
        let pattern = TermPattern::new("lease").unwrap();
        let ranked = by_relevance(
            vec![
                post("late", "my landlord broke the lease", "", ""),
                post("tie-a", "lease ended", "", ""),
                post("tie-b", "lease renewed", "", ""),
            ],
            Some(&pattern),
        );
        assert_eq!(ids(&ranked), ["tie-a", "tie-b", "late"]);
    }

    #[test]
    fn category_only_searches_keep_cache_order() {
        let posts = vec![post("b", "", "", ""), post("a", "", "", "")];
        assert_eq!(ids(&by_relevance(posts, None)), ["b", "a"]);
    }

    #[test]
    fn date_sort_is_newest_first_with_unparseable_last() {
        let mut posts = vec![
            post("old", "", "", "2024-01-01T00:00:00Z"),
            post("junk", "", "", "yesterday"),
            post("new", "", "", "2024-05-01T09:30:00.123456+00:00"),
            post("naive", "", "", "2024-03-01T12:00:00"),
        ];
        by_date(&mut posts);
        assert_eq!(ids(&posts), ["new", "naive", "old", "junk"]);
    }
}
