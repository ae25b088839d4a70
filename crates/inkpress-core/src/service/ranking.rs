use std::cmp::Reverse;
use std::collections::HashMap;

use crate::domain::{Author, AuthorItem};

/// Authors ordered by published post count (descending), ties broken by
/// ascending id, truncated to `limit`. A non-positive limit yields nothing.
pub fn rank_authors(authors: Vec<Author>, counts: &HashMap<i32, u64>, limit: i64) -> Vec<AuthorItem> {
    if limit <= 0 {
        return Vec::new();
    }

    let mut items = with_post_counts(authors, counts, |a| a.id, |author, post_count| AuthorItem {
        author,
        post_count,
    });
    items.sort_by_key(|item| (Reverse(item.post_count), item.author.id));
    items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    items
}

/// Pair each entity with its published post count (0 when absent), keeping
/// the input order.
pub fn with_post_counts<E, I>(
    entities: Vec<E>,
    counts: &HashMap<i32, u64>,
    id_of: impl Fn(&E) -> i32,
    make: impl Fn(E, u64) -> I,
) -> Vec<I> {
    entities
        .into_iter()
        .map(|entity| {
            let count = counts.get(&id_of(&entity)).copied().unwrap_or(0);
            make(entity, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn author(id: i32) -> Author {
        Author {
            id,
            full_name: format!("Author {id}"),
            email: format!("a{id}@example.com"),
            bio: None,
            slug: format!("author-{id}"),
            image_url: None,
            joined_date: Utc::now(),
        }
    }

    #[test]
    fn ties_resolve_by_ascending_id() {
        let authors = vec![author(3), author(1), author(2)];
        let counts = HashMap::from([(1, 3), (2, 5), (3, 5)]);

        let ranked = rank_authors(authors, &counts, 2);
        let ids: Vec<(i32, u64)> = ranked.iter().map(|i| (i.author.id, i.post_count)).collect();
        assert_eq!(ids, vec![(2, 5), (3, 5)]);
    }

    #[test]
    fn authors_without_posts_rank_last_with_zero() {
        let ranked = rank_authors(vec![author(1), author(2)], &HashMap::from([(2, 1)]), 10);
        let ids: Vec<(i32, u64)> = ranked.iter().map(|i| (i.author.id, i.post_count)).collect();
        assert_eq!(ids, vec![(2, 1), (1, 0)]);
    }

    #[test]
    fn non_positive_limit_is_empty() {
        let counts = HashMap::from([(1, 1)]);
        assert!(rank_authors(vec![author(1)], &counts, 0).is_empty());
        assert!(rank_authors(vec![author(1)], &counts, -4).is_empty());
    }
}
