use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Utc};

use crate::domain::{AuthorId, CategoryId, Post, TagId};

/// A post predicate with every slug already resolved to an id.
///
/// All set fields must hold for a post to match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Lowercased keyword, matched as a substring.
    pub keyword: Option<String>,
    pub category_id: Option<CategoryId>,
    pub author_id: Option<AuthorId>,
    pub tag_id: Option<TagId>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// When set, only published posts posted at or before this instant match.
    pub published_before: Option<DateTime<Utc>>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post, tag_ids: &[TagId]) -> bool {
        if let Some(keyword) = &self.keyword {
            let hit = [&post.title, &post.short_description, &post.description]
                .iter()
                .any(|field| field.to_lowercase().contains(keyword.as_str()));
            if !hit {
                return false;
            }
        }
        if self.category_id.is_some_and(|id| post.category_id != id) {
            return false;
        }
        if self.author_id.is_some_and(|id| post.author_id != id) {
            return false;
        }
        if self.tag_id.is_some_and(|id| !tag_ids.contains(&id)) {
            return false;
        }
        if self.year.is_some_and(|y| post.posted_date.year() != y) {
            return false;
        }
        if self.month.is_some_and(|m| post.posted_date.month() != m) {
            return false;
        }
        if let Some(now) = self.published_before {
            if !post.published || post.posted_date > now {
                return false;
            }
        }
        true
    }
}

/// Default post order: newest `posted_date` first, then larger id first.
pub fn compare_posts(a: &Post, b: &Post) -> Ordering {
    b.posted_date
        .cmp(&a.posted_date)
        .then_with(|| b.id.cmp(&a.id))
}

pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(compare_posts);
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn post(id: i32, posted: DateTime<Utc>) -> Post {
        Post {
            id,
            title: format!("Post {id}"),
            short_description: "Short".to_string(),
            description: "Body text".to_string(),
            meta: String::new(),
            slug: format!("post-{id}"),
            image_url: None,
            published: true,
            posted_date: posted,
            modified_date: None,
            view_count: 0,
            author_id: 1,
            category_id: 1,
            details: None,
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = PostFilter::default();
        assert!(filter.matches(&post(1, at(2023, 1, 1)), &[]));
    }

    #[test]
    fn keyword_is_case_insensitive_over_three_fields() {
        let filter = PostFilter {
            keyword: Some("body".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&post(1, at(2023, 1, 1)), &[]));

        let filter = PostFilter {
            keyword: Some("missing".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&post(1, at(2023, 1, 1)), &[]));
    }

    #[test]
    fn conditions_are_conjunctive() {
        let mut p = post(1, at(2023, 3, 5));
        p.category_id = 3;
        let filter = PostFilter {
            category_id: Some(3),
            year: Some(2023),
            month: Some(3),
            tag_id: Some(9),
            ..Default::default()
        };

        assert!(filter.matches(&p, &[4, 9]));
        assert!(!filter.matches(&p, &[4]));
        p.category_id = 2;
        assert!(!filter.matches(&p, &[9]));
    }

    #[test]
    fn published_only_excludes_drafts_and_future_posts() {
        let now = at(2023, 6, 1);
        let filter = PostFilter {
            published_before: Some(now),
            ..Default::default()
        };

        assert!(filter.matches(&post(1, at(2023, 5, 1)), &[]));
        assert!(!filter.matches(&post(2, at(2023, 7, 1)), &[]));

        let mut draft = post(3, at(2023, 5, 1));
        draft.published = false;
        assert!(!filter.matches(&draft, &[]));
    }

    #[test]
    fn equal_timestamps_order_by_descending_id() {
        let same = at(2023, 1, 1);
        let mut posts = vec![post(1, same), post(3, at(2022, 1, 1)), post(2, same)];
        sort_posts(&mut posts);

        let ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
