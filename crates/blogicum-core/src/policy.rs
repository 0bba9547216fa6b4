//! The access policy: visibility, ownership, and pagination rules.
//!
//! Every endpoint that decides whether a viewer may see or touch a record
//! goes through this module. The rules are deliberately defined once:
//!
//! - [`visible`] answers "may this viewer see this post?"
//! - [`owns`] answers "may this viewer mutate this record?"
//! - [`clamp_page`] and [`PageMeta`] define how feeds paginate.
//!
//! Listings apply the visibility rule at the query level (repositories
//! translate it into filters); detail lookups apply it here, after the
//! fetch. Authors always see their own posts, published or not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Comment, Post};

/// Fixed page size for every paginated feed.
pub const PAGE_SIZE: u64 = 10;

/// Whether `viewer` may see `post`.
///
/// True iff the viewer is the author, or the post is published, its
/// publication date has passed, and its category is published.
/// `category_is_published` is supplied by the caller because the post
/// record itself only carries the category id.
pub fn visible(
    post: &Post,
    category_is_published: bool,
    viewer: Option<Uuid>,
    now: DateTime<Utc>,
) -> bool {
    if viewer == Some(post.author_id) {
        return true;
    }
    post.is_published && post.pub_date <= now && category_is_published
}

/// A record with an author, subject to the ownership guard.
pub trait Authored {
    fn author_id(&self) -> Uuid;
}

impl Authored for Post {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

impl Authored for Comment {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

/// Whether `viewer` owns `record` and may therefore edit or delete it.
pub fn owns<T: Authored>(record: &T, viewer: Uuid) -> bool {
    record.author_id() == viewer
}

/// Clamp a requested 1-based page number into `1..=total_pages`.
///
/// An empty result set (zero pages) clamps to page 1, which then yields
/// an empty listing rather than an error.
pub fn clamp_page(requested: u64, total_pages: u64) -> u64 {
    requested.clamp(1, total_pages.max(1))
}

/// Pagination metadata attached to every feed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub number: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageMeta {
    /// Build metadata for a (already clamped) page number.
    pub fn new(number: u64, total_pages: u64) -> Self {
        Self {
            number,
            total_pages,
            has_next: number < total_pages,
            has_previous: number > 1,
        }
    }
}

/// One page of a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn sample_post(author: Uuid, published: bool, pub_date: DateTime<Utc>) -> Post {
        let mut post = Post::new(
            author,
            Uuid::new_v4(),
            "Title".to_owned(),
            "Text".to_owned(),
            pub_date,
        );
        post.is_published = published;
        post
    }

    #[test]
    fn published_past_post_in_published_category_is_visible_to_anyone() {
        let now = Utc::now();
        let post = sample_post(Uuid::new_v4(), true, now - TimeDelta::hours(1));

        assert!(visible(&post, true, None, now));
        assert!(visible(&post, true, Some(Uuid::new_v4()), now));
    }

    #[test]
    fn unpublished_post_is_hidden_from_everyone_but_the_author() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let post = sample_post(author, false, now - TimeDelta::hours(1));

        assert!(!visible(&post, true, None, now));
        assert!(!visible(&post, true, Some(Uuid::new_v4()), now));
        assert!(visible(&post, true, Some(author), now));
    }

    #[test]
    fn scheduled_post_becomes_visible_once_pub_date_passes() {
        let author = Uuid::new_v4();
        let pub_date = Utc::now() + TimeDelta::hours(1);
        let post = sample_post(author, true, pub_date);

        let before = pub_date - TimeDelta::minutes(30);
        assert!(!visible(&post, true, None, before));
        assert!(visible(&post, true, Some(author), before));

        let after = pub_date + TimeDelta::minutes(1);
        assert!(visible(&post, true, None, after));
    }

    #[test]
    fn unpublished_category_hides_the_post() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let post = sample_post(author, true, now - TimeDelta::hours(1));

        assert!(!visible(&post, false, None, now));
        assert!(!visible(&post, false, Some(Uuid::new_v4()), now));
        // ...except from the author.
        assert!(visible(&post, false, Some(author), now));
    }

    #[test]
    fn ownership_is_exact_author_match() {
        let author = Uuid::new_v4();
        let post = sample_post(author, true, Utc::now());
        let comment = Comment::new(post.id, author, "hi".to_owned());

        assert!(owns(&post, author));
        assert!(owns(&comment, author));
        assert!(!owns(&post, Uuid::new_v4()));
        assert!(!owns(&comment, Uuid::new_v4()));
    }

    #[test]
    fn page_clamping_at_both_ends() {
        assert_eq!(clamp_page(0, 5), 1);
        assert_eq!(clamp_page(1, 5), 1);
        assert_eq!(clamp_page(3, 5), 3);
        assert_eq!(clamp_page(99, 5), 5);
        // empty result set clamps to page 1
        assert_eq!(clamp_page(7, 0), 1);
    }

    #[test]
    fn page_meta_flags() {
        let first = PageMeta::new(1, 3);
        assert!(first.has_next);
        assert!(!first.has_previous);

        let middle = PageMeta::new(2, 3);
        assert!(middle.has_next);
        assert!(middle.has_previous);

        let last = PageMeta::new(3, 3);
        assert!(!last.has_next);
        assert!(last.has_previous);

        let only = PageMeta::new(1, 0);
        assert!(!only.has_next);
        assert!(!only.has_previous);
    }
}
