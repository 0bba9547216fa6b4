//! Mapping from domain records to response DTOs.

use std::collections::HashMap;

use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Post, PostPreview, User};
use blogicum_core::policy::Page;
use blogicum_shared::dto::{
    AccountResponse, CategoryResponse, CommentResponse, PageResponse, PostResponse,
    ProfileResponse,
};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Resolve author usernames for a set of user ids.
///
/// A referenced author that no longer exists would violate the cascade
/// rules, so that case is an internal error rather than a 404.
pub async fn usernames(
    state: &AppState,
    ids: impl IntoIterator<Item = Uuid>,
) -> AppResult<HashMap<Uuid, String>> {
    let mut map = HashMap::new();
    for id in ids {
        if map.contains_key(&id) {
            continue;
        }
        let user = state
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("author {id} missing")))?;
        map.insert(id, user.username);
    }
    Ok(map)
}

pub fn post_response(post: Post, author: String, comment_count: Option<u64>) -> PostResponse {
    PostResponse {
        id: post.id,
        author,
        category_id: post.category_id,
        location_id: post.location_id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        is_published: post.is_published,
        image: post.image,
        created_at: post.created_at,
        comment_count,
    }
}

pub fn comment_response(comment: Comment, author: String) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author,
        text: comment.text,
        created_at: comment.created_at,
    }
}

/// Render one feed page, attaching each post's author username.
pub fn feed_page(page: Page<PostPreview>, authors: &HashMap<Uuid, String>) -> PageResponse<PostResponse> {
    let items = page
        .items
        .into_iter()
        .map(|preview| {
            let author = authors
                .get(&preview.post.author_id)
                .cloned()
                .unwrap_or_default();
            post_response(preview.post, author, Some(preview.comment_count))
        })
        .collect();

    PageResponse {
        items,
        page: page.meta.number,
        total_pages: page.meta.total_pages,
        has_next: page.meta.has_next,
        has_previous: page.meta.has_previous,
    }
}

pub fn category_response(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        title: category.title,
        description: category.description,
        slug: category.slug,
    }
}

pub fn profile_response(user: &User) -> ProfileResponse {
    ProfileResponse {
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    }
}

/// The account holder's own view, email included.
pub fn account_response(user: &User) -> AccountResponse {
    AccountResponse {
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone(),
    }
}
