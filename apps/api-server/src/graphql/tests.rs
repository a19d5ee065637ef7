//! Schema-level tests: real GraphQL operations executed against the
//! in-memory store, with a recording mailer so the emailed-token flows can
//! be driven end to end.

use std::sync::Arc;

use async_graphql::Request;
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tokio::sync::Mutex;

use scribe_core::domain::{Category, Post, User};
use scribe_core::ports::{
    CategoryRepository, MailError, MailMessage, Mailer, PostRepository, TokenScope, TokenService,
    UserRepository,
};
use scribe_infra::database::{
    InMemoryCategoryRepository, InMemoryPostRepository, InMemoryStore, InMemoryUserRepository,
};
use scribe_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

use crate::identity::Identity;
use crate::state::AppState;

use super::{ServiceSchema, build_schema};

/// Mailer that records outbound messages for inspection.
#[derive(Default)]
struct RecordingMailer {
    outbox: Mutex<Vec<MailMessage>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        self.outbox.lock().await.push(message);
        Ok(())
    }
}

struct TestApp {
    schema: ServiceSchema,
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    posts: Arc<dyn PostRepository>,
    tokens: Arc<dyn TokenService>,
    mailer: Arc<RecordingMailer>,
}

impl TestApp {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let users: Arc<dyn UserRepository> =
            Arc::new(InMemoryUserRepository::new(store.clone()));
        let categories: Arc<dyn CategoryRepository> =
            Arc::new(InMemoryCategoryRepository::new(store.clone()));
        let posts: Arc<dyn PostRepository> = Arc::new(InMemoryPostRepository::new(store));
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            session_hours: 1,
            issuer: "test".to_string(),
        }));
        let mailer = Arc::new(RecordingMailer::default());

        let state = AppState {
            users: users.clone(),
            categories: categories.clone(),
            posts: posts.clone(),
            tokens: tokens.clone(),
            passwords: Arc::new(Argon2PasswordService::new()),
            mailer: mailer.clone(),
        };

        Self {
            schema: build_schema(&state),
            users,
            categories,
            posts,
            tokens,
            mailer,
        }
    }

    async fn seed_user(&self, username: &str) -> User {
        let mut user = User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "hash".to_string(),
        );
        user.activate();
        self.users.insert(user).await.unwrap()
    }

    async fn seed_category(&self, name: &str, slug: &str) -> Category {
        self.categories
            .insert(Category::root(name.to_string(), slug.to_string()))
            .await
            .unwrap()
    }

    async fn seed_post(&self, author: &User, category: &Category, title: &str) -> Post {
        self.posts
            .insert(Post::new(
                author.id,
                category.id,
                title.to_string(),
                "thumb.png".to_string(),
                "body".to_string(),
            ))
            .await
            .unwrap()
    }

    async fn execute(&self, query: &str) -> async_graphql::Response {
        self.schema.execute(query).await
    }

    async fn execute_as(&self, user: &User, query: &str) -> async_graphql::Response {
        let identity = Identity {
            user_id: user.id,
            username: user.username.clone(),
        };
        self.schema.execute(Request::new(query).data(identity)).await
    }
}

fn data(resp: &async_graphql::Response) -> serde_json::Value {
    assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
    resp.data.clone().into_json().unwrap()
}

fn first_error(resp: &async_graphql::Response) -> String {
    assert!(!resp.errors.is_empty(), "expected an error");
    resp.errors[0].message.clone()
}

#[tokio::test]
async fn test_create_post_returns_author() {
    let app = TestApp::new();
    let ada = app.seed_user("ada").await;
    let tech = app.seed_category("Tech", "tech").await;

    let resp = app
        .execute_as(
            &ada,
            &format!(
                r#"mutation {{
                    createPost(categoryId: "{}", title: "t1", thumbnail: "x.png", body: "hello") {{
                        post {{ title author {{ username }} category {{ name }} likes }}
                    }}
                }}"#,
                tech.id
            ),
        )
        .await;

    let data = data(&resp);
    assert_eq!(data["createPost"]["post"]["title"], "t1");
    assert_eq!(data["createPost"]["post"]["author"]["username"], "ada");
    assert_eq!(data["createPost"]["post"]["category"]["name"], "Tech");
    assert_eq!(data["createPost"]["post"]["likes"], 0);
}

#[tokio::test]
async fn test_mutations_require_login() {
    let app = TestApp::new();
    let tech = app.seed_category("Tech", "tech").await;

    let resp = app
        .execute(&format!(
            r#"mutation {{
                createPost(categoryId: "{}", title: "t1", thumbnail: "x", body: "b") {{ post {{ title }} }}
            }}"#,
            tech.id
        ))
        .await;

    assert_eq!(
        first_error(&resp),
        "You do not have permission to perform this action"
    );
}

#[tokio::test]
async fn test_create_post_unknown_category() {
    let app = TestApp::new();
    let ada = app.seed_user("ada").await;

    let resp = app
        .execute_as(
            &ada,
            &format!(
                r#"mutation {{
                    createPost(categoryId: "{}", title: "t1", thumbnail: "x", body: "b") {{ post {{ title }} }}
                }}"#,
                uuid::Uuid::new_v4()
            ),
        )
        .await;

    assert_eq!(first_error(&resp), "Category not found");
}

#[tokio::test]
async fn test_duplicate_title_per_author_rejected() {
    let app = TestApp::new();
    let ada = app.seed_user("ada").await;
    let tech = app.seed_category("Tech", "tech").await;
    app.seed_post(&ada, &tech, "t1").await;

    let resp = app
        .execute_as(
            &ada,
            &format!(
                r#"mutation {{
                    createPost(categoryId: "{}", title: "t1", thumbnail: "x", body: "b") {{ post {{ title }} }}
                }}"#,
                tech.id
            ),
        )
        .await;

    assert!(first_error(&resp).contains("unique"));
}

#[tokio::test]
async fn test_update_by_non_owner_matches_missing_post_error() {
    let app = TestApp::new();
    let ada = app.seed_user("ada").await;
    let bob = app.seed_user("bob").await;
    let tech = app.seed_category("Tech", "tech").await;
    let post = app.seed_post(&ada, &tech, "t1").await;

    let update = |post_id: String| {
        format!(
            r#"mutation {{ updatePost(postId: "{post_id}", title: "stolen") {{ post {{ title }} }} }}"#
        )
    };

    // Bob updating Ada's post...
    let foreign = app.execute_as(&bob, &update(post.id.to_string())).await;
    // ...and anyone updating a post that does not exist.
    let missing = app
        .execute_as(&bob, &update(uuid::Uuid::new_v4().to_string()))
        .await;

    let foreign_msg = first_error(&foreign);
    let missing_msg = first_error(&missing);
    assert_eq!(foreign_msg, missing_msg);
    assert_eq!(
        foreign_msg,
        "Post not found or you do not have permission to edit."
    );
}

#[tokio::test]
async fn test_update_with_empty_string_leaves_field_unchanged() {
    let app = TestApp::new();
    let ada = app.seed_user("ada").await;
    let tech = app.seed_category("Tech", "tech").await;
    let post = app.seed_post(&ada, &tech, "t1").await;

    let resp = app
        .execute_as(
            &ada,
            &format!(
                r#"mutation {{
                    updatePost(postId: "{}", title: "", body: "updated body") {{
                        post {{ title body }}
                    }}
                }}"#,
                post.id
            ),
        )
        .await;

    let data = data(&resp);
    assert_eq!(data["updatePost"]["post"]["title"], "t1");
    assert_eq!(data["updatePost"]["post"]["body"], "updated body");
}

#[tokio::test]
async fn test_delete_post_then_lookup_is_null() {
    let app = TestApp::new();
    let ada = app.seed_user("ada").await;
    let tech = app.seed_category("Tech", "tech").await;
    let post = app.seed_post(&ada, &tech, "t1").await;

    let resp = app
        .execute_as(
            &ada,
            &format!(r#"mutation {{ deletePost(postId: "{}") {{ ok }} }}"#, post.id),
        )
        .await;
    assert_eq!(data(&resp)["deletePost"]["ok"], true);

    let resp = app
        .execute(&format!(
            r#"query {{ postByName(author: "{}", title: "t1") {{ title }} }}"#,
            ada.id
        ))
        .await;
    assert!(data(&resp)["postByName"].is_null());
}

#[tokio::test]
async fn test_delete_by_non_owner_uses_conflated_message() {
    let app = TestApp::new();
    let ada = app.seed_user("ada").await;
    let bob = app.seed_user("bob").await;
    let tech = app.seed_category("Tech", "tech").await;
    let post = app.seed_post(&ada, &tech, "t1").await;

    let resp = app
        .execute_as(
            &bob,
            &format!(r#"mutation {{ deletePost(postId: "{}") {{ ok }} }}"#, post.id),
        )
        .await;

    assert_eq!(
        first_error(&resp),
        "Post not found or you do not have permission to delete."
    );
    // The post survived.
    assert!(app.posts.find_by_id(post.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_listings_exclude_soft_deleted_records() {
    let app = TestApp::new();
    let ada = app.seed_user("ada").await;
    let tech = app.seed_category("Tech", "tech").await;

    let mut hidden_post = Post::new(
        ada.id,
        tech.id,
        "hidden".to_string(),
        "x".to_string(),
        "b".to_string(),
    );
    hidden_post.meta.is_deleted = true;
    app.posts.insert(hidden_post).await.unwrap();

    let mut hidden_category = Category::root("Old".to_string(), "old".to_string());
    hidden_category.meta.is_deleted = true;
    app.categories.insert(hidden_category).await.unwrap();

    app.seed_post(&ada, &tech, "visible").await;

    let resp = app
        .execute("query { allPosts { edges { node { title } } } }")
        .await;
    let posts = data(&resp);
    let edges = posts["allPosts"]["edges"].as_array().unwrap().clone();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["node"]["title"], "visible");

    let resp = app
        .execute("query { allCategories { edges { node { name } } } }")
        .await;
    let categories = data(&resp);
    let edges = categories["allCategories"]["edges"].as_array().unwrap().clone();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["node"]["name"], "Tech");
}

#[tokio::test]
async fn test_category_tree_filters() {
    let app = TestApp::new();
    let tech = app.seed_category("Tech", "tech").await;
    let rust = app
        .categories
        .insert(Category::child_of(&tech, "Rust".to_string(), "rust".to_string()))
        .await
        .unwrap();
    app.categories
        .insert(Category::child_of(&rust, "Async".to_string(), "async".to_string()))
        .await
        .unwrap();

    // By exact level.
    let resp = app
        .execute("query { allCategories(filter: { level: 1 }) { edges { node { name level } } } }")
        .await;
    let by_level = data(&resp);
    let edges = by_level["allCategories"]["edges"].as_array().unwrap().clone();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["node"]["name"], "Rust");

    // By parent.
    let resp = app
        .execute(&format!(
            r#"query {{ allCategories(filter: {{ parent: "{}" }}) {{ edges {{ node {{ name }} }} }} }}"#,
            tech.id
        ))
        .await;
    let by_parent = data(&resp);
    let edges = by_parent["allCategories"]["edges"].as_array().unwrap().clone();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["node"]["name"], "Rust");

    // By name fragment.
    let resp = app
        .execute(
            r#"query { allCategories(filter: { name: { contains: "s" } }) { edges { node { name } } } }"#,
        )
        .await;
    let by_name = data(&resp);
    let names: Vec<String> = by_name["allCategories"]["edges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["node"]["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Rust", "Async"]);

    // Parent and level resolve through the tree.
    let resp = app
        .execute(r#"query { categoryByName(name: "Async") { level parent { name } } }"#)
        .await;
    let lookup = data(&resp);
    assert_eq!(lookup["categoryByName"]["level"], 2);
    assert_eq!(lookup["categoryByName"]["parent"]["name"], "Rust");
}

#[tokio::test]
async fn test_category_by_name_absent_is_null_not_error() {
    let app = TestApp::new();

    let resp = app
        .execute(r#"query { categoryByName(name: "missing") { name } }"#)
        .await;

    assert!(resp.errors.is_empty());
    assert!(data(&resp)["categoryByName"].is_null());
}

#[tokio::test]
async fn test_post_filters_match_related_rows() {
    let app = TestApp::new();
    let ada = app.seed_user("ada").await;
    let bob = app.seed_user("bob").await;
    let tech = app.seed_category("Tech", "tech").await;
    let art = app.seed_category("Art", "art").await;
    app.seed_post(&ada, &tech, "rust tips").await;
    app.seed_post(&bob, &art, "watercolors").await;

    let resp = app
        .execute(
            r#"query { allPosts(filter: { authorUsername: { eq: "ada" } }) { edges { node { title } } } }"#,
        )
        .await;
    let by_author = data(&resp);
    let edges = by_author["allPosts"]["edges"].as_array().unwrap().clone();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["node"]["title"], "rust tips");

    let resp = app
        .execute(
            r#"query { allPosts(filter: { categoryName: { contains: "Ar" } }) { edges { node { title } } } }"#,
        )
        .await;
    let by_category = data(&resp);
    let edges = by_category["allPosts"]["edges"].as_array().unwrap().clone();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["node"]["title"], "watercolors");

    let resp = app
        .execute(
            r#"query { allPosts(filter: { title: { contains: "tips" } }) { edges { node { title } } } }"#,
        )
        .await;
    assert_eq!(
        data(&resp)["allPosts"]["edges"].as_array().unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_pagination_cursors() {
    let app = TestApp::new();
    let ada = app.seed_user("ada").await;
    let tech = app.seed_category("Tech", "tech").await;

    // Distinct timestamps so newest-first ordering is deterministic.
    for i in 0..3 {
        let mut post = Post::new(
            ada.id,
            tech.id,
            format!("t{i}"),
            "x".to_string(),
            "b".to_string(),
        );
        post.meta.created_at = Utc::now() - TimeDelta::seconds(i);
        app.posts.insert(post).await.unwrap();
    }

    let resp = app
        .execute("query { allPosts(first: 2) { edges { cursor node { title } } pageInfo { hasNextPage endCursor } } }")
        .await;
    let page1 = data(&resp);
    let edges = page1["allPosts"]["edges"].as_array().unwrap().clone();
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0]["node"]["title"], "t0");
    assert_eq!(page1["allPosts"]["pageInfo"]["hasNextPage"], true);

    let end_cursor = page1["allPosts"]["pageInfo"]["endCursor"]
        .as_str()
        .unwrap()
        .to_string();
    let resp = app
        .execute(&format!(
            r#"query {{ allPosts(first: 2, after: "{end_cursor}") {{ edges {{ node {{ title }} }} pageInfo {{ hasNextPage hasPreviousPage }} }} }}"#
        ))
        .await;
    let page2 = data(&resp);
    let edges = page2["allPosts"]["edges"].as_array().unwrap().clone();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["node"]["title"], "t2");
    assert_eq!(page2["allPosts"]["pageInfo"]["hasNextPage"], false);
    assert_eq!(page2["allPosts"]["pageInfo"]["hasPreviousPage"], true);
}

#[tokio::test]
async fn test_me_query() {
    let app = TestApp::new();
    let ada = app.seed_user("ada").await;

    let resp = app.execute_as(&ada, "query { me { username email } }").await;
    assert_eq!(data(&resp)["me"]["username"], "ada");

    let resp = app.execute("query { me { username } }").await;
    assert!(data(&resp)["me"].is_null());
}

#[tokio::test]
async fn test_node_refetch_by_global_id() {
    let app = TestApp::new();
    let ada = app.seed_user("ada").await;
    let tech = app.seed_category("Tech", "tech").await;
    app.seed_post(&ada, &tech, "t1").await;

    let resp = app
        .execute("query { allPosts { edges { node { id } } } }")
        .await;
    let listing = data(&resp);
    let global_id = listing["allPosts"]["edges"][0]["node"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let resp = app
        .execute(&format!(
            r#"query {{ node(id: "{global_id}") {{ ... on Post {{ title }} }} }}"#
        ))
        .await;
    assert_eq!(data(&resp)["node"]["title"], "t1");

    // Unknown IDs resolve to null.
    let resp = app
        .execute(&format!(
            r#"query {{ node(id: "{}") {{ ... on Post {{ title }} }} }}"#,
            super::node::encode_global_id("Post", uuid::Uuid::new_v4()).as_str()
        ))
        .await;
    assert!(data(&resp)["node"].is_null());
}

#[tokio::test]
async fn test_account_lifecycle() {
    let app = TestApp::new();

    // Register.
    let resp = app
        .execute(
            r#"mutation {
                register(username: "ada", email: "ada@example.com",
                         password1: "s3cret-pass", password2: "s3cret-pass") {
                    success errors
                }
            }"#,
        )
        .await;
    assert_eq!(data(&resp)["register"]["success"], true);

    let user = app.users.find_by_username("ada").await.unwrap().unwrap();
    assert!(!user.is_verified);

    // Login before verification is rejected.
    let resp = app
        .execute(r#"mutation { tokenAuth(username: "ada", password: "s3cret-pass") { success errors } }"#)
        .await;
    let login = data(&resp);
    assert_eq!(login["tokenAuth"]["success"], false);
    assert_eq!(login["tokenAuth"]["errors"][0], "Please verify your account.");

    // Verify with the emailed activation token.
    let outbox = app.mailer.outbox.lock().await;
    let token = outbox[0]
        .body
        .strip_prefix("Your activation token: ")
        .unwrap()
        .to_string();
    drop(outbox);

    let resp = app
        .execute(&format!(
            r#"mutation {{ verifyAccount(token: "{token}") {{ success }} }}"#
        ))
        .await;
    assert_eq!(data(&resp)["verifyAccount"]["success"], true);

    // Login now succeeds and the session token resolves an identity.
    let resp = app
        .execute(r#"mutation { tokenAuth(username: "ada", password: "s3cret-pass") { success token user { username } } }"#)
        .await;
    let login = data(&resp);
    assert_eq!(login["tokenAuth"]["success"], true);
    assert_eq!(login["tokenAuth"]["user"]["username"], "ada");

    let session = login["tokenAuth"]["token"].as_str().unwrap();
    let claims = app.tokens.verify(session, TokenScope::Session).unwrap();
    assert_eq!(claims.username, "ada");
}

#[tokio::test]
async fn test_register_duplicate_username_fails_in_payload() {
    let app = TestApp::new();
    app.seed_user("ada").await;

    let resp = app
        .execute(
            r#"mutation {
                register(username: "ada", email: "other@example.com",
                         password1: "s3cret-pass", password2: "s3cret-pass") {
                    success errors
                }
            }"#,
        )
        .await;

    let payload = data(&resp);
    assert_eq!(payload["register"]["success"], false);
    assert_eq!(
        payload["register"]["errors"][0],
        "A user with that username already exists."
    );
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new();

    // Register and verify by hand so the stored hash is real.
    let resp = app
        .execute(
            r#"mutation {
                register(username: "ada", email: "ada@example.com",
                         password1: "old-password", password2: "old-password") {
                    success
                }
            }"#,
        )
        .await;
    assert_eq!(data(&resp)["register"]["success"], true);
    let mut user = app.users.find_by_username("ada").await.unwrap().unwrap();
    user.activate();
    app.users.update(user).await.unwrap();

    // Request a reset; the token arrives by mail.
    let resp = app
        .execute(r#"mutation { sendPasswordResetEmail(email: "ada@example.com") { success } }"#)
        .await;
    assert_eq!(data(&resp)["sendPasswordResetEmail"]["success"], true);

    let outbox = app.mailer.outbox.lock().await;
    let token = outbox
        .last()
        .unwrap()
        .body
        .strip_prefix("Your password reset token: ")
        .unwrap()
        .to_string();
    drop(outbox);

    let resp = app
        .execute(&format!(
            r#"mutation {{
                passwordReset(token: "{token}",
                              newPassword1: "new-password", newPassword2: "new-password") {{
                    success
                }}
            }}"#
        ))
        .await;
    assert_eq!(data(&resp)["passwordReset"]["success"], true);

    // Old password no longer works, new one does.
    let resp = app
        .execute(r#"mutation { tokenAuth(username: "ada", password: "old-password") { success } }"#)
        .await;
    assert_eq!(data(&resp)["tokenAuth"]["success"], false);

    let resp = app
        .execute(r#"mutation { tokenAuth(username: "ada", password: "new-password") { success } }"#)
        .await;
    assert_eq!(data(&resp)["tokenAuth"]["success"], true);
}

#[tokio::test]
async fn test_reset_email_for_unknown_address_still_succeeds() {
    let app = TestApp::new();

    let resp = app
        .execute(r#"mutation { sendPasswordResetEmail(email: "ghost@example.com") { success } }"#)
        .await;

    assert_eq!(data(&resp)["sendPasswordResetEmail"]["success"], true);
    assert!(app.mailer.outbox.lock().await.is_empty());
}
