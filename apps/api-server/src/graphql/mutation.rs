//! Mutation surface.
//!
//! Post mutations are owner-scoped: they resolve the caller identity first
//! and look the post up by (id AND author), so a missing post and someone
//! else's post produce the identical error message. Account lifecycle
//! mutations follow the auth collaborator's payload convention: business
//! failures come back as `success=false` with an error list, not as
//! top-level GraphQL errors.

use std::sync::Arc;

use async_graphql::{Context, Error, ID, Object, Result, SimpleObject};

use scribe_core::DomainError;
use scribe_core::domain;
use scribe_core::error::RepoError;
use scribe_core::ports::{
    CategoryRepository, MailMessage, Mailer, PasswordService, PostRepository, TokenScope,
    TokenService, UserRepository,
};

use super::node::parse_id;
use super::repo_err;
use super::types::{Post, User};
use crate::identity::Identity;

const POST_EDIT_DENIED: &str = "Post not found or you do not have permission to edit.";
const POST_DELETE_DENIED: &str = "Post not found or you do not have permission to delete.";
const CATEGORY_NOT_FOUND: &str = "Category not found";
const INVALID_TOKEN: &str = "Invalid or expired token.";
const MIN_PASSWORD_LEN: usize = 8;

/// Resolved caller identity, or the Unauthorized error. Every owner-scoped
/// mutation calls this before touching any domain logic.
fn require_login(ctx: &Context<'_>) -> Result<Identity> {
    ctx.data_opt::<Identity>()
        .cloned()
        .ok_or_else(|| Error::new(DomainError::Unauthorized.to_string()))
}

/// Validate a new password pair; returns the failure message if any.
fn password_problem(password1: &str, password2: &str) -> Option<&'static str> {
    if password1 != password2 {
        return Some("The two password fields didn't match.");
    }
    if password1.len() < MIN_PASSWORD_LEN {
        return Some("Password must be at least 8 characters.");
    }
    None
}

fn internal_err(e: impl std::fmt::Display) -> Error {
    tracing::error!("Mutation failed: {}", e);
    Error::new("Internal server error")
}

#[derive(SimpleObject)]
pub struct CreatePostPayload {
    pub post: Post,
}

#[derive(SimpleObject)]
pub struct UpdatePostPayload {
    pub post: Post,
}

#[derive(SimpleObject)]
pub struct DeletePostPayload {
    pub ok: bool,
}

/// Outcome of an account-lifecycle mutation.
#[derive(SimpleObject)]
pub struct AccountPayload {
    pub success: bool,
    pub errors: Option<Vec<String>>,
}

impl AccountPayload {
    fn ok() -> Self {
        Self {
            success: true,
            errors: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: Some(vec![message.into()]),
        }
    }
}

/// Outcome of a login attempt.
#[derive(SimpleObject)]
pub struct TokenAuthPayload {
    pub success: bool,
    pub errors: Option<Vec<String>>,
    pub token: Option<String>,
    pub user: Option<User>,
}

impl TokenAuthPayload {
    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: Some(vec![message.into()]),
            token: None,
            user: None,
        }
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a post owned by the caller.
    async fn create_post(
        &self,
        ctx: &Context<'_>,
        category_id: ID,
        title: String,
        thumbnail: String,
        body: String,
    ) -> Result<CreatePostPayload> {
        let identity = require_login(ctx)?;
        let categories = ctx.data_unchecked::<Arc<dyn CategoryRepository>>();
        let posts = ctx.data_unchecked::<Arc<dyn PostRepository>>();

        let category = match parse_id(&category_id, "Category") {
            Some(id) => categories.find_by_id(id).await.map_err(repo_err)?,
            None => None,
        }
        .ok_or_else(|| Error::new(CATEGORY_NOT_FOUND))?;

        let post = domain::Post::new(identity.user_id, category.id, title, thumbnail, body);
        let post = posts.insert(post).await.map_err(repo_err)?;

        tracing::info!(author = %identity.username, post_id = %post.id, "Post created");
        Ok(CreatePostPayload { post: Post(post) })
    }

    /// Update one of the caller's posts. A field is applied only when it is
    /// supplied and non-empty; an empty string leaves the stored value
    /// untouched.
    async fn update_post(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        title: Option<String>,
        body: Option<String>,
        thumbnail: Option<String>,
        category_id: Option<ID>,
    ) -> Result<UpdatePostPayload> {
        let identity = require_login(ctx)?;
        let posts = ctx.data_unchecked::<Arc<dyn PostRepository>>();

        let mut post = match parse_id(&post_id, "Post") {
            Some(id) => posts
                .find_owned(id, identity.user_id)
                .await
                .map_err(repo_err)?,
            None => None,
        }
        .ok_or_else(|| Error::new(POST_EDIT_DENIED))?;

        if let Some(title) = title.filter(|v| !v.is_empty()) {
            post.title = title;
        }
        if let Some(body) = body.filter(|v| !v.is_empty()) {
            post.body = body;
        }
        if let Some(thumbnail) = thumbnail.filter(|v| !v.is_empty()) {
            post.thumbnail = thumbnail;
        }
        if let Some(category_id) = category_id {
            let categories = ctx.data_unchecked::<Arc<dyn CategoryRepository>>();
            let category = match parse_id(&category_id, "Category") {
                Some(id) => categories.find_by_id(id).await.map_err(repo_err)?,
                None => None,
            }
            .ok_or_else(|| Error::new(CATEGORY_NOT_FOUND))?;
            post.category_id = category.id;
        }

        let post = posts.update(post).await.map_err(repo_err)?;
        Ok(UpdatePostPayload { post: Post(post) })
    }

    /// Hard-delete one of the caller's posts.
    async fn delete_post(&self, ctx: &Context<'_>, post_id: ID) -> Result<DeletePostPayload> {
        let identity = require_login(ctx)?;
        let posts = ctx.data_unchecked::<Arc<dyn PostRepository>>();

        let post = match parse_id(&post_id, "Post") {
            Some(id) => posts
                .find_owned(id, identity.user_id)
                .await
                .map_err(repo_err)?,
            None => None,
        }
        .ok_or_else(|| Error::new(POST_DELETE_DENIED))?;

        posts.delete(post.id).await.map_err(repo_err)?;

        tracing::info!(author = %identity.username, post_id = %post.id, "Post deleted");
        Ok(DeletePostPayload { ok: true })
    }

    /// Register a new account. The account starts unverified; an activation
    /// token is emailed to the given address.
    async fn register(
        &self,
        ctx: &Context<'_>,
        username: String,
        email: String,
        password1: String,
        password2: String,
    ) -> Result<AccountPayload> {
        let users = ctx.data_unchecked::<Arc<dyn UserRepository>>();
        let passwords = ctx.data_unchecked::<Arc<dyn PasswordService>>();
        let tokens = ctx.data_unchecked::<Arc<dyn TokenService>>();
        let mailer = ctx.data_unchecked::<Arc<dyn Mailer>>();

        if username.trim().is_empty() {
            return Ok(AccountPayload::fail("Username is required."));
        }
        if email.is_empty() || !email.contains('@') {
            return Ok(AccountPayload::fail("Invalid email address."));
        }
        if let Some(problem) = password_problem(&password1, &password2) {
            return Ok(AccountPayload::fail(problem));
        }

        if users
            .find_by_username(&username)
            .await
            .map_err(repo_err)?
            .is_some()
        {
            return Ok(AccountPayload::fail(
                "A user with that username already exists.",
            ));
        }
        if users
            .find_by_email(&email)
            .await
            .map_err(repo_err)?
            .is_some()
        {
            return Ok(AccountPayload::fail(
                "A user with that email already exists.",
            ));
        }

        let password_hash = passwords.hash(&password1).map_err(internal_err)?;
        let user = domain::User::new(username, email, password_hash);

        let user = match users.insert(user).await {
            Ok(user) => user,
            // Lost the race against a concurrent registration.
            Err(RepoError::Constraint(msg)) => return Ok(AccountPayload::fail(msg)),
            Err(e) => return Err(repo_err(e)),
        };

        let token = tokens
            .issue(user.id, &user.username, TokenScope::Activation)
            .map_err(internal_err)?;
        mailer
            .send(MailMessage {
                to: user.email.clone(),
                subject: "Activate your account".to_string(),
                body: format!("Your activation token: {token}"),
            })
            .await
            .map_err(internal_err)?;

        tracing::info!(username = %user.username, "Account registered");
        Ok(AccountPayload::ok())
    }

    /// Verify an account with an emailed activation token.
    async fn verify_account(&self, ctx: &Context<'_>, token: String) -> Result<AccountPayload> {
        let users = ctx.data_unchecked::<Arc<dyn UserRepository>>();
        let tokens = ctx.data_unchecked::<Arc<dyn TokenService>>();

        let Ok(claims) = tokens.verify(&token, TokenScope::Activation) else {
            return Ok(AccountPayload::fail(INVALID_TOKEN));
        };
        let Some(mut user) = users.find_by_id(claims.user_id).await.map_err(repo_err)? else {
            return Ok(AccountPayload::fail(INVALID_TOKEN));
        };

        user.activate();
        users.update(user).await.map_err(repo_err)?;

        Ok(AccountPayload::ok())
    }

    /// Log in with username and password; issues a session token.
    async fn token_auth(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> Result<TokenAuthPayload> {
        let users = ctx.data_unchecked::<Arc<dyn UserRepository>>();
        let passwords = ctx.data_unchecked::<Arc<dyn PasswordService>>();
        let tokens = ctx.data_unchecked::<Arc<dyn TokenService>>();

        let Some(user) = users.find_by_username(&username).await.map_err(repo_err)? else {
            return Ok(TokenAuthPayload::fail("Please enter valid credentials."));
        };

        let valid = passwords
            .verify(&password, &user.password_hash)
            .map_err(internal_err)?;
        if !valid {
            return Ok(TokenAuthPayload::fail("Please enter valid credentials."));
        }
        if !user.is_verified || !user.is_active {
            return Ok(TokenAuthPayload::fail("Please verify your account."));
        }

        let token = tokens
            .issue(user.id, &user.username, TokenScope::Session)
            .map_err(internal_err)?;

        Ok(TokenAuthPayload {
            success: true,
            errors: None,
            token: Some(token),
            user: Some(User(user)),
        })
    }

    /// Update the caller's profile fields.
    async fn update_account(
        &self,
        ctx: &Context<'_>,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Result<AccountPayload> {
        let identity = require_login(ctx)?;
        let users = ctx.data_unchecked::<Arc<dyn UserRepository>>();

        let Some(mut user) = users.find_by_id(identity.user_id).await.map_err(repo_err)? else {
            return Ok(AccountPayload::fail("Account not found."));
        };

        if let Some(first_name) = first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = last_name {
            user.last_name = Some(last_name);
        }
        users.update(user).await.map_err(repo_err)?;

        Ok(AccountPayload::ok())
    }

    /// Re-send the activation email. Always succeeds, so callers cannot probe
    /// which addresses are registered.
    async fn resend_activation_email(
        &self,
        ctx: &Context<'_>,
        email: String,
    ) -> Result<AccountPayload> {
        let users = ctx.data_unchecked::<Arc<dyn UserRepository>>();
        let tokens = ctx.data_unchecked::<Arc<dyn TokenService>>();
        let mailer = ctx.data_unchecked::<Arc<dyn Mailer>>();

        if let Some(user) = users.find_by_email(&email).await.map_err(repo_err)? {
            if !user.is_verified {
                let token = tokens
                    .issue(user.id, &user.username, TokenScope::Activation)
                    .map_err(internal_err)?;
                mailer
                    .send(MailMessage {
                        to: user.email.clone(),
                        subject: "Activate your account".to_string(),
                        body: format!("Your activation token: {token}"),
                    })
                    .await
                    .map_err(internal_err)?;
            }
        }

        Ok(AccountPayload::ok())
    }

    /// Send a password-reset email. Always succeeds, same as above.
    async fn send_password_reset_email(
        &self,
        ctx: &Context<'_>,
        email: String,
    ) -> Result<AccountPayload> {
        let users = ctx.data_unchecked::<Arc<dyn UserRepository>>();
        let tokens = ctx.data_unchecked::<Arc<dyn TokenService>>();
        let mailer = ctx.data_unchecked::<Arc<dyn Mailer>>();

        if let Some(user) = users.find_by_email(&email).await.map_err(repo_err)? {
            let token = tokens
                .issue(user.id, &user.username, TokenScope::PasswordReset)
                .map_err(internal_err)?;
            mailer
                .send(MailMessage {
                    to: user.email.clone(),
                    subject: "Reset your password".to_string(),
                    body: format!("Your password reset token: {token}"),
                })
                .await
                .map_err(internal_err)?;
        }

        Ok(AccountPayload::ok())
    }

    /// Set a new password with an emailed reset token.
    async fn password_reset(
        &self,
        ctx: &Context<'_>,
        token: String,
        new_password1: String,
        new_password2: String,
    ) -> Result<AccountPayload> {
        let users = ctx.data_unchecked::<Arc<dyn UserRepository>>();
        let passwords = ctx.data_unchecked::<Arc<dyn PasswordService>>();
        let tokens = ctx.data_unchecked::<Arc<dyn TokenService>>();

        let Ok(claims) = tokens.verify(&token, TokenScope::PasswordReset) else {
            return Ok(AccountPayload::fail(INVALID_TOKEN));
        };
        if let Some(problem) = password_problem(&new_password1, &new_password2) {
            return Ok(AccountPayload::fail(problem));
        }
        let Some(mut user) = users.find_by_id(claims.user_id).await.map_err(repo_err)? else {
            return Ok(AccountPayload::fail(INVALID_TOKEN));
        };

        user.password_hash = passwords.hash(&new_password1).map_err(internal_err)?;
        users.update(user).await.map_err(repo_err)?;

        tracing::info!(username = %claims.username, "Password reset");
        Ok(AccountPayload::ok())
    }

    /// Change the caller's password.
    async fn password_change(
        &self,
        ctx: &Context<'_>,
        old_password: String,
        new_password1: String,
        new_password2: String,
    ) -> Result<AccountPayload> {
        let identity = require_login(ctx)?;
        let users = ctx.data_unchecked::<Arc<dyn UserRepository>>();
        let passwords = ctx.data_unchecked::<Arc<dyn PasswordService>>();

        let Some(mut user) = users.find_by_id(identity.user_id).await.map_err(repo_err)? else {
            return Ok(AccountPayload::fail("Account not found."));
        };

        let valid = passwords
            .verify(&old_password, &user.password_hash)
            .map_err(internal_err)?;
        if !valid {
            return Ok(AccountPayload::fail("Invalid password."));
        }
        if let Some(problem) = password_problem(&new_password1, &new_password2) {
            return Ok(AccountPayload::fail(problem));
        }

        user.password_hash = passwords.hash(&new_password1).map_err(internal_err)?;
        users.update(user).await.map_err(repo_err)?;

        Ok(AccountPayload::ok())
    }
}
