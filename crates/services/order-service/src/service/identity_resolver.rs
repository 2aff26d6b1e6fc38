//! Identity resolution - maps external chat-platform accounts to users.
//!
//! Resolution is idempotent: the first call for an external id creates the
//! user and its binding, every later call returns that same user. Two
//! transactions racing on a fresh id both end up with the winner's user.

use std::sync::Arc;

use async_trait::async_trait;

use common::{AppError, AppResult};
use domain::{generated_display_name, require_identity, User, UserRole};

use crate::infra::{TransactionContext, UnitOfWork};
use crate::with_transaction;

/// Resolve `external_id` to a user inside the caller's transaction.
///
/// New users get the display name `kook_<external_id>` and the role from
/// `role_hint`, defaulting to `PLAYER`. A lost insert race is absorbed by
/// re-reading the binding the other transaction committed.
pub async fn resolve_identity(
    ctx: &TransactionContext<'_>,
    external_id: &str,
    role_hint: Option<&str>,
) -> AppResult<User> {
    require_identity("external_id", external_id)?;
    let identities = ctx.identities();

    if let Some(user) = identities.find_by_external_id(external_id).await? {
        return Ok(user);
    }

    let role = UserRole::from_hint(role_hint);
    let display_name = generated_display_name(external_id);
    if let Some(user) = identities
        .insert_with_binding(external_id, &display_name, role)
        .await?
    {
        tracing::info!(user_id = user.id, external_id, role = %role, "User created for external account");
        return Ok(user);
    }

    tracing::debug!(external_id, "Lost binding race, re-reading");
    identities
        .find_by_external_id(external_id)
        .await?
        .ok_or_else(|| AppError::internal(format!("binding for {} vanished", external_id)))
}

/// Identity service trait for dependency injection.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Resolve or create the user for an external id in its own transaction
    async fn resolve(&self, external_id: &str, role_hint: Option<&str>) -> AppResult<User>;

    /// Bind an external id to a user with an explicit display name and role.
    ///
    /// Returns the bound user and whether it was created by this call. An
    /// existing binding is left as it is.
    async fn bind(
        &self,
        external_id: &str,
        display_name: &str,
        role: UserRole,
    ) -> AppResult<(User, bool)>;
}

/// Concrete implementation of IdentityService
pub struct IdentityResolver<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> IdentityResolver<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork + 'static> IdentityService for IdentityResolver<U> {
    async fn resolve(&self, external_id: &str, role_hint: Option<&str>) -> AppResult<User> {
        let external_id = external_id.to_string();
        let role_hint = role_hint.map(str::to_string);

        with_transaction!(self.uow, |ctx| {
            resolve_identity(&ctx, &external_id, role_hint.as_deref()).await
        })
    }

    async fn bind(
        &self,
        external_id: &str,
        display_name: &str,
        role: UserRole,
    ) -> AppResult<(User, bool)> {
        require_identity("external_id", external_id)?;
        let external_id = external_id.to_string();
        let display_name = display_name.to_string();

        with_transaction!(self.uow, |ctx| {
            let identities = ctx.identities();
            if let Some(user) = identities.find_by_external_id(&external_id).await? {
                return Ok((user, false));
            }

            match identities
                .insert_with_binding(&external_id, &display_name, role)
                .await?
            {
                Some(user) => Ok((user, true)),
                None => identities
                    .find_by_external_id(&external_id)
                    .await?
                    .map(|user| (user, false))
                    .ok_or_else(|| {
                        AppError::internal(format!("binding for {} vanished", external_id))
                    }),
            }
        })
    }
}
