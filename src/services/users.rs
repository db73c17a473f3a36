// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User registration and role management.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::middleware::SessionContext;
use crate::models::{Role, User};

#[derive(Clone)]
pub struct UserService {
    db: FirestoreDb,
}

impl UserService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Return the caller's user document, creating it (as a buyer) on the
    /// first authenticated session.
    pub async fn ensure_user(&self, ctx: &SessionContext) -> Result<User> {
        if let Some(user) = self.db.get_user(&ctx.uid).await? {
            return Ok(user);
        }

        let user = User {
            uid: ctx.uid.clone(),
            email: ctx.email.clone(),
            display_name: ctx.display_name.clone(),
            role: Role::Buyer,
            created_at: chrono::Utc::now(),
        };

        match self.db.create_user(&user).await {
            Ok(()) => {
                tracing::info!(uid = %user.uid, "Registered new user");
                Ok(user)
            }
            // Another session registered the user first.
            Err(AppError::Conflict(_)) => self.get_user(&ctx.uid).await,
            Err(e) => Err(e),
        }
    }

    pub async fn get_user(&self, uid: &str) -> Result<User> {
        self.db
            .get_user(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))
    }

    /// Upgrade to seller or downgrade to buyer.
    pub async fn set_role(&self, ctx: &SessionContext, role: Role) -> Result<User> {
        let mut user = self.ensure_user(ctx).await?;
        if user.role == role {
            return Ok(user);
        }

        tracing::info!(uid = %user.uid, from = ?user.role, to = ?role, "Changing user role");
        user.role = role;
        self.db.upsert_user(&user).await?;
        Ok(user)
    }
}
