//! Page-level state: the canonical user list and its load status.
//!
//! Every mutation is followed by exactly one full refetch; nothing is patched
//! locally.

use crate::api::UserApi;
use crate::model::{PageSnapshot, PageStatus, User};
use crate::table::Intent;
use std::sync::Arc;
use time::macros::format_description;
use time::OffsetDateTime;

pub(crate) const FETCH_FAILED: &str = "Failed to fetch users";
pub(crate) const CREATE_FAILED: &str = "Failed to create user";
pub(crate) const UPDATE_FAILED: &str = "Failed to update user";
pub(crate) const DELETE_FAILED: &str = "Failed to delete user";

pub(crate) struct PageController<A: ?Sized> {
    api: Arc<A>,
    users: Vec<User>,
    status: PageStatus,
    refreshed_at: Option<String>,
}

impl<A: UserApi + ?Sized> PageController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            users: Vec::new(),
            status: PageStatus::Loading,
            refreshed_at: None,
        }
    }

    pub fn status(&self) -> &PageStatus {
        &self.status
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            status: self.status.clone(),
            users: self.users.clone(),
            refreshed_at: self.refreshed_at.clone(),
        }
    }

    /// Fetch the whole list. On failure the previous list is kept but the
    /// page shows only the error.
    pub async fn load(&mut self) {
        match self.api.list_users().await {
            Ok(users) => {
                tracing::info!(count = users.len(), "fetched users");
                self.users = users;
                self.status = PageStatus::Ready;
                self.refreshed_at = Some(now_hms());
            }
            Err(e) => {
                let chain = e.chain();
                tracing::warn!(error = %chain, "fetching users failed");
                self.status = PageStatus::Failed(FETCH_FAILED.into());
            }
        }
    }

    pub async fn create(&mut self, user: User) {
        let res = self.api.create_user(&user).await;
        self.finish_mutation("create", res, CREATE_FAILED).await;
    }

    pub async fn update(&mut self, user: User) {
        let res = self.api.update_user(&user).await;
        self.finish_mutation("update", res, UPDATE_FAILED).await;
    }

    pub async fn delete(&mut self, id: String) {
        let res = self.api.delete_user(&id).await;
        self.finish_mutation("delete", res, DELETE_FAILED).await;
    }

    /// Run the mutation a table intent asks for.
    pub async fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Create(user) => self.create(user).await,
            Intent::Update(user) => self.update(user).await,
            Intent::Delete(id) => self.delete(id).await,
        }
    }

    async fn finish_mutation(
        &mut self,
        op: &'static str,
        res: crate::api::ApiResult<()>,
        failure: &str,
    ) {
        if let Err(e) = &res {
            let chain = e.chain();
            tracing::warn!(op, error = %chain, "mutation failed");
        } else {
            tracing::info!(op, "mutation succeeded");
        }
        self.load().await;
        // The mutation's own message wins over whatever the refetch reported.
        if res.is_err() {
            self.status = PageStatus::Failed(failure.into());
        }
    }
}

fn now_hms() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../tests/page_tests.rs"]
mod tests;
