use std::sync::Arc;

use super::PERSONNEL_POLICY;
use crate::cache::QueryKey;
use crate::error::ClientResult;
use crate::models::Personnel;
use crate::query::{QueryClient, QuerySpec};

#[derive(Clone)]
pub struct PersonnelApi {
    client: Arc<QueryClient>,
}

impl PersonnelApi {
    pub fn new(client: Arc<QueryClient>) -> Self {
        Self { client }
    }

    pub fn admins_spec() -> QuerySpec {
        QuerySpec::new(QueryKey::root("personnel"), "/admin/admins", PERSONNEL_POLICY).with_retry()
    }

    pub fn users_spec() -> QuerySpec {
        QuerySpec::new(QueryKey::root("users"), "/admin/users", PERSONNEL_POLICY).with_retry()
    }

    /// Admin and personnel accounts
    pub async fn admins(&self) -> ClientResult<Vec<Personnel>> {
        self.client.fetch_list(&Self::admins_spec()).await
    }

    /// Registered public users
    pub async fn users(&self) -> ClientResult<Vec<Personnel>> {
        self.client.fetch_list(&Self::users_spec()).await
    }
}
