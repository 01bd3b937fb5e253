//! In-memory client and scope storage
//!
//! Records live in `Mutex<BTreeMap>`s keyed by id. One sequence hands out
//! both parent and child ids.

use crate::admin::types::{ChildRow, ClientRecord, ScopeRecord};
use crate::errors::StorageError;
use crate::storage::traits::*;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// In-memory implementation of [`AdminStorage`]
#[derive(Default)]
pub struct MemoryAdminStorage {
    clients: Mutex<BTreeMap<i64, ClientRecord>>,
    scopes: Mutex<BTreeMap<i64, ScopeRecord>>,
    sequence: AtomicI64,
}

impl MemoryAdminStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn assign_ids<R: ChildRow>(&self, rows: &mut [R]) {
        for row in rows.iter_mut().filter(|row| row.id() == 0) {
            row.set_id(self.next_id());
        }
    }

    fn assign_client_ids(&self, client: &mut ClientRecord) {
        self.assign_ids(&mut client.claims);
        self.assign_ids(&mut client.client_secrets);
        self.assign_ids(&mut client.redirect_uris);
        self.assign_ids(&mut client.post_logout_redirect_uris);
        self.assign_ids(&mut client.allowed_cors_origins);
        self.assign_ids(&mut client.allowed_custom_grant_types);
        self.assign_ids(&mut client.allowed_scopes);
        self.assign_ids(&mut client.identity_provider_restrictions);
    }

    fn assign_scope_ids(&self, scope: &mut ScopeRecord) {
        self.assign_ids(&mut scope.scope_claims);
        self.assign_ids(&mut scope.scope_secrets);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| StorageError::QueryFailed(format!("Lock error: {}", e)))
}

fn page<T, L>(
    rows: impl Iterator<Item = T>,
    query: &ListQuery,
    name: impl Fn(&T) -> &str,
    listing: impl Fn(&T) -> L,
) -> Page<L> {
    let mut matched: Vec<T> = rows.filter(|row| query.matches(name(row))).collect();
    // BTreeMap iteration is already in id order, so a stable sort breaks name ties by id
    matched.sort_by(|a, b| name(a).cmp(name(b)));
    query.window(matched.iter().map(listing).collect())
}

#[async_trait]
impl ClientStore for MemoryAdminStorage {
    async fn get_client(&self, id: i64) -> Result<Option<ClientRecord>> {
        let clients = lock(&self.clients)?;
        Ok(clients.get(&id).cloned())
    }

    async fn query_clients(&self, query: &ListQuery) -> Result<Page<ClientListing>> {
        let clients = lock(&self.clients)?;
        Ok(page(
            clients.values(),
            query,
            |client| client.client_name.as_str(),
            |client| ClientListing {
                id: client.id,
                client_id: client.client_id.clone(),
                client_name: client.client_name.clone(),
            },
        ))
    }

    async fn count_clients(&self) -> Result<usize> {
        Ok(lock(&self.clients)?.len())
    }

    async fn insert_client(&self, client: &ClientRecord) -> Result<i64> {
        let mut clients = lock(&self.clients)?;
        if clients
            .values()
            .any(|existing| existing.client_id == client.client_id)
        {
            return Err(StorageError::Duplicate(format!(
                "client_id {} already exists",
                client.client_id
            )));
        }

        let mut stored = client.clone();
        stored.id = self.next_id();
        self.assign_client_ids(&mut stored);
        let id = stored.id;
        clients.insert(id, stored);
        Ok(id)
    }

    async fn update_client(&self, client: &ClientRecord) -> Result<()> {
        let mut clients = lock(&self.clients)?;
        if !clients.contains_key(&client.id) {
            return Err(StorageError::NotFound(format!("client {}", client.id)));
        }
        if clients
            .values()
            .any(|existing| existing.id != client.id && existing.client_id == client.client_id)
        {
            return Err(StorageError::Duplicate(format!(
                "client_id {} already exists",
                client.client_id
            )));
        }

        let mut stored = client.clone();
        self.assign_client_ids(&mut stored);
        clients.insert(stored.id, stored);
        Ok(())
    }

    async fn delete_client(&self, id: i64) -> Result<()> {
        let mut clients = lock(&self.clients)?;
        clients
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("client {}", id)))
    }
}

#[async_trait]
impl ScopeStore for MemoryAdminStorage {
    async fn get_scope(&self, id: i64) -> Result<Option<ScopeRecord>> {
        let scopes = lock(&self.scopes)?;
        Ok(scopes.get(&id).cloned())
    }

    async fn query_scopes(&self, query: &ListQuery) -> Result<Page<ScopeListing>> {
        let scopes = lock(&self.scopes)?;
        Ok(page(
            scopes.values(),
            query,
            |scope| scope.name.as_str(),
            |scope| ScopeListing {
                id: scope.id,
                name: scope.name.clone(),
                description: scope.description.clone(),
            },
        ))
    }

    async fn count_scopes(&self) -> Result<usize> {
        Ok(lock(&self.scopes)?.len())
    }

    async fn insert_scope(&self, scope: &ScopeRecord) -> Result<i64> {
        let mut scopes = lock(&self.scopes)?;
        if scopes.values().any(|existing| existing.name == scope.name) {
            return Err(StorageError::Duplicate(format!(
                "scope {} already exists",
                scope.name
            )));
        }

        let mut stored = scope.clone();
        stored.id = self.next_id();
        self.assign_scope_ids(&mut stored);
        let id = stored.id;
        scopes.insert(id, stored);
        Ok(id)
    }

    async fn update_scope(&self, scope: &ScopeRecord) -> Result<()> {
        let mut scopes = lock(&self.scopes)?;
        if !scopes.contains_key(&scope.id) {
            return Err(StorageError::NotFound(format!("scope {}", scope.id)));
        }
        if scopes
            .values()
            .any(|existing| existing.id != scope.id && existing.name == scope.name)
        {
            return Err(StorageError::Duplicate(format!(
                "scope {} already exists",
                scope.name
            )));
        }

        let mut stored = scope.clone();
        self.assign_scope_ids(&mut stored);
        scopes.insert(stored.id, stored);
        Ok(())
    }

    async fn delete_scope(&self, id: i64) -> Result<()> {
        let mut scopes = lock(&self.scopes)?;
        scopes
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("scope {}", id)))
    }
}

impl AdminStorage for MemoryAdminStorage {}
