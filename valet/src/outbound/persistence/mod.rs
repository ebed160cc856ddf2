//! Persistence adapters.

mod tenant_store;

pub use tenant_store::{RowMap, TenantStore, TenantStoreError};
