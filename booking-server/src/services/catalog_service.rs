//! Catalog Service - provider services and designs with in-memory caching
//!
//! The order engine only reads the catalog once per order, to snapshot the
//! price and check the slot length. Reads go through the cache; writes go
//! to redb first and refresh the cache afterwards.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use shared::models::{DesignInfo, DesignUpsert, ServiceInfo, ServiceUpsert};
use std::sync::Arc;

use crate::db::{BookingStorage, StorageResult};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_URL_LEN, validate_optional_text, validate_price, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Read-only catalog lookup used by the order state machine
pub trait ServiceCatalog: Send + Sync {
    fn service(&self, service_id: &str) -> Option<ServiceInfo>;
    fn design(&self, design_id: &str) -> Option<DesignInfo>;
}

#[derive(Clone)]
pub struct CatalogService {
    storage: BookingStorage,
    services: Arc<DashMap<String, ServiceInfo>>,
    designs: Arc<DashMap<String, DesignInfo>>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("services", &self.services.len())
            .field("designs", &self.designs.len())
            .finish()
    }
}

impl CatalogService {
    pub fn new(storage: BookingStorage) -> Self {
        Self {
            storage,
            services: Arc::new(DashMap::new()),
            designs: Arc::new(DashMap::new()),
        }
    }

    /// 启动时加载全部目录到缓存
    pub fn warmup(&self) -> StorageResult<usize> {
        let services = self.storage.get_all_services()?;
        let designs = self.storage.get_all_designs()?;
        let total = services.len() + designs.len();

        for service in services {
            self.services.insert(service.id.clone(), service);
        }
        for design in designs {
            self.designs.insert(design.id.clone(), design);
        }

        tracing::info!(
            services = self.services.len(),
            designs = self.designs.len(),
            "Catalog cache warmed up"
        );
        Ok(total)
    }

    pub fn list_services(&self, provider_id: &str) -> Vec<ServiceInfo> {
        let mut list: Vec<_> = self
            .services
            .iter()
            .filter(|e| e.provider_id == provider_id)
            .map(|e| e.value().clone())
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    pub fn list_designs(&self, provider_id: &str) -> Vec<DesignInfo> {
        let mut list: Vec<_> = self
            .designs
            .iter()
            .filter(|e| e.provider_id == provider_id)
            .map(|e| e.value().clone())
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    /// Create or replace a service owned by `provider_id`
    pub fn upsert_service(
        &self,
        provider_id: &str,
        service_id: &str,
        data: ServiceUpsert,
    ) -> AppResult<ServiceInfo> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_price(data.price, "price")?;
        if data.duration_minutes == 0 {
            return Err(AppError::validation("duration_minutes must be positive")
                .with_detail("field", "duration_minutes"));
        }
        // Entry guard keeps the ownership check and the write together
        let entry = self.services.entry(service_id.to_string());
        if let Entry::Occupied(existing) = &entry
            && existing.get().provider_id != provider_id
        {
            return Err(AppError::permission_denied(
                "Service belongs to another provider",
            ));
        }

        let service = ServiceInfo {
            id: service_id.to_string(),
            provider_id: provider_id.to_string(),
            name: data.name,
            price: data.price,
            duration_minutes: data.duration_minutes,
            is_active: data.is_active,
        };
        self.storage
            .put_service(&service)
            .map_err(|e| AppError::storage(e.to_string()))?;
        entry.insert(service.clone());

        tracing::debug!(service_id, provider_id, "Service saved");
        Ok(service)
    }

    /// Create or replace a design owned by `provider_id`
    pub fn upsert_design(
        &self,
        provider_id: &str,
        design_id: &str,
        data: DesignUpsert,
    ) -> AppResult<DesignInfo> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&data.image_url, "image_url", MAX_URL_LEN)?;
        validate_price(data.price, "price")?;
        let entry = self.designs.entry(design_id.to_string());
        if let Entry::Occupied(existing) = &entry
            && existing.get().provider_id != provider_id
        {
            return Err(AppError::permission_denied(
                "Design belongs to another provider",
            ));
        }

        let design = DesignInfo {
            id: design_id.to_string(),
            provider_id: provider_id.to_string(),
            name: data.name,
            price: data.price,
            image_url: data.image_url,
            is_active: data.is_active,
        };
        self.storage
            .put_design(&design)
            .map_err(|e| AppError::storage(e.to_string()))?;
        entry.insert(design.clone());

        tracing::debug!(design_id, provider_id, "Design saved");
        Ok(design)
    }
}

impl ServiceCatalog for CatalogService {
    fn service(&self, service_id: &str) -> Option<ServiceInfo> {
        self.services.get(service_id).map(|e| e.value().clone())
    }

    fn design(&self, design_id: &str) -> Option<DesignInfo> {
        self.designs.get(design_id).map(|e| e.value().clone())
    }
}
