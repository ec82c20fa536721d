// core/dashboard_service.rs
use chrono::Utc;

use crate::core::dashboard::{aggregate, MetricsSnapshot};
use crate::infrastructure::database::{
    ClientsRepository, FacturesRepository, OdrRepository, VehiculesRepository,
};
use crate::utils::error::AppResult;

/// Tableau de bord : charge les collections et délègue à l'agrégateur
#[derive(Clone)]
pub struct DashboardService {
    clients: ClientsRepository,
    vehicules: VehiculesRepository,
    odrs: OdrRepository,
    factures: FacturesRepository,
}

impl DashboardService {
    pub fn new(
        clients: ClientsRepository,
        vehicules: VehiculesRepository,
        odrs: OdrRepository,
        factures: FacturesRepository,
    ) -> Self {
        Self {
            clients,
            vehicules,
            odrs,
            factures,
        }
    }

    /// Instantané des indicateurs, recalculé à la demande
    pub async fn snapshot(&self) -> AppResult<MetricsSnapshot> {
        let clients = self.clients.list_all().await?;
        let vehicules = self.vehicules.list_all().await?;
        let odrs = self.odrs.list_all().await?;
        let factures = self.factures.list_all().await?;

        Ok(aggregate(&clients, &vehicules, &odrs, &factures, Utc::now()))
    }
}
