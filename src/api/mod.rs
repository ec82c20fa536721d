pub mod routes;

pub use routes::config;

use crate::core::{
    CatalogueService, ClientService, DashboardService, DevisService, FactureService, OdrService,
};

/// État partagé de l'application, injecté dans les handlers
#[derive(Clone)]
pub struct AppState {
    pub clients: ClientService,
    pub catalogue: CatalogueService,
    pub devis: DevisService,
    pub odrs: OdrService,
    pub factures: FactureService,
    pub dashboard: DashboardService,
}
