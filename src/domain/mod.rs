//! Modèles métier de l'atelier
//!
//! Les entités sont partagées par toute l'application (API, services,
//! base de données). Les montants utilisent `rust_decimal::Decimal`,
//! les horodatages `chrono::DateTime<Utc>` et les identifiants
//! `uuid::Uuid`. Les statuts de documents portent leur table de
//! transitions ; la logique de transition vit dans `core::lifecycle`.

pub mod client;
pub mod devis;
pub mod facture;
pub mod ligne;
pub mod ordre_reparation;
pub mod prestation;

pub use client::{Client, NewClient, NewVehicule, TypeClient, UpdateClient, Vehicule};
pub use devis::{Devis, NewDevis, StatutDevis};
pub use facture::{Facture, ModePaiement, NewFacture, Reglement, StatutFacture};
pub use ligne::{round2, LigneDocument};
pub use ordre_reparation::{NewOrdreReparation, OrdreReparation, StatutOdr};
pub use prestation::{NewPrestation, Prestation, TypeService};

use serde::{Deserialize, Serialize};

/// Réponse paginée standard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            items,
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
