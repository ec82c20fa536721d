// core/catalogue_service.rs
use chrono::Utc;
use uuid::Uuid;

use crate::domain::prestation::{NewPrestation, Prestation, TypeService};
use crate::domain::PaginatedResponse;
use crate::infrastructure::database::{
    DevisRepository, FacturesRepository, OdrRepository, PrestationsRepository,
};
use crate::utils::error::AppResult;
use crate::utils::validation::ensure_no_references;

/// Gestion du catalogue de prestations
#[derive(Clone)]
pub struct CatalogueService {
    prestations: PrestationsRepository,
    devis: DevisRepository,
    odrs: OdrRepository,
    factures: FacturesRepository,
}

impl CatalogueService {
    pub fn new(
        prestations: PrestationsRepository,
        devis: DevisRepository,
        odrs: OdrRepository,
        factures: FacturesRepository,
    ) -> Self {
        Self {
            prestations,
            devis,
            odrs,
            factures,
        }
    }

    pub async fn create(&self, data: NewPrestation) -> AppResult<Prestation> {
        self.prestations.create(&Prestation::new(data)).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Prestation> {
        self.prestations.get_by_id(id).await
    }

    pub async fn list(
        &self,
        type_service: Option<TypeService>,
        page: i64,
        per_page: i64,
    ) -> AppResult<PaginatedResponse<Prestation>> {
        let offset = (page - 1).max(0) * per_page;
        let items = self.prestations.list(type_service, per_page, offset).await?;
        let total = self.prestations.count().await?;
        Ok(PaginatedResponse::new(items, total, page, per_page))
    }

    pub async fn update(&self, id: Uuid, data: NewPrestation) -> AppResult<Prestation> {
        let mut prestation = self.prestations.get_by_id(id).await?;
        prestation.nom = data.nom;
        prestation.description = data.description;
        prestation.type_service = data.type_service;
        prestation.prix_base_ttc = data.prix_base_ttc;
        prestation.updated_at = Utc::now();
        self.prestations.update(&prestation).await
    }

    /// Supprimer une prestation, refusé tant qu'une ligne de document la
    /// référence
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.prestations.get_by_id(id).await?;

        let devis = self.devis.count_lignes_prestation(id).await?;
        let odrs = self.odrs.count_lignes_prestation(id).await?;
        let factures = self.factures.count_lignes_prestation(id).await?;

        ensure_no_references(
            "Prestation",
            &[
                ("ligne(s) de devis", devis),
                ("ligne(s) d'ordre de réparation", odrs),
                ("ligne(s) de facture", factures),
            ],
        )?;

        self.prestations.delete(id).await
    }
}
