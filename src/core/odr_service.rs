// core/odr_service.rs
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::lifecycle::{can_convert_to_odr, ensure_odr_modifiable, transition_odr};
use crate::core::numbering::TypePiece;
use crate::core::totals::compute_totals;
use crate::core::Numeroteur;
use crate::domain::ligne::LigneDocument;
use crate::domain::ordre_reparation::{NewOrdreReparation, OrdreReparation, StatutOdr};
use crate::domain::PaginatedResponse;
use crate::infrastructure::database::{
    ClientsRepository, DevisRepository, FacturesRepository, OdrRepository, VehiculesRepository,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{ensure_no_references, validate_lignes};

/// Gestion des ordres de réparation
#[derive(Clone)]
pub struct OdrService {
    odrs: OdrRepository,
    clients: ClientsRepository,
    vehicules: VehiculesRepository,
    devis: DevisRepository,
    factures: FacturesRepository,
    numeroteur: Arc<Numeroteur>,
    taux_tva: Decimal,
}

impl OdrService {
    pub fn new(
        odrs: OdrRepository,
        clients: ClientsRepository,
        vehicules: VehiculesRepository,
        devis: DevisRepository,
        factures: FacturesRepository,
        numeroteur: Arc<Numeroteur>,
        taux_tva: Decimal,
    ) -> Self {
        Self {
            odrs,
            clients,
            vehicules,
            devis,
            factures,
            numeroteur,
            taux_tva,
        }
    }

    /// Créer un ordre de réparation
    ///
    /// Un `devis_id` fourni doit référencer un devis accepté : c'est la
    /// garde de conversion devis → ODR.
    pub async fn create(&self, data: NewOrdreReparation) -> AppResult<OrdreReparation> {
        self.clients.get_by_id(data.client_id).await?;
        let vehicule = self.vehicules.get_by_id(data.vehicule_id).await?;
        if vehicule.client_id != data.client_id {
            return Err(AppError::Validation(
                "le véhicule n'appartient pas à ce client".to_string(),
            ));
        }

        if let Some(devis_id) = data.devis_id {
            let devis = self.devis.get_by_id(devis_id).await?;
            if !can_convert_to_odr(&devis) {
                return Err(AppError::Validation(format!(
                    "le devis {} n'est pas accepté",
                    devis.numero
                )));
            }
        }

        validate_lignes(&data.lignes)?;
        let montant_total = compute_totals(&data.lignes, self.taux_tva).total_ttc;

        let numero = self
            .numeroteur
            .next_number(TypePiece::Odr, Utc::now().year())
            .await?;

        let odr = self
            .odrs
            .create(&OrdreReparation::new(numero, data, montant_total))
            .await?;

        info!(numero = %odr.numero, montant_total = %odr.montant_total, "ordre de réparation créé");
        Ok(odr)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<OrdreReparation> {
        self.odrs.get_by_id(id).await
    }

    pub async fn list(
        &self,
        client_id: Option<Uuid>,
        page: i64,
        per_page: i64,
    ) -> AppResult<PaginatedResponse<OrdreReparation>> {
        let offset = (page - 1).max(0) * per_page;
        let items = self.odrs.list(client_id, per_page, offset).await?;
        let total = self.odrs.count().await?;
        Ok(PaginatedResponse::new(items, total, page, per_page))
    }

    /// Remplacer les lignes d'un ordre en cours et recalculer son montant
    ///
    /// Les lignes d'un ordre terminé ou annulé sont figées.
    pub async fn update_lignes(
        &self,
        id: Uuid,
        lignes: Vec<LigneDocument>,
    ) -> AppResult<OrdreReparation> {
        let mut odr = self.odrs.get_by_id(id).await?;
        ensure_odr_modifiable(&odr)?;
        validate_lignes(&lignes)?;

        odr.montant_total = compute_totals(&lignes, self.taux_tva).total_ttc;
        odr.lignes = sqlx::types::Json(lignes);
        odr.updated_at = Utc::now();

        self.odrs.update(&odr).await
    }

    /// Faire passer un ordre vers un nouveau statut
    ///
    /// Le passage à TERMINE fige le montant recalculé depuis les lignes.
    pub async fn transition(
        &self,
        id: Uuid,
        vers: StatutOdr,
        acteur: &str,
    ) -> AppResult<OrdreReparation> {
        let odr = self.odrs.get_by_id(id).await?;
        let updated = transition_odr(&odr, vers, self.taux_tva)?;

        let persisted = self.odrs.update(&updated).await?;
        info!(
            numero = %persisted.numero,
            de = %odr.statut,
            vers = %persisted.statut,
            acteur = acteur,
            "transition ordre de réparation"
        );
        Ok(persisted)
    }

    /// Supprimer un ordre, refusé s'il a été facturé
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let odr = self.odrs.get_by_id(id).await?;

        let factures = self.factures.count_by_odr(id).await?;
        ensure_no_references("Ordre de réparation", &[("facture(s)", factures)])?;

        self.odrs.delete(id).await?;
        info!(numero = %odr.numero, "ordre de réparation supprimé");
        Ok(())
    }
}
