// core/devis_service.rs
use chrono::{Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::lifecycle::{can_convert_to_odr, ensure_devis_modifiable, transition_devis};
use crate::core::numbering::TypePiece;
use crate::core::totals::compute_totals;
use crate::core::Numeroteur;
use crate::domain::devis::{Devis, NewDevis, StatutDevis};
use crate::domain::ligne::LigneDocument;
use crate::domain::PaginatedResponse;
use crate::infrastructure::database::{
    ClientsRepository, DevisRepository, OdrRepository, VehiculesRepository,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{ensure_no_references, validate_lignes};

/// Gestion des devis : création, lignes, cycle de vie
#[derive(Clone)]
pub struct DevisService {
    devis: DevisRepository,
    clients: ClientsRepository,
    vehicules: VehiculesRepository,
    odrs: OdrRepository,
    numeroteur: Arc<Numeroteur>,
    taux_tva: Decimal,
    delai_validite_jours: i64,
}

impl DevisService {
    pub fn new(
        devis: DevisRepository,
        clients: ClientsRepository,
        vehicules: VehiculesRepository,
        odrs: OdrRepository,
        numeroteur: Arc<Numeroteur>,
        taux_tva: Decimal,
        delai_validite_jours: i64,
    ) -> Self {
        Self {
            devis,
            clients,
            vehicules,
            odrs,
            numeroteur,
            taux_tva,
            delai_validite_jours,
        }
    }

    /// Créer un devis : références validées, numéro attribué, totaux calculés
    pub async fn create(&self, data: NewDevis) -> AppResult<Devis> {
        self.clients.get_by_id(data.client_id).await?;
        let vehicule = self.vehicules.get_by_id(data.vehicule_id).await?;
        if vehicule.client_id != data.client_id {
            return Err(AppError::Validation(
                "le véhicule n'appartient pas à ce client".to_string(),
            ));
        }

        validate_lignes(&data.lignes)?;
        let totaux = compute_totals(&data.lignes, self.taux_tva);

        let now = Utc::now();
        let date_validite = data
            .date_validite
            .unwrap_or_else(|| now.date_naive() + Duration::days(self.delai_validite_jours));

        let numero = self
            .numeroteur
            .next_number(TypePiece::Devis, now.year())
            .await?;

        let devis = self
            .devis
            .create(&Devis::new(
                numero,
                data.client_id,
                data.vehicule_id,
                data.lignes,
                totaux.as_tuple(),
                date_validite,
            ))
            .await?;

        info!(numero = %devis.numero, total_ttc = %devis.total_ttc, "devis créé");
        Ok(devis)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Devis> {
        self.devis.get_by_id(id).await
    }

    pub async fn list(
        &self,
        client_id: Option<Uuid>,
        page: i64,
        per_page: i64,
    ) -> AppResult<PaginatedResponse<Devis>> {
        let offset = (page - 1).max(0) * per_page;
        let items = self.devis.list(client_id, per_page, offset).await?;
        let total = self.devis.count().await?;
        Ok(PaginatedResponse::new(items, total, page, per_page))
    }

    /// Remplacer les lignes d'un devis et recalculer ses totaux
    pub async fn update_lignes(
        &self,
        id: Uuid,
        lignes: Vec<LigneDocument>,
        date_validite: Option<NaiveDate>,
    ) -> AppResult<Devis> {
        let mut devis = self.devis.get_by_id(id).await?;
        ensure_devis_modifiable(&devis)?;
        validate_lignes(&lignes)?;

        let totaux = compute_totals(&lignes, self.taux_tva);
        devis.lignes = sqlx::types::Json(lignes);
        let (total_ht, montant_tva, total_ttc) = totaux.as_tuple();
        devis.total_ht = total_ht;
        devis.montant_tva = montant_tva;
        devis.total_ttc = total_ttc;
        if let Some(date_validite) = date_validite {
            devis.date_validite = date_validite;
        }
        devis.updated_at = Utc::now();

        self.devis.update(&devis).await
    }

    /// Faire passer un devis vers un nouveau statut
    pub async fn transition(
        &self,
        id: Uuid,
        vers: StatutDevis,
        acteur: &str,
    ) -> AppResult<Devis> {
        let devis = self.devis.get_by_id(id).await?;
        let updated = transition_devis(&devis, vers)?;

        let persisted = self.devis.update(&updated).await?;
        info!(
            numero = %persisted.numero,
            de = %devis.statut,
            vers = %persisted.statut,
            acteur = acteur,
            "transition devis"
        );
        Ok(persisted)
    }

    /// Un devis n'est convertible en ODR que s'il est accepté
    pub async fn can_convert_to_odr(&self, id: Uuid) -> AppResult<bool> {
        let devis = self.devis.get_by_id(id).await?;
        Ok(can_convert_to_odr(&devis))
    }

    /// Supprimer un devis, refusé s'il a donné lieu à un ordre de réparation
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let devis = self.devis.get_by_id(id).await?;

        let odrs = self.odrs.count_by_devis(id).await?;
        ensure_no_references("Devis", &[("ordre(s) de réparation", odrs)])?;

        self.devis.delete(id).await?;
        info!(numero = %devis.numero, "devis supprimé");
        Ok(())
    }
}
