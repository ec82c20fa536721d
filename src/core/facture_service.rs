// core/facture_service.rs
use chrono::{Datelike, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::alerts::{evaluate_alerts, AlertesEcheances};
use crate::core::lifecycle::{
    annuler_facture_payee, ensure_facture_modifiable, transition_facture,
};
use crate::core::numbering::TypePiece;
use crate::core::totals::compute_totals;
use crate::core::Numeroteur;
use crate::domain::facture::{Facture, NewFacture, Reglement, StatutFacture};
use crate::domain::ligne::LigneDocument;
use crate::domain::PaginatedResponse;
use crate::infrastructure::database::{ClientsRepository, FacturesRepository, OdrRepository};
use crate::utils::error::AppResult;
use crate::utils::validation::validate_lignes;

/// Gestion des factures : création, paiement, alertes d'échéance
#[derive(Clone)]
pub struct FactureService {
    factures: FacturesRepository,
    clients: ClientsRepository,
    odrs: OdrRepository,
    numeroteur: Arc<Numeroteur>,
    taux_tva: Decimal,
    delai_paiement_jours: i64,
    delai_alerte_echeance: i64,
}

impl FactureService {
    pub fn new(
        factures: FacturesRepository,
        clients: ClientsRepository,
        odrs: OdrRepository,
        numeroteur: Arc<Numeroteur>,
        taux_tva: Decimal,
        delai_paiement_jours: i64,
        delai_alerte_echeance: i64,
    ) -> Self {
        Self {
            factures,
            clients,
            odrs,
            numeroteur,
            taux_tva,
            delai_paiement_jours,
            delai_alerte_echeance,
        }
    }

    /// Créer une facture en attente de paiement
    pub async fn create(&self, data: NewFacture) -> AppResult<Facture> {
        self.clients.get_by_id(data.client_id).await?;
        if let Some(odr_id) = data.odr_id {
            self.odrs.get_by_id(odr_id).await?;
        }

        validate_lignes(&data.lignes)?;
        let totaux = compute_totals(&data.lignes, self.taux_tva);

        let now = Utc::now();
        let date_echeance = data
            .date_echeance
            .unwrap_or_else(|| now.date_naive() + Duration::days(self.delai_paiement_jours));

        let numero = self
            .numeroteur
            .next_number(TypePiece::Facture, now.year())
            .await?;

        let facture = self
            .factures
            .create(&Facture::new(
                numero,
                data.client_id,
                data.odr_id,
                data.lignes,
                totaux.as_tuple(),
                date_echeance,
            ))
            .await?;

        info!(numero = %facture.numero, montant_ttc = %facture.montant_ttc, "facture créée");
        Ok(facture)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Facture> {
        self.factures.get_by_id(id).await
    }

    pub async fn list(
        &self,
        client_id: Option<Uuid>,
        page: i64,
        per_page: i64,
    ) -> AppResult<PaginatedResponse<Facture>> {
        let offset = (page - 1).max(0) * per_page;
        let items = self.factures.list(client_id, per_page, offset).await?;
        let total = self.factures.count().await?;
        Ok(PaginatedResponse::new(items, total, page, per_page))
    }

    /// Remplacer les lignes d'une facture en attente et recalculer ses montants
    pub async fn update_lignes(
        &self,
        id: Uuid,
        lignes: Vec<LigneDocument>,
    ) -> AppResult<Facture> {
        let mut facture = self.factures.get_by_id(id).await?;
        ensure_facture_modifiable(&facture)?;
        validate_lignes(&lignes)?;

        let (montant_ht, montant_tva, montant_ttc) =
            compute_totals(&lignes, self.taux_tva).as_tuple();
        facture.lignes = sqlx::types::Json(lignes);
        facture.montant_ht = montant_ht;
        facture.montant_tva = montant_tva;
        facture.montant_ttc = montant_ttc;
        facture.updated_at = Utc::now();

        self.factures.update(&facture).await
    }

    /// Faire passer une facture vers un nouveau statut de paiement
    ///
    /// Le règlement (mode + date) est exigé atomiquement pour PAYEE et
    /// PARTIELLEMENT_PAYEE ; un retour en EN_ATTENTE ou IMPAYEE l'efface.
    pub async fn transition(
        &self,
        id: Uuid,
        vers: StatutFacture,
        reglement: Option<Reglement>,
        acteur: &str,
    ) -> AppResult<Facture> {
        let facture = self.factures.get_by_id(id).await?;
        let updated = transition_facture(&facture, vers, reglement)?;

        let persisted = self.factures.update(&updated).await?;
        info!(
            numero = %persisted.numero,
            de = %facture.statut,
            vers = %persisted.statut,
            acteur = acteur,
            "transition facture"
        );
        Ok(persisted)
    }

    /// Extourne : annulation auditée d'une facture déjà payée
    pub async fn annuler_payee(&self, id: Uuid, acteur: &str, motif: &str) -> AppResult<Facture> {
        let facture = self.factures.get_by_id(id).await?;
        let annulee = annuler_facture_payee(&facture)?;

        let persisted = self.factures.update(&annulee).await?;
        warn!(
            numero = %persisted.numero,
            acteur = acteur,
            motif = motif,
            "extourne d'une facture payée"
        );
        Ok(persisted)
    }

    /// Alertes d'échéance sur les factures en attente et impayées
    pub async fn echeances(&self) -> AppResult<AlertesEcheances> {
        let mut candidates = self
            .factures
            .list_by_statut(StatutFacture::EnAttente)
            .await?;
        candidates.extend(self.factures.list_by_statut(StatutFacture::Impayee).await?);

        Ok(evaluate_alerts(
            &candidates,
            Utc::now(),
            self.delai_alerte_echeance,
        ))
    }

    /// Supprimer une facture
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let facture = self.factures.get_by_id(id).await?;
        self.factures.delete(id).await?;
        info!(numero = %facture.numero, "facture supprimée");
        Ok(())
    }
}
