// core/client_service.rs
use chrono::{Datelike, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::numbering::TypePiece;
use crate::core::Numeroteur;
use crate::domain::client::{Client, NewClient, NewVehicule, UpdateClient, Vehicule};
use crate::domain::PaginatedResponse;
use crate::infrastructure::database::{
    ClientsRepository, DevisRepository, FacturesRepository, OdrRepository, VehiculesRepository,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::ensure_no_references;

/// Gestion des clients et de leurs véhicules
#[derive(Clone)]
pub struct ClientService {
    clients: ClientsRepository,
    vehicules: VehiculesRepository,
    devis: DevisRepository,
    odrs: OdrRepository,
    factures: FacturesRepository,
    numeroteur: Arc<Numeroteur>,
}

impl ClientService {
    pub fn new(
        clients: ClientsRepository,
        vehicules: VehiculesRepository,
        devis: DevisRepository,
        odrs: OdrRepository,
        factures: FacturesRepository,
        numeroteur: Arc<Numeroteur>,
    ) -> Self {
        Self {
            clients,
            vehicules,
            devis,
            odrs,
            factures,
            numeroteur,
        }
    }

    /// Créer un client avec son numéro attribué
    pub async fn create_client(&self, data: NewClient) -> AppResult<Client> {
        if self.clients.find_by_email(&data.email).await?.is_some() {
            return Err(AppError::Duplicate(format!(
                "un client utilise déjà l'email {}",
                data.email
            )));
        }

        let numero = self
            .numeroteur
            .next_number(TypePiece::Client, Utc::now().year())
            .await?;

        let client = self.clients.create(&Client::new(numero, data)).await?;
        info!(numero_client = %client.numero_client, "client créé");
        Ok(client)
    }

    pub async fn get_client(&self, id: Uuid) -> AppResult<Client> {
        self.clients.get_by_id(id).await
    }

    pub async fn list_clients(&self, page: i64, per_page: i64) -> AppResult<PaginatedResponse<Client>> {
        let offset = (page - 1).max(0) * per_page;
        let items = self.clients.list(per_page, offset).await?;
        let total = self.clients.count().await?;
        Ok(PaginatedResponse::new(items, total, page, per_page))
    }

    /// Mettre à jour un client (le numéro n'est jamais modifié)
    pub async fn update_client(&self, id: Uuid, update: UpdateClient) -> AppResult<Client> {
        let mut client = self.clients.get_by_id(id).await?;

        if let Some(email) = &update.email {
            if let Some(existant) = self.clients.find_by_email(email).await? {
                if existant.id != id {
                    return Err(AppError::Duplicate(format!(
                        "un client utilise déjà l'email {}",
                        email
                    )));
                }
            }
        }

        client.apply(update);
        self.clients.update(&client).await
    }

    /// Supprimer un client, refusé tant que des enregistrements dépendent de lui
    pub async fn delete_client(&self, id: Uuid) -> AppResult<()> {
        let client = self.clients.get_by_id(id).await?;

        let vehicules = self.vehicules.count_by_client(id).await?;
        let devis = self.devis.count_by_client(id).await?;
        let odrs = self.odrs.count_by_client(id).await?;
        let factures = self.factures.count_by_client(id).await?;

        ensure_no_references(
            "Client",
            &[
                ("véhicule(s)", vehicules),
                ("devis", devis),
                ("ordre(s) de réparation", odrs),
                ("facture(s)", factures),
            ],
        )?;

        self.clients.delete(id).await?;
        info!(numero_client = %client.numero_client, "client supprimé");
        Ok(())
    }

    // -- Véhicules ---------------------------------------------------------

    /// Créer un véhicule rattaché à un client existant
    pub async fn create_vehicule(&self, data: NewVehicule) -> AppResult<Vehicule> {
        // Le propriétaire doit exister
        self.clients.get_by_id(data.client_id).await?;
        self.vehicules.create(&Vehicule::new(data)).await
    }

    pub async fn get_vehicule(&self, id: Uuid) -> AppResult<Vehicule> {
        self.vehicules.get_by_id(id).await
    }

    pub async fn list_vehicules(
        &self,
        page: i64,
        per_page: i64,
    ) -> AppResult<PaginatedResponse<Vehicule>> {
        let offset = (page - 1).max(0) * per_page;
        let items = self.vehicules.list(per_page, offset).await?;
        let total = self.vehicules.count().await?;
        Ok(PaginatedResponse::new(items, total, page, per_page))
    }

    pub async fn list_vehicules_client(&self, client_id: Uuid) -> AppResult<Vec<Vehicule>> {
        self.clients.get_by_id(client_id).await?;
        self.vehicules.list_by_client(client_id).await
    }

    /// Supprimer un véhicule, refusé tant que des documents le référencent
    pub async fn delete_vehicule(&self, id: Uuid) -> AppResult<()> {
        self.vehicules.get_by_id(id).await?;

        let devis = self.devis.count_by_vehicule(id).await?;
        let odrs = self.odrs.count_by_vehicule(id).await?;

        ensure_no_references(
            "Véhicule",
            &[("devis", devis), ("ordre(s) de réparation", odrs)],
        )?;

        self.vehicules.delete(id).await
    }
}
