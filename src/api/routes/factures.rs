use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::routes::PaginationQuery;
use crate::api::AppState;
use crate::domain::facture::{ModePaiement, NewFacture, Reglement, StatutFacture};
use crate::domain::ligne::LigneDocument;
use crate::utils::error::AppResult;

/// Requête de création de facture
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFactureRequest {
    pub client_id: Uuid,
    /// Ordre de réparation facturé, si applicable
    pub odr_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Au moins une ligne est requise"))]
    pub lignes: Vec<LigneDocument>,
    pub date_echeance: Option<NaiveDate>,
}

/// Requête de remplacement des lignes d'une facture
#[derive(Debug, Deserialize)]
pub struct UpdateLignesFactureRequest {
    pub lignes: Vec<LigneDocument>,
}

/// Requête de changement de statut de paiement
///
/// Le mode de paiement et la date de règlement doivent accompagner
/// atomiquement un passage en PAYEE ou PARTIELLEMENT_PAYEE.
#[derive(Debug, Deserialize)]
pub struct TransitionFactureRequest {
    pub statut: StatutFacture,
    pub mode_paiement: Option<ModePaiement>,
    pub date_reglement: Option<NaiveDate>,
    pub acteur: Option<String>,
}

/// Requête d'extourne d'une facture payée
#[derive(Debug, Deserialize, Validate)]
pub struct AnnulationPayeeRequest {
    #[validate(length(min = 1, message = "Le motif est requis"))]
    pub motif: String,
    pub acteur: Option<String>,
}

/// Filtre de liste des factures
#[derive(Debug, Deserialize)]
pub struct FactureQuery {
    pub client_id: Option<Uuid>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[post("/factures")]
pub async fn create_facture(
    state: web::Data<AppState>,
    request: web::Json<CreateFactureRequest>,
) -> AppResult<HttpResponse> {
    request.validate()?;
    let request = request.into_inner();

    let facture = state
        .factures
        .create(NewFacture {
            client_id: request.client_id,
            odr_id: request.odr_id,
            lignes: request.lignes,
            date_echeance: request.date_echeance,
        })
        .await?;

    Ok(HttpResponse::Created().json(facture))
}

#[get("/factures/echeances")]
pub async fn echeances(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let alertes = state.factures.echeances().await?;
    Ok(HttpResponse::Ok().json(alertes))
}

#[get("/factures/{id}")]
pub async fn get_facture(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let facture = state.factures.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(facture))
}

#[get("/factures")]
pub async fn list_factures(
    state: web::Data<AppState>,
    query: web::Query<FactureQuery>,
) -> AppResult<HttpResponse> {
    let pagination = PaginationQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let page = state
        .factures
        .list(query.client_id, pagination.page(), pagination.per_page())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[put("/factures/{id}/lignes")]
pub async fn update_lignes_facture(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<UpdateLignesFactureRequest>,
) -> AppResult<HttpResponse> {
    let facture = state
        .factures
        .update_lignes(id.into_inner(), request.into_inner().lignes)
        .await?;
    Ok(HttpResponse::Ok().json(facture))
}

#[post("/factures/{id}/transition")]
pub async fn transition_facture(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<TransitionFactureRequest>,
) -> AppResult<HttpResponse> {
    let request = request.into_inner();
    let acteur = request.acteur.as_deref().unwrap_or("système").to_string();

    // Les deux informations de règlement doivent arriver ensemble ;
    // la machine à états rejette un règlement incomplet
    let reglement = match (request.mode_paiement, request.date_reglement) {
        (Some(mode_paiement), Some(date_reglement)) => Some(Reglement {
            mode_paiement,
            date_reglement,
        }),
        _ => None,
    };

    let facture = state
        .factures
        .transition(id.into_inner(), request.statut, reglement, &acteur)
        .await?;
    Ok(HttpResponse::Ok().json(facture))
}

#[post("/factures/{id}/annulation-payee")]
pub async fn annuler_facture_payee(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<AnnulationPayeeRequest>,
) -> AppResult<HttpResponse> {
    request.validate()?;
    let request = request.into_inner();
    let acteur = request.acteur.as_deref().unwrap_or("système").to_string();

    let facture = state
        .factures
        .annuler_payee(id.into_inner(), &acteur, &request.motif)
        .await?;
    Ok(HttpResponse::Ok().json(facture))
}

#[delete("/factures/{id}")]
pub async fn delete_facture(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.factures.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
