use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::routes::PaginationQuery;
use crate::api::AppState;
use crate::domain::devis::{NewDevis, StatutDevis};
use crate::domain::ligne::LigneDocument;
use crate::utils::error::AppResult;

/// Requête de création de devis
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDevisRequest {
    pub client_id: Uuid,
    pub vehicule_id: Uuid,
    #[validate(length(min = 1, message = "Au moins une ligne est requise"))]
    pub lignes: Vec<LigneDocument>,
    pub date_validite: Option<NaiveDate>,
}

/// Requête de remplacement des lignes d'un devis
#[derive(Debug, Deserialize)]
pub struct UpdateLignesDevisRequest {
    pub lignes: Vec<LigneDocument>,
    pub date_validite: Option<NaiveDate>,
}

/// Requête de changement de statut
#[derive(Debug, Deserialize)]
pub struct TransitionDevisRequest {
    pub statut: StatutDevis,
    pub acteur: Option<String>,
}

/// Filtre de liste des devis
#[derive(Debug, Deserialize)]
pub struct DevisQuery {
    pub client_id: Option<Uuid>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Serialize)]
struct ConversionReponse {
    convertible: bool,
}

#[post("/devis")]
pub async fn create_devis(
    state: web::Data<AppState>,
    request: web::Json<CreateDevisRequest>,
) -> AppResult<HttpResponse> {
    request.validate()?;
    let request = request.into_inner();

    let devis = state
        .devis
        .create(NewDevis {
            client_id: request.client_id,
            vehicule_id: request.vehicule_id,
            lignes: request.lignes,
            date_validite: request.date_validite,
        })
        .await?;

    Ok(HttpResponse::Created().json(devis))
}

#[get("/devis/{id}")]
pub async fn get_devis(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let devis = state.devis.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(devis))
}

#[get("/devis")]
pub async fn list_devis(
    state: web::Data<AppState>,
    query: web::Query<DevisQuery>,
) -> AppResult<HttpResponse> {
    let pagination = PaginationQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let page = state
        .devis
        .list(query.client_id, pagination.page(), pagination.per_page())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[put("/devis/{id}/lignes")]
pub async fn update_lignes_devis(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<UpdateLignesDevisRequest>,
) -> AppResult<HttpResponse> {
    let request = request.into_inner();
    let devis = state
        .devis
        .update_lignes(id.into_inner(), request.lignes, request.date_validite)
        .await?;
    Ok(HttpResponse::Ok().json(devis))
}

#[post("/devis/{id}/transition")]
pub async fn transition_devis(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<TransitionDevisRequest>,
) -> AppResult<HttpResponse> {
    let request = request.into_inner();
    let acteur = request.acteur.as_deref().unwrap_or("système");

    let devis = state
        .devis
        .transition(id.into_inner(), request.statut, acteur)
        .await?;
    Ok(HttpResponse::Ok().json(devis))
}

#[get("/devis/{id}/conversion-odr")]
pub async fn conversion_odr_possible(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let convertible = state.devis.can_convert_to_odr(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ConversionReponse { convertible }))
}

#[delete("/devis/{id}")]
pub async fn delete_devis(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.devis.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
