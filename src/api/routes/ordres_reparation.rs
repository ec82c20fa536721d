use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::routes::PaginationQuery;
use crate::api::AppState;
use crate::domain::ligne::LigneDocument;
use crate::domain::ordre_reparation::{NewOrdreReparation, StatutOdr};
use crate::utils::error::AppResult;

/// Requête de création d'ordre de réparation
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOdrRequest {
    pub client_id: Uuid,
    pub vehicule_id: Uuid,
    /// Devis accepté dont l'ordre est issu, si conversion
    pub devis_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Au moins une ligne est requise"))]
    pub lignes: Vec<LigneDocument>,
}

/// Requête de remplacement des lignes d'un ordre
#[derive(Debug, Deserialize)]
pub struct UpdateLignesOdrRequest {
    pub lignes: Vec<LigneDocument>,
}

/// Requête de changement de statut
#[derive(Debug, Deserialize)]
pub struct TransitionOdrRequest {
    pub statut: StatutOdr,
    pub acteur: Option<String>,
}

/// Filtre de liste des ordres
#[derive(Debug, Deserialize)]
pub struct OdrQuery {
    pub client_id: Option<Uuid>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[post("/ordres-reparation")]
pub async fn create_odr(
    state: web::Data<AppState>,
    request: web::Json<CreateOdrRequest>,
) -> AppResult<HttpResponse> {
    request.validate()?;
    let request = request.into_inner();

    let odr = state
        .odrs
        .create(NewOrdreReparation {
            client_id: request.client_id,
            vehicule_id: request.vehicule_id,
            devis_id: request.devis_id,
            lignes: request.lignes,
        })
        .await?;

    Ok(HttpResponse::Created().json(odr))
}

#[get("/ordres-reparation/{id}")]
pub async fn get_odr(state: web::Data<AppState>, id: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let odr = state.odrs.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(odr))
}

#[get("/ordres-reparation")]
pub async fn list_odrs(
    state: web::Data<AppState>,
    query: web::Query<OdrQuery>,
) -> AppResult<HttpResponse> {
    let pagination = PaginationQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let page = state
        .odrs
        .list(query.client_id, pagination.page(), pagination.per_page())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[put("/ordres-reparation/{id}/lignes")]
pub async fn update_lignes_odr(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<UpdateLignesOdrRequest>,
) -> AppResult<HttpResponse> {
    let odr = state
        .odrs
        .update_lignes(id.into_inner(), request.into_inner().lignes)
        .await?;
    Ok(HttpResponse::Ok().json(odr))
}

#[post("/ordres-reparation/{id}/transition")]
pub async fn transition_odr(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<TransitionOdrRequest>,
) -> AppResult<HttpResponse> {
    let request = request.into_inner();
    let acteur = request.acteur.as_deref().unwrap_or("système");

    let odr = state
        .odrs
        .transition(id.into_inner(), request.statut, acteur)
        .await?;
    Ok(HttpResponse::Ok().json(odr))
}

#[delete("/ordres-reparation/{id}")]
pub async fn delete_odr(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.odrs.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
