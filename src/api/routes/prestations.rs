use actix_web::{delete, get, post, put, web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::routes::PaginationQuery;
use crate::api::AppState;
use crate::domain::prestation::{NewPrestation, TypeService};
use crate::utils::error::AppResult;

/// Requête de création ou de mise à jour de prestation
#[derive(Debug, Deserialize, Validate)]
pub struct PrestationRequest {
    #[validate(length(min = 1, message = "Le nom est requis"))]
    pub nom: String,
    pub description: Option<String>,
    pub type_service: TypeService,
    #[validate(custom = "valider_prix")]
    pub prix_base_ttc: Decimal,
}

/// Filtre de liste du catalogue
#[derive(Debug, Deserialize)]
pub struct CatalogueQuery {
    pub type_service: Option<TypeService>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl CatalogueQuery {
    fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

fn valider_prix(prix: &Decimal) -> Result<(), validator::ValidationError> {
    if prix.is_sign_negative() {
        let mut err = validator::ValidationError::new("prix_base_ttc");
        err.message = Some("Le prix ne peut pas être négatif".into());
        return Err(err);
    }
    Ok(())
}

impl PrestationRequest {
    fn into_new(self) -> NewPrestation {
        NewPrestation {
            nom: self.nom,
            description: self.description,
            type_service: self.type_service,
            prix_base_ttc: self.prix_base_ttc,
        }
    }
}

#[post("/prestations")]
pub async fn create_prestation(
    state: web::Data<AppState>,
    request: web::Json<PrestationRequest>,
) -> AppResult<HttpResponse> {
    request.validate()?;
    let prestation = state.catalogue.create(request.into_inner().into_new()).await?;
    Ok(HttpResponse::Created().json(prestation))
}

#[get("/prestations/{id}")]
pub async fn get_prestation(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let prestation = state.catalogue.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(prestation))
}

#[get("/prestations")]
pub async fn list_prestations(
    state: web::Data<AppState>,
    query: web::Query<CatalogueQuery>,
) -> AppResult<HttpResponse> {
    let pagination = query.pagination();
    let page = state
        .catalogue
        .list(query.type_service, pagination.page(), pagination.per_page())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[put("/prestations/{id}")]
pub async fn update_prestation(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<PrestationRequest>,
) -> AppResult<HttpResponse> {
    request.validate()?;
    let prestation = state
        .catalogue
        .update(id.into_inner(), request.into_inner().into_new())
        .await?;
    Ok(HttpResponse::Ok().json(prestation))
}

#[delete("/prestations/{id}")]
pub async fn delete_prestation(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.catalogue.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
