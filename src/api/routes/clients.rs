use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::AppState;
use crate::api::routes::PaginationQuery;
use crate::domain::client::{NewClient, NewVehicule, TypeClient, UpdateClient};
use crate::utils::error::AppResult;

/// Requête de création de client
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, message = "Le nom est requis"))]
    pub nom: String,
    pub prenom: Option<String>,
    #[validate(email(message = "Email invalide"))]
    pub email: String,
    #[validate(length(min = 1, message = "Le téléphone est requis"))]
    pub telephone: String,
    pub adresse: Option<String>,
    pub type_client: TypeClient,
}

/// Requête de mise à jour de client
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClientRequest {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    #[validate(email(message = "Email invalide"))]
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub type_client: Option<TypeClient>,
}

/// Requête de création de véhicule
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehiculeRequest {
    pub client_id: Uuid,
    #[validate(length(min = 1, message = "L'immatriculation est requise"))]
    pub immatriculation: String,
    #[validate(length(min = 1, message = "La marque est requise"))]
    pub marque: String,
    #[validate(length(min = 1, message = "Le modèle est requis"))]
    pub modele: String,
    pub annee: Option<i32>,
    pub vin: Option<String>,
    pub kilometrage: Option<i32>,
}

#[post("/clients")]
pub async fn create_client(
    state: web::Data<AppState>,
    request: web::Json<CreateClientRequest>,
) -> AppResult<HttpResponse> {
    request.validate()?;
    let request = request.into_inner();

    let client = state
        .clients
        .create_client(NewClient {
            nom: request.nom,
            prenom: request.prenom,
            email: request.email,
            telephone: request.telephone,
            adresse: request.adresse,
            type_client: request.type_client,
        })
        .await?;

    Ok(HttpResponse::Created().json(client))
}

#[get("/clients/{id}")]
pub async fn get_client(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let client = state.clients.get_client(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(client))
}

#[get("/clients")]
pub async fn list_clients(
    state: web::Data<AppState>,
    query: web::Query<PaginationQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .clients
        .list_clients(query.page(), query.per_page())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[put("/clients/{id}")]
pub async fn update_client(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<UpdateClientRequest>,
) -> AppResult<HttpResponse> {
    request.validate()?;
    let request = request.into_inner();

    let client = state
        .clients
        .update_client(
            id.into_inner(),
            UpdateClient {
                nom: request.nom,
                prenom: request.prenom,
                email: request.email,
                telephone: request.telephone,
                adresse: request.adresse,
                type_client: request.type_client,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(client))
}

#[delete("/clients/{id}")]
pub async fn delete_client(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.clients.delete_client(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/clients/{id}/vehicules")]
pub async fn list_vehicules_client(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let vehicules = state.clients.list_vehicules_client(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(vehicules))
}

#[post("/vehicules")]
pub async fn create_vehicule(
    state: web::Data<AppState>,
    request: web::Json<CreateVehiculeRequest>,
) -> AppResult<HttpResponse> {
    request.validate()?;
    let request = request.into_inner();

    let vehicule = state
        .clients
        .create_vehicule(NewVehicule {
            client_id: request.client_id,
            immatriculation: request.immatriculation,
            marque: request.marque,
            modele: request.modele,
            annee: request.annee,
            vin: request.vin,
            kilometrage: request.kilometrage,
        })
        .await?;

    Ok(HttpResponse::Created().json(vehicule))
}

#[get("/vehicules/{id}")]
pub async fn get_vehicule(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let vehicule = state.clients.get_vehicule(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(vehicule))
}

#[get("/vehicules")]
pub async fn list_vehicules(
    state: web::Data<AppState>,
    query: web::Query<PaginationQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .clients
        .list_vehicules(query.page(), query.per_page())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[delete("/vehicules/{id}")]
pub async fn delete_vehicule(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.clients.delete_vehicule(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
