use actix_web::{get, web, HttpResponse};

use crate::api::AppState;
use crate::utils::error::AppResult;

#[get("/dashboard")]
pub async fn snapshot(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let snapshot = state.dashboard.snapshot().await?;
    Ok(HttpResponse::Ok().json(snapshot))
}
