use actix_web::web;
use serde::Deserialize;

pub mod clients;
pub mod dashboard;
pub mod devis;
pub mod factures;
pub mod ordres_reparation;
pub mod prestations;

/// Paramètres de pagination communs aux listes
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PaginationQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Clients et véhicules
            .service(clients::create_client)
            .service(clients::get_client)
            .service(clients::list_clients)
            .service(clients::update_client)
            .service(clients::delete_client)
            .service(clients::list_vehicules_client)
            .service(clients::create_vehicule)
            .service(clients::get_vehicule)
            .service(clients::list_vehicules)
            .service(clients::delete_vehicule)
            // Catalogue de prestations
            .service(prestations::create_prestation)
            .service(prestations::get_prestation)
            .service(prestations::list_prestations)
            .service(prestations::update_prestation)
            .service(prestations::delete_prestation)
            // Devis
            .service(devis::create_devis)
            .service(devis::get_devis)
            .service(devis::list_devis)
            .service(devis::update_lignes_devis)
            .service(devis::transition_devis)
            .service(devis::conversion_odr_possible)
            .service(devis::delete_devis)
            // Ordres de réparation
            .service(ordres_reparation::create_odr)
            .service(ordres_reparation::get_odr)
            .service(ordres_reparation::list_odrs)
            .service(ordres_reparation::update_lignes_odr)
            .service(ordres_reparation::transition_odr)
            .service(ordres_reparation::delete_odr)
            // Factures : les routes fixes avant /factures/{id}
            .service(factures::echeances)
            .service(factures::create_facture)
            .service(factures::get_facture)
            .service(factures::list_factures)
            .service(factures::update_lignes_facture)
            .service(factures::transition_facture)
            .service(factures::annuler_facture_payee)
            .service(factures::delete_facture)
            // Tableau de bord
            .service(dashboard::snapshot),
    );

    // Routes publiques
    cfg.service(web::resource("/health").route(web::get().to(health_check)));
}

/// Endpoint de santé pour les probes
async fn health_check() -> impl actix_web::Responder {
    actix_web::HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
