use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use garage_backoffice::api::{self, AppState};
use garage_backoffice::core::{
    CatalogueService, ClientService, DashboardService, DevisService, FactureService,
    GenerateurNumeros, OdrService,
};
use garage_backoffice::infrastructure::database::{
    ClientsRepository, Database, DevisRepository, FacturesRepository, OdrRepository,
    PrestationsRepository, SqlCompteurPieces, VehiculesRepository,
};
use garage_backoffice::utils::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialisation du logging
    setup_tracing();
    info!("🚀 Démarrage du back office atelier");

    // Chargement de la configuration
    let config = Config::from_env().expect("❌ Impossible de charger la configuration");
    info!("✅ Configuration chargée avec succès");
    info!("🔧 Mode: {}", config.run_mode);

    // Initialisation des services
    let db = Database::new(&config.database_url, config.database_max_connections)
        .await
        .expect("❌ Impossible de se connecter à la base de données");

    let pool = db.pool.clone();
    let clients = ClientsRepository::new(pool.clone());
    let vehicules = VehiculesRepository::new(pool.clone());
    let prestations = PrestationsRepository::new(pool.clone());
    let devis = DevisRepository::new(pool.clone());
    let odrs = OdrRepository::new(pool.clone());
    let factures = FacturesRepository::new(pool.clone());

    // La numérotation est centralisée dans une seule instance partagée
    let numeroteur = Arc::new(GenerateurNumeros::new(
        SqlCompteurPieces::new(pool.clone()),
        config.numerotation_max_tentatives,
    ));

    // Création de l'état de l'application
    let app_state = web::Data::new(AppState {
        clients: ClientService::new(
            clients.clone(),
            vehicules.clone(),
            devis.clone(),
            odrs.clone(),
            factures.clone(),
            numeroteur.clone(),
        ),
        catalogue: CatalogueService::new(
            prestations.clone(),
            devis.clone(),
            odrs.clone(),
            factures.clone(),
        ),
        devis: DevisService::new(
            devis.clone(),
            clients.clone(),
            vehicules.clone(),
            odrs.clone(),
            numeroteur.clone(),
            config.taux_tva,
            config.delai_validite_devis_jours,
        ),
        odrs: OdrService::new(
            odrs.clone(),
            clients.clone(),
            vehicules.clone(),
            devis.clone(),
            factures.clone(),
            numeroteur.clone(),
            config.taux_tva,
        ),
        factures: FactureService::new(
            factures.clone(),
            clients.clone(),
            odrs.clone(),
            numeroteur,
            config.taux_tva,
            config.delai_paiement_jours,
            config.delai_alerte_echeance,
        ),
        dashboard: DashboardService::new(clients, vehicules, odrs, factures),
    });

    // Configuration du serveur Actix-Web
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .app_data(app_state.clone())
            .configure(api::config)
            .default_service(
                web::route().to(|| async { "🚗 Back office atelier en cours d'exécution!" }),
            )
    })
    .bind(format!("{}:{}", config.server_host, config.server_port))?
    .workers(config.workers)
    .shutdown_timeout(10);

    info!("✅ Backend démarré avec succès!");
    info!(
        "🔗 API disponible sur http://{}:{}",
        config.server_host, config.server_port
    );

    server.run().await
}

/// Configure le tracing pour le logging structuré
fn setup_tracing() {
    let log_level = env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(tracing::Level::INFO);

    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".into());

    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .with(if log_format == "json" {
            Box::new(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(true),
            ) as Box<dyn tracing_subscriber::Layer<_> + Send + Sync>
        } else {
            Box::new(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_line_number(true)
                    .with_file(true),
            ) as Box<dyn tracing_subscriber::Layer<_> + Send + Sync>
        });

    subscriber.init();
}
