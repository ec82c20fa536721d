pub mod clients;
pub mod compteur;
pub mod devis;
pub mod factures;
pub mod ordres_reparation;
pub mod prestations;
pub mod vehicules;

pub use clients::ClientsRepository;
pub use compteur::SqlCompteurPieces;
pub use devis::DevisRepository;
pub use factures::FacturesRepository;
pub use ordres_reparation::OdrRepository;
pub use prestations::PrestationsRepository;
pub use vehicules::VehiculesRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Error as SqlxError, Pool, Postgres};
use tracing::info;

/// Gestion de la connexion à la base de données
#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    /// Crée une nouvelle connexion à la base de données
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, SqlxError> {
        info!("🔌 Connexion à la base de données PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!("✅ Connexion établie avec succès");

        Ok(Self { pool })
    }
}
