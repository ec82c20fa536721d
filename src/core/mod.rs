// core/mod.rs
pub mod alerts;
pub mod dashboard;
pub mod lifecycle;
pub mod numbering;
pub mod totals;

pub mod catalogue_service;
pub mod client_service;
pub mod dashboard_service;
pub mod devis_service;
pub mod facture_service;
pub mod odr_service;

// Ré-exports pour faciliter l'import
pub use alerts::{evaluate_alerts, AlerteEcheance, AlertesEcheances};
pub use catalogue_service::CatalogueService;
pub use client_service::ClientService;
pub use dashboard::{aggregate, MetricsSnapshot};
pub use dashboard_service::DashboardService;
pub use devis_service::DevisService;
pub use facture_service::FactureService;
pub use lifecycle::TransitionError;
pub use numbering::{format_numero, CompteurPieces, GenerateurNumeros, TypePiece};
pub use odr_service::OdrService;
pub use totals::{compute_totals, Totaux};

use crate::infrastructure::database::SqlCompteurPieces;

/// Générateur de numéros branché sur la base de données
pub type Numeroteur = GenerateurNumeros<SqlCompteurPieces>;
