// utils/config.rs
use crate::utils::error::{AppError, AppResult};
use dotenv::dotenv;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Environnement et serveur
    pub run_mode: String,
    pub server_host: String,
    pub server_port: u16,
    pub workers: usize,
    pub log_level: String,
    pub log_format: String,

    // Base de données
    pub database_url: String,
    pub database_max_connections: u32,

    // Règles métier
    /// Taux de TVA appliqué à tous les documents (0.20 = 20 %)
    pub taux_tva: Decimal,
    /// Fenêtre d'alerte avant échéance de facture, en jours
    pub delai_alerte_echeance: i64,
    /// Durée de validité par défaut d'un devis, en jours
    pub delai_validite_devis_jours: i64,
    /// Délai de paiement par défaut d'une facture, en jours
    pub delai_paiement_jours: i64,
    /// Nombre maximum de tentatives de numérotation sur conflit
    pub numerotation_max_tentatives: u32,
}

fn var_or<T: std::str::FromStr>(name: &str, default: &str) -> AppResult<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::Configuration(format!("{} must be a valid value", name)))
}

impl Config {
    /// Charger la configuration depuis les variables d'environnement
    pub fn from_env() -> AppResult<Self> {
        // Charger le fichier .env si présent
        let _ = dotenv().ok();

        let database_url = env::var("DATABASE_URL").map_err(|_| {
            AppError::Configuration("Variable d'environnement requise manquante: DATABASE_URL".to_string())
        })?;

        let config = Config {
            run_mode: env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: var_or("SERVER_PORT", "8080")?,
            workers: var_or("WORKERS", "4")?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),

            database_url,
            database_max_connections: var_or("DATABASE_MAX_CONNECTIONS", "20")?,

            taux_tva: var_or("TAUX_TVA", "0.20")?,
            delai_alerte_echeance: var_or("DELAI_ALERTE_ECHEANCE", "3")?,
            delai_validite_devis_jours: var_or("DELAI_VALIDITE_DEVIS_JOURS", "30")?,
            delai_paiement_jours: var_or("DELAI_PAIEMENT_JOURS", "30")?,
            numerotation_max_tentatives: var_or("NUMEROTATION_MAX_TENTATIVES", "3")?,
        };

        if config.taux_tva.is_sign_negative() || config.taux_tva >= Decimal::ONE {
            return Err(AppError::Configuration(
                "TAUX_TVA doit être compris entre 0 et 1".to_string(),
            ));
        }

        Ok(config)
    }

    /// Vérifier si on est en production
    pub fn is_production(&self) -> bool {
        self.run_mode == "production"
    }

    /// Vérifier si on est en développement
    pub fn is_development(&self) -> bool {
        self.run_mode == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_or_default() {
        let port: u16 = var_or("GARAGE_TEST_PORT_ABSENT", "8080").unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_var_or_invalid() {
        env::set_var("GARAGE_TEST_PORT_INVALIDE", "pas-un-nombre");
        let result: AppResult<u16> = var_or("GARAGE_TEST_PORT_INVALIDE", "8080");
        assert!(result.is_err());
        env::remove_var("GARAGE_TEST_PORT_INVALIDE");
    }
}
