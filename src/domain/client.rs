use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Type de client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
pub enum TypeClient {
    /// Particulier ou petit compte
    Normal,
    /// Grand compte (flottes, assureurs) avec interlocuteurs dédiés
    GrandCompte,
}

impl Default for TypeClient {
    fn default() -> Self {
        TypeClient::Normal
    }
}

impl fmt::Display for TypeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeClient::Normal => write!(f, "NORMAL"),
            TypeClient::GrandCompte => write!(f, "GRAND_COMPTE"),
        }
    }
}

/// Un client de l'atelier
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: Uuid,
    /// Numéro lisible attribué à la création (CLI-001), jamais modifié
    pub numero_client: String,
    pub nom: String,
    pub prenom: Option<String>,
    pub email: String,
    pub telephone: String,
    pub adresse: Option<String>,
    pub type_client: TypeClient,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Données requises pour créer un client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewClient {
    pub nom: String,
    pub prenom: Option<String>,
    pub email: String,
    pub telephone: String,
    pub adresse: Option<String>,
    pub type_client: TypeClient,
}

/// Champs modifiables d'un client (le numéro ne l'est pas)
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct UpdateClient {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub type_client: Option<TypeClient>,
}

impl Client {
    /// Crée un client avec son numéro attribué par la numérotation
    pub fn new(numero_client: String, data: NewClient) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            numero_client,
            nom: data.nom,
            prenom: data.prenom,
            email: data.email,
            telephone: data.telephone,
            adresse: data.adresse,
            type_client: data.type_client,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applique une mise à jour partielle
    pub fn apply(&mut self, update: UpdateClient) {
        if let Some(nom) = update.nom {
            self.nom = nom;
        }
        if update.prenom.is_some() {
            self.prenom = update.prenom;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(telephone) = update.telephone {
            self.telephone = telephone;
        }
        if update.adresse.is_some() {
            self.adresse = update.adresse;
        }
        if let Some(type_client) = update.type_client {
            self.type_client = type_client;
        }
        self.updated_at = Utc::now();
    }
}

/// Un véhicule, rattaché à exactement un client
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicule {
    pub id: Uuid,
    pub client_id: Uuid,
    /// Plaque d'immatriculation
    pub immatriculation: String,
    pub marque: String,
    pub modele: String,
    pub annee: Option<i32>,
    /// Numéro de série constructeur
    pub vin: Option<String>,
    pub kilometrage: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Données requises pour créer un véhicule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewVehicule {
    pub client_id: Uuid,
    pub immatriculation: String,
    pub marque: String,
    pub modele: String,
    pub annee: Option<i32>,
    pub vin: Option<String>,
    pub kilometrage: Option<i32>,
}

impl Vehicule {
    pub fn new(data: NewVehicule) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            client_id: data.client_id,
            immatriculation: data.immatriculation,
            marque: data.marque,
            modele: data.modele,
            annee: data.annee,
            vin: data.vin,
            kilometrage: data.kilometrage,
            created_at: now,
            updated_at: now,
        }
    }
}
