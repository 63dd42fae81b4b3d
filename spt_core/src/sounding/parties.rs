//! Records around a sounding: the drilling company, the engineer of record,
//! the work site and the client project. Plain data for the report header.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default geodetic datum for Brazilian surveys
pub const DEFAULT_DATUM: &str = "SIRGAS2000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub legal_name: String,
    #[serde(default)]
    pub trade_name: Option<String>,
    #[serde(default)]
    pub cnpj: Option<String>,
    #[serde(default)]
    pub crea: Option<String>,
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub logo_path: Option<String>,
}

impl Company {
    pub fn new(legal_name: impl Into<String>, address: impl Into<String>) -> Self {
        Company {
            id: Uuid::new_v4(),
            legal_name: legal_name.into(),
            trade_name: None,
            cnpj: None,
            crea: None,
            address: address.into(),
            city: None,
            state: None,
            phone: None,
            email: None,
            website: None,
            logo_path: None,
        }
    }
}

/// Engineer (or geologist) legally responsible for the sounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsibleTechnician {
    pub id: Uuid,
    pub name: String,
    /// CREA registration number
    pub crea: String,
    pub role: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub signature_path: Option<String>,
}

impl ResponsibleTechnician {
    pub fn new(name: impl Into<String>, crea: impl Into<String>, role: impl Into<String>) -> Self {
        ResponsibleTechnician {
            id: Uuid::new_v4(),
            name: name.into(),
            crea: crea.into(),
            role: role.into(),
            email: None,
            phone: None,
            signature_path: None,
        }
    }
}

/// Work site (obra) where the soundings were drilled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    /// Two-letter state code (UF)
    pub state: String,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub datum: Option<String>,
    #[serde(default)]
    pub utm_zone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Work {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Work {
            id: Uuid::new_v4(),
            name: name.into(),
            address: address.into(),
            city: city.into(),
            state: state.into(),
            zip_code: None,
            datum: None,
            utm_zone: None,
            notes: None,
        }
    }

    pub fn datum_or_default(&self) -> &str {
        self.datum.as_deref().unwrap_or(DEFAULT_DATUM)
    }
}

/// Client project grouping one or more works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub client: String,
    #[serde(default)]
    pub client_cnpj: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Project {
    pub fn new(name: impl Into<String>, client: impl Into<String>) -> Self {
        Project {
            id: Uuid::new_v4(),
            name: name.into(),
            code: None,
            client: client.into(),
            client_cnpj: None,
            description: None,
        }
    }
}
