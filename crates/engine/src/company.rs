//! Company profile shown in document headers.
//!
//! There is at most one profile per database.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    ResultEngine,
    util::{normalize_optional_text, normalize_required_text},
};

/// Primary key of the single profile row.
pub(crate) const PROFILE_ID: &str = "default";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl CompanyProfile {
    pub(crate) fn validate(self) -> ResultEngine<Self> {
        Ok(Self {
            name: normalize_required_text(&self.name, "company name")?,
            phone: normalize_optional_text(self.phone.as_deref()),
            email: normalize_optional_text(self.email.as_deref()),
            address: normalize_optional_text(self.address.as_deref()),
        })
    }

    /// Lines printed under the company name in report headers.
    pub fn contact_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(address) = &self.address {
            lines.extend(address.lines().map(str::to_string));
        }
        let contact: Vec<&str> = [self.phone.as_deref(), self.email.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !contact.is_empty() {
            lines.push(contact.join(" | "));
        }
        lines
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "company_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_profile(profile: &CompanyProfile, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: ActiveValue::Set(PROFILE_ID.to_string()),
            name: ActiveValue::Set(profile.name.clone()),
            phone: ActiveValue::Set(profile.phone.clone()),
            email: ActiveValue::Set(profile.email.clone()),
            address: ActiveValue::Set(profile.address.clone()),
            updated_at: ActiveValue::Set(updated_at),
        }
    }
}

impl From<Model> for CompanyProfile {
    fn from(model: Model) -> Self {
        Self {
            name: model.name,
            phone: model.phone,
            email: model.email,
            address: model.address,
        }
    }
}
