use chrono::Utc;
use sea_orm::{TransactionTrait, prelude::*};

use crate::{CompanyProfile, EngineError, ResultEngine, company};

use super::{Engine, with_tx};

impl Engine {
    /// Return the stored company profile, if one was saved.
    pub async fn company_profile(&self) -> ResultEngine<Option<CompanyProfile>> {
        let model = company::Entity::find_by_id(company::PROFILE_ID.to_string())
            .one(&self.database)
            .await?;
        Ok(model.map(CompanyProfile::from))
    }

    /// Store the first company profile. Fails with `ExistingKey` if one exists.
    pub async fn create_company_profile(
        &self,
        profile: CompanyProfile,
    ) -> ResultEngine<CompanyProfile> {
        let profile = profile.validate()?;
        with_tx!(self, |db_tx| {
            let exists = company::Entity::find_by_id(company::PROFILE_ID.to_string())
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey("company profile".to_string()));
            }
            company::ActiveModel::from_profile(&profile, Utc::now())
                .insert(&db_tx)
                .await?;
            tracing::info!("company profile '{}' created", profile.name);
            Ok(profile)
        })
    }

    /// Create or replace the company profile.
    pub async fn upsert_company_profile(
        &self,
        profile: CompanyProfile,
    ) -> ResultEngine<CompanyProfile> {
        let profile = profile.validate()?;
        with_tx!(self, |db_tx| {
            let model = company::ActiveModel::from_profile(&profile, Utc::now());
            let exists = company::Entity::find_by_id(company::PROFILE_ID.to_string())
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                model.update(&db_tx).await?;
            } else {
                model.insert(&db_tx).await?;
            }
            tracing::info!("company profile '{}' saved", profile.name);
            Ok(profile)
        })
    }
}
