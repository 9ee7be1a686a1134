use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::catalog::{self, Category, CategoryFamily, SkillLevel};

/// In-progress registrant details collected on the first step of the flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationDraft {
    pub full_name: String,
    pub email: String,
    pub market: String,
    pub city: String,
    pub categories: BTreeSet<Category>,
    pub partner_name: String,
    pub partner_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_reported_level: Option<SkillLevel>,
}

/// Blocking, user-facing problems that keep a draft on the details step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftViolation {
    #[error("please enter your full name")]
    MissingFullName,
    #[error("please enter your email address")]
    MissingEmail,
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("please select at least one category")]
    NoCategorySelected,
    #[error("men's and women's categories cannot be combined")]
    MixedCategoryFamilies,
    #[error("please choose both a market and a city")]
    MissingLocation,
    #[error("{city} is not an office in {market}")]
    UnknownLocation { market: String, city: String },
    #[error("doubles categories need your partner's name and email")]
    MissingPartnerDetails,
    #[error("partner email '{0}' is not a valid email address")]
    InvalidPartnerEmail(String),
}

impl RegistrationDraft {
    /// Switch market; the city falls back to the market's first office.
    pub fn set_market(&mut self, market: &str) {
        self.market = market.trim().to_string();
        self.city = catalog::default_city(&self.market)
            .map(str::to_string)
            .unwrap_or_default();
    }

    pub fn set_city(&mut self, city: &str) {
        self.city = city.trim().to_string();
    }

    /// Toggle a category. Picking a men's category drops every women's one and vice versa.
    pub fn toggle_category(&mut self, category: Category) {
        if self.categories.remove(&category) {
            self.clear_partner_unless_doubles();
            return;
        }

        if let Some(family) = category.family() {
            let evicted = family.opposite();
            self.categories
                .retain(|selected| selected.family() != Some(evicted));
        }
        self.categories.insert(category);
        self.clear_partner_unless_doubles();
    }

    pub fn requires_partner(&self) -> bool {
        self.categories.iter().any(|category| category.is_doubles())
    }

    pub fn category_labels(&self) -> Vec<&'static str> {
        self.categories.iter().map(|category| category.label()).collect()
    }

    pub fn validate(&self) -> Result<(), DraftViolation> {
        if is_blank(&self.full_name) {
            return Err(DraftViolation::MissingFullName);
        }
        if is_blank(&self.email) {
            return Err(DraftViolation::MissingEmail);
        }
        if !is_structurally_valid_email(&self.email) {
            return Err(DraftViolation::InvalidEmail(self.email.trim().to_string()));
        }
        if self.categories.is_empty() {
            return Err(DraftViolation::NoCategorySelected);
        }
        if self.has_both_families() {
            return Err(DraftViolation::MixedCategoryFamilies);
        }
        if is_blank(&self.market) || is_blank(&self.city) {
            return Err(DraftViolation::MissingLocation);
        }
        if !catalog::is_known_location(self.market.trim(), self.city.trim()) {
            return Err(DraftViolation::UnknownLocation {
                market: self.market.trim().to_string(),
                city: self.city.trim().to_string(),
            });
        }
        if self.requires_partner() {
            if is_blank(&self.partner_name) || is_blank(&self.partner_email) {
                return Err(DraftViolation::MissingPartnerDetails);
            }
            if !is_structurally_valid_email(&self.partner_email) {
                return Err(DraftViolation::InvalidPartnerEmail(
                    self.partner_email.trim().to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Drop partner details that no selected category can use.
    pub fn discard_unused_partner(&mut self) {
        self.clear_partner_unless_doubles();
    }

    fn has_both_families(&self) -> bool {
        let families: Vec<_> = self
            .categories
            .iter()
            .filter_map(|category| category.family())
            .collect();
        families.contains(&CategoryFamily::Men) && families.contains(&CategoryFamily::Women)
    }

    fn clear_partner_unless_doubles(&mut self) {
        if !self.requires_partner() {
            self.partner_name.clear();
            self.partner_email.clear();
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn is_structurally_valid_email(raw: &str) -> bool {
    let value = raw.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
