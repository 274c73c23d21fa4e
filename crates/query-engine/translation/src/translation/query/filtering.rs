//! Handle filtering/where clauses translation.

use std::fmt;
use std::sync::Arc;

use query_engine_models::models;
use query_engine_sql::sql::string::BindValues;

use super::params::ParamNames;
use super::standard::StandardFilterTranslator;
use crate::translation::error::Error;

/// A boolean SQL expression together with the values of its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub bind_values: BindValues,
}

/// Turns filters of some variant into SQL.
///
/// Implementations must take every bind parameter name from `params`, so
/// that several filters can share one statement.
pub trait FilterTranslator: fmt::Debug + Send + Sync {
    fn translate(&self, filter: &models::Filter, params: &mut ParamNames)
        -> Result<Fragment, Error>;
}

/// Which filters a registered translator accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantSelector {
    /// Every filter, whatever its variant.
    AnyFilter,
    /// Standard filters.
    Standard,
    /// Filters built with `Filter::custom` and this variant tag.
    Custom(String),
}

impl VariantSelector {
    pub fn accepts(&self, filter: &models::Filter) -> bool {
        match (self, filter.kind()) {
            (VariantSelector::AnyFilter, _)
            | (VariantSelector::Standard, models::FilterKind::Standard(_)) => true,
            (VariantSelector::Custom(tag), models::FilterKind::Custom(variant)) => tag == variant,
            _ => false,
        }
    }
}

/// The translators available to a data source.
///
/// Lookup walks the translators in registration order and uses the first
/// one whose selector accepts the filter.
#[derive(Debug, Clone, Default)]
pub struct TranslatorRegistry {
    translators: Vec<(VariantSelector, Arc<dyn FilterTranslator>)>,
}

impl TranslatorRegistry {
    /// A registry without any translator.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with the standard translator registered.
    pub fn standard() -> Self {
        let translator: Arc<dyn FilterTranslator> = Arc::new(StandardFilterTranslator);
        TranslatorRegistry {
            translators: vec![(VariantSelector::Standard, translator)],
        }
    }

    /// Register a translator. Registering a selector again replaces the
    /// previous translator and keeps its position.
    pub fn register(
        &mut self,
        selector: VariantSelector,
        translator: impl FilterTranslator + 'static,
    ) -> Result<&mut Self, Error> {
        if let VariantSelector::Custom(tag) = &selector {
            if tag.trim().is_empty() {
                return Err(Error::InvalidRequest(models::Error::BlankVariant));
            }
        }
        let translator: Arc<dyn FilterTranslator> = Arc::new(translator);
        match self
            .translators
            .iter_mut()
            .find(|(registered, _)| *registered == selector)
        {
            Some(entry) => entry.1 = translator,
            None => self.translators.push((selector, translator)),
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }

    /// Translate one filter with the first translator that accepts it.
    pub fn translate(
        &self,
        filter: &models::Filter,
        params: &mut ParamNames,
    ) -> Result<Fragment, Error> {
        let (_, translator) = self
            .translators
            .iter()
            .find(|(selector, _)| selector.accepts(filter))
            .ok_or_else(|| Error::TranslatorNotFound {
                variant: filter.variant().to_string(),
                filter: filter.to_string(),
            })?;
        let fragment = translator.translate(filter, params)?;
        if fragment.sql.trim().is_empty() {
            return Err(Error::UnexpectedValue(format!(
                "translator {translator:?} returned an empty condition for filter {filter}"
            )));
        }
        Ok(fragment)
    }
}

/// Translate every filter and join the conditions with `AND`.
/// `None` when there are no filters.
pub fn translate_filters(
    registry: &TranslatorRegistry,
    filters: &[models::Filter],
    params: &mut ParamNames,
) -> Result<Option<Fragment>, Error> {
    let mut conditions = Vec::with_capacity(filters.len());
    let mut bind_values = BindValues::new();
    for filter in filters {
        let fragment = registry.translate(filter, params)?;
        conditions.push(fragment.sql);
        bind_values.merge(fragment.bind_values)?;
    }
    if conditions.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Fragment {
            sql: conditions.join(" AND "),
            bind_values,
        }))
    }
}
