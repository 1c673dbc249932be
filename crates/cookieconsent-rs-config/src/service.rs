//! Consent configuration service: defaults, stored overrides and the
//! operations an admin or page request performs on them.

use crate::ConfigError;
use crate::defaults::{SiteContext, default_config};
use crate::emit;
use crate::fields::catalog;
use crate::form::FormSubmission;
use crate::merge::merge_distinct;
use crate::path::{self, Path};
use crate::sanitize::{PlainTextSanitizer, TextSanitizer, sanitize_tree, sanitize_value};
use crate::store::{self, OPTION_NAME, SettingsStore, SiteId};
use crate::value::{ConfigTree, ConfigValue};
use log::{debug, info};

/// Owns the default tree, the settings store and the text sanitizer.
///
/// Built once at startup and passed to whatever handles requests.
pub struct ConsentService<S> {
    store: S,
    defaults: ConfigTree,
    sanitizer: Box<dyn TextSanitizer>,
}

impl<S: SettingsStore> ConsentService<S> {
    /// Service with the built-in defaults for `site`.
    pub fn new(store: S, site: &SiteContext) -> Self {
        Self::with_defaults(store, default_config(site))
    }

    /// Service with an explicit default tree.
    pub fn with_defaults(store: S, defaults: ConfigTree) -> Self {
        Self {
            store,
            defaults,
            sanitizer: Box::new(PlainTextSanitizer),
        }
    }

    /// Replace the plain-text sanitizer.
    pub fn with_sanitizer(mut self, sanitizer: impl TextSanitizer + 'static) -> Self {
        self.sanitizer = Box::new(sanitizer);
        self
    }

    pub fn defaults(&self) -> &ConfigTree {
        &self.defaults
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Stored override tree; empty when the site never saved settings.
    pub fn overrides(&self, site: &SiteId) -> Result<ConfigTree, ConfigError> {
        Ok(self
            .store
            .get_option(site, OPTION_NAME)?
            .unwrap_or_default())
    }

    /// Defaults with the stored overrides merged on top.
    pub fn effective_config(&self, site: &SiteId) -> Result<ConfigTree, ConfigError> {
        let overrides = self.overrides(site)?;
        debug!(
            "building effective config (site={site}, override_keys={})",
            overrides.len()
        );
        Ok(merge_distinct(&self.defaults, &overrides))
    }

    /// Page fragment running the banner with the effective configuration.
    pub fn inline_script(&self, site: &SiteId) -> Result<String, ConfigError> {
        emit::inline_script(&self.effective_config(site)?)
    }

    /// Stored value for a strict field name such as
    /// `guiOptions[consentModal][layout]`; the empty sentinel when unset.
    pub fn field_value(&self, site: &SiteId, field_name: &str) -> Result<ConfigValue, ConfigError> {
        let path = Path::parse_field_name(field_name)?;
        let overrides = self.overrides(site)?;
        Ok(path::read(&overrides, &path).clone())
    }

    /// Effective value at a leniently parsed bracket path.
    ///
    /// Only `[...]` groups are used, so `[guiOptions][consentModal]`
    /// addresses a nested key and `mode` a top-level one. Unknown paths
    /// yield the empty sentinel; only store access can fail.
    pub fn lookup(&self, site: &SiteId, path: &str) -> Result<ConfigValue, ConfigError> {
        let effective = self.effective_config(site)?;
        Ok(path::read(&effective, &Path::parse(path)).clone())
    }

    /// Sanitize a raw override tree and persist it as the site's record.
    pub fn submit(&mut self, site: &SiteId, raw: &ConfigTree) -> Result<ConfigTree, ConfigError> {
        let sanitized = sanitize_tree(raw, self.sanitizer.as_ref());
        self.store.update_option(site, OPTION_NAME, &sanitized)?;
        info!(
            "saved consent settings (site={site}, keys={})",
            sanitized.len()
        );
        Ok(sanitized)
    }

    /// Decode settings-form pairs and submit them.
    pub fn submit_form<I, K, V>(&mut self, site: &SiteId, pairs: I) -> Result<ConfigTree, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let submission = FormSubmission::from_pairs(pairs)?;
        debug!("decoded settings form (site={site}, fields={})", submission.len());
        let raw = submission.into_tree(catalog());
        self.submit(site, &raw)
    }

    /// Sanitize one raw value and store it at `field_name`, keeping the
    /// rest of the stored overrides.
    pub fn set_field(
        &mut self,
        site: &SiteId,
        field_name: &str,
        raw: &str,
    ) -> Result<ConfigValue, ConfigError> {
        let path = Path::parse_field_name(field_name)?;
        let value = sanitize_value(&ConfigValue::from(raw), self.sanitizer.as_ref());
        let mut overrides = self.overrides(site)?;
        path::write(&mut overrides, &path, value.clone());
        self.store.update_option(site, OPTION_NAME, &overrides)?;
        info!("set field (site={site}, field={path})");
        Ok(value)
    }

    /// Drop the override at `field_name`, returning the removed value.
    pub fn reset_field(
        &mut self,
        site: &SiteId,
        field_name: &str,
    ) -> Result<Option<ConfigValue>, ConfigError> {
        let path = Path::parse_field_name(field_name)?;
        let mut overrides = self.overrides(site)?;
        let removed = path::remove(&mut overrides, &path);
        if removed.is_some() {
            self.store.update_option(site, OPTION_NAME, &overrides)?;
            info!("reset field (site={site}, field={path})");
        } else {
            debug!("field has no override (site={site}, field={path})");
        }
        Ok(removed)
    }

    /// Remove the stored record of every site.
    pub fn uninstall(&mut self) -> Result<usize, ConfigError> {
        store::uninstall(&mut self.store)
    }
}
