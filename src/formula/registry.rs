//! Transform registry: the table of converters between formula formats.
//!
//! A registry is an ordinary value, built once and shared by reference (or
//! `Arc`) with every formula that needs converting. Lookups take a read lock
//! and hand back a cloned converter handle, so converters always run with the
//! lock released.

use super::convert::{self, Stylesheet};
use super::types::{DisplayMode, Format, Representation, TransformKey};
use crate::common::error::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A conversion function from one format to another.
///
/// Receives the value of the source slot and the formula's display mode.
/// Must be pure: results are cached per formula.
pub type Converter =
    Arc<dyn Fn(&Representation, DisplayMode) -> Result<Representation> + Send + Sync>;

/// Table of converters keyed by (source, target) format.
pub struct TransformRegistry {
    transforms: RwLock<HashMap<TransformKey, Converter>>,
}

impl TransformRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            transforms: RwLock::new(HashMap::with_capacity(6)),
        }
    }

    /// Create a registry with the default converters installed.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register_defaults();
        registry
    }

    /// Install the canonical converters: LaTeX → MathML, MathML → OMML and
    /// OMML → MathML.
    ///
    /// LaTeX → OMML and both directions into LaTeX stay unregistered; the
    /// first is reachable through MathML, the others need a caller-supplied
    /// converter. Without the `latex` feature only the two XML converters are
    /// installed. Existing entries for these keys are replaced.
    pub fn register_defaults(&self) {
        let defaults = convert::default_converters();
        let mut transforms = self.transforms.write();
        for (key, converter) in defaults {
            debug!(transform = %key, "Registering default converter");
            transforms.insert(key, converter);
        }
    }

    /// Install or replace the converter for `source → target`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTransformKey`] if `source == target`.
    ///
    /// # Example
    ///
    /// ```
    /// use formulary::formula::{Format, Representation, TransformRegistry};
    ///
    /// let registry = TransformRegistry::new();
    /// registry
    ///     .register(Format::MathML, Format::LaTeX, |value, _display| {
    ///         Ok(Representation::Text(value.to_markup()))
    ///     })
    ///     .unwrap();
    /// assert_eq!(registry.len(), 1);
    /// ```
    pub fn register<F>(&self, source: Format, target: Format, converter: F) -> Result<()>
    where
        F: Fn(&Representation, DisplayMode) -> Result<Representation> + Send + Sync + 'static,
    {
        let key = TransformKey::new(source, target)?;
        self.register_key(key, Arc::new(converter));
        Ok(())
    }

    /// Install or replace the converter for an already validated key.
    pub fn register_key(&self, key: TransformKey, converter: Converter) {
        let replaced = self.transforms.write().insert(key, converter).is_some();
        debug!(transform = %key, replaced, "Registered converter");
    }

    /// Register an XML-to-XML stylesheet as the converter for
    /// `source → target`.
    ///
    /// Text values handed to the converter are parsed before the stylesheet
    /// is applied.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTransformKey`] unless both formats are XML formats and
    /// differ.
    pub fn register_stylesheet<S>(&self, source: Format, target: Format, stylesheet: S) -> Result<()>
    where
        S: Stylesheet + 'static,
    {
        if !source.is_xml() || !target.is_xml() {
            return Err(Error::InvalidTransformKey {
                from: source,
                to: target,
            });
        }
        let key = TransformKey::new(source, target)?;
        self.register_key(key, convert::stylesheet_converter(source, stylesheet));
        Ok(())
    }

    /// Converter registered for `key`, if any.
    pub fn lookup(&self, key: TransformKey) -> Option<Converter> {
        self.transforms.read().get(&key).cloned()
    }

    /// Converter registered for `source → target`, if any.
    ///
    /// Identity pairs never have a converter.
    pub fn find(&self, source: Format, target: Format) -> Option<Converter> {
        TransformKey::new(source, target)
            .ok()
            .and_then(|key| self.lookup(key))
    }

    /// Whether a converter is registered for `source → target`.
    pub fn contains(&self, source: Format, target: Format) -> bool {
        TransformKey::new(source, target)
            .map(|key| self.transforms.read().contains_key(&key))
            .unwrap_or(false)
    }

    /// Registered keys in (source, target) order.
    pub fn keys(&self) -> Vec<TransformKey> {
        let mut keys: Vec<_> = self.transforms.read().keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.transforms.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.read().is_empty()
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::XmlElement;
    use std::thread;

    fn echo(value: &Representation, _display: DisplayMode) -> Result<Representation> {
        Ok(value.clone())
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = TransformRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.find(Format::LaTeX, Format::MathML).is_none());
    }

    #[test]
    fn test_register_defaults_installs_three_converters() {
        let registry = TransformRegistry::with_defaults();
        assert!(registry.contains(Format::MathML, Format::OMML));
        assert!(registry.contains(Format::OMML, Format::MathML));
        assert!(!registry.contains(Format::LaTeX, Format::OMML));
        assert!(!registry.contains(Format::MathML, Format::LaTeX));
        assert!(!registry.contains(Format::OMML, Format::LaTeX));
        #[cfg(feature = "latex")]
        {
            assert!(registry.contains(Format::LaTeX, Format::MathML));
            assert_eq!(registry.len(), 3);
        }
    }

    #[test]
    fn test_register_rejects_identity_key() {
        let registry = TransformRegistry::new();
        let err = registry.register(Format::LaTeX, Format::LaTeX, echo).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransformKey {
                from: Format::LaTeX,
                to: Format::LaTeX
            }
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reregistration_overwrites() {
        let registry = TransformRegistry::new();
        registry
            .register(Format::LaTeX, Format::OMML, |_, _| Ok("first".into()))
            .unwrap();
        registry
            .register(Format::LaTeX, Format::OMML, |_, _| Ok("second".into()))
            .unwrap();
        assert_eq!(registry.len(), 1);

        let converter = registry.find(Format::LaTeX, Format::OMML).unwrap();
        let out = converter(&"x".into(), DisplayMode::Inline).unwrap();
        assert_eq!(out.as_text(), Some("second"));
    }

    #[test]
    fn test_stylesheet_requires_xml_formats() {
        struct Identity;
        impl Stylesheet for Identity {
            fn apply(&self, tree: &XmlElement, _display: DisplayMode) -> Result<XmlElement> {
                Ok(tree.clone())
            }
        }

        let registry = TransformRegistry::new();
        assert!(matches!(
            registry.register_stylesheet(Format::LaTeX, Format::OMML, Identity),
            Err(Error::InvalidTransformKey { .. })
        ));
        registry
            .register_stylesheet(Format::OMML, Format::MathML, Identity)
            .unwrap();

        let converter = registry.find(Format::OMML, Format::MathML).unwrap();
        let out = converter(&"<m:oMath/>".into(), DisplayMode::Inline).unwrap();
        assert_eq!(out.as_tree().map(|t| t.name()), Some("m:oMath"));
    }

    #[test]
    fn test_keys_are_sorted() {
        let registry = TransformRegistry::new();
        registry.register(Format::OMML, Format::LaTeX, echo).unwrap();
        registry.register(Format::LaTeX, Format::MathML, echo).unwrap();
        let keys = registry.keys();
        assert_eq!(keys[0].source(), Format::LaTeX);
        assert_eq!(keys[1].source(), Format::OMML);
    }

    #[test]
    fn test_concurrent_register_and_lookup() {
        let registry = Arc::new(TransformRegistry::with_defaults());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        if i % 2 == 0 {
                            registry.register(Format::MathML, Format::LaTeX, echo).unwrap();
                        } else {
                            assert!(registry.find(Format::MathML, Format::OMML).is_some());
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(registry.contains(Format::MathML, Format::LaTeX));
    }
}
