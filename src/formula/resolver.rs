//! Conversion path search over a [`TransformRegistry`].
//!
//! A requested format is served from the formula's cache, then through a
//! direct converter, then (outside safe mode) through a two-hop path via the
//! third format. The search works on a shared borrow of the formula and
//! returns the values to commit, so a failure anywhere along a path leaves
//! the formula exactly as it was.

use super::entity::Formula;
use super::registry::TransformRegistry;
use super::types::{Format, Representation};
use crate::common::error::{Error, Result};
use std::borrow::Cow;
use tracing::{debug, trace};

/// Values produced by a successful path search.
struct Resolution {
    /// Intermediate value of a two-hop path, when it was computed fresh
    intermediate: Option<(Format, Representation)>,
    value: Representation,
}

/// Value of `formula` in `target` format, converting and caching on demand.
///
/// 1. A populated target slot is returned as is.
/// 2. Direct converters are tried from the source format first, then from
///    the other populated slots in format order.
/// 3. In safe mode nothing else is attempted.
/// 4. Otherwise the path source → third format → target is used when both
///    converters exist, reusing a cached intermediate value.
///
/// # Errors
///
/// [`Error::UnresolvableFormat`] when no permitted path exists, or the error
/// of the first converter that fails. Converter output that does not fit the
/// target format is [`Error::MalformedMarkup`].
pub fn resolve<'f>(
    formula: &'f mut Formula,
    registry: &TransformRegistry,
    target: Format,
    safe: bool,
) -> Result<&'f Representation> {
    let index = target.index();
    if formula.slots[index].is_some() {
        trace!(%target, "Formula cache hit");
    } else {
        let Resolution {
            intermediate,
            value,
        } = search(formula, registry, target, safe)?;
        if let Some((mid, mid_value)) = intermediate {
            let slot = &mut formula.slots[mid.index()];
            if slot.is_none() {
                *slot = Some(mid_value);
            }
        }
        formula.slots[index] = Some(value);
    }

    formula.slots[index]
        .as_ref()
        .ok_or_else(|| unresolvable(formula, target, safe))
}

fn search(
    formula: &Formula,
    registry: &TransformRegistry,
    target: Format,
    safe: bool,
) -> Result<Resolution> {
    let source = formula.source_format();
    let display = formula.display_mode();

    let origins = std::iter::once(source)
        .chain(Format::ALL.into_iter().filter(|f| *f != source && *f != target));
    for origin in origins {
        let Some(input) = formula.cached(origin) else {
            continue;
        };
        if let Some(converter) = registry.find(origin, target) {
            debug!(from = %origin, to = %target, "Resolving through direct converter");
            let value = converter(input, display)?.into_slot(target)?;
            return Ok(Resolution {
                intermediate: None,
                value,
            });
        }
    }

    if safe {
        debug!(from = %source, to = %target, "No direct converter in safe mode");
        return Err(unresolvable(formula, target, safe));
    }

    let Some(mid) = source.third(target) else {
        return Err(unresolvable(formula, target, safe));
    };
    let (Some(first), Some(second)) = (registry.find(source, mid), registry.find(mid, target))
    else {
        debug!(from = %source, via = %mid, to = %target, "No two-hop path");
        return Err(unresolvable(formula, target, safe));
    };
    let Some(input) = formula.cached(source) else {
        return Err(unresolvable(formula, target, safe));
    };

    debug!(from = %source, via = %mid, to = %target, "Resolving through two-hop path");
    let (mid_value, fresh) = match formula.cached(mid) {
        Some(cached) => (Cow::Borrowed(cached), false),
        None => {
            trace!(from = %source, to = %mid, "Invoking first hop");
            (Cow::Owned(first(input, display)?.into_slot(mid)?), true)
        },
    };
    trace!(from = %mid, to = %target, "Invoking second hop");
    let value = second(&*mid_value, display)?.into_slot(target)?;

    Ok(Resolution {
        intermediate: fresh.then(|| (mid, mid_value.into_owned())),
        value,
    })
}

fn unresolvable(formula: &Formula, target: Format, safe: bool) -> Error {
    Error::UnresolvableFormat {
        from: formula.source_format(),
        to: target,
        safe,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::XmlElement;
    use crate::formula::types::DisplayMode;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MATHML: &str = "<math><mfrac><mn>1</mn><mn>2</mn></mfrac></math>";

    fn counting_registry() -> (TransformRegistry, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = TransformRegistry::new();
        let counter = Arc::clone(&calls);
        registry
            .register(Format::LaTeX, Format::MathML, move |value, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                let latex = value.as_text().unwrap_or_default();
                Ok(XmlElement::new("math").with_child(XmlElement::new("mi").with_text(latex)).into())
            })
            .unwrap();
        let counter = Arc::clone(&calls);
        registry
            .register(Format::MathML, Format::OMML, move |value, display| {
                counter.fetch_add(1, Ordering::SeqCst);
                crate::formula::convert::mathml_to_omml(value, display)
            })
            .unwrap();
        (registry, calls)
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let (registry, calls) = counting_registry();
        let mut formula = Formula::new("y", DisplayMode::Inline).unwrap();

        let first = formula.resolve(&registry, Format::MathML, false).unwrap().clone();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let second = formula.resolve(&registry, Format::MathML, false).unwrap().clone();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_source_slot_needs_no_converter() {
        let registry = TransformRegistry::new();
        let mut formula = Formula::new("a+b", DisplayMode::Inline).unwrap();
        let value = formula.resolve(&registry, Format::LaTeX, true).unwrap();
        assert_eq!(value.as_text(), Some("a+b"));
    }

    #[test]
    fn test_two_hop_commits_intermediate() {
        let (registry, calls) = counting_registry();
        let mut formula = Formula::new("z", DisplayMode::Inline).unwrap();

        let omml = formula.omml(&registry, false).unwrap();
        assert_eq!(omml.name(), "m:oMath");
        assert_eq!(omml.text(), "z");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            formula.available_formats().as_slice(),
            &[Format::LaTeX, Format::MathML, Format::OMML]
        );

        // Both derived slots are cached now
        formula.mathml(&registry, false).unwrap();
        formula.omml(&registry, false).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_safe_mode_refuses_two_hop() {
        let (registry, calls) = counting_registry();
        let mut formula = Formula::new("z", DisplayMode::Inline).unwrap();

        let err = formula.resolve(&registry, Format::OMML, true).unwrap_err();
        assert!(matches!(
            err,
            Error::UnresolvableFormat {
                from: Format::LaTeX,
                to: Format::OMML,
                safe: true
            }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(formula.available_formats().as_slice(), &[Format::LaTeX]);
    }

    #[test]
    fn test_safe_mode_uses_derived_slot() {
        let (registry, _) = counting_registry();
        let mut formula = Formula::new("z", DisplayMode::Inline).unwrap();
        formula.resolve(&registry, Format::MathML, true).unwrap();
        // MathML is now cached, so MathML -> OMML is a direct path
        assert!(formula.resolve(&registry, Format::OMML, true).is_ok());
    }

    #[test]
    fn test_direct_converter_wins_over_two_hop() {
        let (registry, calls) = counting_registry();
        registry
            .register(Format::LaTeX, Format::OMML, |_, _| {
                Ok("<m:oMath><m:r><m:t>direct</m:t></m:r></m:oMath>".into())
            })
            .unwrap();
        let mut formula = Formula::new("z", DisplayMode::Inline).unwrap();

        let omml = formula.omml(&registry, true).unwrap();
        assert_eq!(omml.text(), "direct");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(formula.cached(Format::MathML).is_none());
    }

    #[test]
    fn test_source_format_is_preferred_origin() {
        let registry = TransformRegistry::new();
        registry
            .register(Format::OMML, Format::LaTeX, |_, _| Ok("from omml".into()))
            .unwrap();
        registry
            .register(Format::MathML, Format::LaTeX, |_, _| Ok("from mathml".into()))
            .unwrap();
        registry
            .register_stylesheet(Format::OMML, Format::MathML, crate::formula::OmmlToMml)
            .unwrap();

        let omml = r#"<m:oMath xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math"><m:r><m:t>q</m:t></m:r></m:oMath>"#;
        let mut formula = Formula::new(omml, DisplayMode::Inline).unwrap();
        formula.mathml(&registry, true).unwrap();
        assert_eq!(formula.latex(&registry, true).unwrap(), "from omml");
    }

    #[test]
    fn test_failed_second_hop_writes_nothing() {
        let registry = TransformRegistry::new();
        registry
            .register(Format::LaTeX, Format::MathML, |_, _| Ok(MATHML.into()))
            .unwrap();
        registry
            .register(Format::MathML, Format::OMML, |_, _| {
                Err(Error::conversion(Format::MathML, Format::OMML, "boom"))
            })
            .unwrap();
        let mut formula = Formula::new("x", DisplayMode::Inline).unwrap();

        let err = formula.resolve(&registry, Format::OMML, false).unwrap_err();
        assert!(matches!(err, Error::Conversion { .. }));
        assert!(formula.cached(Format::MathML).is_none());
        assert!(formula.cached(Format::OMML).is_none());
    }

    #[test]
    fn test_bad_converter_output_is_malformed() {
        let registry = TransformRegistry::new();
        registry
            .register(Format::LaTeX, Format::MathML, |_, _| Ok("not xml".into()))
            .unwrap();
        let mut formula = Formula::new("x", DisplayMode::Inline).unwrap();
        let err = formula.resolve(&registry, Format::MathML, false).unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup { format: Format::MathML, .. }));
        assert!(formula.cached(Format::MathML).is_none());
    }

    #[test]
    fn test_cache_survives_registry_changes() {
        let registry = TransformRegistry::new();
        registry
            .register(Format::LaTeX, Format::MathML, |_, _| Ok(MATHML.into()))
            .unwrap();
        let mut formula = Formula::new("x", DisplayMode::Inline).unwrap();
        let before = formula.mathml(&registry, false).unwrap().clone();

        registry
            .register(Format::LaTeX, Format::MathML, |_, _| Ok("<math/>".into()))
            .unwrap();
        assert_eq!(formula.mathml(&registry, false).unwrap(), &before);
    }

    #[test]
    fn test_missing_path() {
        let registry = TransformRegistry::new();
        let mut formula = Formula::new("x", DisplayMode::Inline).unwrap();
        let err = formula.resolve(&registry, Format::MathML, false).unwrap_err();
        assert_eq!(err.to_string(), "Cannot convert LaTeX formula to MathML");
    }

    #[cfg(feature = "latex")]
    #[test]
    fn test_latex_to_omml_with_defaults() {
        let registry = TransformRegistry::with_defaults();
        let mut formula = Formula::new(r"\frac{1}{2}", DisplayMode::Block).unwrap();

        let omml = formula.omml(&registry, false).unwrap().clone();
        assert_eq!(omml.name(), "m:oMath");
        let frac = omml.find("f").unwrap();
        assert_eq!(frac.child("num").unwrap().text(), "1");
        assert_eq!(frac.child("den").unwrap().text(), "2");

        let mathml = formula.cached(Format::MathML).and_then(|v| v.as_tree()).unwrap();
        assert_eq!(mathml.attr("display"), Some("block"));
        assert_eq!(formula.omml(&registry, false).unwrap(), &omml);
    }
}
