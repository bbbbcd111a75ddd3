//! Profile activation

use crate::overrides::Overrides;
use crate::properties;
use depctx_model::{Activation, ActivationFile, ActivationOs, ActivationProperty, Profile, Settings};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

/// Host facts profile predicates are evaluated against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationContext {
    pub properties: BTreeMap<String, String>,
}

impl ActivationContext {
    pub fn new(properties: BTreeMap<String, String>) -> Self {
        Self { properties }
    }

    pub fn from_overrides(overrides: &Overrides) -> Self {
        Self::new(overrides.effective_properties())
    }

    fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Decides whether a profile's activation conditions hold
pub trait ProfileSelector: Send + Sync {
    fn is_active(&self, profile: &Profile, context: &ActivationContext) -> bool;
}

/// Evaluates `jdk`, `os`, `property` and `file` conditions.
///
/// A profile without conditions is never activated here. When several
/// conditions are declared all of them must hold.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProfileSelector;

impl ProfileSelector for DefaultProfileSelector {
    fn is_active(&self, profile: &Profile, context: &ActivationContext) -> bool {
        let Some(activation) = profile.activation.as_ref() else {
            return false;
        };
        if !activation.has_conditions() {
            return false;
        }
        let active = matches_activation(activation, context);
        tracing::trace!(profile = %profile.id, active, "Evaluated profile activation");
        active
    }
}

fn matches_activation(activation: &Activation, context: &ActivationContext) -> bool {
    activation
        .jdk
        .as_deref()
        .is_none_or(|jdk| matches_jdk(jdk, context))
        && activation.os.as_ref().is_none_or(|os| matches_os(os, context))
        && activation
            .property
            .as_ref()
            .is_none_or(|p| matches_property(p, context))
        && activation
            .file
            .as_ref()
            .is_none_or(|f| matches_file(f, context))
}

/// `17` (prefix), `!1.8` (negated prefix) or a range such as `[11,17)`.
fn matches_jdk(spec: &str, context: &ActivationContext) -> bool {
    let Some(version) = context.property(properties::JAVA_VERSION) else {
        return false;
    };
    let spec = spec.trim();
    if let Some(negated) = spec.strip_prefix('!') {
        return !version.starts_with(negated.trim());
    }
    if spec.starts_with('[') || spec.starts_with('(') {
        return in_range(version, spec);
    }
    version.starts_with(spec)
}

fn version_parts(version: &str) -> Vec<u64> {
    version
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a, b) = (version_parts(a), version_parts(b));
    let len = a.len().max(b.len());
    for i in 0..len {
        let ordering = a.get(i).unwrap_or(&0).cmp(b.get(i).unwrap_or(&0));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn in_range(version: &str, range: &str) -> bool {
    let (lower_inclusive, rest) = match (range.strip_prefix('['), range.strip_prefix('(')) {
        (Some(rest), _) => (true, rest),
        (None, Some(rest)) => (false, rest),
        (None, None) => return false,
    };
    let (upper_inclusive, inner) = match (rest.strip_suffix(']'), rest.strip_suffix(')')) {
        (Some(inner), _) => (true, inner),
        (None, Some(inner)) => (false, inner),
        // unterminated range never matches
        (None, None) => return false,
    };
    let (lower, upper) = match inner.split_once(',') {
        Some((lower, upper)) => (lower.trim(), upper.trim()),
        // [11] pins one version
        None => (inner.trim(), inner.trim()),
    };

    let lower_ok = lower.is_empty()
        || match compare_versions(version, lower) {
            Ordering::Greater => true,
            Ordering::Equal => lower_inclusive,
            Ordering::Less => false,
        };
    let upper_ok = upper.is_empty()
        || match compare_versions(version, upper) {
            Ordering::Less => true,
            Ordering::Equal => upper_inclusive,
            Ordering::Greater => false,
        };
    lower_ok && upper_ok
}

fn negatable(expected: &str, matches: impl Fn(&str) -> bool) -> bool {
    match expected.trim().strip_prefix('!') {
        Some(negated) => !matches(negated),
        None => matches(expected.trim()),
    }
}

fn matches_os(os: &ActivationOs, context: &ActivationContext) -> bool {
    let name = context.property(properties::OS_NAME).unwrap_or_default();
    let family = context.property(properties::OS_FAMILY).unwrap_or_default();
    let arch = context.property(properties::OS_ARCH).unwrap_or_default();
    let version = context.property(properties::OS_VERSION).unwrap_or_default();

    os.name
        .as_deref()
        .is_none_or(|expected| negatable(expected, |v| v.eq_ignore_ascii_case(name)))
        && os
            .family
            .as_deref()
            .is_none_or(|expected| negatable(expected, |v| matches_family(v, name, family)))
        && os
            .arch
            .as_deref()
            .is_none_or(|expected| negatable(expected, |v| v.eq_ignore_ascii_case(arch)))
        && os
            .version
            .as_deref()
            .is_none_or(|expected| negatable(expected, |v| version.starts_with(v)))
}

fn matches_family(expected: &str, name: &str, family: &str) -> bool {
    let name = name.to_ascii_lowercase();
    match expected.to_ascii_lowercase().as_str() {
        "windows" => family.eq_ignore_ascii_case("windows") || name.contains("windows"),
        "mac" => name.contains("mac"),
        "unix" => family.eq_ignore_ascii_case("unix"),
        other => family.eq_ignore_ascii_case(other),
    }
}

/// `name` present (or `!name` absent), optionally with a `value` / `!value`.
fn matches_property(property: &ActivationProperty, context: &ActivationContext) -> bool {
    let name = property.name.trim();
    if let Some(absent) = name.strip_prefix('!') {
        return context
            .property(absent)
            .is_none_or(|v| v.trim().is_empty());
    }
    let actual = context.property(name);
    match property.value.as_deref() {
        None => actual.is_some_and(|v| !v.trim().is_empty()),
        Some(expected) => negatable(expected, |v| actual == Some(v)),
    }
}

fn matches_file(file: &ActivationFile, context: &ActivationContext) -> bool {
    let resolve = |path: &str| properties::interpolate(path, &context.properties);
    file.exists
        .as_deref()
        .is_none_or(|p| Path::new(&resolve(p)).exists())
        && file
            .missing
            .as_deref()
            .is_none_or(|p| !Path::new(&resolve(p)).exists())
}

fn activate(active: &mut Vec<Profile>, profile: &Profile, inactive: &[String], reason: &str) {
    if inactive.contains(&profile.id) {
        tracing::debug!(profile = %profile.id, "Profile explicitly deactivated");
        return;
    }
    if active.iter().any(|p| p.id == profile.id) {
        return;
    }
    tracing::debug!(profile = %profile.id, reason, "Activating profile");
    active.push(profile.clone());
}

/// Active profiles of `settings`, in activation order.
///
/// Profiles are collected from, in order, the override's active ids, the
/// settings' own active ids and, when a selector is supplied, profiles whose
/// conditions hold. Ids in the override's inactive list are always excluded.
/// Profiles marked active-by-default apply only when nothing else is active.
pub fn active_profiles(
    settings: &Settings,
    overrides: &Overrides,
    selector: Option<&dyn ProfileSelector>,
    context: &ActivationContext,
) -> Vec<Profile> {
    let inactive = overrides.inactive_profile_ids();
    let mut active: Vec<Profile> = Vec::new();

    let requested = overrides
        .active_profile_ids()
        .iter()
        .map(|id| (id, "requested"))
        .chain(settings.active_profiles.iter().map(|id| (id, "settings")));
    for (id, reason) in requested {
        match settings.profile(id) {
            Some(profile) => activate(&mut active, profile, inactive, reason),
            None => tracing::debug!(profile = %id, "Requested profile is not declared"),
        }
    }

    if let Some(selector) = selector {
        for profile in &settings.profiles {
            if selector.is_active(profile, context) {
                activate(&mut active, profile, inactive, "activation");
            }
        }
    }

    if active.is_empty() {
        for profile in settings.profiles.iter().filter(|p| p.is_active_by_default()) {
            activate(&mut active, profile, inactive, "default");
        }
    }
    active
}
