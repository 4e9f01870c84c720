//! Behaviour templates and the template matcher.
//!
//! A template describes, day by day, what a trial should look like for the
//! student to have tried a particular experiment: "light on for four days,
//! then off", "plant dead by day six", and so on. Slot `i` constrains day
//! `i`; slot 0 is always ignored.
//!
//! Missing data is treated asymmetrically. A day that was never simulated
//! fails a [`TemplateCode::LightOn`] slot but vacuously satisfies
//! [`TemplateCode::LightOffOrDead`] and [`TemplateCode::Dead`] slots, so a
//! trial that ended early still matches "off or dead" for the days it never
//! reached.

use std::collections::BTreeMap;

use photosim_types::{SeriesKind, TemplateCode, Trial};

use crate::error::TemplateError;

/// Number of slots in every template (day 0 plus twenty days).
pub const TEMPLATE_LEN: usize = 21;

/// A validated, named behaviour template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Template name, used as the key for match bookkeeping.
    name: String,
    /// One code per day; index 0 is ignored.
    slots: [TemplateCode; TEMPLATE_LEN],
}

impl Template {
    /// Validate raw integer codes into a template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::WrongLength`] unless there are exactly
    /// [`TEMPLATE_LEN`] codes, and [`TemplateError::InvalidCode`] for any
    /// code outside `-1..=2`.
    pub fn from_codes(name: &str, codes: &[i8]) -> Result<Self, TemplateError> {
        if codes.len() != TEMPLATE_LEN {
            return Err(TemplateError::WrongLength {
                name: name.to_owned(),
                expected: TEMPLATE_LEN,
                actual: codes.len(),
            });
        }
        let mut slots = [TemplateCode::DontCare; TEMPLATE_LEN];
        for (slot, (target, &raw)) in slots.iter_mut().zip(codes).enumerate() {
            *target = TemplateCode::try_from(raw).map_err(|source| TemplateError::InvalidCode {
                name: name.to_owned(),
                slot,
                source,
            })?;
        }
        Ok(Self {
            name: name.to_owned(),
            slots,
        })
    }

    /// The template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The slot codes, day 0 first.
    pub const fn slots(&self) -> &[TemplateCode; TEMPLATE_LEN] {
        &self.slots
    }

    /// Whether `trial` satisfies every slot of this template.
    pub fn matches(&self, trial: &Trial) -> bool {
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .all(|(day, &code)| slot_satisfied(trial, day, code))
    }
}

/// Evaluate a single slot against a trial.
fn slot_satisfied(trial: &Trial, day: usize, code: TemplateCode) -> bool {
    let Ok(day) = u32::try_from(day) else {
        return false;
    };
    match code {
        TemplateCode::DontCare => true,
        TemplateCode::LightOn => created_delta(trial, day).is_some_and(|delta| delta > 0),
        TemplateCode::LightOffOrDead => created_delta(trial, day).is_none_or(|delta| delta <= 0),
        TemplateCode::Dead => trial
            .value_at(SeriesKind::Stored, day)
            .is_none_or(|stored| stored < 0),
    }
}

/// Glucose created on `day`, if both that day and the one before it were
/// recorded.
fn created_delta(trial: &Trial, day: u32) -> Option<i64> {
    let previous = day.checked_sub(1)?;
    let today = trial.value_at(SeriesKind::Created, day)?;
    let before = trial.value_at(SeriesKind::Created, previous)?;
    today.checked_sub(before)
}

/// The templates a policy evaluates, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    templates: BTreeMap<String, Template>,
}

impl TemplateSet {
    /// Validate every raw template.
    ///
    /// # Errors
    ///
    /// Returns the first [`TemplateError`] encountered.
    pub fn from_raw(raw: &BTreeMap<String, Vec<i8>>) -> Result<Self, TemplateError> {
        let templates = raw
            .iter()
            .map(|(name, codes)| Template::from_codes(name, codes).map(|t| (name.clone(), t)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self { templates })
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Whether a template with `name` is configured.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Iterate templates in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no templates are configured.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Names of every template `trial` matches.
    pub fn matching<'a>(&'a self, trial: &'a Trial) -> impl Iterator<Item = &'a str> + 'a {
        self.templates
            .values()
            .filter(move |template| template.matches(trial))
            .map(Template::name)
    }
}
