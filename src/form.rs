//! Create/edit form for a week's plan.
//!
//! Raw text coming from the operator is coerced so the in-memory draft always
//! holds a usable number, even while an input is half typed.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::{FormError, SubmitError};
use crate::models::{
    Acknowledgement, MaterialDraft, MaterialType, WeeklyModFormData, WeeklyRecord, MAX_WEEK,
    MIN_WEEK,
};
use crate::service;
use crate::weeks::WeekValidation;

pub const WEEK_INPUT_MIN: i64 = 0;
pub const FIELD_INT_MIN: i64 = 0;
pub const FIELD_DECIMAL_MIN: f64 = 0.0;

/// Blank, `-` and non-numeric input become `min`; anything else is the
/// leading integer of the input, never below `min`.
pub fn coerce_int(input: &str, min: i64) -> i64 {
    leading_int(input.trim()).map_or(min, |value| value.max(min))
}

/// Like [`coerce_int`] for decimals; a bare `.` is non-numeric too.
pub fn coerce_decimal(input: &str, min: f64) -> f64 {
    leading_decimal(input.trim())
        .filter(|value| value.is_finite())
        .map_or(min, |value| value.max(min))
}

fn sign_len(s: &str) -> usize {
    usize::from(s.starts_with(['+', '-']))
}

fn digits_len(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

fn leading_int(s: &str) -> Option<i64> {
    let sign = sign_len(s);
    let digits = digits_len(&s[sign..]);
    if digits == 0 {
        return None;
    }
    s[..sign + digits].parse().ok()
}

fn leading_decimal(s: &str) -> Option<f64> {
    let mut end = sign_len(s);
    let int_digits = digits_len(&s[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if s[end..].starts_with('.') {
        frac_digits = digits_len(&s[end + 1..]);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if s[end..].starts_with(['e', 'E']) {
        let exp_start = end + 1;
        let exp_sign = sign_len(&s[exp_start..]);
        let exp_digits = digits_len(&s[exp_start + exp_sign..]);
        if exp_digits > 0 {
            end = exp_start + exp_sign + exp_digits;
        }
    }
    s[..end].parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    ProductivityTarget,
    ProductionVolume,
    Mod,
}

/// Hydrates a draft for `week` from its records, one section per material.
/// Missing materials stay at zero.
pub fn hydrate_draft(week: i64, records: &[WeeklyRecord]) -> WeeklyModFormData {
    let mut draft = WeeklyModFormData {
        week_number: week,
        ..WeeklyModFormData::default()
    };
    for material in [MaterialType::Cu, MaterialType::Al] {
        let found = records
            .iter()
            .find(|record| record.week_number == week && record.material() == Some(material));
        if let Some(record) = found {
            *draft.material_mut(material) = MaterialDraft {
                productivity_target: record.productivity_target,
                production_volume: record.production_volume,
                mod_count: record.mod_count,
            };
        }
    }
    draft
}

#[derive(Debug, Clone)]
pub struct WeeklyPlanForm {
    mode: FormMode,
    draft: WeeklyModFormData,
    weeks: WeekValidation,
    week_error: Option<FormError>,
}

impl WeeklyPlanForm {
    /// Fresh draft prefilled with the next available week.
    pub fn new_create(weeks: WeekValidation) -> Self {
        let draft = WeeklyModFormData {
            week_number: weeks.next_available_week(),
            ..WeeklyModFormData::default()
        };
        Self::from_draft(draft, weeks)
    }

    /// Create-mode form around an already filled draft.
    pub fn from_draft(draft: WeeklyModFormData, weeks: WeekValidation) -> Self {
        let mut form = Self {
            mode: FormMode::Create,
            draft,
            weeks,
            week_error: None,
        };
        form.check_week();
        form
    }

    pub fn new_edit(week: i64, records: &[WeeklyRecord], weeks: WeekValidation) -> Self {
        Self {
            mode: FormMode::Edit(week),
            draft: hydrate_draft(week, records),
            weeks,
            week_error: None,
        }
    }

    /// Prepares a create form. The known-weeks refresh is best effort, so a
    /// failure only costs the next-week suggestion and conflict hint.
    pub async fn open_create(client: &ApiClient) -> Self {
        let mut weeks = WeekValidation::new();
        weeks.refetch_weeks(client).await;
        Self::new_create(weeks)
    }

    /// Prepares an edit form hydrated from the week's current records.
    pub async fn open_edit(client: &ApiClient, week: i64) -> Result<Self, SubmitError> {
        let records = service::get_all(client).await?;
        let weeks = WeekValidation::from_weeks(records.iter().map(|record| record.week_number));
        Ok(Self::new_edit(week, &records, weeks))
    }

    pub fn draft(&self) -> &WeeklyModFormData {
        &self.draft
    }

    pub fn week_error(&self) -> Option<&FormError> {
        self.week_error.as_ref()
    }

    pub fn set_week(&mut self, raw: &str) {
        self.draft.week_number = coerce_int(raw, WEEK_INPUT_MIN);
        self.check_week();
    }

    pub fn set_field(&mut self, material: MaterialType, field: DraftField, raw: &str) {
        let section = self.draft.material_mut(material);
        match field {
            DraftField::ProductivityTarget => {
                section.productivity_target = coerce_decimal(raw, FIELD_DECIMAL_MIN)
            }
            DraftField::ProductionVolume => {
                section.production_volume = coerce_int(raw, FIELD_INT_MIN)
            }
            DraftField::Mod => section.mod_count = coerce_int(raw, FIELD_INT_MIN),
        }
    }

    fn check_week(&mut self) {
        let week = self.draft.week_number;
        self.week_error = match self.mode {
            FormMode::Create if self.weeks.is_week_exists(week) => {
                Some(FormError::WeekExists(week))
            }
            _ => None,
        };
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if let Some(err) = &self.week_error {
            return Err(err.clone());
        }
        let week = self.draft.week_number;
        if !(MIN_WEEK..=MAX_WEEK).contains(&week) {
            return Err(FormError::WeekOutOfRange(week));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Sends the draft; nothing goes over the wire while the form is invalid.
    pub async fn submit(&self, client: &ApiClient) -> Result<Acknowledgement, SubmitError> {
        self.validate()?;
        debug!(mode = ?self.mode, week = self.draft.week_number, "submitting weekly plan");
        let ack = match self.mode {
            FormMode::Create => service::create(client, &self.draft).await?,
            FormMode::Edit(week) => service::update(client, week, &self.draft).await?,
        };
        Ok(ack)
    }
}
