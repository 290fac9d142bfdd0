use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Cohort attributes. Every field is optional so the same shape serves as
/// create payload and partial update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct CohortFields {
    pub in_progress: Option<bool>,
    pub cohort_slug: Option<String>,
    pub cohort_name: Option<String>,
    pub program: Option<String>,
    pub campus: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub program_manager: Option<String>,
    pub lead_teacher: Option<String>,
    pub total_hours: Option<i32>,
}

impl CohortFields {
    /// Overwrite fields that are present in `patch`
    pub fn merge(&mut self, patch: CohortFields) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.in_progress, patch.in_progress);
        take(&mut self.cohort_slug, patch.cohort_slug);
        take(&mut self.cohort_name, patch.cohort_name);
        take(&mut self.program, patch.program);
        take(&mut self.campus, patch.campus);
        take(&mut self.start_date, patch.start_date);
        take(&mut self.end_date, patch.end_date);
        take(&mut self.program_manager, patch.program_manager);
        take(&mut self.lead_teacher, patch.lead_teacher);
        take(&mut self.total_hours, patch.total_hours);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Cohort {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub fields: CohortFields,
}
