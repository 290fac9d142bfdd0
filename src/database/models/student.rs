use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::cohort::Cohort;

/// Student attributes other than the cohort reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub languages: Option<Vec<String>>,
    pub program: Option<String>,
    pub background: Option<String>,
    pub image: Option<String>,
    pub projects: Option<Vec<Value>>,
}

impl StudentProfile {
    /// Overwrite fields that are present in `patch`
    pub fn merge(&mut self, patch: StudentProfile) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.first_name, patch.first_name);
        take(&mut self.last_name, patch.last_name);
        take(&mut self.email, patch.email);
        take(&mut self.phone, patch.phone);
        take(&mut self.linkedin_url, patch.linkedin_url);
        take(&mut self.languages, patch.languages);
        take(&mut self.program, patch.program);
        take(&mut self.background, patch.background);
        take(&mut self.image, patch.image);
        take(&mut self.projects, patch.projects);
    }

    /// Lists default to empty rather than null once a student is stored
    pub fn with_list_defaults(mut self) -> Self {
        self.languages.get_or_insert_with(Vec::new);
        self.projects.get_or_insert_with(Vec::new);
        self
    }
}

/// Create or update payload for a student
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StudentInput {
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub cohort: Option<Uuid>,
}

/// Stored student. `cohort` is a weak reference: it may point at a cohort
/// that no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub cohort: Option<Uuid>,
}

impl Student {
    pub fn populate(self, cohort: Option<Cohort>) -> PopulatedStudent {
        PopulatedStudent {
            id: self.id,
            profile: self.profile,
            cohort,
        }
    }
}

/// Student with its cohort reference resolved to the full record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulatedStudent {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub cohort: Option<Cohort>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_reads_profile_and_cohort() {
        let cohort_id = Uuid::new_v4();
        let input: StudentInput = serde_json::from_value(json!({
            "firstName": "Christine",
            "lastName": "Clayton",
            "languages": ["English", "Dutch"],
            "projects": [{ "name": "Portfolio" }],
            "cohort": cohort_id.to_string(),
        }))
        .unwrap();

        assert_eq!(input.profile.first_name.as_deref(), Some("Christine"));
        assert_eq!(input.profile.languages.as_ref().map(Vec::len), Some(2));
        assert_eq!(input.cohort, Some(cohort_id));
    }

    #[test]
    fn list_defaults_fill_missing_lists_only() {
        let profile = StudentProfile {
            languages: Some(vec!["French".to_string()]),
            ..Default::default()
        }
        .with_list_defaults();

        assert_eq!(profile.languages, Some(vec!["French".to_string()]));
        assert_eq!(profile.projects, Some(Vec::new()));
    }

    #[test]
    fn populated_student_embeds_cohort_object() {
        let cohort = Cohort {
            id: Uuid::new_v4(),
            fields: Default::default(),
        };
        let student = Student {
            id: Uuid::new_v4(),
            profile: StudentProfile::default(),
            cohort: Some(cohort.id),
        };

        let value = serde_json::to_value(student.populate(Some(cohort.clone()))).unwrap();
        assert_eq!(value["cohort"]["_id"], json!(cohort.id.to_string()));
    }
}
