use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Cohort, CohortFields, NewUser, Student, StudentInput, User};
use super::{CohortStore, Storage, StoreError, StudentStore, UserStore};

/// In-process storage for tests and local development.
///
/// Collections keep insertion order. Each collection sits behind its own lock;
/// user creation checks and inserts under a single write guard, which gives the
/// same uniqueness guarantee as the unique index in PostgreSQL.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    cohorts: RwLock<Vec<Cohort>>,
    students: RwLock<Vec<Student>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(user.email));
        }

        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl CohortStore for MemoryStore {
    async fn list_cohorts(&self) -> Result<Vec<Cohort>, StoreError> {
        Ok(self.cohorts.read().await.clone())
    }

    async fn find_cohort(&self, id: Uuid) -> Result<Option<Cohort>, StoreError> {
        let cohorts = self.cohorts.read().await;
        Ok(cohorts.iter().find(|c| c.id == id).cloned())
    }

    async fn find_cohorts(&self, ids: &[Uuid]) -> Result<Vec<Cohort>, StoreError> {
        let cohorts = self.cohorts.read().await;
        Ok(cohorts.iter().filter(|c| ids.contains(&c.id)).cloned().collect())
    }

    async fn create_cohort(&self, fields: CohortFields) -> Result<Cohort, StoreError> {
        let cohort = Cohort {
            id: Uuid::new_v4(),
            fields,
        };
        self.cohorts.write().await.push(cohort.clone());
        Ok(cohort)
    }

    async fn update_cohort(
        &self,
        id: Uuid,
        patch: CohortFields,
    ) -> Result<Option<Cohort>, StoreError> {
        let mut cohorts = self.cohorts.write().await;
        Ok(cohorts.iter_mut().find(|c| c.id == id).map(|cohort| {
            cohort.fields.merge(patch);
            cohort.clone()
        }))
    }

    async fn delete_cohort(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut cohorts = self.cohorts.write().await;
        let before = cohorts.len();
        cohorts.retain(|c| c.id != id);
        Ok(cohorts.len() != before)
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.students.read().await.clone())
    }

    async fn list_students_by_cohort(&self, cohort_id: Uuid) -> Result<Vec<Student>, StoreError> {
        let students = self.students.read().await;
        Ok(students
            .iter()
            .filter(|s| s.cohort == Some(cohort_id))
            .cloned()
            .collect())
    }

    async fn find_student(&self, id: Uuid) -> Result<Option<Student>, StoreError> {
        let students = self.students.read().await;
        Ok(students.iter().find(|s| s.id == id).cloned())
    }

    async fn create_student(&self, input: StudentInput) -> Result<Student, StoreError> {
        let student = Student {
            id: Uuid::new_v4(),
            profile: input.profile.with_list_defaults(),
            cohort: input.cohort,
        };
        self.students.write().await.push(student.clone());
        Ok(student)
    }

    async fn update_student(
        &self,
        id: Uuid,
        patch: StudentInput,
    ) -> Result<Option<Student>, StoreError> {
        let mut students = self.students.write().await;
        Ok(students.iter_mut().find(|s| s.id == id).map(|student| {
            student.profile.merge(patch.profile);
            if patch.cohort.is_some() {
                student.cohort = patch.cohort;
            }
            student.clone()
        }))
    }

    async fn delete_student(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut students = self.students.write().await;
        let before = students.len();
        students.retain(|s| s.id != id);
        Ok(students.len() != before)
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
