use std::collections::HashMap;

use uuid::Uuid;

use crate::database::models::{PopulatedStudent, Student, StudentInput};
use crate::database::{CohortStore, StoreError, StudentStore};

/// Student operations that resolve each student's cohort reference on read.
///
/// A missing or dangling reference resolves to `None`; it is never an error.
pub struct StudentService<'a, S: StudentStore + CohortStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: StudentStore + CohortStore + ?Sized> StudentService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<PopulatedStudent>, StoreError> {
        let students = self.store.list_students().await?;
        self.populate_all(students).await
    }

    pub async fn list_by_cohort(
        &self,
        cohort_id: Uuid,
    ) -> Result<Vec<PopulatedStudent>, StoreError> {
        let students = self.store.list_students_by_cohort(cohort_id).await?;
        self.populate_all(students).await
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<PopulatedStudent>, StoreError> {
        match self.store.find_student(id).await? {
            Some(student) => Ok(Some(self.populate(student).await?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, input: StudentInput) -> Result<PopulatedStudent, StoreError> {
        let student = self.store.create_student(input).await?;
        self.populate(student).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: StudentInput,
    ) -> Result<Option<PopulatedStudent>, StoreError> {
        match self.store.update_student(id, patch).await? {
            Some(student) => Ok(Some(self.populate(student).await?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.store.delete_student(id).await
    }

    async fn populate(&self, student: Student) -> Result<PopulatedStudent, StoreError> {
        let cohort = match student.cohort {
            Some(cohort_id) => self.store.find_cohort(cohort_id).await?,
            None => None,
        };
        Ok(student.populate(cohort))
    }

    // One cohort lookup for the whole batch
    async fn populate_all(
        &self,
        students: Vec<Student>,
    ) -> Result<Vec<PopulatedStudent>, StoreError> {
        let mut ids: Vec<Uuid> = students.iter().filter_map(|s| s.cohort).collect();
        ids.sort_unstable();
        ids.dedup();

        let cohorts: HashMap<Uuid, _> = self
            .store
            .find_cohorts(&ids)
            .await?
            .into_iter()
            .map(|cohort| (cohort.id, cohort))
            .collect();

        Ok(students
            .into_iter()
            .map(|student| {
                let cohort = student.cohort.and_then(|id| cohorts.get(&id).cloned());
                student.populate(cohort)
            })
            .collect())
    }
}
