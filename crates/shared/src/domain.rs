use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(UserId);
id_newtype!(CohortId);
id_newtype!(CourseId);
id_newtype!(AssignmentId);
id_newtype!(SubmissionId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Student,
    Lecturer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortRef {
    pub id: CohortId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub cohort: CohortRef,
    #[serde(default)]
    pub is_lecturer: bool,
    #[serde(default)]
    pub is_admin: bool,
}
