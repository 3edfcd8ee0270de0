/// In-flight create/edit form state. Distinct from the persisted user row;
/// discarded on cancel or after a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub name: String,
    pub username: String,
    pub email: String,
    /// Blank means "leave unchanged" on update; required on create.
    pub password: String,
    pub role_id: Option<i32>,
    pub is_active: bool,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            username: String::new(),
            email: String::new(),
            password: String::new(),
            role_id: None,
            is_active: true,
        }
    }
}
