use service::user::UserService;

/// Shared handler state. Cheap to clone; the repository sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
}

impl AppState {
    pub fn new(users: UserService) -> Self { Self { users } }
}
