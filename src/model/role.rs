#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Administrator = 1,
    User = 2,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Administrator),
            2 => Some(Role::User),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::User => "User",
        }
    }
}
