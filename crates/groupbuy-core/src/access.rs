use thiserror::Error;

/// What a requester is allowed to do with a form. Exactly one of the three
/// holds; owner wins over viewer when both would match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Viewer,
    None,
}

impl Role {
    pub fn is_owner(self) -> bool {
        self == Role::Owner
    }

    pub fn is_viewer(self) -> bool {
        self == Role::Viewer
    }

    pub fn can_read(self) -> bool {
        self != Role::None
    }
}

/// Identity of the caller, resolved against the user store before the gate.
#[derive(Debug, Clone, Copy)]
pub struct Requester<'a> {
    pub user_id: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("not allowed")]
    Forbidden,
}

/// Classify a requester against a form's owner reference and allow-list.
pub fn classify(owner_id: &str, allowed_viewers: &[String], req: Requester<'_>) -> Role {
    if req.user_id == owner_id {
        Role::Owner
    } else if allowed_viewers.iter().any(|v| v == req.email) {
        Role::Viewer
    } else {
        Role::None
    }
}

/// Gate for mutating operations: owner only.
pub fn require_owner(role: Role) -> Result<(), AccessError> {
    if role.is_owner() {
        Ok(())
    } else {
        Err(AccessError::Forbidden)
    }
}

/// Gate for the read path: owner or viewer.
pub fn require_reader(role: Role) -> Result<(), AccessError> {
    if role.can_read() {
        Ok(())
    } else {
        Err(AccessError::Forbidden)
    }
}
