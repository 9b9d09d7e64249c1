//! Create/edit forms for users and roles.
//!
//! Shape checks (name length, email format, role presence, at least one permission)
//! happen here, before anything reaches the services. The store itself accepts
//! whatever it is given.

use crossterm::event::KeyCode;

use super::Mutation;
use crate::model::{NewRole, NewUser, Role, User, UserStatus};
use crate::permissions;

/// What the caller should do after a key went to a form.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormOutcome {
    Continue,
    Cancel,
    Submit,
}

pub const MIN_NAME_CHARS: usize = 2;

fn check_name(name: &str) -> Result<(), String> {
    if name.trim().chars().count() < MIN_NAME_CHARS {
        return Err(format!("Name must be at least {MIN_NAME_CHARS} characters."));
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace and no empty labels.
pub fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !s.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

fn edit_text(buf: &mut String, code: KeyCode) {
    match code {
        KeyCode::Backspace => {
            buf.pop();
        }
        KeyCode::Char(c) => buf.push(c),
        _ => {}
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserForm {
    /// Id of the user being edited; `None` when creating.
    pub editing: Option<String>,
    pub focus: usize,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: UserStatus,
    pub role_options: Vec<String>,
    pub error: Option<String>,
}

impl UserForm {
    pub const FIELDS: [&'static str; 4] = ["Name", "Email", "Role", "Status"];

    pub fn create(role_options: Vec<String>) -> Self {
        Self {
            editing: None,
            focus: 0,
            name: String::new(),
            email: String::new(),
            role: String::new(),
            status: UserStatus::Active,
            role_options,
            error: None,
        }
    }

    pub fn edit(user: &User, role_options: Vec<String>) -> Self {
        Self {
            editing: Some(user.id.clone()),
            focus: 0,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            status: user.status,
            role_options,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() { "Edit user" } else { "Create user" }
    }

    fn cycle_role(&mut self, forward: bool) {
        let n = self.role_options.len();
        if n == 0 {
            return;
        }
        let next = match self.role_options.iter().position(|r| *r == self.role) {
            Some(i) if forward => (i + 1) % n,
            Some(i) => (i + n - 1) % n,
            None if forward => 0,
            None => n - 1,
        };
        self.role = self.role_options[next].clone();
    }

    pub fn handle_key(&mut self, code: KeyCode) -> FormOutcome {
        let last = Self::FIELDS.len() - 1;
        match code {
            KeyCode::Esc => return FormOutcome::Cancel,
            KeyCode::Enter => return FormOutcome::Submit,
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1).min(last),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.saturating_sub(1),
            _ => match self.focus {
                0 => edit_text(&mut self.name, code),
                1 => edit_text(&mut self.email, code),
                2 => match code {
                    KeyCode::Right | KeyCode::Char(' ') => self.cycle_role(true),
                    KeyCode::Left => self.cycle_role(false),
                    _ => {}
                },
                _ => {
                    if matches!(code, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) {
                        self.status = self.status.toggled();
                    }
                }
            },
        }
        FormOutcome::Continue
    }

    pub fn validate(&self) -> Result<(), String> {
        check_name(&self.name)?;
        if !is_valid_email(self.email.trim()) {
            return Err("Invalid email address.".to_string());
        }
        if self.role.trim().is_empty() {
            return Err("Role is required.".to_string());
        }
        Ok(())
    }

    /// Validate and turn the form into the store call it stands for.
    pub fn submit(&self) -> Result<Mutation, String> {
        self.validate()?;
        let data = NewUser {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            role: self.role.clone(),
            status: self.status,
        };
        Ok(match &self.editing {
            Some(id) => Mutation::UpdateUser {
                id: id.clone(),
                patch: data.into(),
            },
            None => Mutation::CreateUser(data),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleForm {
    /// Id of the role being edited; `None` when creating.
    pub editing: Option<String>,
    pub focus: usize,
    pub name: String,
    pub description: String,
    /// Checked permissions, in the order they were granted.
    pub permissions: Vec<String>,
    /// Checklist rows: the fixed vocabulary, then anything else the role already carries.
    pub choices: Vec<String>,
    pub cursor: usize,
    pub error: Option<String>,
}

impl RoleForm {
    pub const FIELDS: [&'static str; 3] = ["Name", "Description", "Permissions"];

    fn vocabulary_choices() -> Vec<String> {
        permissions::vocabulary().into_iter().map(str::to_string).collect()
    }

    pub fn create() -> Self {
        Self {
            editing: None,
            focus: 0,
            name: String::new(),
            description: String::new(),
            permissions: Vec::new(),
            choices: Self::vocabulary_choices(),
            cursor: 0,
            error: None,
        }
    }

    pub fn edit(role: &Role) -> Self {
        let mut choices = Self::vocabulary_choices();
        for p in &role.permissions {
            if !choices.contains(p) {
                choices.push(p.clone());
            }
        }
        Self {
            editing: Some(role.id.clone()),
            focus: 0,
            name: role.name.clone(),
            description: role.description.clone(),
            permissions: role.permissions.clone(),
            choices,
            cursor: 0,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() { "Edit role" } else { "Create role" }
    }

    pub fn is_checked(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    fn toggle_current(&mut self) {
        let Some(choice) = self.choices.get(self.cursor).cloned() else {
            return;
        };
        if self.is_checked(&choice) {
            self.permissions.retain(|p| *p != choice);
        } else {
            self.permissions.push(choice);
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> FormOutcome {
        let on_list = self.focus == 2;
        match code {
            KeyCode::Esc => return FormOutcome::Cancel,
            KeyCode::Enter => return FormOutcome::Submit,
            KeyCode::Tab => self.focus = (self.focus + 1) % Self::FIELDS.len(),
            KeyCode::BackTab => self.focus = (self.focus + Self::FIELDS.len() - 1) % Self::FIELDS.len(),
            KeyCode::Down if on_list => {
                if self.cursor + 1 < self.choices.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Up if on_list => {
                if self.cursor == 0 {
                    self.focus = 1;
                } else {
                    self.cursor -= 1;
                }
            }
            KeyCode::Char(' ') if on_list => self.toggle_current(),
            KeyCode::Down => self.focus += 1,
            KeyCode::Up => self.focus = self.focus.saturating_sub(1),
            _ => match self.focus {
                0 => edit_text(&mut self.name, code),
                1 => edit_text(&mut self.description, code),
                _ => {}
            },
        }
        FormOutcome::Continue
    }

    pub fn validate(&self) -> Result<(), String> {
        check_name(&self.name)?;
        if self.permissions.is_empty() {
            return Err("At least one permission is required.".to_string());
        }
        Ok(())
    }

    /// Validate and turn the form into the store call it stands for.
    pub fn submit(&self) -> Result<Mutation, String> {
        self.validate()?;
        let data = NewRole {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            permissions: self.permissions.clone(),
        };
        Ok(match &self.editing {
            Some(id) => Mutation::UpdateRole {
                id: id.clone(),
                patch: data.into(),
            },
            None => Mutation::CreateRole(data),
        })
    }
}
