//! Search criteria and paging for the user directory

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;

use super::entity::{User, UserId, UserRole, UserStatus};
use crate::domain::message::MessageCode;
use crate::domain::DomainError;

pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const MAX_PAGE_SIZE: usize = 1000;

/// Fields a search may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortField {
    RequestDate,
    ApprovedDate,
    ActivationDate,
    EmailAddress,
    FirstName,
    LastName,
}

impl UserSortField {
    /// Wire names accepted in `sortBy`
    pub const ALLOWED: [&'static str; 6] = [
        "requestDate",
        "approvedDate",
        "activationDate",
        "emailAddress",
        "firstName",
        "lastName",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestDate => "requestDate",
            Self::ApprovedDate => "approvedDate",
            Self::ActivationDate => "activationDate",
            Self::EmailAddress => "emailAddress",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
        }
    }

    fn compare(&self, a: &User, b: &User) -> Ordering {
        match self {
            Self::RequestDate => a.request_date().cmp(&b.request_date()),
            Self::ApprovedDate => a.approved_at().cmp(&b.approved_at()),
            Self::ActivationDate => a.activated_at().cmp(&b.activated_at()),
            Self::EmailAddress => a.email().cmp(b.email()),
            Self::FirstName => a.first_name().cmp(b.first_name()),
            Self::LastName => a.last_name().cmp(&b.last_name()),
        }
    }
}

impl FromStr for UserSortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requestDate" => Ok(Self::RequestDate),
            "approvedDate" => Ok(Self::ApprovedDate),
            "activationDate" => Ok(Self::ActivationDate),
            "emailAddress" => Ok(Self::EmailAddress),
            "firstName" => Ok(Self::FirstName),
            "lastName" => Ok(Self::LastName),
            other => Err(DomainError::invalid_field(
                "sortBy",
                MessageCode::InvalidInputData,
                format!(
                    "Unsupported sort field '{}'. Allowed: {}",
                    other,
                    Self::ALLOWED.join(", ")
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(DomainError::invalid_field(
                "sortType",
                MessageCode::InvalidInputData,
                format!("Unsupported sort order '{}'", other),
            )),
        }
    }
}

/// Filters, ordering and paging for a user search
///
/// String filters are case-insensitive substring matches. `statuses` and
/// `roles` match when the user has any of the listed values.
#[derive(Debug, Clone)]
pub struct UserSearchCriteria {
    pub user_id: Option<UserId>,
    pub login_id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub public_screen_name: Option<String>,
    pub statuses: Vec<UserStatus>,
    pub roles: Vec<UserRole>,
    pub sort_by: Option<UserSortField>,
    pub sort_order: SortOrder,
    pub start_index: usize,
    pub page_size: usize,
}

impl Default for UserSearchCriteria {
    fn default() -> Self {
        Self {
            user_id: None,
            login_id: None,
            email: None,
            first_name: None,
            last_name: None,
            public_screen_name: None,
            statuses: Vec::new(),
            roles: Vec::new(),
            sort_by: None,
            sort_order: SortOrder::Asc,
            start_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl UserSearchCriteria {
    /// Reject paging requests outside the supported bounds
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(DomainError::invalid_field(
                "pageSize",
                MessageCode::InputDataOutOfBound,
                format!("Page size must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }

        Ok(())
    }

    pub fn matches(&self, user: &User) -> bool {
        if let Some(id) = self.user_id {
            if user.id() != id {
                return false;
            }
        }

        let text_filters = [
            (self.login_id.as_deref(), Some(user.login_id())),
            (self.email.as_deref(), Some(user.email())),
            (self.first_name.as_deref(), Some(user.first_name())),
            (self.last_name.as_deref(), user.last_name()),
            (self.public_screen_name.as_deref(), user.public_screen_name()),
        ];

        for (filter, value) in text_filters {
            if let Some(needle) = filter {
                match value {
                    Some(haystack) if contains_ignore_case(haystack, needle) => {}
                    _ => return false,
                }
            }
        }

        if !self.statuses.is_empty() && !self.statuses.contains(&user.status()) {
            return false;
        }

        if !self.roles.is_empty() && !self.roles.iter().any(|r| user.roles().contains(r)) {
            return false;
        }

        true
    }

    /// Ordering between two users; ties fall back to id so pages are stable
    pub fn compare(&self, a: &User, b: &User) -> Ordering {
        let ordering = match self.sort_by {
            Some(field) => field.compare(a, b).then_with(|| a.id().cmp(&b.id())),
            None => a.id().cmp(&b.id()),
        };

        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Filter, sort and cut one page out of a candidate set
    pub fn apply<'a>(&self, users: impl IntoIterator<Item = &'a User>) -> Page<User> {
        let mut matched: Vec<&User> = users.into_iter().filter(|u| self.matches(u)).collect();
        matched.sort_by(|a, b| self.compare(a, b));

        let total_count = matched.len();
        let items = matched
            .into_iter()
            .skip(self.start_index)
            .take(self.page_size)
            .cloned()
            .collect();

        Page::new(items, total_count, self.start_index, self.page_size)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// One page of search results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    total_count: usize,
    start_index: usize,
    page_size: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: usize, start_index: usize, page_size: usize) -> Self {
        Self {
            items,
            total_count,
            start_index,
            page_size,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn result_size(&self) -> usize {
        self.items.len()
    }
}
