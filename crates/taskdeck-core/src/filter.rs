use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "dueDate")]
    DueDate,
}

impl SortBy {
    pub const ALL: &[SortBy] = &[SortBy::CreatedAt, SortBy::Title, SortBy::DueDate];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::CreatedAt => "createdAt",
            SortBy::Title => "title",
            SortBy::DueDate => "dueDate",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortBy::CreatedAt => "Created Date",
            SortBy::Title => "Title",
            SortBy::DueDate => "Due Date",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "createdAt" => Some(SortBy::CreatedAt),
            "title" => Some(SortBy::Title),
            "dueDate" => Some(SortBy::DueDate),
            _ => None,
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortDirection::Asc => "Ascending",
            SortDirection::Desc => "Descending",
        }
    }

    /// Case-insensitive `asc` / `desc`; anything else is `None`.
    pub fn parse_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else if s.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else {
            None
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Rows per page offered by the list view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageSize {
    Five,
    #[default]
    Ten,
    TwentyFive,
}

impl PageSize {
    pub const ALL: &[PageSize] = &[PageSize::Five, PageSize::Ten, PageSize::TwentyFive];

    pub fn get(&self) -> u32 {
        match self {
            PageSize::Five => 5,
            PageSize::Ten => 10,
            PageSize::TwentyFive => 25,
        }
    }

    pub fn from_u32(n: u32) -> Option<Self> {
        match n {
            5 => Some(PageSize::Five),
            10 => Some(PageSize::Ten),
            25 => Some(PageSize::TwentyFive),
            _ => None,
        }
    }
}

/// Listing criteria. Unset optional fields mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub is_completed: Option<bool>,
    /// Inclusive lower bound on the due date.
    pub due_date_from: Option<NaiveDateTime>,
    /// Inclusive upper bound on the due date.
    pub due_date_to: Option<NaiveDateTime>,
    pub sort_by: SortBy,
    pub sort_direction: SortDirection,
    /// Zero-based.
    pub page: u32,
    pub size: PageSize,
}
