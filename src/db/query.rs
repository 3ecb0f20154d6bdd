//! Typed list queries

use serde::Deserialize;

use crate::auth::models::UserRole;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than `desc` sorts ascending
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Sortable store columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreSort {
    #[default]
    Name,
    Email,
    Address,
    Rating,
}

impl StoreSort {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(StoreSort::Name),
            "email" => Some(StoreSort::Email),
            "address" => Some(StoreSort::Address),
            "rating" | "average_rating" => Some(StoreSort::Rating),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            StoreSort::Name => "s.name",
            StoreSort::Email => "s.email",
            StoreSort::Address => "s.address",
            StoreSort::Rating => "average_rating",
        }
    }
}

/// Sortable user columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSort {
    #[default]
    Name,
    Email,
    Address,
    Role,
    Rating,
}

impl UserSort {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(UserSort::Name),
            "email" => Some(UserSort::Email),
            "address" => Some(UserSort::Address),
            "role" => Some(UserSort::Role),
            "rating" | "average_rating" => Some(UserSort::Rating),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            UserSort::Name => "u.name",
            UserSort::Email => "u.email",
            UserSort::Address => "u.address",
            UserSort::Role => "u.role",
            UserSort::Rating => "average_rating",
        }
    }
}

/// Raw `GET /api/stores` query string
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListParams {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Raw `GET /api/users` query string
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListParams {
    pub search: Option<String>,
    pub role: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreQuery {
    pub search: Option<String>,
    pub sort: StoreSort,
    pub order: SortOrder,
}

impl TryFrom<StoreListParams> for StoreQuery {
    type Error = ApiError;

    fn try_from(params: StoreListParams) -> Result<Self, Self::Error> {
        let sort = match non_empty(params.sort_by.as_deref()) {
            Some(s) => StoreSort::parse(s)
                .ok_or_else(|| ApiError::Validation(format!("Cannot sort stores by '{s}'")))?,
            None => StoreSort::default(),
        };

        Ok(Self {
            search: non_empty(params.search.as_deref()).map(str::to_string),
            sort,
            order: SortOrder::parse(params.sort_order.as_deref()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub sort: UserSort,
    pub order: SortOrder,
}

impl TryFrom<UserListParams> for UserQuery {
    type Error = ApiError;

    fn try_from(params: UserListParams) -> Result<Self, Self::Error> {
        let sort = match non_empty(params.sort_by.as_deref()) {
            Some(s) => UserSort::parse(s)
                .ok_or_else(|| ApiError::Validation(format!("Cannot sort users by '{s}'")))?,
            None => UserSort::default(),
        };

        let role = match non_empty(params.role.as_deref()) {
            None | Some("all") => None,
            Some(r) => Some(
                UserRole::from_str(r)
                    .ok_or_else(|| ApiError::Validation(format!("Unknown role '{r}'")))?,
            ),
        };

        Ok(Self {
            search: non_empty(params.search.as_deref()).map(str::to_string),
            role,
            sort,
            order: SortOrder::parse(params.sort_order.as_deref()),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Build a `LIKE` pattern for substring search, escaping wildcards with `\`
pub fn like_pattern(search: &str) -> String {
    let mut out = String::with_capacity(search.len() + 2);
    out.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

pub(crate) fn like_pattern_opt(search: Option<&str>) -> Option<String> {
    search.map(like_pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_defaults_ascending() {
        assert_eq!(SortOrder::parse(None), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("sideways")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("DESC")), SortOrder::Desc);
    }

    #[test]
    fn test_store_query_rejects_unknown_column() {
        let params = StoreListParams {
            sort_by: Some("name; DROP TABLE stores".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            StoreQuery::try_from(params),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_store_query_defaults() {
        let query = StoreQuery::try_from(StoreListParams::default()).unwrap();
        assert_eq!(query, StoreQuery::default());
        assert_eq!(query.sort.as_sql(), "s.name");
    }

    #[test]
    fn test_user_query_role_filter() {
        let all = UserQuery::try_from(UserListParams {
            role: Some("all".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(all.role, None);

        let owners = UserQuery::try_from(UserListParams {
            role: Some("store_owner".to_string()),
            sort_by: Some("average_rating".to_string()),
            sort_order: Some("desc".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(owners.role, Some(UserRole::StoreOwner));
        assert_eq!(owners.sort, UserSort::Rating);
        assert_eq!(owners.order, SortOrder::Desc);

        assert!(UserQuery::try_from(UserListParams {
            role: Some("superuser".to_string()),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("cafe"), "%cafe%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
