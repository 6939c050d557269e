//! Id-set queries
//!
//! The only query shape reference verification needs:
//! `{ "where": { "id": { "$in": [ ... ] } } }`

use serde::{Deserialize, Serialize};

/// Query selecting records whose id is in a set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindQuery {
    #[serde(rename = "where")]
    pub filter: WhereClause,
}

/// Where clause of a [`FindQuery`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhereClause {
    pub id: IdFilter,
}

/// Membership filter on the id column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdFilter {
    #[serde(rename = "$in")]
    pub any_of: Vec<u64>,
}

impl FindQuery {
    /// Select records whose id is one of `ids`
    pub fn ids_in(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            filter: WhereClause {
                id: IdFilter {
                    any_of: ids.into_iter().collect(),
                },
            },
        }
    }

    /// Requested ids
    pub fn ids(&self) -> &[u64] {
        &self.filter.id.any_of
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let query = FindQuery::ids_in([5, 9]);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({ "where": { "id": { "$in": [5, 9] } } })
        );
        assert_eq!(query.ids(), &[5, 9]);
    }
}
