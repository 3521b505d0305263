use serde::{Deserialize, Serialize};

// Query string pairs in request order. Repeated keys are kept, the last one wins.
pub type QueryPairs = Vec<(String, String)>;

pub fn last_param(pairs: QueryPairs, name: &str) -> Option<String> {
    pairs
        .into_iter()
        .rev()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}

// JSON error body: {"error": "..."}
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> QueryPairs {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn last_repeated_param_wins() {
        let query = pairs(&[("url", "first"), ("other", "x"), ("url", "second")]);
        assert_eq!(last_param(query, "url").as_deref(), Some("second"));
    }

    #[test]
    fn absent_param_is_none() {
        assert_eq!(last_param(pairs(&[("other", "x")]), "url"), None);
        assert_eq!(last_param(Vec::new(), "url"), None);
    }
}
