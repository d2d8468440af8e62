use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Page size used when listing `Reminder`s without a limit
    pub default_page_limit: usize,
    /// Upper bound for the page size when listing `Reminder`s.
    /// Larger limits are clamped to this value.
    pub max_page_limit: usize,
}

fn env_or_default(name: &str, default: usize) -> usize {
    match std::env::var(name) {
        Ok(value) => match value.parse::<usize>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    name, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    pub fn new() -> Self {
        let port = env_or_default("PORT", 5000);
        let default_page_limit = env_or_default("DEFAULT_PAGE_LIMIT", 50);
        let mut max_page_limit = env_or_default("MAX_PAGE_LIMIT", 200);
        if max_page_limit < default_page_limit {
            warn!(
                "MAX_PAGE_LIMIT: {} is lower than DEFAULT_PAGE_LIMIT: {}, raising it.",
                max_page_limit, default_page_limit
            );
            max_page_limit = default_page_limit;
        }

        Self {
            port,
            default_page_limit,
            max_page_limit,
        }
    }

    /// Resolves the page size requested by a client
    pub fn page_limit(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(limit) => limit.min(self.max_page_limit),
            None => self.default_page_limit,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clamps_page_limit() {
        let config = Config {
            port: 0,
            default_page_limit: 50,
            max_page_limit: 200,
        };
        assert_eq!(config.page_limit(None), 50);
        assert_eq!(config.page_limit(Some(10)), 10);
        assert_eq!(config.page_limit(Some(1000)), 200);
    }
}
