use std::env;

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { allowed_origins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_origins_are_local_dev_hosts() {
        // Only meaningful when ALLOWED_ORIGINS is not set in the test env.
        if env::var("ALLOWED_ORIGINS").is_err() {
            let config = CorsConfig::from_env();
            assert_eq!(config.allowed_origins.len(), 2);
            assert!(config.allowed_origins[0].starts_with("http://localhost"));
        }
    }
}
