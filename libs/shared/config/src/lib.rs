use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub nric_hash_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            nric_hash_secret: env::var("NRIC_HASH_SECRET")
                .unwrap_or_else(|_| {
                    warn!("NRIC_HASH_SECRET not set, using empty value");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
            && !self.nric_hash_secret.is_empty()
    }

    /// Names of the required environment variables that are currently unset.
    pub fn missing_vars(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.supabase_url.is_empty() {
            missing.push("SUPABASE_URL");
        }
        if self.supabase_anon_key.is_empty() {
            missing.push("SUPABASE_ANON_PUBLIC_KEY");
        }
        if self.supabase_jwt_secret.is_empty() {
            missing.push("SUPABASE_JWT_SECRET");
        }
        if self.nric_hash_secret.is_empty() {
            missing.push("NRIC_HASH_SECRET");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_vars_reports_every_empty_field() {
        let config = AppConfig {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: String::new(),
            supabase_jwt_secret: "secret".to_string(),
            nric_hash_secret: String::new(),
        };

        assert!(!config.is_configured());
        assert_eq!(
            config.missing_vars(),
            vec!["SUPABASE_ANON_PUBLIC_KEY", "NRIC_HASH_SECRET"]
        );
    }
}
