use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub notify_service_url: String,
    pub notify_service_token: String,
    pub jwt_public_key: String, // Ed25519 public key (PEM), issued by the identity service
    pub auth_issuer: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            notify_service_url: env::var("NOTIFY_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/notify".to_string()),
            notify_service_token: env::var("NOTIFY_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://id.fitcore.local".to_string()),
        }
    }
}
