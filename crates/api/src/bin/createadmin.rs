//! Bootstrap an administrator account: create it, or promote the existing
//! account under the same email and rotate its password.
//!
//! Meaningful against the persistent store (`USE_PERSISTENT_STORES=true`);
//! with the in-memory stores the account dies with the process.

use adboard_identity::NewUser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    adboard_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret".to_string());
    let services = adboard_api::app::services::build_services(jwt_secret.as_bytes()).await;

    let input = NewUser {
        email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string()),
        first_name: std::env::var("ADMIN_FIRST_NAME").unwrap_or_else(|_| "Admin".to_string()),
        last_name: std::env::var("ADMIN_LAST_NAME").unwrap_or_else(|_| "User".to_string()),
        phone: std::env::var("ADMIN_PHONE").unwrap_or_else(|_| "+10000000000".to_string()),
    };
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

    let email = input.email.clone();
    let created = services.bootstrap_admin(input, &password).await?;
    tracing::info!(%email, created, "admin account ready");
    Ok(())
}
