use std::sync::Arc;
use tracing::info;

use crate::config::{Config, EmailConfig};
use crate::db::{CredentialStore, Store};
use crate::services::{
    AuthService, DefaultAuthService, LogMailer, Mailer, Notifier, PasswordHasher, ProductService,
    SeaOrmProductService, SmtpMailer, TokenLifetimes, TokenService,
};

fn mailer_from_config(config: &EmailConfig) -> Arc<dyn Mailer> {
    if config.enabled {
        info!(host = %config.host, port = config.port, "SMTP delivery enabled");
        Arc::new(SmtpMailer::new(config.clone()))
    } else {
        info!("SMTP delivery disabled, emails will be logged");
        Arc::new(LogMailer)
    }
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub product_service: Arc<dyn ProductService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let mailer = mailer_from_config(&config.email);
        Self::with_mailer(config, mailer).await
    }

    /// Builds the state around a caller-supplied mailer.
    pub async fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        config.validate()?;

        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let hasher = PasswordHasher::new(&config.security)?;
        let tokens = Arc::new(TokenService::from_config(&config.auth)?);
        let lifetimes = TokenLifetimes::from_config(&config.auth);
        let notifier = Notifier::new(mailer, &config.auth.app_url);

        let credentials: Arc<dyn CredentialStore> = Arc::new(store.clone());
        let auth_service = Arc::new(DefaultAuthService::new(
            credentials,
            hasher,
            tokens,
            lifetimes,
            notifier,
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        let product_service = Arc::new(SeaOrmProductService::new(store.clone()))
            as Arc<dyn ProductService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            product_service,
        })
    }
}
