pub mod access;
pub mod email;
pub mod password;
pub mod token;
pub mod validation;

pub use email::{LogMailer, Mailer, Notifier, SmtpMailer};
pub use password::PasswordHasher;
pub use token::{Clock, SystemClock, TokenLifetimes, TokenPurpose, TokenService};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, TokenResponse};
pub use auth_service_impl::DefaultAuthService;

pub mod product_service;
pub mod product_service_impl;
pub use product_service::{ProductError, ProductService};
pub use product_service_impl::SeaOrmProductService;
