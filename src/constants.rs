pub const TOKEN_TYPE: &str = "bearer";

pub mod messages {

    pub const USER_VERIFIED: &str = "User verified successfully";

    pub const RESET_REQUESTED: &str =
        "If that email is registered, a password reset link has been sent";

    pub const PASSWORD_RESET: &str = "Password reset successfully";

    pub const NOT_AUTHENTICATED: &str = "Not authenticated";

    pub const INVALID_TOKEN: &str = "Could not validate credentials";

    pub const INVALID_CREDENTIALS: &str = "Incorrect username or password";

    pub const NO_PRODUCTS: &str = "No products found";
}

pub mod limits {

    pub const USERNAME_MIN_LEN: usize = 3;

    pub const USERNAME_MAX_LEN: usize = 32;

    pub const EMAIL_MAX_LEN: usize = 254;

    pub const PASSWORD_MAX_LEN: usize = 128;

    pub const PRODUCT_NAME_MAX_LEN: usize = 200;
}
