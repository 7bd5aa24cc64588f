pub(crate) const DEFAULT_USER_AGENT: &str = concat!("pkiload/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8200";
pub const DEFAULT_MOUNT: &str = "pki";
pub const DEFAULT_ROLE: &str = "default";
pub const DEFAULT_COMMON_NAME: &str = "example.com";
pub const DEFAULT_DURATION_SECS: u64 = 120;
pub const DEFAULT_CONCURRENCY: usize = 10;
/// Target aggregate OCSP rate in requests per second.
pub const DEFAULT_OCSP_RATE: i64 = 20;
pub const DEFAULT_ENCODER: &str = "openssl";
/// Environment variable holding the issuance credential.
pub const TOKEN_ENV: &str = "VAULT_TOKEN";
