use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;

/// Signing configuration for a [`TokenIssuer`].
///
/// Built once at startup from service configuration and handed to the issuer;
/// nothing reads the secret from process-global state.
#[derive(Clone)]
pub struct TokenSettings {
    secret: Vec<u8>,
    ttl: Option<Duration>,
    issuer: Option<String>,
}

impl TokenSettings {
    /// Settings with a signing secret, no expiry and no issuer.
    ///
    /// The secret should be at least 32 bytes for HS256.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl: None,
            issuer: None,
        }
    }

    /// Expire issued tokens after `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Stamp issued tokens with `iss` and require it on verification.
    pub fn with_issuer(mut self, issuer: impl ToString) -> Self {
        self.issuer = Some(issuer.to_string());
        self
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Signs and verifies compact HS256 access tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Option<Duration>,
    issuer: Option<String>,
}

impl TokenIssuer {
    /// Create an issuer from its signing settings.
    pub fn new(settings: TokenSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(&settings.secret),
            decoding_key: DecodingKey::from_secret(&settings.secret),
            algorithm: Algorithm::HS256,
            ttl: settings.ttl,
            issuer: settings.issuer,
        }
    }

    /// Build the claims this issuer would sign for `subject`, applying the
    /// configured expiry and issuer.
    pub fn claims_for(&self, subject: impl ToString) -> Claims {
        let mut claims = Claims::new(subject);
        if let Some(ttl) = self.ttl {
            claims = claims.expires_in(ttl);
        }
        if let Some(issuer) = &self.issuer {
            claims = claims.with_issuer(issuer);
        }
        claims
    }

    /// Sign claims into a compact token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Sign a token for `subject` using [`TokenIssuer::claims_for`].
    pub fn issue_for(&self, subject: impl ToString) -> Result<String, TokenError> {
        self.issue(&self.claims_for(subject))
    }

    /// Verify a token's signature and time/issuer claims and decode it.
    ///
    /// Tokens without `exp` are accepted; when `exp` is present it is checked.
    ///
    /// # Errors
    /// * `Expired` - The `exp` claim is in the past
    /// * `DecodingFailed` - Malformed token, bad signature or wrong issuer
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::DecodingFailed(e.to_string()),
            })
    }
}
