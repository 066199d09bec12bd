use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use family_db::models::UserRow;
use family_types::api::Claims;

/// RS256 signing material. The private key signs at login, the public key
/// verifies on every protected request; verification never touches I/O.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl AuthKeys {
    pub fn from_rsa_pem(
        private_pem: &[u8],
        public_pem: &[u8],
        ttl: Duration,
    ) -> jsonwebtoken::errors::Result<Self> {
        Ok(Self {
            encoding: EncodingKey::from_rsa_pem(private_pem)?,
            decoding: DecodingKey::from_rsa_pem(public_pem)?,
            ttl,
        })
    }

    /// Token lifetime in seconds.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl.num_seconds().max(0) as u64
    }

    pub fn issue(&self, user: &UserRow) -> jsonwebtoken::errors::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            family_id: user.family_id.clone(),
            role: user.role.clone(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding)
    }

    /// Check signature, algorithm and expiry.
    pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::RS256))?;
        Ok(data.claims)
    }
}
