use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::models::auth::{Claims, Principal};

const BCRYPT_COST: u32 = 10;

/// Password hashing and bearer-token issuance/verification.
pub struct AuthService;

impl AuthService {
    pub fn hash_password(password: &str) -> anyhow::Result<String> {
        Ok(bcrypt::hash(password, BCRYPT_COST)?)
    }

    /// A malformed stored hash counts as a mismatch.
    pub fn verify_password(password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    pub fn issue_token(
        principal: &Principal,
        secret: &str,
        ttl_seconds: u64,
    ) -> anyhow::Result<String> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: principal.id.to_string(),
            email: principal.email.clone(),
            iat: now,
            exp: now + ttl_seconds as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }

    pub fn verify_token(token: &str, secret: &str) -> anyhow::Result<Principal> {
        let key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &key, &validation)?;
        let claims = data.claims;

        Ok(Principal {
            id: claims.sub.parse()?,
            email: claims.email,
        })
    }
}
