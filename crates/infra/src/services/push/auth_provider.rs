use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

// https://developers.google.com/identity/protocols/oauth2/service-account#httprest

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const FIREBASE_MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_LIFETIME_SECS: i64 = 60 * 60;

/// The relevant fields of a Google service account key file
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.into()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    // Access token expires in specified in seconds
    expires_in: i64,
}

struct CachedToken {
    access_token: String,
    expires_ts: i64,
}

/// Exchanges a signed service account assertion for OAuth access tokens
/// and caches them until shortly before they expire
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    client: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey, client: reqwest::Client) -> anyhow::Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        Ok(Self {
            key,
            encoding_key,
            client,
            token: Mutex::new(None),
        })
    }

    fn create_assertion(&self, now_secs: i64) -> anyhow::Result<String> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: FIREBASE_MESSAGING_SCOPE,
            aud: &self.key.token_uri,
            exp: now_secs + JWT_LIFETIME_SECS,
            iat: now_secs,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        Ok(encode(&header, &claims, &self.encoding_key)?)
    }

    pub async fn get_access_token(&self) -> anyhow::Result<String> {
        let mut token = self.token.lock().await;

        let now = Utc::now().timestamp_millis();
        let one_minute_in_millis = 1000 * 60;
        if let Some(cached) = token.as_ref() {
            if now + one_minute_in_millis <= cached.expires_ts {
                return Ok(cached.access_token.clone());
            }
        }

        debug!("Requesting new firebase access token");
        let assertion = self.create_assertion(now / 1000)?;
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];
        let res = self
            .client
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await?
            .error_for_status()?
            .json::<TokenResponse>()
            .await?;

        let access_token = res.access_token.clone();
        *token = Some(CachedToken {
            access_token: res.access_token,
            expires_ts: now + res.expires_in * 1000,
        });
        Ok(access_token)
    }
}
