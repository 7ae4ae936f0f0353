use chrono::{DateTime, Utc};
use ring::{digest, hmac};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// AWS Signature Version 4 signer for JSON-protocol POSTs to `/`.
pub struct AwsSigner {
    access_key_id: String,
    secret_access_key: String,
    region: String,
    service: String,
}

impl AwsSigner {
    pub fn new(access_key_id: &str, secret_access_key: &str, region: &str, service: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            region: region.to_string(),
            service: service.to_string(),
        }
    }

    /// Build the signed headers for a request to `host` with the given
    /// `X-Amz-Target` and JSON body.
    pub fn headers(&self, host: &str, target: &str, body: &[u8], now: DateTime<Utc>) -> Vec<(String, String)> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let content_type = super::CONTENT_TYPE;

        // Header names sorted, lower-cased.
        let canonical_headers = format!(
            "content-type:{}\nhost:{}\nx-amz-date:{}\nx-amz-target:{}\n",
            content_type, host, amz_date, target
        );
        let signed_headers = "content-type;host;x-amz-date;x-amz-target";
        let canonical_request = format!(
            "POST\n/\n\n{}\n{}\n{}",
            canonical_headers,
            signed_headers,
            sha256_hex(body)
        );

        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let key = self.signing_key(&date);
        let signature = hex::encode(hmac::sign(&key, string_to_sign.as_bytes()).as_ref());

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.access_key_id, scope, signed_headers, signature
        );

        vec![
            ("Content-Type".to_string(), content_type.to_string()),
            ("X-Amz-Date".to_string(), amz_date),
            ("X-Amz-Target".to_string(), target.to_string()),
            ("Authorization".to_string(), authorization),
        ]
    }

    fn signing_key(&self, date: &str) -> hmac::Key {
        let secret = format!("AWS4{}", self.secret_access_key);
        let k_date = hmac_sha256(secret.as_bytes(), date.as_bytes());
        let k_region = hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = hmac_sha256(&k_region, self.service.as_bytes());
        let k_signing = hmac_sha256(&k_service, b"aws4_request");
        hmac::Key::new(hmac::HMAC_SHA256, &k_signing)
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    hmac::sign(&key, data).as_ref().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(digest::digest(&digest::SHA256, data).as_ref())
}
