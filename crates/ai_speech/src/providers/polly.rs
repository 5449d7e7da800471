//! Amazon Polly speech synthesis provider
//!
//! Calls the `SynthesizeSpeech` REST operation with a SigV4-signed JSON
//! request and streams the audio body back.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use reqwest::{Client, Url};
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::sigv4::{AMZ_DATE_FORMAT, CanonicalRequest, RequestSigner};
use crate::config::PollyConfig;
use crate::error::{ConfigurationError, ProviderError};
use crate::ports::{ByteStream, SynthesisProvider};
use crate::types::OutputFormat;

const SERVICE: &str = "polly";
const SPEECH_PATH: &str = "/v1/speech";
const CONTENT_TYPE: &str = "application/json";

/// `SynthesizeSpeech` request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SynthesizeSpeechRequest<'a> {
    engine: &'a str,
    output_format: &'a str,
    text: &'a str,
    voice_id: &'a str,
}

/// Speech synthesis backed by Amazon Polly
#[derive(Debug, Clone)]
pub struct PollySynthesisProvider {
    client: Client,
    config: PollyConfig,
    speech_url: Url,
    host: String,
}

impl PollySynthesisProvider {
    /// Create a new Polly provider
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if credentials are missing or the
    /// endpoint is not a valid URL.
    pub fn new(config: PollyConfig) -> Result<Self, ConfigurationError> {
        config.validate().map_err(ConfigurationError)?;

        let base = Url::parse(&config.endpoint_url())
            .map_err(|e| ConfigurationError(format!("Invalid Polly endpoint: {e}")))?;
        let speech_url = base
            .join(SPEECH_PATH)
            .map_err(|e| ConfigurationError(format!("Invalid Polly endpoint: {e}")))?;

        let host = match (speech_url.host_str(), speech_url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(ConfigurationError(
                    "Polly endpoint has no host".to_string(),
                ));
            },
        };

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ConfigurationError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            speech_url,
            host,
        })
    }

    fn signer(&self) -> RequestSigner<'_> {
        RequestSigner {
            access_key_id: self
                .config
                .access_key_id
                .as_ref()
                .map_or("", |k| k.expose_secret()),
            secret_access_key: self
                .config
                .secret_access_key
                .as_ref()
                .map_or("", |k| k.expose_secret()),
            region: &self.config.region,
            service: SERVICE,
        }
    }
}

#[async_trait]
impl SynthesisProvider for PollySynthesisProvider {
    #[instrument(skip(self, text), fields(text_len = text.len(), format = %format, voice = %self.config.voice_id))]
    async fn synthesize(
        &self,
        text: &str,
        format: OutputFormat,
    ) -> Result<ByteStream, ProviderError> {
        let body = serde_json::to_vec(&SynthesizeSpeechRequest {
            engine: &self.config.engine,
            output_format: format.as_str(),
            text,
            voice_id: &self.config.voice_id,
        })
        .map_err(|e| ProviderError::new(format!("failed to encode request: {e}")))?;

        let now = Utc::now();
        let amz_date = now.format(AMZ_DATE_FORMAT).to_string();

        let authorization = self.signer().authorization(
            &CanonicalRequest {
                method: "POST",
                path: self.speech_url.path(),
                query: "",
                headers: &[
                    ("content-type", CONTENT_TYPE),
                    ("host", self.host.as_str()),
                    ("x-amz-date", amz_date.as_str()),
                ],
                payload: &body,
            },
            now,
        )?;

        let response = self
            .client
            .post(self.speech_url.clone())
            .header("content-type", CONTENT_TYPE)
            .header("x-amz-date", &amz_date)
            .header("authorization", authorization)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(%status, body = %error_body, "Polly rejected synthesis request");
            return Err(ProviderError::new(format!("HTTP {status}: {error_body}")));
        }

        debug!("Polly synthesis stream opened");

        Ok(Box::pin(
            response.bytes_stream().map_err(ProviderError::from),
        ))
    }

    fn voice_id(&self) -> &str {
        &self.config.voice_id
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn create_test_provider(mock_server: &MockServer) -> PollySynthesisProvider {
        let config = PollyConfig {
            endpoint: Some(mock_server.uri()),
            ..PollyConfig::test()
        };
        PollySynthesisProvider::new(config).unwrap()
    }

    async fn collect(mut stream: ByteStream) -> Result<Vec<u8>, ProviderError> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }

    #[tokio::test]
    async fn synthesize_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/speech"))
            .and(header("content-type", "application/json"))
            .and(header_exists("x-amz-date"))
            .and(header_exists("authorization"))
            .and(body_json(serde_json::json!({
                "Engine": "standard",
                "OutputFormat": "mp3",
                "Text": "Hello",
                "VoiceId": "Joanna"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/mpeg")
                    .set_body_bytes(b"fake-binary-audio".to_vec()),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);

        let stream = provider.synthesize("Hello", OutputFormat::Mp3).await.unwrap();

        assert_eq!(collect(stream).await.unwrap(), b"fake-binary-audio");
    }

    #[tokio::test]
    async fn synthesize_sends_requested_format() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/speech"))
            .and(body_json(serde_json::json!({
                "Engine": "standard",
                "OutputFormat": "ogg_vorbis",
                "Text": "Hi there",
                "VoiceId": "Joanna"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 64]))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);

        let stream = provider
            .synthesize("Hi there", OutputFormat::OggVorbis)
            .await
            .unwrap();

        assert_eq!(collect(stream).await.unwrap().len(), 64);
    }

    #[tokio::test]
    async fn authorization_uses_polly_scope() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/speech"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4]))
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);
        provider.synthesize("Hi", OutputFormat::Pcm).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let authorization = requests[0]
            .headers
            .get("authorization")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
        assert!(authorization.contains("/us-east-1/polly/aws4_request"));
        assert!(authorization.contains("SignedHeaders=content-type;host;x-amz-date"));
    }

    #[tokio::test]
    async fn rejected_request_is_opaque_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/speech"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "message": "The security token included in the request is invalid."
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);

        let err = match provider.synthesize("Hello", OutputFormat::Mp3).await {
            Err(e) => e,
            Ok(_) => panic!("expected provider failure"),
        };

        assert_eq!(err.to_string(), "Speech synthesis provider failed");
        assert!(err.reason().contains("403"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_provider_failure() {
        let config = PollyConfig {
            endpoint: Some("http://127.0.0.1:1".to_string()),
            ..PollyConfig::test()
        };
        let provider = PollySynthesisProvider::new(config).unwrap();

        let result = provider.synthesize("Hello", OutputFormat::Mp3).await;

        assert!(result.is_err());
    }

    #[test]
    fn new_fails_without_credentials() {
        assert!(PollySynthesisProvider::new(PollyConfig::default()).is_err());
    }

    #[test]
    fn new_fails_with_invalid_endpoint() {
        let config = PollyConfig {
            endpoint: Some("not a url".to_string()),
            ..PollyConfig::test()
        };
        assert!(PollySynthesisProvider::new(config).is_err());
    }

    #[test]
    fn voice_id_from_config() {
        let provider = PollySynthesisProvider::new(PollyConfig::test()).unwrap();
        assert_eq!(provider.voice_id(), "Joanna");
    }

    #[test]
    fn request_body_uses_pascal_case() {
        let body = serde_json::to_value(SynthesizeSpeechRequest {
            engine: "neural",
            output_format: "pcm",
            text: "x",
            voice_id: "Matthew",
        })
        .unwrap();

        assert_eq!(body["OutputFormat"], "pcm");
        assert_eq!(body["VoiceId"], "Matthew");
        assert_eq!(body["Engine"], "neural");
    }
}
