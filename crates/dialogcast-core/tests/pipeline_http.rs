use base64::Engine;
use dialogcast_core::{
    AssemblyStrategy, DialoguePipeline, DialoguePipelineBuilder, DialogueRequest, PipelineConfig,
    PipelineError, SynthesisError,
};
use dialogcast_speech::{
    AzureTts, ElevenLabsTts, GoogleCloudTts, OpenAiTts, ProviderKind, ScriptLine, Speaker,
    SpeechBuilder,
};
use httpmock::prelude::*;
use serde_json::json;

const FAKE_MP3: &[u8] = &[0xFF, 0xFB, 0x90, 0x64, 0x00, 0x00, 0x00, 0x00];

struct Backends {
    google: MockServer,
    azure: MockServer,
    elevenlabs: MockServer,
    openai: MockServer,
}

impl Backends {
    async fn start() -> Self {
        Self {
            google: MockServer::start_async().await,
            azure: MockServer::start_async().await,
            elevenlabs: MockServer::start_async().await,
            openai: MockServer::start_async().await,
        }
    }

    /// All four adapters in the default cascade order, pointed at the mocks.
    fn pipeline(&self) -> DialoguePipelineBuilder {
        DialoguePipeline::builder()
            .config(PipelineConfig {
                batch_delay_ms: 0,
                ..PipelineConfig::default()
            })
            .provider(
                SpeechBuilder::<GoogleCloudTts>::new()
                    .api_key("google-key")
                    .base_url(self.google.base_url())
                    .build()
                    .unwrap(),
            )
            .provider(
                SpeechBuilder::<AzureTts>::new()
                    .api_key("azure-key")
                    .base_url(self.azure.base_url())
                    .build()
                    .unwrap(),
            )
            .provider(
                SpeechBuilder::<ElevenLabsTts>::new()
                    .api_key("xi-key")
                    .base_url(self.elevenlabs.base_url())
                    .build()
                    .unwrap(),
            )
            .provider(
                SpeechBuilder::<OpenAiTts>::new()
                    .api_key("sk-test")
                    .base_url(self.openai.base_url())
                    .build()
                    .unwrap(),
            )
    }
}

fn script() -> DialogueRequest {
    DialogueRequest::new(vec![
        ScriptLine::new(Speaker::A, "Welcome to the show everyone"),
        ScriptLine::new(Speaker::B, "Thanks for having me"),
    ])
    .language("en-US")
}

async fn google_healthy(server: &MockServer) {
    let encoded = base64::engine::general_purpose::STANDARD.encode(FAKE_MP3);
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/text:synthesize");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "audioContent": encoded }));
        })
        .await;
}

async fn raw_audio(server: &MockServer, path: &str, status: u16) {
    let path = path.to_string();
    server
        .mock_async(|when, then| {
            when.method(POST).path(path);
            if status == 200 {
                then.status(200).body(FAKE_MP3);
            } else {
                then.status(status).body("backend unavailable");
            }
        })
        .await;
}

#[tokio::test]
async fn test_healthy_cascade_uses_first_priority_provider() {
    let backends = Backends::start().await;
    google_healthy(&backends.google).await;
    raw_audio(&backends.azure, "/cognitiveservices/v1", 200).await;

    let pipeline = backends.pipeline().build().unwrap();
    let output = pipeline.run(script(), None).await.unwrap();

    assert_eq!(output.segments.len(), 2);
    assert!(
        output
            .segments
            .iter()
            .all(|s| s.provider == ProviderKind::GoogleCloud)
    );
    assert_eq!(output.assembly, AssemblyStrategy::Concatenated);
    assert_eq!(output.audio.len(), FAKE_MP3.len() * 2);

    assert_eq!(output.transcript.len(), 2);
    assert_eq!(output.transcript[0].start_time, 0.0);
    assert_eq!(output.transcript[1].start_time, output.transcript[0].end_time);
    assert_eq!(output.transcript[0].speaker_name, "Host");
    assert_eq!(output.provider_usage.len(), 1);
}

#[tokio::test]
async fn test_failing_primary_falls_back_to_next_tier() {
    let backends = Backends::start().await;
    raw_audio(&backends.google, "/v1/text:synthesize", 503).await;
    raw_audio(&backends.azure, "/cognitiveservices/v1", 200).await;

    let pipeline = backends.pipeline().build().unwrap();
    let output = pipeline.run(script(), None).await.unwrap();

    assert!(output.segments.iter().all(|s| s.provider == ProviderKind::Azure));
    assert_eq!(output.provider_usage.get(&ProviderKind::Azure), Some(&2));
    assert_eq!(output.assembly, AssemblyStrategy::Concatenated);
}

#[tokio::test]
async fn test_every_provider_failing_exhausts() {
    let backends = Backends::start().await;
    raw_audio(&backends.google, "/v1/text:synthesize", 500).await;
    raw_audio(&backends.azure, "/cognitiveservices/v1", 401).await;
    backends
        .elevenlabs
        .mock_async(|when, then| {
            when.method(POST);
            then.status(429).body("quota exceeded");
        })
        .await;
    raw_audio(&backends.openai, "/audio/speech", 500).await;

    let pipeline = backends.pipeline().build().unwrap();
    match pipeline.run(script(), None).await {
        Err(PipelineError::Synthesis(SynthesisError::AllProvidersExhausted {
            attempted,
            failures,
            ..
        })) => {
            assert_eq!(attempted, ProviderKind::DEFAULT_CASCADE.to_vec());
            assert_eq!(failures.len(), 4);
        }
        other => panic!("Expected AllProvidersExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unconfigured_tiers_are_skipped() {
    let openai = MockServer::start_async().await;
    raw_audio(&openai, "/audio/speech", 200).await;

    let pipeline = DialoguePipeline::builder()
        .config(PipelineConfig {
            batch_delay_ms: 0,
            ..PipelineConfig::default()
        })
        .provider(SpeechBuilder::<GoogleCloudTts>::new().build().unwrap())
        .provider(SpeechBuilder::<AzureTts>::new().build().unwrap())
        .provider(
            SpeechBuilder::<OpenAiTts>::new()
                .api_key("sk-test")
                .base_url(openai.base_url())
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let output = pipeline.run(script(), None).await.unwrap();
    assert!(output.segments.iter().all(|s| s.provider == ProviderKind::OpenAI));
    assert_eq!(output.audio.len(), FAKE_MP3.len() * 2);
}
