use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use imageforge::*;

/// Backend double that records every prompt it receives and returns as many
/// images as requested, or fails on demand.
struct RecordingBackend {
    prompts: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingBackend {
    fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                prompts: prompts.clone(),
                fail: false,
            },
            prompts,
        )
    }

    fn failing() -> Self {
        Self {
            prompts: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }
}

#[async_trait]
impl ImageBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn generate(&self, prompt: &str, params: &ImageParams) -> Result<Vec<GeneratedImage>> {
        if self.fail {
            return Err(ForgeError::BackendError {
                backend: "recording".to_string(),
                message: "simulated outage".to_string(),
            });
        }
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok((0..params.num_outputs)
            .map(|i| GeneratedImage::Url(format!("https://images.test/{}.webp", i)))
            .collect())
    }
}

fn test_enhancer() -> GeminiEnhancer {
    // Unroutable loopback port, so any accidental call fails fast.
    GeminiEnhancer::new(GeminiConfig::new().with_api_key("test-key"))
        .unwrap()
        .with_api_base("http://127.0.0.1:1")
}

/// One-shot HTTP stub that answers any request with the given JSON body.
async fn spawn_stub_server(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 65536];
        let mut read = 0;
        // Drain the request: headers, then Content-Length body bytes.
        loop {
            let n = socket.read(&mut buf[read..]).await.unwrap();
            if n == 0 {
                break;
            }
            read += n;
            let text = String::from_utf8_lossy(&buf[..read]).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if read >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    format!("http://{}", addr)
}

// --- Orchestration tests ---

#[tokio::test]
async fn test_skip_enhancement_passes_topic_through() {
    let (backend, prompts) = RecordingBackend::new();
    let client = ForgeClient::from_parts(test_enhancer(), Box::new(backend));

    let request = GenerationRequest::new("a red bicycle").skip_enhancement(true);
    let mut session = Session::new();
    let outcome = client.run(request, &mut session).await.unwrap();

    assert_eq!(outcome.prompt, "a red bicycle");
    assert!(!outcome.enhanced);
    assert_eq!(prompts.lock().unwrap().as_slice(), ["a red bicycle"]);
    assert_eq!(session.state(), PipelineState::Displaying);
}

#[tokio::test]
async fn test_enhanced_prompt_reaches_backend_exactly() {
    let enhanced = "A vivid red bicycle leaning against a brick wall, golden hour light";
    let base = spawn_stub_server(
        r#"{"candidates":[{"content":{"parts":[{"text":"A vivid red bicycle leaning against a brick wall, golden hour light"}]}}]}"#,
    )
    .await;

    let enhancer = GeminiEnhancer::new(GeminiConfig::new().with_api_key("test-key"))
        .unwrap()
        .with_api_base(base);
    let (backend, prompts) = RecordingBackend::new();
    let client = ForgeClient::from_parts(enhancer, Box::new(backend));

    let request = GenerationRequest::new("a red bicycle");
    let mut session = Session::new();
    let outcome = client.run(request, &mut session).await.unwrap();

    assert!(outcome.enhanced);
    assert_eq!(outcome.prompt, enhanced);
    assert_eq!(prompts.lock().unwrap().as_slice(), [enhanced]);
}

#[tokio::test]
async fn test_structured_enhancement_is_normalized() {
    let base = spawn_stub_server(
        r#"{"candidates":[{"content":{"parts":[{"text":"{\"prompt\": \"a misty forest at dawn\"}"}]}}]}"#,
    )
    .await;

    let enhancer = GeminiEnhancer::new(GeminiConfig::new().with_api_key("test-key"))
        .unwrap()
        .with_api_base(base);
    let result = enhancer.enhance("a forest").await.unwrap();
    assert_eq!(result, "a misty forest at dawn");
}

#[tokio::test]
async fn test_enhancement_failure_falls_back_to_topic() {
    let (backend, prompts) = RecordingBackend::new();
    let client = ForgeClient::from_parts(test_enhancer(), Box::new(backend));

    let request = GenerationRequest::new("a red bicycle");
    let mut session = Session::new();
    let outcome = client.run(request, &mut session).await.unwrap();

    assert!(!outcome.enhanced);
    assert_eq!(outcome.prompt, "a red bicycle");
    assert_eq!(prompts.lock().unwrap().as_slice(), ["a red bicycle"]);
    assert_eq!(session.state(), PipelineState::Displaying);
}

#[tokio::test]
async fn test_requested_count_is_returned() {
    let (backend, _prompts) = RecordingBackend::new();
    let client = ForgeClient::from_parts(test_enhancer(), Box::new(backend));

    let params = ImageParams::new().with_num_outputs(2);
    let request = GenerationRequest::new("two of them")
        .skip_enhancement(true)
        .with_params(params);
    let mut session = Session::new();
    let outcome = client.run(request, &mut session).await.unwrap();

    assert_eq!(outcome.images.len(), 2);
}

#[tokio::test]
async fn test_generation_failure_marks_session_failed() {
    let client = ForgeClient::from_parts(test_enhancer(), Box::new(RecordingBackend::failing()));

    let request = GenerationRequest::new("doomed").skip_enhancement(true);
    let mut session = Session::new();
    let result = client.run(request, &mut session).await;

    assert!(result.is_err());
    assert_eq!(session.state(), PipelineState::Failed);
    // The example gallery stays available after a failure.
    assert_eq!(imageforge::output::gallery::examples().len(), 7);
}

#[tokio::test]
async fn test_invalid_params_rejected_before_any_call() {
    let (backend, prompts) = RecordingBackend::new();
    let client = ForgeClient::from_parts(test_enhancer(), Box::new(backend));

    let request = GenerationRequest::new("anything")
        .skip_enhancement(true)
        .with_params(ImageParams::new().with_num_outputs(11));
    let mut session = Session::new();

    assert!(client.run(request, &mut session).await.is_err());
    assert!(prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_session_keeps_prompt_until_cleared() {
    let (backend, _prompts) = RecordingBackend::new();
    let client = ForgeClient::from_parts(test_enhancer(), Box::new(backend));

    let request = GenerationRequest::new("a quiet harbor").skip_enhancement(true);
    let mut session = Session::new();
    client.run(request, &mut session).await.unwrap();

    assert_eq!(session.prompt(), Some("a quiet harbor"));
    session.clear();
    assert_eq!(session.prompt(), None);
    assert_eq!(session.state(), PipelineState::Idle);
}

// --- Seed handling tests ---

#[test]
fn test_zero_seed_equivalent_to_unset() {
    let with_zero = ReplicateBackend::build_input("x", &ImageParams::new().with_seed(0));
    let without = ReplicateBackend::build_input("x", &ImageParams::new());
    assert_eq!(with_zero, without);
}

// --- Archive tests ---

#[tokio::test]
async fn test_archive_contains_all_fetched_images() {
    let presenter = Presenter::new();
    let images: Vec<GeneratedImage> = (0..3)
        .map(|i| GeneratedImage::Base64(general_purpose::STANDARD.encode(format!("img-{}", i))))
        .collect();

    let bytes = presenter
        .build_archive(&images, OutputFormat::Png)
        .await
        .unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 3);
    for (i, expected) in ["output_file_1.png", "output_file_2.png", "output_file_3.png"]
        .iter()
        .enumerate()
    {
        assert_eq!(archive.by_index(i).unwrap().name(), *expected);
    }
}

#[tokio::test]
async fn test_archive_silently_skips_failed_images() {
    let presenter = Presenter::new();
    let images = vec![
        GeneratedImage::Base64(general_purpose::STANDARD.encode("good one")),
        GeneratedImage::Base64("!!! not base64 !!!".to_string()),
        GeneratedImage::Base64(general_purpose::STANDARD.encode("another good one")),
    ];

    let bytes = presenter
        .build_archive(&images, OutputFormat::Webp)
        .await
        .unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2);
    assert_eq!(archive.by_index(0).unwrap().name(), "output_file_1.webp");
    assert_eq!(archive.by_index(1).unwrap().name(), "output_file_2.webp");
}

// --- Prompt normalization tests ---

#[test]
fn test_plain_and_structured_responses_normalize() {
    assert_eq!(
        EnhancedPrompt::parse("just text").into_prompt(),
        "just text"
    );
    assert_eq!(
        EnhancedPrompt::parse(r#"{"prompt": "from json"}"#).into_prompt(),
        "from json"
    );
    assert_eq!(
        EnhancedPrompt::parse(r#"{"other": "field"}"#).into_prompt(),
        ""
    );
}

#[test]
fn test_template_embeds_topic_verbatim() {
    let template = build_enhance_template("a red bicycle");
    assert!(template.contains("a red bicycle"));
}
