use std::env;
use std::path::Path;

use imageforge::{
    output::archive::ARCHIVE_FILE_NAME, Config, ForgeClient, GenerationRequest, ImageParams,
    Presenter, Session,
};

const DEFAULT_TOPIC: &str = "An astronaut riding a rainbow unicorn, cinematic, dramatic";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file first
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    imageforge::logger::init_with_config(
        imageforge::logger::LoggerConfig::development()
            .with_level(imageforge::logger::LogLevel::Debug),
    )?;

    log::info!("🔍 Checking credentials...");

    match env::var("GEMINI_API_KEY") {
        Ok(key) => {
            log::info!("✅ Gemini API key found in environment");
            log::debug!("Key starts with: {}...", &key[..5.min(key.len())]);
        }
        Err(_) => {
            log::error!("❌ GEMINI_API_KEY is not set, prompt enhancement will be unavailable");
        }
    }

    match (
        env::var("REPLICATE_API_TOKEN"),
        env::var("TOGETHER_API_KEY"),
    ) {
        (Err(_), Err(_)) => {
            log::error!("❌ No image back-end credential set");
            log::error!("💡 Set REPLICATE_API_TOKEN or TOGETHER_API_KEY and retry");
        }
        _ => log::info!("✅ Image back-end credential found"),
    }

    let config = Config::from_env();
    log::info!("⚙️  Selected back-end: {}", config.backend.as_str());

    log::info!("🔄 Creating ImageForge client...");
    let client = match ForgeClient::new(config) {
        Ok(client) => {
            log::info!("✅ ImageForge client initialized successfully");
            client
        }
        Err(e) => {
            log::error!("❌ Failed to initialize ImageForge client: {}", e);
            return Err(e.into());
        }
    };

    let topic = env::args().nth(1).unwrap_or_else(|| DEFAULT_TOPIC.to_string());
    log::info!("📝 Topic: {}", topic);

    log::info!("🖼️  Example gallery ({} images available):", imageforge::output::gallery::examples().len());
    for example in imageforge::output::gallery::examples() {
        log::debug!("  {} - {}", example.path, example.caption);
    }

    let params = ImageParams::default();
    let format = params.output_format;
    let request = GenerationRequest::new(topic).with_params(params);

    let mut session = Session::new();
    log::info!("🎨 Running the generation pipeline...");

    let outcome = match client.run(request, &mut session).await {
        Ok(outcome) => {
            log::info!("✅ Generation successful!");
            log::info!("📝 Final prompt: {}", outcome.prompt);
            if outcome.enhanced {
                log::info!("✨ Prompt was enhanced before generation");
            } else {
                log::info!("➡️  Raw topic was sent unchanged");
            }
            log::info!("🖼️  Received {} image(s)", outcome.images.len());
            outcome
        }
        Err(e) => {
            log::error!("❌ Generation failed: {}", e);
            log::info!("🖼️  The example gallery remains available");
            return Err(e.into());
        }
    };

    let presenter = Presenter::new();
    let output_dir = Path::new("output");

    match presenter.save_all(&outcome.images, output_dir, format).await {
        Ok(paths) => log::info!("💾 Saved {} file(s) to {}", paths.len(), output_dir.display()),
        Err(e) => log::error!("❌ Failed to save images: {}", e),
    }

    log::info!("📦 Building download archive...");
    match presenter.build_archive(&outcome.images, format).await {
        Ok(bytes) => {
            let archive_path = output_dir.join(ARCHIVE_FILE_NAME);
            tokio::fs::write(&archive_path, bytes).await?;
            log::info!("📦 Archive written to: {}", archive_path.display());
        }
        Err(e) => log::error!("❌ Failed to build archive: {}", e),
    }

    log::info!("🎉 Pipeline completed!");
    log::info!("💡 Check the output directory for generated files");

    Ok(())
}
