use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pic2text::config::Config;
use pic2text::export::{
    export_file_stem, DirectoryDownloads, ExportAdapter, SystemClipboard, TextKind,
};
use pic2text::extraction::ExtractionClient;
use pic2text::models::{ItemSnapshot, ItemStatus, Language, SourceFile};
use pic2text::processing::ProcessingController;
use pic2text::speech::{CommandSpeechEngine, SpeechAdapter};
use pic2text::store::ItemStore;

#[derive(Parser)]
#[command(name = "pic2text")]
#[command(about = "Extract and translate the text in images")]
struct Args {
    /// Images to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Target language (en, hi, ta, te, kn, mr; eng/hin/... also accepted)
    #[arg(short, long)]
    lang: Option<Language>,

    /// Save the original and translated text of every finished image as .txt files
    #[arg(long)]
    download: bool,

    /// Copy the first image's text to the clipboard (original or translated)
    #[arg(long, value_name = "KIND")]
    copy: Option<TextKind>,

    /// Read the first image's text aloud (original or translated)
    #[arg(long, value_name = "KIND")]
    speak: Option<TextKind>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pic2text=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(lang) = args.lang {
        config.processing.language = lang;
    }

    let client = ExtractionClient::new(&config.extraction)?;
    tracing::info!("Using OCR service at {}", client.endpoint());

    let store = Arc::new(ItemStore::new());
    let controller = ProcessingController::new(store.clone(), Arc::new(client), &config.processing);

    let mut sources = Vec::with_capacity(args.files.len());
    for path in &args.files {
        match SourceFile::read(path).await {
            Ok(source) => sources.push(source),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable file"),
        }
    }
    store.add(sources);

    if store.is_empty() {
        return Err(anyhow::anyhow!("None of the given files could be read"));
    }

    controller.process_all().join().await;

    let items = store.snapshot();
    for item in &items {
        print_item(item, controller.language());
    }

    let export = ExportAdapter::new(
        Arc::new(SystemClipboard::new()),
        Arc::new(DirectoryDownloads::from_config(&config.export)),
    );

    if args.download {
        for item in items.iter().filter(|item| item.status == ItemStatus::Done) {
            for kind in [TextKind::Original, TextKind::Translated] {
                let name = export_file_stem(item.file_name.as_deref(), kind);
                match export.download_as_file(text_of(item, kind), &name).await {
                    Ok(Some(path)) => println!("Saved {}", path.display()),
                    Ok(None) => {}
                    Err(e) => tracing::error!(item_id = %item.id, error = %e, "Download failed"),
                }
            }
        }
    }

    let Some(selected) = store.selected() else {
        return Ok(());
    };

    if let Some(kind) = args.copy {
        match export.copy_to_clipboard(text_of(&selected, kind)).await {
            Ok(()) => println!("Copied to clipboard!"),
            Err(e) => tracing::error!(error = %e, "Copy failed"),
        }
    }

    if let Some(kind) = args.speak {
        let speech = SpeechAdapter::new(Arc::new(CommandSpeechEngine::new(&config.speech)));
        let language_code = match kind {
            TextKind::Original => Language::English.code(),
            TextKind::Translated => controller.language().code(),
        };
        if let Err(e) = speech.speak(text_of(&selected, kind), language_code) {
            tracing::error!(error = %e, "Speech failed");
        }
    }

    Ok(())
}

fn text_of(item: &ItemSnapshot, kind: TextKind) -> &str {
    match kind {
        TextKind::Original => &item.original_text,
        TextKind::Translated => item.translated(),
    }
}

fn print_item(item: &ItemSnapshot, language: Language) {
    let name = item.file_name.as_deref().unwrap_or("image");
    println!("== {} [{}]", name, item.status);
    match item.status {
        ItemStatus::Done => {
            println!("-- Extracted text\n{}", item.original_text.trim_end());
            println!(
                "-- Translated text ({})\n{}",
                language.display_name(),
                item.translated().trim_end()
            );
        }
        ItemStatus::Error => println!("Error extracting text"),
        _ => {}
    }
}
