use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use silly_translate::catalog::LanguageCatalog;
use silly_translate::chain::Policy;
use silly_translate::config::Config;
use silly_translate::retry::RetryConfig;
use silly_translate::service::{TranslateRequest, TranslateService};
use silly_translate::store::InMemoryStore;
use silly_translate::yandex::YandexTranslator;
use std::sync::Arc;
use tracing::{debug, info};

/// Hop count used when no policy flag is given
const DEFAULT_HOPS: i64 = 5;

/// Translate text through a chain of languages and back to English.
///
/// Required environment variables:
/// - YANDEX_API_KEY (or a key file at YANDEX_API_KEY_FILE, default yandex/api_key.txt)
#[derive(Debug, Parser)]
#[command(name = "silly-translate", version)]
#[command(group(ArgGroup::new("policy").args(["count", "permutation", "sequence"])))]
struct Cli {
    /// Translate through N random foreign languages (default 5)
    #[arg(short, long, allow_hyphen_values = true)]
    count: Option<i64>,

    /// Translate through every supported language once, in random order
    #[arg(short, long)]
    permutation: bool,

    /// Translate through the given comma-separated languages, e.g. French,German
    #[arg(short, long, value_delimiter = ',')]
    sequence: Option<Vec<String>>,

    /// Assign the result a shareable translation id
    #[arg(long)]
    public: bool,

    /// Print the supported language names and exit
    #[arg(long)]
    list_languages: bool,

    /// Text to translate (English)
    #[arg(required_unless_present = "list_languages")]
    text: Option<String>,
}

impl Cli {
    fn policy(&self) -> Policy {
        if self.permutation {
            Policy::FullPermutation
        } else if let Some(names) = &self.sequence {
            Policy::ExplicitSequence(names.iter().map(|n| n.trim().to_string()).collect())
        } else {
            Policy::FixedCount(self.count.unwrap_or(DEFAULT_HOPS))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("silly_translate=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let translator =
        YandexTranslator::new(&config).context("Failed to build Yandex client")?;
    let langs = translator
        .fetch_supported_languages(&RetryConfig::catalog_fetch())
        .await
        .context("Failed to fetch supported languages")?;
    let catalog = Arc::new(LanguageCatalog::from_langs(langs));
    info!("Loaded {} supported languages", catalog.len());

    let service = TranslateService::new(
        &config,
        catalog,
        Arc::new(translator),
        Arc::new(InMemoryStore::new()),
    )?;

    if cli.list_languages {
        let body = serde_json::json!({ "supportedLangNames": service.supported_lang_names() });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let request = TranslateRequest {
        text: cli.text.clone().context("TEXT is required")?,
        policy: cli.policy(),
        is_public: cli.public,
    };

    let response = service.translate(request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    debug!("Metrics: {:?}", service.metrics());
    Ok(())
}
