use std::path::PathBuf;
use std::{env, io};

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use glinax::{persist, Orchestrator, ReferenceData};
use glinax_crawler::{fetch, CrawlerConfig, FetchResult, HttpFetcher};
use glinax_extract::{AdmissionsPageRules, HintedRules, MainPageRules};
use glinax_store::{DocumentStore, JsonArtifacts, StoreConfig};
use serde_json::json;
use tokio::runtime;

/// Ghana university admissions scraper
#[derive(Debug, Parser)]
#[command(version, args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Option<SubCommand>,
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommand {
    #[command(name = "scrap")]
    Scrap(ScrapArgs),
    #[command(hide = true)]
    Completion,
}

/// Scrape every source once and persist the snapshot
#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// Reference data yaml file (sources, fallbacks, scholarships, cut-offs)
    #[arg(long)]
    pub reference: Option<PathBuf>,
    /// Directory receiving the JSON artifacts
    #[arg(env = "GLINAX_DATA_DIR", long, default_value = "data")]
    pub data_dir: PathBuf,
    /// Optional default crawler yaml configuration file
    #[arg(env = "GLINAX_CRAWLER_CONFIG", long)]
    pub crawler_config: Option<PathBuf>,
    /// Override crawler's user agent
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Override crawler's per request timeout, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Override crawler's delay between two sources, in seconds
    #[arg(long)]
    pub source_delay: Option<f32>,
    /// Override crawler's retry budget for transport failures
    #[arg(long)]
    pub max_retries: Option<u32>,
    /// Document store endpoint (ws://, wss:// or mem://)
    #[arg(env = "GLINAX_DB_URI", long)]
    pub db_uri: Option<String>,
    /// Document store database
    #[arg(env = "GLINAX_DB_NAME", long, default_value = StoreConfig::DEFAULT_DATABASE)]
    pub db_name: String,
    /// Document store namespace
    #[arg(env = "GLINAX_DB_NAMESPACE", long, default_value = StoreConfig::DEFAULT_NAMESPACE)]
    pub db_namespace: String,
    /// Document store root user
    #[arg(env = "GLINAX_DB_USER", long, requires = "db_pass")]
    pub db_user: Option<String>,
    /// Document store root password
    #[arg(env = "GLINAX_DB_PASS", long, requires = "db_user", hide_env_values = true)]
    pub db_pass: Option<String>,
    /// When quiet no logs are outputted
    #[arg(long, short)]
    pub quiet: bool,
}

impl TryFrom<&RunArgs> for CrawlerConfig {
    type Error = anyhow::Error;

    fn try_from(args: &RunArgs) -> Result<Self, Self::Error> {
        let mut conf = if let Some(path) = &args.crawler_config {
            let file = fs_err::File::open(path)?;
            serde_yaml::from_reader(file)
                .with_context(|| format!("Invalid crawler config {}", path.display()))?
        } else {
            CrawlerConfig::default()
        };
        if let Some(user_agent) = &args.user_agent {
            conf.user_agent = user_agent.to_string();
        }
        if let Some(timeout_secs) = args.timeout_secs {
            conf.timeout_secs = timeout_secs;
        }
        if let Some(source_delay) = args.source_delay {
            conf.source_delay = source_delay;
        }
        if let Some(max_retries) = args.max_retries {
            conf.max_retries = max_retries;
        }
        conf.validate()?;
        Ok(conf)
    }
}

impl TryFrom<&RunArgs> for StoreConfig {
    type Error = anyhow::Error;

    fn try_from(args: &RunArgs) -> Result<Self, Self::Error> {
        let Some(uri) = &args.db_uri else {
            bail!("Missing document store URI, set GLINAX_DB_URI or pass --db-uri");
        };
        let mut conf = StoreConfig::new(uri)
            .with_namespace(&args.db_namespace)
            .with_database(&args.db_name);
        if let (Some(user), Some(pass)) = (&args.db_user, &args.db_pass) {
            conf = conf.with_credentials(user, pass);
        }
        Ok(conf)
    }
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let crawler_conf = CrawlerConfig::try_from(&args)?;
    let store_conf = StoreConfig::try_from(&args)?;
    let reference = match &args.reference {
        Some(path) => ReferenceData::from_path(path)?,
        None => ReferenceData::bundled()?,
    };

    let orchestrator = Orchestrator::new(HttpFetcher::new(crawler_conf.clone()), reference, &crawler_conf)?;
    let files = JsonArtifacts::new(args.data_dir);
    let store = DocumentStore::new(store_conf);

    let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
    rt.block_on(async {
        let snapshot = orchestrator.run().await;
        persist(&snapshot, &files, &store).await
    })
}

/// Run the extractors on a single page and print the fragments to stdout
#[derive(Debug, clap::Args)]
#[command(group = clap::ArgGroup::new("page").required(true))]
pub struct ScrapArgs {
    /// A local html page to scrap
    #[arg(group = "page", long)]
    pub file: Option<PathBuf>,
    /// A distant html page to scrap
    #[arg(group = "page", long)]
    pub url: Option<String>,
    /// Custom user agent to download the page
    #[arg(long, conflicts_with = "file")]
    pub ua: Option<String>,
    /// Class hints for program lists, e.g. ".program-list, .course-list"
    #[arg(long)]
    pub programs_selector: Option<String>,
    /// Class hints for requirement blocks
    #[arg(long)]
    pub requirements_selector: Option<String>,
}

pub fn scrap(args: ScrapArgs) -> anyhow::Result<()> {
    let page = if let Some(url) = &args.url {
        let mut conf = CrawlerConfig::default();
        if let Some(ua) = &args.ua {
            conf.user_agent = ua.to_string();
        }
        let rt = runtime::Builder::new_current_thread().enable_all().build()?;
        match rt.block_on(fetch(&conf, url)) {
            FetchResult::Ok { body, .. } => body,
            FetchResult::HttpError(status) => bail!("Got HTTP {status} for {url}"),
            FetchResult::TransportError(e) => return Err(e.context(format!("Couldn't fetch {url}"))),
        }
    } else if let Some(path) = &args.file {
        fs_err::read_to_string(path)?
    } else {
        bail!("Missing `url` or `file`");
    };

    let rules = HintedRules::new(
        args.programs_selector.as_deref(),
        args.requirements_selector.as_deref(),
    );
    let fragments = json!({
        "main": rules.scrap_main(&page),
        "admissions": rules.scrap_admissions(&page),
    });
    println!("{}", serde_json::to_string_pretty(&fragments)?);
    Ok(())
}

fn init_logs(filter: &str) {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", filter);
    }
    env_logger::init();
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    match args.cmd {
        None => {
            if !args.run.quiet {
                init_logs("glinax=info,glinax_crawler=info,glinax_store=info");
            }
            run(args.run)
        }
        Some(SubCommand::Scrap(args)) => {
            init_logs("glinax_crawler=warn,glinax_extract=warn");
            scrap(args)
        }
        Some(SubCommand::Completion) => {
            generate(Shell::Bash, &mut Args::command(), "glinax", &mut io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        Args::try_parse_from(argv).unwrap().run
    }

    #[test]
    fn flags_override_crawler_config() {
        let args = run_args(&["glinax", "--source-delay", "0.5", "--max-retries", "2"]);
        let conf = CrawlerConfig::try_from(&args).unwrap();
        assert_eq!(conf.source_delay, 0.5);
        assert_eq!(conf.max_retries, 2);
    }

    #[test]
    fn huge_source_delay_is_an_error() {
        let args = run_args(&["glinax", "--source-delay", "1e30"]);
        let err = CrawlerConfig::try_from(&args).unwrap_err();
        assert!(err.to_string().contains("sourceDelay"), "{err}");
    }

    #[test]
    fn invalid_crawler_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sourceDelay: .inf").unwrap();
        let path = file.path().to_str().unwrap();

        let args = run_args(&["glinax", "--crawler-config", path]);
        assert!(CrawlerConfig::try_from(&args).is_err());
    }
}
