mod config;
mod table;

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use client_core::{
    DeclarationList, EntityDescriptor, LinkOutcome, ListController, LogErrorHandler,
    MasterContext, PersonList, PublicationList, QuotationList, RemoteDataApi, RestClient, Session,
};
use shared::{
    domain::{DeclarationId, Master, PersonId, PublicationId, QuotationId},
    protocol::SortSpec,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ListKind {
    Persons,
    Publications,
    Declarations,
    Quotations,
}

/// Browse one list of the climate science database under a master selection.
#[derive(Parser, Debug)]
#[command(name = "climate")]
struct Args {
    #[arg(value_enum)]
    list: ListKind,
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    service_url: Option<String>,
    #[arg(long)]
    user: Option<String>,
    /// NONE, PERSONS, PUBLICATIONS, DECLARATIONS or QUOTATIONS.
    #[arg(long, default_value_t = Master::None)]
    master: Master,
    #[arg(long)]
    person_id: Option<i64>,
    #[arg(long)]
    publication_id: Option<i64>,
    #[arg(long)]
    declaration_id: Option<i64>,
    #[arg(long)]
    quotation_id: Option<i64>,
    #[arg(long, default_value = "")]
    filter: String,
    /// Column and direction, e.g. `LAST_NAME+ASC`.
    #[arg(long)]
    sort: Option<SortSpec>,
    #[arg(long, default_value_t = 0)]
    page: u32,
    #[arg(long)]
    page_size: Option<u32>,
    /// Row id to select after loading.
    #[arg(long)]
    select: Option<i64>,
    /// Link or unlink the selected row and the master person.
    #[arg(long, requires = "select")]
    toggle_link: bool,
    /// Print the export URL for this content type.
    #[arg(long, value_name = "CONTENT_TYPE")]
    download: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(&args.config)?;
    if let Some(v) = &args.service_url {
        settings.service_url = v.clone();
    }
    if let Some(v) = &args.user {
        settings.user = Some(v.clone());
    }
    if let Some(v) = args.page_size {
        settings.page_size = v;
    }

    let session = Arc::new(Session::new());
    let rest = Arc::new(
        RestClient::new(&settings.service_url, session.clone())
            .with_context(|| format!("invalid service url '{}'", settings.service_url))?,
    );
    sign_in(&rest, settings.user.as_deref()).await?;
    let master = resolve_master(&*rest, &args).await?;

    match args.list {
        ListKind::Persons => browse(PersonList, &rest, &session, &settings, master, &args).await,
        ListKind::Publications => {
            browse(PublicationList, &rest, &session, &settings, master, &args).await
        }
        ListKind::Declarations => {
            browse(DeclarationList, &rest, &session, &settings, master, &args).await
        }
        ListKind::Quotations => {
            browse(QuotationList, &rest, &session, &settings, master, &args).await
        }
    }
}

async fn sign_in(rest: &RestClient, user: Option<&str>) -> Result<()> {
    let Some(user) = user else {
        info!("no user configured; browsing anonymously");
        return Ok(());
    };
    let password =
        std::env::var("CLIMATE_PASSWORD").context("CLIMATE_PASSWORD must be set to log in")?;
    if !rest.login(user, &password).await? {
        bail!("login rejected for user '{user}'");
    }
    Ok(())
}

async fn resolve_master(api: &dyn RemoteDataApi, args: &Args) -> Result<MasterContext> {
    let mut context = MasterContext::new(args.master);
    if let Some(id) = args.person_id {
        context.person = api.get_person_by_id(PersonId(id)).await?;
        if context.person.is_none() {
            warn!(person_id = id, "master person not found");
        }
    }
    if let Some(id) = args.publication_id {
        context.publication = api.get_publication_by_id(PublicationId(id)).await?;
        if context.publication.is_none() {
            warn!(publication_id = id, "master publication not found");
        }
    }
    if let Some(id) = args.declaration_id {
        context.declaration = api.get_declaration_by_id(DeclarationId(id)).await?;
        if context.declaration.is_none() {
            warn!(declaration_id = id, "master declaration not found");
        }
    }
    if let Some(id) = args.quotation_id {
        context.quotation = api.get_quotation_by_id(QuotationId(id)).await?;
        if context.quotation.is_none() {
            warn!(quotation_id = id, "master quotation not found");
        }
    }
    Ok(context)
}

async fn browse<E: EntityDescriptor>(
    descriptor: E,
    rest: &Arc<RestClient>,
    session: &Arc<Session>,
    settings: &Settings,
    master: MasterContext,
    args: &Args,
) -> Result<()> {
    let list = ListController::new(
        descriptor,
        rest.clone(),
        session.clone(),
        Arc::new(LogErrorHandler),
        settings.list_settings(),
        master,
    );
    list.commit_filter(&args.filter).await;
    list.set_sort(args.sort.clone()).await;
    list.set_page(args.page, settings.page_size).await;
    if let Some(load) = list.start().await {
        load.await?;
    }

    let name = list.descriptor().name();
    let state = list.state();
    println!("{name}: {} of {}", state.page.len(), state.total_count);
    println!(
        "{}",
        table::render_rows(list.descriptor().display_columns(), &state.page)?
    );

    if let Some(id) = args.select {
        if !list.select_row(id, false).await {
            bail!("row {id} is not on this page of {name}");
        }
        if args.toggle_link {
            match list.toggle_link().await {
                LinkOutcome::Linked => println!("linked {id}"),
                LinkOutcome::Unlinked => println!("unlinked {id}"),
                LinkOutcome::Reverted => bail!("server refused to change the link for {id}"),
                LinkOutcome::Unavailable => {
                    bail!("linking {name} needs --master PERSONS and --person-id")
                }
            }
        }
    }

    if let Some(content_type) = &args.download {
        match list.download_url(&settings.service_url, content_type).await? {
            Some(url) => println!("{url}"),
            None => println!("{name} has nothing to export under master {}", args.master),
        }
    }

    list.shutdown();
    Ok(())
}
