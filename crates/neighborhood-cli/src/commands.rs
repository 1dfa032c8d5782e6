//! Command handlers.
//!
//! `App` owns the loaded config, the session and one in-memory neighborhood
//! seeded at start-up. Data changes last as long as the process, so they are
//! only visible across commands inside `shell`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};

use neighborhood_core::offline::{
    CacheStorage, DiskStorage, FetchOutcome, Method, Network, OfflineCache, Registration, Request,
    ResponseSource, Startup, Url, CACHE_NAME,
};
use neighborhood_core::config::API_URL_ENV;
use neighborhood_core::screens::menu_for;
use neighborhood_core::store::{Entity, EntityForm, EntityService};
use neighborhood_core::{
    open_screen, ApiClient, ApiError, Config, Neighborhood, Role, Screen, ScreenAccess, Session,
    SessionContext,
};

use crate::cli::{ApiRequest, Args, Command, EntityAction, OfflineCommand};
use crate::render::{print_details, Describe, PrintNotifier};

/// Password used instead of prompting
const PASSWORD_ENV: &str = "NEIGHBORHOOD_PASSWORD";

/// Token for backend API requests
const API_TOKEN_ENV: &str = "NEIGHBORHOOD_API_TOKEN";

/// Offline cache directory under the data directory
const OFFLINE_DIR: &str = "offline";

pub struct App {
    config: Config,
    data_dir: PathBuf,
    session: Session,
    neighborhood: Neighborhood,
}

impl App {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let config = Config::load()?.with_env();
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => Config::data_dir()?,
        };

        let mut session = Session::new(data_dir.clone());
        session.load()?;

        Ok(Self {
            config,
            data_dir,
            session,
            neighborhood: Neighborhood::seeded(Arc::new(PrintNotifier)),
        })
    }

    fn context(&self) -> Result<SessionContext> {
        self.session
            .context()
            .context("Not logged in. Run `neighborhood login` first.")
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Login { identifier, role } => self.login(identifier, role),
            Command::Logout => self.logout(),
            Command::Whoami => self.whoami(),
            Command::Menu => self.menu(),
            Command::Open { screen } => self.open(screen),
            Command::Residents {
                action: EntityAction::List { search: Some(query) },
            } => {
                let ctx = self.context()?;
                let residents = self.neighborhood.search_residents(&ctx, &query).await?;
                print_rows(&residents);
                Ok(())
            }
            Command::Residents { action } => {
                entity_command(&self.context()?, &self.neighborhood.residents, action).await
            }
            Command::Schedule { action } => {
                entity_command(&self.context()?, &self.neighborhood.schedule, action).await
            }
            Command::Announcements { action } => {
                entity_command(&self.context()?, &self.neighborhood.announcements, action).await
            }
            Command::Feedback {
                action: EntityAction::Reply { id, text },
            } => {
                let ctx = self.context()?;
                let item = self.neighborhood.reply_feedback(&ctx, id, &text).await?;
                print_details(&item.details());
                Ok(())
            }
            Command::Feedback { action } => {
                entity_command(&self.context()?, &self.neighborhood.feedback, action).await
            }
            Command::Reports { action } => {
                entity_command(&self.context()?, &self.neighborhood.reports, action).await
            }
            Command::Stats => self.stats().await,
            Command::Shell => bail!("Already in a shell"),
            Command::Api { request } => self.api(request).await,
            Command::Offline { command } => self.offline(command).await,
        }
    }

    // ===== Session =====

    fn login(&mut self, identifier: Option<String>, role: Role) -> Result<()> {
        let identifier = match identifier.or_else(|| self.config.last_identifier.clone()) {
            Some(identifier) => identifier,
            None => bail!("An identifier is required the first time you log in"),
        };
        let password = match std::env::var(PASSWORD_ENV) {
            Ok(password) => password,
            Err(_) => rpassword::prompt_password("Password: ").context("Failed to read password")?,
        };

        let ctx = self.session.login(&identifier, &password, role)?;

        let mut file_config = Config::load()?;
        file_config.last_identifier = Some(ctx.identifier().to_string());
        file_config.save()?;
        self.config.last_identifier = file_config.last_identifier;

        println!(
            "Logged in as {} ({} {})",
            ctx.display_name(),
            role.icon(),
            role.label()
        );
        Ok(())
    }

    fn logout(&mut self) -> Result<()> {
        if !self.session.is_valid() {
            println!("Not logged in");
            return Ok(());
        }
        self.session.clear()?;
        info!("Logged out");
        println!("Logged out");
        Ok(())
    }

    fn whoami(&self) -> Result<()> {
        let ctx = self.context()?;
        let role = ctx.role();
        println!("{} <{}>", ctx.display_name(), ctx.identifier());
        println!("Role: {} {} ({})", role.icon(), role.label(), role);
        println!("Permissions:");
        for permission in ctx.permissions().granted() {
            println!("  {}", permission.key());
        }
        Ok(())
    }

    // ===== Screens =====

    fn menu(&self) -> Result<()> {
        let ctx = self.context()?;
        for screen in menu_for(ctx.role()) {
            println!("{} {:<18} {}", screen.icon(), screen.title(), screen.path());
        }
        Ok(())
    }

    fn open(&self, screen: Screen) -> Result<()> {
        let ctx = self.session.context();
        match open_screen(ctx.as_ref(), screen) {
            ScreenAccess::Granted(affordances) => {
                println!("{} {}", screen.icon(), screen.title());
                let controls: Vec<&str> = [
                    (affordances.can_create, "add"),
                    (affordances.can_edit, "edit"),
                    (affordances.can_delete, "delete"),
                    (affordances.can_reply, "reply"),
                ]
                .iter()
                .filter(|(shown, _)| *shown)
                .map(|(_, name)| *name)
                .collect();
                if controls.is_empty() {
                    println!("Read only");
                } else {
                    println!("Controls: {}", controls.join(", "));
                }
            }
            ScreenAccess::Redirect(target) => {
                println!("Redirected to {} ({})", target.title(), target.path());
            }
        }
        Ok(())
    }

    async fn stats(&self) -> Result<()> {
        self.context()?;
        let residents = self.neighborhood.resident_stats().await;
        println!("Residents:      {}", residents.total);
        println!("  active:       {}", residents.active);
        println!("  inactive:     {}", residents.inactive);
        println!("Shifts:         {}", self.neighborhood.schedule.count().await);
        println!("Announcements:  {}", self.neighborhood.announcements.count().await);
        println!("Feedback:       {}", self.neighborhood.feedback.count().await);
        Ok(())
    }

    // ===== Backend API =====

    async fn api(&self, request: ApiRequest) -> Result<()> {
        let mut client = ApiClient::new(self.config.api_url())?;
        if let Ok(token) = std::env::var(API_TOKEN_ENV) {
            client.set_token(token);
        }

        let result: Result<serde_json::Value> = match request {
            ApiRequest::Get { endpoint } => client.get(&endpoint).await,
            ApiRequest::Post { endpoint, data } => client.post(&endpoint, &parse_json(&data)?).await,
            ApiRequest::Put { endpoint, data } => client.put(&endpoint, &parse_json(&data)?).await,
            ApiRequest::Delete { endpoint } => client.delete(&endpoint).await,
        };
        let response = match result {
            Err(e) if e.downcast_ref::<ApiError>().is_some_and(ApiError::is_unreachable) => {
                return Err(e.context(format!(
                    "Backend at {} is unreachable; set {} or api_url in the config",
                    client.base_url(),
                    API_URL_ENV
                )));
            }
            other => other?,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }

    // ===== Offline cache =====

    fn origin(&self) -> Result<Url> {
        Url::parse(self.config.origin())
            .with_context(|| format!("Invalid origin: {}", self.config.origin()))
    }

    fn offline_storage(&self) -> Result<Arc<DiskStorage>> {
        Ok(Arc::new(DiskStorage::new(self.data_dir.join(OFFLINE_DIR))?))
    }

    fn offline_worker(&self, storage: &Arc<DiskStorage>) -> Result<OfflineCache<DiskStorage, ApiClient>> {
        let network = ApiClient::new(self.config.api_url())?;
        Ok(OfflineCache::new(Arc::clone(storage), network, self.origin()?)
            .with_fetch_timeout(self.config.fetch_timeout()))
    }

    async fn offline(&self, command: OfflineCommand) -> Result<()> {
        let storage = self.offline_storage()?;
        match command {
            OfflineCommand::Install => {
                let mut registration = Registration::new();
                let report = registration.register(self.offline_worker(&storage)?).await?;
                println!("Installed {}", CACHE_NAME);
                for key in &report.install.cached {
                    println!("  cached  {}", key);
                }
                for (path, reason) in &report.install.failed {
                    println!("  failed  {} ({})", path, reason);
                }
                if let Some(activate) = report.activate {
                    for name in activate.purged {
                        println!("  purged  {}", name);
                    }
                }
                Ok(())
            }
            OfflineCommand::Fetch { urls, method, body } => {
                let method = Method::from_bytes(method.to_uppercase().as_bytes())
                    .with_context(|| format!("Invalid method: {}", method))?;
                let origin = self.origin()?;

                let mut registration = Registration::new();
                match registration
                    .register_or_resume(self.offline_worker(&storage)?)
                    .await?
                {
                    Startup::Registered(_) => {
                        debug!(cache = CACHE_NAME, "Installed offline cache before fetching")
                    }
                    Startup::Resumed(report) => {
                        debug!(cache = CACHE_NAME, purged = ?report.purged, "Resumed offline cache")
                    }
                }
                let direct = ApiClient::new(self.config.api_url())?;

                for raw in urls {
                    let url = origin
                        .join(&raw)
                        .with_context(|| format!("Invalid URL: {}", raw))?;
                    let request = Request::new(method.clone(), url);
                    let (response, source) = match registration.handle_fetch(&request).await {
                        FetchOutcome::Respond { response, source } => (response, describe_source(&source)),
                        FetchOutcome::Passthrough => match direct.fetch(&request).await {
                            Ok(response) => (response, "passthrough".to_string()),
                            Err(e) => {
                                println!("ERR {:<12} {} ({})", "passthrough", request.url, e);
                                continue;
                            }
                        },
                    };
                    println!(
                        "{} {:<12} {} ({} bytes)",
                        response.status,
                        source,
                        request.url,
                        response.body.len()
                    );
                    if body {
                        println!("{}", response.text());
                    }
                }
                Ok(())
            }
            OfflineCommand::Status => {
                let names = storage.cache_names()?;
                if names.is_empty() {
                    println!("No offline caches in {}", storage.root().display());
                }
                for name in names {
                    let marker = if name == CACHE_NAME { "current" } else { "stale" };
                    println!("{} ({})", name, marker);
                    let entries = storage.entries(&name)?;
                    for (key, cached) in entries {
                        let flag = if cached.is_stale() { " (old)" } else { "" };
                        println!("  {:<50} {}{}", key, cached.age_display(), flag);
                    }
                }
                Ok(())
            }
        }
    }
}

fn describe_source(source: &ResponseSource) -> String {
    match source {
        ResponseSource::Network => "network".to_string(),
        ResponseSource::Cache => "cache".to_string(),
        ResponseSource::Fallback(key) => format!("fallback:{}", key),
        ResponseSource::Offline => "offline".to_string(),
    }
}

fn parse_json(data: &str) -> Result<serde_json::Value> {
    serde_json::from_str(data).context("Request body is not valid JSON")
}

fn print_rows<T: Describe>(items: &[T]) {
    if items.is_empty() {
        println!("(none)");
    }
    for item in items {
        println!("{}", item.row());
    }
}

fn form_from(fields: Vec<(String, String)>) -> EntityForm {
    fields
        .into_iter()
        .fold(EntityForm::new(), |form, (name, value)| form.with(&name, value))
}

/// The list, show, form and CRUD actions every entity shares.
async fn entity_command<T: Entity + Describe>(
    ctx: &SessionContext,
    service: &EntityService<T>,
    action: EntityAction,
) -> Result<()> {
    match action {
        EntityAction::List { search: None } => {
            print_rows(&service.list(ctx).await?);
        }
        EntityAction::List { search: Some(_) } => {
            bail!("Search is only available for residents");
        }
        EntityAction::Show { id } => {
            print_details(&service.get(ctx, id).await?.details());
        }
        EntityAction::Form => {
            let form = service.blank_form(ctx)?;
            for field in T::schema().fields {
                let value = form.get(field.name).unwrap_or("");
                let required = if field.required { "*" } else { " " };
                println!("{}{:<10} {:<12} {}", required, field.name, field.label, value);
            }
        }
        EntityAction::Add { fields } => {
            let item = service.create(ctx, &form_from(fields)).await?;
            print_details(&item.details());
        }
        EntityAction::Edit { id, fields } => {
            let item = service.update(ctx, id, &form_from(fields)).await?;
            print_details(&item.details());
        }
        EntityAction::Delete { id } => {
            service.delete(ctx, id).await?;
        }
        EntityAction::Reply { .. } => {
            bail!("Reply is only available for feedback");
        }
    }
    Ok(())
}

/// Read commands line by line until EOF or `exit`.
pub async fn run_shell(app: &mut App) -> Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("neighborhood> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }

        let tokens = match crate::cli::split_args(&line) {
            Ok(tokens) => tokens,
            Err(e) => {
                eprintln!("Error: {}", e);
                continue;
            }
        };
        match tokens.first().map(String::as_str) {
            None => continue,
            Some("exit") | Some("quit") => return Ok(()),
            Some(_) => {}
        }

        let args = match Args::try_parse_from(std::iter::once("neighborhood".to_string()).chain(tokens)) {
            Ok(args) => args,
            Err(e) => {
                // Help and usage errors alike
                let _ = e.print();
                continue;
            }
        };
        if let Err(e) = app.run(args.command).await {
            crate::report_error(&e);
        }
    }
}
